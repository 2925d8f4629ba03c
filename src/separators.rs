//! Interpreting the five-character encoding block at the start of the MSH
//! segment, and the fixed segment terminator.

use crate::error::{CoreError, Result};

/// The segment terminator is not read from the header; it is the HL7
/// constant `\r`. This is also the delimiter the root divider splits the
/// whole message buffer on.
pub const SEGMENT_TERMINATOR: char = '\r';

/// The three-character identifier that must open every message, and the
/// name of the header segment itself.
pub const HEADER_SEGMENT_ID: &str = "MSH";

/// Minimum length of a valid message: `MSH` (3) + field separator (1) +
/// four encoding characters (4) + the field separator that closes the
/// encoding field (1) = 9.
pub const MINIMUM_MESSAGE_LENGTH: usize = 9;

/// The five delimiter/escape characters declared by MSH-1 and MSH-2.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Separators {
    pub field: char,
    pub component: char,
    pub repeat: char,
    pub escape: char,
    pub subcomponent: char,
}

impl Default for Separators {
    fn default() -> Self {
        Separators {
            field: '|',
            component: '^',
            repeat: '~',
            escape: '\\',
            subcomponent: '&',
        }
    }
}

impl Separators {
    /// Parse the five encoding characters out of the raw message text.
    /// `source` must already have passed [`validate_header`].
    pub fn from_message(source: &str) -> Self {
        let bytes: Vec<char> = source[3..8].chars().collect();
        Separators {
            field: bytes[0],
            component: bytes[1],
            repeat: bytes[2],
            escape: bytes[3],
            subcomponent: bytes[4],
        }
    }
}

/// Validate that `source` begins with the header segment identifier and is
/// long enough to declare its delimiters, per the input text contract.
pub fn validate_header(source: &str) -> Result<()> {
    if source.is_empty() {
        return Err(CoreError::MessageDataMustNotBeNull);
    }
    if source.len() < MINIMUM_MESSAGE_LENGTH {
        return Err(CoreError::MessageDataIsTooShort);
    }
    if !source.starts_with(HEADER_SEGMENT_ID) {
        return Err(CoreError::MessageDataMustStartWithMsh);
    }
    Ok(())
}

/// Normalize line endings to the single-character HL7 segment terminator:
/// both `\r\n` and a lone `\n` become `\r`. Per the explicit recommendation
/// in the core's design notes, this is done regardless of host platform,
/// superseding a host-OS-only reading of the input text contract.
pub fn sanitize_line_endings(source: &str) -> String {
    source.replace("\r\n", "\r").replace('\n', "\r")
}
