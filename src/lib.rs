//! A mutable cursor engine over HL7v2 message text.
//!
//! HL7 v2 messages are delimited text with five nested levels — segment,
//! field, repetition, component, subcomponent — declared by a five
//! character encoding header. This crate maps that text to a tree of
//! addressable, *live* nodes: reading or writing any leaf reads or writes
//! straight through to one shared buffer, and every other cursor derived
//! from the same message stays consistent via a version-stamped cache.
//!
//! # Examples
//!
//! ```
//! use hl7_cursor::Message;
//!
//! let message = Message::new("MSH|^~\\&|APP|FAC|DEST|DESTFAC|20240101000000||ADT^A01|1|P|2.3")
//!     .expect("valid MSH header");
//! assert_eq!(message.message_type(), "ADT");
//! assert_eq!(message.trigger_event(), "A01");
//!
//! let pid = message.segment(2);
//! pid.get(5).set_value("Doe^John");
//! assert_eq!(pid.get(5).get(1).get(1).value(), "Doe");
//! ```

mod buffer;
mod divider;
mod division;
mod element;
mod error;
mod escape;
mod location;
mod message;
mod path;
mod separators;

pub use division::StringDivision;
pub use element::{Element, ElementKey, ElementKind};
pub use error::{CoreError, Result};
pub use location::LocatedElement;
pub use message::{Message, Party};
pub use path::{LocationQuery, SegmentSelector};
pub use separators::Separators;

/// Parse `source` into a [`Message`]. Equivalent to [`Message::new`].
pub fn parse_message(source: &str) -> Result<Message> {
    Message::new(source)
}
