use thiserror::Error;

/// The fixed set of ways a core operation can fail. Everything else —
/// negative-index writes, out-of-range reads — is a silent no-op per the
/// core's error-handling design, not a variant here.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("message data must not be null")]
    MessageDataMustNotBeNull,

    #[error("message data must start with MSH")]
    MessageDataMustStartWithMsh,

    #[error("message data is too short")]
    MessageDataIsTooShort,

    #[error("the root element cannot be deleted")]
    RootElementCannotBeDeleted,

    #[error("the root element cannot be erased")]
    RootElementCannotBeErased,
}

pub type Result<T> = std::result::Result<T, CoreError>;
