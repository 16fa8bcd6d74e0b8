use std::fmt;

/// Coarse classification of a [`ValidationError`], mirroring the API's own
/// field error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    /// `FIELD_EMPTY`
    FieldEmpty,
    /// `FIELD_INVALID`
    FieldInvalid,
    /// `FIELD_UNSAFE`
    FieldUnsafe,
}

impl ValidationKind {
    /// Error code string used by TransmitSMS for this kind.
    pub fn code(self) -> &'static str {
        match self {
            Self::FieldEmpty => "FIELD_EMPTY",
            Self::FieldInvalid => "FIELD_INVALID",
            Self::FieldUnsafe => "FIELD_UNSAFE",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Empty { field: &'static str },
    InvalidUrl { field: &'static str, url: String },
    UnsupportedScheme { field: &'static str, url: String },
    UnsafeUrl { field: &'static str, url: String },
    InvalidEmail { field: &'static str, email: String },
    InvalidSenderId { input: String },
    MessageTooLong { max: usize, actual: usize },
    TooManyRecipients { max: usize, actual: usize },
    ValidityOutOfRange { max: u32, actual: u32 },
}

impl ValidationError {
    /// Classify this error the way the API classifies field errors.
    pub fn kind(&self) -> ValidationKind {
        match self {
            Self::Empty { .. } => ValidationKind::FieldEmpty,
            Self::UnsafeUrl { .. } => ValidationKind::FieldUnsafe,
            Self::InvalidUrl { .. }
            | Self::UnsupportedScheme { .. }
            | Self::InvalidEmail { .. }
            | Self::InvalidSenderId { .. }
            | Self::MessageTooLong { .. }
            | Self::TooManyRecipients { .. }
            | Self::ValidityOutOfRange { .. } => ValidationKind::FieldInvalid,
        }
    }

    /// Shorthand for `self.kind().code()`.
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "the {field} cannot be empty"),
            Self::InvalidUrl { field, url } => {
                write!(f, "the {field} is not a valid URL: {url}")
            }
            Self::UnsupportedScheme { field, url } => {
                write!(f, "the {field} must use HTTP or HTTPS protocol: {url}")
            }
            Self::UnsafeUrl { field, url } => write!(
                f,
                "the {field} must not point to internal or private resources: {url}"
            ),
            Self::InvalidEmail { field, email } => {
                write!(f, "the {field} is not a valid email address: {email}")
            }
            Self::InvalidSenderId { input } => write!(
                f,
                "invalid sender id: {input} (expected a phone number or up to 11 letters and digits)"
            ),
            Self::MessageTooLong { max, actual } => {
                write!(f, "message too long: {actual} characters (max {max})")
            }
            Self::TooManyRecipients { max, actual } => {
                write!(f, "too many recipients: {actual} (max {max})")
            }
            Self::ValidityOutOfRange { max, actual } => {
                write!(
                    f,
                    "validity minutes out of range: {actual} (expected 0..={max})"
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}
