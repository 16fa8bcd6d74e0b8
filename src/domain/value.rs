use crate::domain::validation::ValidationError;
use crate::support::phone::{self, InvalidArgument};
use crate::support::url::{HostResolver, UrlSafetyChecker, validate_email, validate_url};

use chrono::{DateTime, Utc};
use phonenumber::country;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// TransmitSMS API key, sent as the basic-auth username.
///
/// Invariant: non-empty after trimming.
pub struct ApiKey(String);

impl ApiKey {
    pub const FIELD: &'static str = "api_key";

    /// Create a validated [`ApiKey`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, PartialEq, Eq, Hash)]
/// TransmitSMS API secret, sent as the basic-auth password.
///
/// Invariant: must not be empty (whitespace is preserved). `Debug` output is redacted.
pub struct ApiSecret(String);

impl ApiSecret {
    pub const FIELD: &'static str = "api_secret";

    /// Create a validated [`ApiSecret`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ApiSecret(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// SMS message body (`message`).
///
/// Invariant: non-empty after trimming and at most [`MessageText::MAX_LENGTH`]
/// characters. The original value (including whitespace) is preserved.
pub struct MessageText(String);

impl MessageText {
    pub const FIELD: &'static str = "message";

    /// Longest message accepted by the API (four concatenated parts).
    pub const MAX_LENGTH: usize = 612;

    /// Create validated message text.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        let length = value.chars().count();
        if length > Self::MAX_LENGTH {
            return Err(ValidationError::MessageTooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            });
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Sender id (`from`): a virtual number, short code or alphanumeric id.
///
/// Invariant: non-empty after trimming. Values that do not look like a phone
/// number must be at most 11 ASCII letters and digits.
pub struct SenderId(String);

impl SenderId {
    pub const FIELD: &'static str = "from";

    /// Create a validated [`SenderId`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::Empty { field: Self::FIELD });
        }
        if !phone::looks_like_phone_number(trimmed)
            && !phone::is_valid_alphanumeric_sender_id(trimmed)
        {
            return Err(ValidationError::InvalidSenderId {
                input: trimmed.to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this id is a phone number rather than an alphanumeric id.
    pub fn is_phone_number(&self) -> bool {
        phone::looks_like_phone_number(&self.0)
    }

    /// Convert a phone-number sender id to E.164 digits using `country`.
    ///
    /// Alphanumeric ids are returned unchanged.
    pub fn to_international(&self, country: &str) -> Result<Self, InvalidArgument> {
        Ok(Self(phone::format_sender_id(&self.0, Some(country))?))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Recipient number as sent to TransmitSMS (`to`).
///
/// Invariant: non-empty, ASCII digits only. The number may still be in local
/// form; [`Recipient::international`] converts it locally, otherwise the API's
/// `countrycode` parameter does.
pub struct Recipient(String);

impl Recipient {
    pub const FIELD: &'static str = "to";

    /// Strip formatting characters and keep the digits.
    pub fn new(value: impl AsRef<str>) -> Result<Self, InvalidArgument> {
        let value = value.as_ref();
        let cleaned = phone::clean_number(value);
        if cleaned.is_empty() {
            return Err(InvalidArgument::InvalidPhoneNumber {
                input: value.to_owned(),
            });
        }
        Ok(Self(cleaned))
    }

    /// Convert a local number to E.164 digits using `country` (ISO code or name).
    pub fn international(value: impl AsRef<str>, country: &str) -> Result<Self, InvalidArgument> {
        let value = value.as_ref();
        let formatted = phone::to_international(value, Some(country))?;
        if !phone::is_valid(&formatted) {
            return Err(InvalidArgument::InvalidPhoneNumber {
                input: value.to_owned(),
            });
        }
        Ok(Self(formatted))
    }

    /// Parse a comma-separated list, formatting each entry when `country` is given.
    pub fn parse_list(numbers: &str, country: Option<&str>) -> Result<Vec<Self>, InvalidArgument> {
        phone::format_multiple(numbers, country)?
            .split(',')
            .filter(|entry| !entry.is_empty())
            .map(Self::new)
            .collect()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the number already looks like E.164 (7–15 digits, no leading zero).
    pub fn is_e164(&self) -> bool {
        phone::is_valid(&self.0)
    }
}

impl From<PhoneNumber> for Recipient {
    /// E.164 without the leading `+`, as TransmitSMS expects.
    fn from(value: PhoneNumber) -> Self {
        Self(value.digits)
    }
}

#[derive(Debug, Clone)]
/// Phone number checked against libphonenumber metadata.
///
/// This is stricter than [`Recipient::international`], which only knows
/// dialing codes. Equality, ordering and hashing use the E.164 form.
pub struct PhoneNumber {
    raw: String,
    e164: String,
    digits: String,
    parsed: phonenumber::PhoneNumber,
}

impl PhoneNumber {
    pub const FIELD: &'static str = "to";

    /// Parse and validate a number.
    ///
    /// `default_region` is used when the input has no explicit `+` country prefix.
    pub fn parse(
        default_region: Option<country::Id>,
        input: impl Into<String>,
    ) -> Result<Self, InvalidArgument> {
        let input = input.into();
        let raw = input.trim().to_owned();
        if raw.is_empty() {
            return Err(InvalidArgument::InvalidPhoneNumber { input: raw });
        }

        let parsed = phonenumber::parse(default_region, &raw)
            .map_err(|_| InvalidArgument::InvalidPhoneNumber { input: raw.clone() })?;
        if !phonenumber::is_valid(&parsed) {
            return Err(InvalidArgument::InvalidPhoneNumber { input: raw });
        }

        let e164 = phonenumber::format(&parsed)
            .mode(phonenumber::Mode::E164)
            .to_string();
        let digits = phone::clean_number(&e164);

        Ok(Self {
            raw,
            e164,
            digits,
            parsed,
        })
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// `+`-prefixed E.164 form.
    pub fn e164(&self) -> &str {
        &self.e164
    }

    /// E.164 digits without `+`.
    pub fn digits(&self) -> &str {
        &self.digits
    }

    pub fn parsed(&self) -> &phonenumber::PhoneNumber {
        &self.parsed
    }
}

impl PartialEq for PhoneNumber {
    fn eq(&self, other: &Self) -> bool {
        self.e164 == other.e164
    }
}

impl Eq for PhoneNumber {}

impl std::hash::Hash for PhoneNumber {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.e164.hash(state);
    }
}

impl std::cmp::PartialOrd for PhoneNumber {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl std::cmp::Ord for PhoneNumber {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.e164.cmp(&other.e164)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Contact list id (`list_id`).
pub struct ListId(u64);

impl ListId {
    pub const FIELD: &'static str = "list_id";

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Message id (`message_id`) assigned by TransmitSMS.
pub struct MessageId(u64);

impl MessageId {
    pub const FIELD: &'static str = "message_id";

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Delivery validity period in minutes (`validity`).
///
/// Invariant: `0..=4320`; `0` asks for the maximum period.
pub struct ValidityMinutes(u32);

impl ValidityMinutes {
    pub const FIELD: &'static str = "validity";

    /// 72 hours.
    pub const MAX: u32 = 4320;

    pub fn new(value: u32) -> Result<Self, ValidationError> {
        if value > Self::MAX {
            return Err(ValidationError::ValidityOutOfRange {
                max: Self::MAX,
                actual: value,
            });
        }
        Ok(Self(value))
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Scheduled send time (`send_at`), always UTC.
pub struct SendAt(DateTime<Utc>);

impl SendAt {
    pub const FIELD: &'static str = "send_at";

    pub fn new(at: DateTime<Utc>) -> Self {
        Self(at)
    }

    /// From Unix seconds; `None` when out of chrono's range.
    pub fn from_unix(seconds: i64) -> Option<Self> {
        DateTime::from_timestamp(seconds, 0).map(Self)
    }

    pub fn value(self) -> DateTime<Utc> {
        self.0
    }

    /// Wire format: `YYYY-MM-DD HH:MM:SS`.
    pub fn to_wire(self) -> String {
        self.0.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

impl From<DateTime<Utc>> for SendAt {
    fn from(value: DateTime<Utc>) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Callback URL attached to an outbound message.
///
/// Invariant: absolute `http`/`https` URL.
pub struct CallbackUrl(String);

impl CallbackUrl {
    pub const FIELD: &'static str = "callback_url";

    /// Create a validated [`CallbackUrl`].
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        validate_url(trimmed, Self::FIELD)?;
        Ok(Self(trimmed.to_owned()))
    }

    /// Like [`CallbackUrl::new`], additionally rejecting URLs that target internal hosts.
    pub fn new_checked<R: HostResolver>(
        value: impl Into<String>,
        checker: &UrlSafetyChecker<R>,
    ) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        checker.validate(trimmed, Self::FIELD)?;
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// URL converted into a tracked short link (`tracked_link_url`).
///
/// Invariant: absolute `http`/`https` URL.
pub struct TrackedLinkUrl(String);

impl TrackedLinkUrl {
    pub const FIELD: &'static str = "tracked_link_url";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        validate_url(value.trim(), Self::FIELD)?;
        Ok(Self(value.trim().to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Address that receives replies by e-mail (`replies_to_email`).
pub struct EmailAddress(String);

impl EmailAddress {
    pub const FIELD: &'static str = "replies_to_email";

    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();
        let trimmed = value.trim();
        validate_email(trimmed, Self::FIELD)?;
        Ok(Self(trimmed.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// API error code from the response envelope (`error.code`).
///
/// Preserved as-is even when unknown to this crate.
pub struct ErrorCode(String);

impl ErrorCode {
    /// Code the API uses for successful calls.
    pub const SUCCESS: &'static str = "SUCCESS";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS
    }

    /// Map this code to a known variant, if one exists.
    pub fn known_kind(&self) -> Option<KnownErrorCode> {
        KnownErrorCode::from_code(&self.0)
    }

    /// Whether this code is an authentication failure.
    pub fn is_auth_error(&self) -> bool {
        matches!(self.known_kind(), Some(KnownErrorCode::Authentication))
    }

    /// Whether this code is worth retrying later.
    pub fn is_retryable(&self) -> bool {
        matches!(self.known_kind(), Some(KnownErrorCode::RateLimit))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
/// Families of TransmitSMS error codes.
pub enum KnownErrorCode {
    /// `AUTH_FAILED`, `AUTH_FAILED_NO_DATA`
    Authentication,
    /// `OVER_LIMIT`
    RateLimit,
    /// `FIELD_EMPTY`, `FIELD_INVALID`, `FIELD_UNSAFE`
    Validation,
    /// `LEDGER_ERROR`
    InsufficientFunds,
    /// `RECIPIENTS_ERROR`, `LIST_EMPTY`
    InvalidRecipients,
    /// `NO_ACCESS`
    AccessDenied,
    /// `BAD_CALLER_ID`
    InvalidSender,
}

impl KnownErrorCode {
    pub fn from_code(code: &str) -> Option<Self> {
        Some(match code {
            "AUTH_FAILED" | "AUTH_FAILED_NO_DATA" => Self::Authentication,
            "OVER_LIMIT" => Self::RateLimit,
            "FIELD_EMPTY" | "FIELD_INVALID" | "FIELD_UNSAFE" => Self::Validation,
            "LEDGER_ERROR" => Self::InsufficientFunds,
            "RECIPIENTS_ERROR" | "LIST_EMPTY" => Self::InvalidRecipients,
            "NO_ACCESS" => Self::AccessDenied,
            "BAD_CALLER_ID" => Self::InvalidSender,
            _ => return None,
        })
    }
}
