//! Phone number normalization and sender-id validation.
//!
//! TransmitSMS expects E.164 numbers as bare digits: no `+`, no leading zero.
//! These helpers convert local numbers using the static dialing-code table in
//! [`super::country`] and never talk to the network.

use super::country;

/// Maximum number of recipients accepted in one API call.
pub const MAX_RECIPIENTS: usize = 500;

/// Maximum length of an alphanumeric sender id.
pub const MAX_SENDER_ID_LENGTH: usize = 11;

const MIN_E164_DIGITS: usize = 7;
const MAX_E164_DIGITS: usize = 15;
const MIN_INTERNATIONAL_DIGITS: usize = 10;

/// Caller errors raised by the phone helpers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidArgument {
    #[error("Invalid country code: {input}")]
    UnknownCountry { input: String },

    #[error("Maximum {max} recipients allowed per API call, got {actual}")]
    TooManyRecipients { max: usize, actual: usize },

    #[error("invalid phone number: {input}")]
    InvalidPhoneNumber { input: String },
}

/// Result of [`validate_multiple`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipientCheck {
    /// Cleaned numbers that passed [`is_valid`].
    pub valid: Vec<String>,
    /// Original (trimmed) entries that failed.
    pub invalid: Vec<String>,
}

/// Drop every character that is not an ASCII digit.
pub fn clean_number(number: &str) -> String {
    number.chars().filter(char::is_ascii_digit).collect()
}

/// Convert a local number to E.164 digits.
///
/// Without a country the cleaned digits are returned as-is. Numbers that already
/// carry the country's dialing code (and are long enough to be international)
/// are not prefixed twice. Exactly one leading `0` is stripped before prefixing.
pub fn to_international(number: &str, country: Option<&str>) -> Result<String, InvalidArgument> {
    let cleaned = clean_number(number);

    let Some(country) = country else {
        return Ok(cleaned);
    };

    let dialing_code =
        country::dialing_code(country).ok_or_else(|| InvalidArgument::UnknownCountry {
            input: country.to_owned(),
        })?;

    if cleaned.starts_with(dialing_code) && cleaned.len() >= MIN_INTERNATIONAL_DIGITS {
        return Ok(cleaned);
    }

    let national = cleaned.strip_prefix('0').unwrap_or(&cleaned);
    Ok(format!("{dialing_code}{national}"))
}

/// Format a comma-separated recipient list.
///
/// Entries are trimmed and empty entries dropped; more than [`MAX_RECIPIENTS`]
/// entries is an error.
pub fn format_multiple(numbers: &str, country: Option<&str>) -> Result<String, InvalidArgument> {
    let entries = split_recipients(numbers).collect::<Vec<_>>();
    if entries.len() > MAX_RECIPIENTS {
        return Err(InvalidArgument::TooManyRecipients {
            max: MAX_RECIPIENTS,
            actual: entries.len(),
        });
    }

    let formatted = entries
        .into_iter()
        .map(|entry| to_international(entry, country))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(formatted.join(","))
}

/// Whether `number` is plausible E.164: 7 to 15 digits, no leading zero.
pub fn is_valid(number: &str) -> bool {
    let cleaned = clean_number(number);
    (MIN_E164_DIGITS..=MAX_E164_DIGITS).contains(&cleaned.len()) && !cleaned.starts_with('0')
}

/// Split a comma-separated list into valid (cleaned) and invalid entries.
pub fn validate_multiple(numbers: &str) -> RecipientCheck {
    let mut check = RecipientCheck::default();
    for entry in split_recipients(numbers) {
        let cleaned = clean_number(entry);
        if is_valid(&cleaned) {
            check.valid.push(cleaned);
        } else {
            check.invalid.push(entry.to_owned());
        }
    }
    check
}

/// Heuristic: no leading zero, at least 10 digits and a known dialing code prefix.
pub fn is_international(number: &str) -> bool {
    let cleaned = clean_number(number);
    !cleaned.starts_with('0')
        && cleaned.len() >= MIN_INTERNATIONAL_DIGITS
        && country::starts_with_known_dialing_code(&cleaned)
}

/// A sender id is either a valid E.164 number (digits only) or an alphanumeric id.
pub fn is_valid_sender_id(sender_id: &str) -> bool {
    if is_all_digits(sender_id) && is_valid(sender_id) {
        return true;
    }
    is_valid_alphanumeric_sender_id(sender_id)
}

/// Non-empty, at most 11 ASCII letters and digits.
pub fn is_valid_alphanumeric_sender_id(sender_id: &str) -> bool {
    !sender_id.is_empty()
        && sender_id.len() <= MAX_SENDER_ID_LENGTH
        && sender_id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Format a sender id that looks like a phone number; alphanumeric ids pass through.
pub fn format_sender_id(sender_id: &str, country: Option<&str>) -> Result<String, InvalidArgument> {
    if looks_like_phone_number(sender_id) {
        return to_international(sender_id, country);
    }
    Ok(sender_id.to_owned())
}

/// Number of non-empty entries in a comma-separated list.
pub fn count_recipients(numbers: &str) -> usize {
    split_recipients(numbers).count()
}

/// Digits plus the punctuation people type into phone numbers.
pub(crate) fn looks_like_phone_number(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '+' | '(' | ')'))
}

fn is_all_digits(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

fn split_recipients(numbers: &str) -> impl Iterator<Item = &str> {
    numbers
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
}
