use crate::domain::value::{ListId, MessageId};

use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
/// Accepted `send-sms` request.
pub struct SmsSent {
    pub message_id: MessageId,
    /// Scheduled or actual send time as reported by the API (UTC, no zone on the wire).
    pub send_at: Option<NaiveDateTime>,
    pub recipients: u32,
    /// Exact decimal token from the response, e.g. `"0.0700"`.
    pub cost: Option<String>,
    /// Number of SMS parts per recipient.
    pub sms: u32,
    pub list: Option<ListSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListSummary {
    pub id: ListId,
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Account balance. `balance` keeps the exact decimal token.
pub struct Balance {
    pub balance: String,
    pub currency: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// Number type reported by `format-number`.
pub enum NumberType {
    Landline,
    Mobile,
    Invalid,
    Unknown(i64),
}

impl NumberType {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Self::Landline,
            1 => Self::Mobile,
            10 => Self::Invalid,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of `format-number`.
pub struct FormattedNumber {
    pub country_code: String,
    pub national_number: String,
    /// E.164 digits without `+`.
    pub international: String,
    pub number_type: NumberType,
    pub is_valid: bool,
}

impl FormattedNumber {
    pub fn is_mobile(&self) -> bool {
        self.number_type == NumberType::Mobile
    }

    pub fn is_landline(&self) -> bool {
        self.number_type == NumberType::Landline
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// Rate-limit metadata from response headers.
pub struct RateLimitInfo {
    /// `X-Rate-Limit-Limit`
    pub limit: Option<u32>,
    /// `X-Rate-Limit-Remaining`
    pub remaining: Option<u32>,
    /// `X-Rate-Limit-Reset`, unix seconds.
    pub reset: Option<i64>,
    /// `Retry-After`, seconds.
    pub retry_after: Option<u64>,
}

impl RateLimitInfo {
    /// Seconds to wait: the explicit `Retry-After`, else the time until reset.
    pub fn effective_retry_after(&self, now_unix: i64) -> Option<u64> {
        if let Some(seconds) = self.retry_after {
            return Some(seconds);
        }
        self.reset
            .map(|reset| u64::try_from(reset.saturating_sub(now_unix)).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_after_prefers_header_then_reset() {
        let info = RateLimitInfo {
            reset: Some(1_000),
            retry_after: Some(5),
            ..Default::default()
        };
        assert_eq!(info.effective_retry_after(990), Some(5));

        let info = RateLimitInfo {
            reset: Some(1_000),
            ..Default::default()
        };
        assert_eq!(info.effective_retry_after(990), Some(10));
        assert_eq!(info.effective_retry_after(1_010), Some(0));
        assert_eq!(RateLimitInfo::default().effective_retry_after(0), None);
    }

    #[test]
    fn number_type_codes() {
        assert_eq!(NumberType::from_code(0), NumberType::Landline);
        assert_eq!(NumberType::from_code(1), NumberType::Mobile);
        assert_eq!(NumberType::from_code(10), NumberType::Invalid);
        assert_eq!(NumberType::from_code(7), NumberType::Unknown(7));
    }
}
