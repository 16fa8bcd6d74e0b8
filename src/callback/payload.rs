//! Inbound callback payloads.
//!
//! TransmitSMS sends callback fields as query parameters and has used several
//! names for the same field over time, so decoding is lenient: each field tries
//! its known aliases in order and falls back to a default.

use std::collections::HashMap;

use chrono::Utc;

use crate::callback::CallbackType;
use crate::domain::MessageId;

type Query = HashMap<String, String>;

fn first<'a>(query: &'a Query, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| query.get(*key).map(String::as_str))
}

fn first_owned(query: &Query, keys: &[&str]) -> Option<String> {
    first(query, keys).map(str::to_owned)
}

fn message_id(query: &Query) -> MessageId {
    MessageId::new(
        first(query, &["message_id"])
            .and_then(|raw| raw.trim().parse().ok())
            .unwrap_or_default(),
    )
}

fn now() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Delivery receipt.
pub struct DlrCallback {
    pub message_id: MessageId,
    pub mobile: String,
    /// `delivered`, `pending`, `failed` or another provider status.
    pub status: String,
    pub datetime: Option<String>,
    pub sender_id: Option<String>,
    pub error_code: Option<String>,
    pub error_description: Option<String>,
}

impl DlrCallback {
    pub const STATUS_DELIVERED: &'static str = "delivered";
    pub const STATUS_PENDING: &'static str = "pending";
    pub const STATUS_FAILED: &'static str = "failed";

    pub fn from_query(query: &Query) -> Self {
        Self {
            message_id: message_id(query),
            mobile: first_owned(query, &["mobile", "msisdn"]).unwrap_or_default(),
            status: first_owned(query, &["status"])
                .unwrap_or_else(|| Self::STATUS_PENDING.to_owned()),
            datetime: first_owned(query, &["datetime", "delivery_time"]),
            sender_id: first_owned(query, &["sender_id", "from"]),
            error_code: first_owned(query, &["error_code", "error"]),
            error_description: first_owned(query, &["error_description", "error_msg"]),
        }
    }

    pub fn is_delivered(&self) -> bool {
        self.status.eq_ignore_ascii_case(Self::STATUS_DELIVERED)
    }

    pub fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case(Self::STATUS_PENDING)
    }

    pub fn is_failed(&self) -> bool {
        self.status.eq_ignore_ascii_case(Self::STATUS_FAILED)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Inbound reply to a sent message.
pub struct ReplyCallback {
    pub message_id: MessageId,
    pub mobile: String,
    pub message: String,
    /// Provider timestamp, or the local receive time when absent.
    pub received_at: String,
    pub response_id: Option<u64>,
    /// The virtual number the reply was sent to.
    pub longcode: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ReplyCallback {
    pub fn from_query(query: &Query) -> Self {
        Self {
            message_id: message_id(query),
            mobile: first_owned(query, &["mobile", "msisdn", "from"]).unwrap_or_default(),
            message: first_owned(query, &["message", "response", "body"]).unwrap_or_default(),
            received_at: first_owned(query, &["received_at", "datetime"]).unwrap_or_else(now),
            response_id: first(query, &["response_id", "id"])
                .map(|raw| raw.trim().parse().unwrap_or_default()),
            longcode: first_owned(query, &["longcode", "to"]),
            first_name: first_owned(query, &["first_name"]),
            last_name: first_owned(query, &["last_name"]),
        }
    }

    /// `first last`, trimmed; `None` when neither part is present.
    pub fn full_name(&self) -> Option<String> {
        if self.first_name.is_none() && self.last_name.is_none() {
            return None;
        }
        let full = format!(
            "{} {}",
            self.first_name.as_deref().unwrap_or_default(),
            self.last_name.as_deref().unwrap_or_default()
        );
        Some(full.trim().to_owned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Click on a tracked link.
pub struct LinkHitCallback {
    pub message_id: MessageId,
    pub mobile: String,
    pub url: String,
    pub clicked_at: String,
    pub user_agent: Option<String>,
    pub ip_address: Option<String>,
}

impl LinkHitCallback {
    pub fn from_query(query: &Query) -> Self {
        Self {
            message_id: message_id(query),
            mobile: first_owned(query, &["mobile", "msisdn"]).unwrap_or_default(),
            url: first_owned(query, &["url", "link"]).unwrap_or_default(),
            clicked_at: first_owned(query, &["clicked_at", "datetime"]).unwrap_or_else(now),
            user_agent: first_owned(query, &["user_agent"]),
            ip_address: first_owned(query, &["ip_address", "ip"]),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// A decoded callback of any type.
pub enum CallbackPayload {
    Dlr(DlrCallback),
    Reply(ReplyCallback),
    LinkHit(LinkHitCallback),
}

impl CallbackPayload {
    pub fn from_query(kind: CallbackType, query: &Query) -> Self {
        match kind {
            CallbackType::Dlr => Self::Dlr(DlrCallback::from_query(query)),
            CallbackType::Reply => Self::Reply(ReplyCallback::from_query(query)),
            CallbackType::LinkHits => Self::LinkHit(LinkHitCallback::from_query(query)),
        }
    }

    pub fn kind(&self) -> CallbackType {
        match self {
            Self::Dlr(_) => CallbackType::Dlr,
            Self::Reply(_) => CallbackType::Reply,
            Self::LinkHit(_) => CallbackType::LinkHits,
        }
    }

    pub fn message_id(&self) -> MessageId {
        match self {
            Self::Dlr(dlr) => dlr.message_id,
            Self::Reply(reply) => reply.message_id,
            Self::LinkHit(hit) => hit.message_id,
        }
    }

    pub fn mobile(&self) -> &str {
        match self {
            Self::Dlr(dlr) => &dlr.mobile,
            Self::Reply(reply) => &reply.mobile,
            Self::LinkHit(hit) => &hit.mobile,
        }
    }
}
