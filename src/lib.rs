//! Typed Rust client for the TransmitSMS HTTP API.
//!
//! The crate is layered: a domain layer of strong types, a transport layer for
//! wire-format quirks, a small client layer orchestrating requests, and a
//! callback/webhook layer that signs callback URLs and verifies them when
//! TransmitSMS calls back.
//!
//! ```rust,no_run
//! use transmitsms::{Credentials, MessageText, Recipient, SendOptions, SendSms, TransmitSmsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = TransmitSmsClient::new(Credentials::new("key", "secret")?)?;
//!     let to = Recipient::new("61400000000")?;
//!     let msg = MessageText::new("hello")?;
//!     let request = SendSms::to_many(vec![to], msg, SendOptions::default())?;
//!     let sent = client.send_sms(request).await?;
//!     println!("message id: {}", sent.message_id.value());
//!     Ok(())
//! }
//! ```
//!
//! Signed callbacks round-trip through [`CallbackUrlBuilder`] and
//! [`WebhookReceiver`]:
//!
//! ```rust
//! use transmitsms::{
//!     CallbackEvent, CallbackType, CallbackUrlBuilder, HandlerError, HandlerRegistry, SigningKey,
//!     WebhookReceiver,
//! };
//!
//! let key = SigningKey::new("shared secret").unwrap();
//! let builder = CallbackUrlBuilder::new("https://app.test/webhooks/transmitsms", key.clone());
//! let url = builder
//!     .build(CallbackType::Dlr, Some("orders"), &serde_json::json!({"order": 7}))
//!     .unwrap();
//!
//! let mut registry = HandlerRegistry::new();
//! registry.register(
//!     CallbackType::Dlr,
//!     "orders",
//!     |event: &CallbackEvent| -> Result<(), HandlerError> {
//!         println!("dlr for {:?}", event.context.get("order"));
//!         Ok(())
//!     },
//! );
//! let receiver = WebhookReceiver::new(key, registry);
//!
//! let url = url::Url::parse(&url).unwrap();
//! let response = receiver.handle_query_str("webhooks/transmitsms/dlr", url.query().unwrap_or(""));
//! assert_eq!(response.status, 200);
//! ```
#![forbid(unsafe_code)]

pub mod callback;
pub mod client;
pub mod domain;
pub mod support;
mod transport;
pub mod webhook;

pub use callback::{
    CallbackContext, CallbackError, CallbackPayload, CallbackType, CallbackUrlBuilder,
    CallbackUrlParser, DlrCallback, InvalidSignature, LinkHitCallback, ParsedCallback,
    ReplyCallback, SigningKey,
};
pub use client::{
    BASE_URL_MMS, BASE_URL_SMS, Credentials, RetryPolicy, TransmitSmsClient,
    TransmitSmsClientBuilder, TransmitSmsError,
};
pub use domain::{
    ApiKey, ApiSecret, Balance, CallbackUrl, Destination, EmailAddress, ErrorCode, FormatNumber,
    FormattedNumber, KnownErrorCode, ListId, ListSummary, MessageId, MessageText, NumberType,
    PhoneNumber, RateLimitInfo, Recipient, SendAt, SendOptions, SendSms, SenderId, SmsSent,
    TrackedLinkUrl, ValidationError, ValidationKind, ValidityMinutes,
};
pub use support::{InvalidArgument, UrlSafetyChecker};
pub use webhook::{
    CallbackEvent, CallbackHandler, HandlerError, HandlerRegistry, WebhookConfig, WebhookReceiver,
    WebhookResponse,
};
