//! Support layer: phone-number normalization, the dialing-code table and URL safety checks.
//!
//! Everything here is synchronous. The only I/O is the bounded DNS lookup in
//! [`url::SystemResolver`].

pub mod country;
pub mod phone;
pub mod url;

pub use phone::{InvalidArgument, MAX_RECIPIENTS, MAX_SENDER_ID_LENGTH, RecipientCheck};
pub use url::{HostResolver, SystemResolver, UrlSafetyChecker};
