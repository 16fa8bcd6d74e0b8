//! Callback layer: callback types, signed callback URLs and inbound payloads.

mod kind;
mod payload;
mod signer;

pub use kind::CallbackType;
pub use payload::{CallbackPayload, DlrCallback, LinkHitCallback, ReplyCallback};
pub use signer::{
    CallbackContext, CallbackError, CallbackUrlBuilder, CallbackUrlParser, InvalidSignature,
    ParsedCallback, SigningKey,
};
