//! Webhook layer: handler registry, route table and the callback receiver.

mod config;
mod receiver;
mod registry;

pub use config::{DEFAULT_PREFIX, RouteConfig, WebhookConfig};
pub use receiver::{WebhookReceiver, WebhookResponse};
pub use registry::{CallbackEvent, CallbackHandler, HandlerError, HandlerRegistry};
