use std::collections::HashMap;
use std::sync::Arc;

use crate::callback::{CallbackPayload, CallbackType, CallbackUrlParser, SigningKey};
use crate::webhook::config::WebhookConfig;
use crate::webhook::registry::{CallbackEvent, HandlerRegistry, Lookup};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// HTTP status and plain-text body to send back to TransmitSMS.
pub struct WebhookResponse {
    pub status: u16,
    pub body: &'static str,
}

impl WebhookResponse {
    pub const OK: Self = Self {
        status: 200,
        body: "OK",
    };
    pub const FORBIDDEN: Self = Self {
        status: 403,
        body: "Invalid signature",
    };
    pub const NOT_FOUND: Self = Self {
        status: 404,
        body: "Not Found",
    };

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

#[derive(Debug, Clone)]
/// Verifies inbound callbacks and dispatches them to registered handlers.
///
/// Framework-agnostic: feed it the request path and decoded query parameters and
/// translate the returned [`WebhookResponse`] into your server's response type.
pub struct WebhookReceiver {
    parser: CallbackUrlParser,
    registry: Arc<HandlerRegistry>,
    config: WebhookConfig,
}

impl WebhookReceiver {
    pub fn new(key: SigningKey, registry: HandlerRegistry) -> Self {
        Self {
            parser: CallbackUrlParser::new(key),
            registry: Arc::new(registry),
            config: WebhookConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WebhookConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &WebhookConfig {
        &self.config
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    /// Resolve a request path to an enabled callback type.
    pub fn route(&self, path: &str) -> Option<CallbackType> {
        self.config.resolve(path)
    }

    /// Route by path, then [`WebhookReceiver::receive`]; unknown or disabled routes get 404.
    pub fn handle(&self, path: &str, query: &HashMap<String, String>) -> WebhookResponse {
        match self.route(path) {
            Some(kind) => self.receive(kind, query),
            None => {
                tracing::debug!(path, "no webhook route");
                WebhookResponse::NOT_FOUND
            }
        }
    }

    /// Like [`WebhookReceiver::handle`], taking a raw query string.
    pub fn handle_query_str(&self, path: &str, query: &str) -> WebhookResponse {
        let query = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect::<HashMap<String, String>>();
        self.handle(path, &query)
    }

    /// Verify and dispatch one callback of a known type.
    ///
    /// Listeners run first, then the handler named in the URL, if any. Handler
    /// failures and unknown handler names are logged and still answered with 200
    /// so TransmitSMS does not redeliver.
    pub fn receive(&self, kind: CallbackType, query: &HashMap<String, String>) -> WebhookResponse {
        let parsed = match self.parser.parse(query) {
            Ok(parsed) => parsed,
            Err(err) => {
                tracing::warn!(callback = kind.path(), error = %err, "rejected webhook callback");
                return WebhookResponse::FORBIDDEN;
            }
        };

        let event = CallbackEvent {
            kind,
            payload: CallbackPayload::from_query(kind, query),
            handler: parsed.handler,
            context: parsed.context,
        };

        tracing::debug!(
            callback = kind.path(),
            message_id = event.payload.message_id().value(),
            handler = event.handler.as_deref(),
            "received webhook callback"
        );

        for listener in self.registry.listeners() {
            if let Err(err) = listener.handle(&event) {
                tracing::warn!(callback = kind.path(), error = %err, "webhook listener failed");
            }
        }

        if let Some(name) = event.handler.as_deref() {
            self.dispatch(name, &event);
        }

        WebhookResponse::OK
    }

    fn dispatch(&self, name: &str, event: &CallbackEvent) {
        match self.registry.lookup(event.kind, name) {
            Lookup::Found(handler) => {
                if let Err(err) = handler.handle(event) {
                    tracing::warn!(
                        callback = event.kind.path(),
                        handler = name,
                        error = %err,
                        "webhook handler failed"
                    );
                }
            }
            Lookup::WrongType(registered_for) => {
                tracing::warn!(
                    callback = event.kind.path(),
                    handler = name,
                    registered_for = ?registered_for,
                    "webhook handler does not accept this callback type"
                );
            }
            Lookup::Unknown => {
                tracing::warn!(
                    callback = event.kind.path(),
                    handler = name,
                    "unknown webhook handler"
                );
            }
        }
    }
}
