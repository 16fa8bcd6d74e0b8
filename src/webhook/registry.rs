use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;

use crate::callback::{CallbackContext, CallbackPayload, CallbackType};

/// Error type handlers may return; it is logged and never surfaces to TransmitSMS.
pub type HandlerError = Box<dyn StdError + Send + Sync>;

#[derive(Debug, Clone, PartialEq)]
/// A verified callback, as seen by handlers and listeners.
pub struct CallbackEvent {
    pub kind: CallbackType,
    pub payload: CallbackPayload,
    /// Handler name carried in the signed URL.
    pub handler: Option<String>,
    /// Context carried in the signed URL.
    pub context: CallbackContext,
}

/// Application code invoked for a verified callback.
pub trait CallbackHandler: Send + Sync {
    fn handle(&self, event: &CallbackEvent) -> Result<(), HandlerError>;
}

impl<F> CallbackHandler for F
where
    F: Fn(&CallbackEvent) -> Result<(), HandlerError> + Send + Sync,
{
    fn handle(&self, event: &CallbackEvent) -> Result<(), HandlerError> {
        self(event)
    }
}

/// Outcome of looking up a named handler.
pub(crate) enum Lookup<'a> {
    Found(&'a Arc<dyn CallbackHandler>),
    WrongType(Vec<CallbackType>),
    Unknown,
}

#[derive(Default, Clone)]
/// Named handlers per callback type, plus listeners that see every callback.
pub struct HandlerRegistry {
    handlers: HashMap<(CallbackType, String), Arc<dyn CallbackHandler>>,
    listeners: Vec<Arc<dyn CallbackHandler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name` for one callback type, replacing any previous one.
    pub fn register(
        &mut self,
        kind: CallbackType,
        name: impl Into<String>,
        handler: impl CallbackHandler + 'static,
    ) -> &mut Self {
        self.register_shared(kind, name, Arc::new(handler))
    }

    /// Register an already shared handler; reuse the `Arc` to serve several callback types.
    pub fn register_shared(
        &mut self,
        kind: CallbackType,
        name: impl Into<String>,
        handler: Arc<dyn CallbackHandler>,
    ) -> &mut Self {
        self.handlers.insert((kind, name.into()), handler);
        self
    }

    /// Add a listener invoked for every verified callback, before named handlers.
    pub fn listen(&mut self, handler: impl CallbackHandler + 'static) -> &mut Self {
        self.listeners.push(Arc::new(handler));
        self
    }

    pub fn contains(&self, kind: CallbackType, name: &str) -> bool {
        self.handlers.contains_key(&(kind, name.to_owned()))
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub(crate) fn listeners(&self) -> &[Arc<dyn CallbackHandler>] {
        &self.listeners
    }

    pub(crate) fn lookup(&self, kind: CallbackType, name: &str) -> Lookup<'_> {
        if let Some(handler) = self.handlers.get(&(kind, name.to_owned())) {
            return Lookup::Found(handler);
        }

        let mut registered_for = self
            .handlers
            .keys()
            .filter(|(_, registered)| registered == name)
            .map(|(kind, _)| *kind)
            .collect::<Vec<_>>();
        if registered_for.is_empty() {
            return Lookup::Unknown;
        }
        registered_for.sort();
        Lookup::WrongType(registered_for)
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = self
            .handlers
            .keys()
            .map(|(kind, name)| format!("{}:{name}", kind.path()))
            .collect::<Vec<_>>();
        names.sort();
        f.debug_struct("HandlerRegistry")
            .field("handlers", &names)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(_: &CallbackEvent) -> Result<(), HandlerError> {
        Ok(())
    }

    #[test]
    fn lookup_distinguishes_unknown_and_wrong_type() {
        let mut registry = HandlerRegistry::new();
        registry
            .register(CallbackType::Dlr, "orders", noop)
            .register(CallbackType::LinkHits, "orders", noop);

        assert!(matches!(
            registry.lookup(CallbackType::Dlr, "orders"),
            Lookup::Found(_)
        ));
        match registry.lookup(CallbackType::Reply, "orders") {
            Lookup::WrongType(kinds) => {
                assert_eq!(kinds, vec![CallbackType::Dlr, CallbackType::LinkHits]);
            }
            _ => panic!("expected WrongType"),
        }
        assert!(matches!(
            registry.lookup(CallbackType::Dlr, "missing"),
            Lookup::Unknown
        ));
    }

    #[test]
    fn registering_same_key_replaces() {
        let mut registry = HandlerRegistry::new();
        registry.register(CallbackType::Reply, "a", noop);
        registry.register(CallbackType::Reply, "a", noop);
        assert_eq!(registry.len(), 1);
        assert!(registry.contains(CallbackType::Reply, "a"));
        assert!(!registry.contains(CallbackType::Dlr, "a"));
    }

    #[test]
    fn debug_lists_names() {
        let mut registry = HandlerRegistry::new();
        registry.register(CallbackType::LinkHits, "clicks", noop);
        registry.listen(noop);
        let debug = format!("{registry:?}");
        assert!(debug.contains("link-hits:clicks"));
        assert!(debug.contains("listeners: 1"));
    }
}
