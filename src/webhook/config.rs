use std::collections::BTreeMap;

use crate::callback::CallbackType;

/// Default route prefix for callback endpoints.
pub const DEFAULT_PREFIX: &str = "webhooks/transmitsms";

#[derive(Debug, Clone, PartialEq, Eq)]
/// Route settings for one callback type.
pub struct RouteConfig {
    pub enabled: bool,
    /// Path segment under the prefix.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Webhook route table: a prefix plus one route per callback type.
pub struct WebhookConfig {
    prefix: String,
    routes: BTreeMap<CallbackType, RouteConfig>,
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_owned(),
            routes: CallbackType::ALL
                .into_iter()
                .map(|kind| {
                    (
                        kind,
                        RouteConfig {
                            enabled: true,
                            path: kind.path().to_owned(),
                        },
                    )
                })
                .collect(),
        }
    }
}

fn trim_slashes(value: &str) -> &str {
    value.trim_matches('/')
}

impl WebhookConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the route prefix; surrounding slashes are ignored.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = trim_slashes(&prefix.into()).to_owned();
        self
    }

    /// Serve `kind` under a custom path segment.
    pub fn with_path(mut self, kind: CallbackType, path: impl Into<String>) -> Self {
        let path = trim_slashes(&path.into()).to_owned();
        self.route_mut(kind).path = path;
        self
    }

    pub fn enable(mut self, kind: CallbackType, enabled: bool) -> Self {
        self.route_mut(kind).enabled = enabled;
        self
    }

    pub fn disable(self, kind: CallbackType) -> Self {
        self.enable(kind, false)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn route(&self, kind: CallbackType) -> Option<&RouteConfig> {
        self.routes.get(&kind)
    }

    pub fn is_enabled(&self, kind: CallbackType) -> bool {
        self.route(kind).is_some_and(|route| route.enabled)
    }

    /// Full path (`<prefix>/<path>`, no leading slash) for an enabled type.
    pub fn path_for(&self, kind: CallbackType) -> Option<String> {
        let route = self.route(kind).filter(|route| route.enabled)?;
        Some(join(&self.prefix, &route.path))
    }

    /// Resolve a request path to an enabled callback type.
    pub fn resolve(&self, path: &str) -> Option<CallbackType> {
        let path = trim_slashes(path);
        self.routes
            .iter()
            .filter(|(_, route)| route.enabled)
            .find(|(_, route)| join(&self.prefix, &route.path) == path)
            .map(|(kind, _)| *kind)
    }

    fn route_mut(&mut self, kind: CallbackType) -> &mut RouteConfig {
        self.routes.entry(kind).or_insert_with(|| RouteConfig {
            enabled: true,
            path: kind.path().to_owned(),
        })
    }
}

fn join(prefix: &str, path: &str) -> String {
    match (prefix.is_empty(), path.is_empty()) {
        (true, _) => path.to_owned(),
        (false, true) => prefix.to_owned(),
        (false, false) => format!("{prefix}/{path}"),
    }
}
