use std::env;
use tracing::warn;

use crate::event::{kinds, RouteStrategy, RoutingPolicy};

/// Runtime configuration for the relay server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayConfig {
    /// Address the HTTP/WebSocket listener binds to
    pub bind_addr: String,
    /// Buffer size of the presence notice channel
    pub presence_capacity: usize,
    /// Extra kinds delivered to a single addressed peer
    pub unicast_kinds: Vec<String>,
    /// Extra kinds fanned out to a channel
    pub broadcast_kinds: Vec<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            presence_capacity: 256,
            unicast_kinds: Vec::new(),
            broadcast_kinds: Vec::new(),
        }
    }
}

impl RelayConfig {
    /// Reads `RELAY_*` environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let presence_capacity = match lookup("RELAY_PRESENCE_CAPACITY") {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(capacity) if capacity > 0 => capacity,
                _ => {
                    warn!(value = %raw, "Invalid RELAY_PRESENCE_CAPACITY, using default");
                    defaults.presence_capacity
                }
            },
            None => defaults.presence_capacity,
        };

        Self {
            bind_addr: lookup("RELAY_BIND_ADDR").unwrap_or(defaults.bind_addr),
            presence_capacity,
            unicast_kinds: split_kinds(lookup("RELAY_UNICAST_KINDS")),
            broadcast_kinds: split_kinds(lookup("RELAY_BROADCAST_KINDS")),
        }
    }

    /// The default routing table plus any configured kinds. Presence kinds
    /// are emitted by the relay itself and always stay broadcast.
    pub fn routing_policy(&self) -> RoutingPolicy {
        let mut policy = RoutingPolicy::default();
        let overrides = self
            .unicast_kinds
            .iter()
            .map(|kind| (kind, RouteStrategy::Unicast))
            .chain(
                self.broadcast_kinds
                    .iter()
                    .map(|kind| (kind, RouteStrategy::Broadcast)),
            );
        for (kind, strategy) in overrides {
            if is_presence_kind(kind) {
                warn!(kind = %kind, strategy = %strategy, "Ignoring override of presence event kind");
                continue;
            }
            policy.insert(kind.clone(), strategy);
        }
        policy
    }
}

fn is_presence_kind(kind: &str) -> bool {
    kind == kinds::PRESENCE_JOINED || kind == kinds::PRESENCE_LEFT
}

fn split_kinds(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|kind| !kind.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> RelayConfig {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        RelayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(config_from(&[]), RelayConfig::default());
    }

    #[test]
    fn test_reads_overrides() {
        let config = config_from(&[
            ("RELAY_BIND_ADDR", "127.0.0.1:8080"),
            ("RELAY_PRESENCE_CAPACITY", "32"),
            ("RELAY_UNICAST_KINDS", "whiteboard-ack, ,file-offer"),
            ("RELAY_BROADCAST_KINDS", "whiteboard"),
        ]);

        assert_eq!(config.bind_addr, "127.0.0.1:8080");
        assert_eq!(config.presence_capacity, 32);
        assert_eq!(config.unicast_kinds, vec!["whiteboard-ack", "file-offer"]);

        let policy = config.routing_policy();
        assert_eq!(policy.classify("file-offer").unwrap(), RouteStrategy::Unicast);
        assert_eq!(policy.classify("whiteboard").unwrap(), RouteStrategy::Broadcast);
        assert_eq!(policy.classify("chat").unwrap(), RouteStrategy::Broadcast);
    }

    #[test]
    fn test_invalid_capacity_falls_back() {
        let config = config_from(&[("RELAY_PRESENCE_CAPACITY", "lots")]);
        assert_eq!(config.presence_capacity, 256);

        let config = config_from(&[("RELAY_PRESENCE_CAPACITY", "0")]);
        assert_eq!(config.presence_capacity, 256);
    }

    #[test]
    fn test_presence_kinds_cannot_be_reclassified() {
        let config = config_from(&[
            ("RELAY_UNICAST_KINDS", "presence-left,presence-joined,file-offer"),
            ("RELAY_BROADCAST_KINDS", "presence-left"),
        ]);

        let policy = config.routing_policy();
        assert_eq!(policy.classify("presence-left").unwrap(), RouteStrategy::Broadcast);
        assert_eq!(policy.classify("presence-joined").unwrap(), RouteStrategy::Broadcast);
        assert_eq!(policy.classify("file-offer").unwrap(), RouteStrategy::Unicast);
    }
}
