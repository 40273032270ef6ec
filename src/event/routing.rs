use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::events::kinds;
use crate::shared::RelayError;

/// How an event kind is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteStrategy {
    /// Exactly one addressed peer
    Unicast,
    /// Every current member of the event's channel
    Broadcast,
}

impl fmt::Display for RouteStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteStrategy::Unicast => write!(f, "unicast"),
            RouteStrategy::Broadcast => write!(f, "broadcast"),
        }
    }
}

/// Lookup table from event kind to delivery strategy.
///
/// Classification only ever looks at the producer-supplied kind.
#[derive(Debug, Clone)]
pub struct RoutingPolicy {
    table: HashMap<String, RouteStrategy>,
}

impl RoutingPolicy {
    /// A policy with no kinds at all
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>, strategy: RouteStrategy) -> Self {
        self.insert(kind, strategy);
        self
    }

    pub fn insert(&mut self, kind: impl Into<String>, strategy: RouteStrategy) {
        self.table.insert(kind.into(), strategy);
    }

    pub fn classify(&self, kind: &str) -> Result<RouteStrategy, RelayError> {
        self.table
            .get(kind)
            .copied()
            .ok_or_else(|| RelayError::UnknownKind(kind.to_string()))
    }
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self::empty()
            .with_kind(kinds::OBJECT_SYNC, RouteStrategy::Unicast)
            .with_kind(kinds::SIGNAL, RouteStrategy::Unicast)
            .with_kind(kinds::CHAT, RouteStrategy::Broadcast)
            .with_kind(kinds::CODE_CHANGE, RouteStrategy::Broadcast)
            .with_kind(kinds::CURSOR, RouteStrategy::Broadcast)
            .with_kind(kinds::PRESENCE_JOINED, RouteStrategy::Broadcast)
            .with_kind(kinds::PRESENCE_LEFT, RouteStrategy::Broadcast)
    }
}
