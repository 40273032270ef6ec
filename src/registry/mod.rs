// Connection registry
//
// Tracks which transport connections are alive and the identity bound to each.

// Public API
pub use connections::{ConnectionRegistry, Registration, Unregistered};
pub use peer::{ConnectionId, PeerConnection, PeerHandle, TransportError, TransportHandle};

// Internal modules
mod connections;
mod peer;
