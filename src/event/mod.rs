// Event routing
//
// Classifies inbound application events by kind and delivers them to a single
// peer or to every member of a channel.

// Public API - what other modules can use
pub use dispatcher::{DeliveryReport, EventDispatcher};
pub use events::{kinds, Envelope, InboundEvent};
pub use routing::{RouteStrategy, RoutingPolicy};

// Internal modules
mod dispatcher;
mod events;
mod routing;
