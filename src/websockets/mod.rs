// Public API
pub use handler::{handle_websocket_connection, websocket_handler, RelayMessageHandler};
pub use messages::{ClientCommand, ServerMessage};
pub use socket::{Connection, MessageHandler, SocketError, SocketWrapper};
pub use transport::ChannelTransport;

// Internal modules
mod handler;
mod messages;
mod socket;
mod transport;
