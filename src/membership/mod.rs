// Public API - what other modules can use
pub use handlers::{list_channel_members, ChannelMembersResponse};
pub use index::ChannelMembershipIndex;

// Internal modules
mod handlers;
mod index;
