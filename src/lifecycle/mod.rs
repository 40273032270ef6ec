// Connect/disconnect handling and presence notifications

// Public API
pub use hooks::LifecycleHooks;
pub use presence::{spawn_presence_logger, PresenceBus, PresenceNotice, PresenceSink};

// Internal modules
mod hooks;
mod presence;
