//! Process-local caches
//!
//! Both caches are intentionally in-memory: the bot, the command handlers,
//! and the HTTP read API run in one process, and the admin refresh command
//! must be able to invalidate the same cache the API reads. A clustered
//! deployment would need to move these into the shared store; that is out of
//! scope and documented as a scaling limitation.

mod cooldown;
mod roster_cache;

pub use cooldown::CooldownGate;
pub use roster_cache::RosterCache;
