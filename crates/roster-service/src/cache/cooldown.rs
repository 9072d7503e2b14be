//! Per-person command cooldown gate
//!
//! A time-bounded map keyed by (guild, person). Checked before the bind
//! command runs and armed after it succeeds, so a rejected name does not
//! burn the cooldown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use roster_core::{PersonId, Snowflake};

/// Prune threshold: past this size, arming also sweeps expired slots
const PRUNE_LEN: usize = 1024;

/// Per-(guild, person) cooldown tracking
#[derive(Clone)]
pub struct CooldownGate {
    ttl: Duration,
    armed: Arc<DashMap<(i64, String), Instant>>,
}

impl CooldownGate {
    /// Create a gate with the given cooldown duration
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            armed: Arc::new(DashMap::new()),
        }
    }

    /// Check whether the person may act now. Does not arm the gate.
    ///
    /// # Errors
    /// Returns the whole seconds remaining until the cooldown lapses.
    pub fn check(&self, guild_id: Snowflake, person: &PersonId) -> Result<(), u64> {
        let key = (guild_id.into_inner(), person.to_string());
        if let Some(deadline) = self.armed.get(&key) {
            let now = Instant::now();
            if *deadline > now {
                return Err((*deadline - now).as_secs().max(1));
            }
        }
        Ok(())
    }

    /// Start the cooldown for a person
    pub fn arm(&self, guild_id: Snowflake, person: &PersonId) {
        let now = Instant::now();
        if self.armed.len() > PRUNE_LEN {
            self.armed.retain(|_, deadline| *deadline > now);
        }
        self.armed
            .insert((guild_id.into_inner(), person.to_string()), now + self.ttl);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: i64) -> PersonId {
        PersonId::Platform(Snowflake::new(id))
    }

    #[test]
    fn test_unarmed_gate_is_open() {
        let gate = CooldownGate::new(Duration::from_secs(30));
        assert!(gate.check(Snowflake::new(1), &person(2)).is_ok());
    }

    #[test]
    fn test_armed_gate_blocks_and_reports_remaining() {
        let gate = CooldownGate::new(Duration::from_secs(30));
        let guild = Snowflake::new(1);

        gate.arm(guild, &person(2));
        let remaining = gate.check(guild, &person(2)).unwrap_err();
        assert!(remaining >= 1 && remaining <= 30);
    }

    #[test]
    fn test_gate_reopens_after_ttl() {
        let gate = CooldownGate::new(Duration::from_millis(10));
        let guild = Snowflake::new(1);

        gate.arm(guild, &person(2));
        std::thread::sleep(Duration::from_millis(20));
        assert!(gate.check(guild, &person(2)).is_ok());
    }

    #[test]
    fn test_people_are_independent() {
        let gate = CooldownGate::new(Duration::from_secs(30));
        let guild = Snowflake::new(1);

        gate.arm(guild, &person(2));
        assert!(gate.check(guild, &person(3)).is_ok());
        // Same person in another guild is also unaffected
        assert!(gate.check(Snowflake::new(9), &person(2)).is_ok());
    }
}
