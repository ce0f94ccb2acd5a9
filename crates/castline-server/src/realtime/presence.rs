//! Presence registry: the set of currently connected usernames.

use dashmap::DashSet;

use castline_core::{CastlineError, Result};

/// Server-owned username set. A name present here corresponds to exactly one
/// live session; the sharded set gives check-and-insert atomicity across
/// concurrently arriving connects.
#[derive(Default)]
pub struct Presence {
    users: DashSet<String>,
}

impl Presence {
    pub fn new() -> Self {
        Self { users: DashSet::new() }
    }

    /// Claim `name`. Rejects with `DuplicateName` if a live session already
    /// holds it, leaving the set unchanged.
    pub fn try_connect(&self, name: &str) -> Result<()> {
        if self.users.insert(name.to_string()) {
            Ok(())
        } else {
            Err(CastlineError::DuplicateName(name.to_string()))
        }
    }

    /// Release `name`. Removing an absent name is a no-op: a session may
    /// disconnect after having been rejected or already removed.
    pub fn disconnect(&self, name: &str) {
        self.users.remove(name);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.users.contains(name)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_connect_is_rejected() {
        let presence = Presence::new();
        presence.try_connect("alice").unwrap();
        let err = presence.try_connect("alice").unwrap_err();
        assert!(matches!(err, CastlineError::DuplicateName(name) if name == "alice"));
        assert_eq!(presence.len(), 1);
    }

    #[test]
    fn disconnect_is_idempotent() {
        let presence = Presence::new();
        presence.try_connect("alice").unwrap();
        presence.disconnect("alice");
        presence.disconnect("alice");
        presence.disconnect("never-joined");
        assert!(presence.is_empty());
    }

    #[test]
    fn name_is_free_again_after_disconnect() {
        let presence = Presence::new();
        presence.try_connect("alice").unwrap();
        presence.disconnect("alice");
        presence.try_connect("alice").unwrap();
        assert!(presence.contains("alice"));
    }
}
