//! Session identity
//!
//! The display name used both to attribute outgoing messages and to spot our
//! own messages when the server echoes them back. Shared between the
//! connection manager (announces it on open) and the dispatcher.

use parking_lot::RwLock;
use rand::Rng;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SessionIdentity {
    name: Arc<RwLock<String>>,
}

impl SessionIdentity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Arc::new(RwLock::new(name.into())),
        }
    }

    /// Random `GUEST_<n>` name with `n` in `0..=10000`
    pub fn guest() -> Self {
        let n: u32 = rand::thread_rng().gen_range(0..=10_000);
        Self::new(format!("GUEST_{}", n))
    }

    pub fn get(&self) -> String {
        self.name.read().clone()
    }

    /// Replace the name. Uniqueness is the server's business.
    pub fn set(&self, name: impl Into<String>) {
        *self.name.write() = name.into();
    }

    pub fn is_empty(&self) -> bool {
        self.name.read().is_empty()
    }

    /// Whether `author` is this session
    pub fn matches(&self, author: &str) -> bool {
        *self.name.read() == author
    }
}

impl Default for SessionIdentity {
    fn default() -> Self {
        Self::guest()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guest_name_shape() {
        for _ in 0..50 {
            let name = SessionIdentity::guest().get();
            let n: u32 = name
                .strip_prefix("GUEST_")
                .expect("guest prefix")
                .parse()
                .expect("numeric suffix");
            assert!(n <= 10_000);
        }
    }

    #[test]
    fn test_clones_share_the_name() {
        let identity = SessionIdentity::new("alice");
        let shared = identity.clone();

        shared.set("bob");

        assert_eq!(identity.get(), "bob");
        assert!(identity.matches("bob"));
        assert!(!identity.matches("alice"));
    }
}
