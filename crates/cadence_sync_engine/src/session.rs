//! The session gate: the one bit consumed from the auth collaborator.

use std::sync::atomic::{AtomicBool, Ordering};

/// Exposes whether the user currently holds a valid session.
///
/// The sync client consults the gate fresh at the top of every
/// `schedule_push` and `pull_and_merge` call and never caches the
/// answer, so sync turns on and off automatically as authentication
/// state changes. No explicit enable/disable call exists.
pub trait SessionGate: Send + Sync {
    /// Returns true if the user is currently authenticated.
    fn is_authenticated(&self) -> bool;
}

/// A gate with a fixed answer. Useful for wiring contexts where the
/// session is known (a CLI invoked with a live cookie jar) and for
/// tests.
#[derive(Debug, Clone, Copy)]
pub struct StaticGate(bool);

impl StaticGate {
    /// A gate that always reports authenticated.
    #[must_use]
    pub fn authenticated() -> Self {
        Self(true)
    }

    /// A gate that always reports unauthenticated.
    #[must_use]
    pub fn anonymous() -> Self {
        Self(false)
    }
}

impl SessionGate for StaticGate {
    fn is_authenticated(&self) -> bool {
        self.0
    }
}

/// A gate that can be flipped at runtime, e.g. by an auth layer
/// observing login and logout.
#[derive(Debug, Default)]
pub struct ToggleGate {
    authenticated: AtomicBool,
}

impl ToggleGate {
    /// Creates a gate in the given state.
    #[must_use]
    pub fn new(authenticated: bool) -> Self {
        Self {
            authenticated: AtomicBool::new(authenticated),
        }
    }

    /// Flips the gate.
    pub fn set(&self, authenticated: bool) {
        self.authenticated.store(authenticated, Ordering::SeqCst);
    }
}

impl SessionGate for ToggleGate {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }
}
