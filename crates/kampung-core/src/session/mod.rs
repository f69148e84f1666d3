//! Session persistence and the auth session controller.

mod controller;
mod store;

pub use controller::{AuthFailure, AuthPhase, AuthSession, AuthState};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, keys};
