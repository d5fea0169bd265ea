//! Authentication and account linking against the GooberCord relay.
//!
//! This crate provides:
//! - The two-step bearer token handshake (`/auth/begin`, `/auth/verify`)
//! - Session server verification proving the identity owns its account
//! - Discord link management (link, unlink, list)

mod client;
mod error;
mod identity;
mod links;
mod verifier;

pub use client::{endpoint, AuthClient};
pub use error::{AuthError, AuthResult, LinkError, LinkResult};
pub use identity::{Identity, Session};
pub use links::{Link, LinkClient};
pub use verifier::{verification_digest, MojangSessionVerifier, SessionVerifier};
