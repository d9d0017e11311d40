//! Client crate for the hosted place store.
//!
//! The store is a Supabase-compatible service: rows live behind a PostgREST
//! endpoint (`/rest/v1`) and identities behind a GoTrue endpoint
//! (`/auth/v1`). Both speak JSON over HTTP and authenticate with the
//! project's public anon key; user-scoped writes additionally carry the
//! session's bearer token.

pub mod auth;
pub mod error;
pub mod places;

pub use auth::{AuthClient, AuthEvent, AuthSubscription, User};
pub use error::StoreError;
pub use places::{NewPlace, Place, PlacesClient};
