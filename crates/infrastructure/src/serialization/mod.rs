//! JSON serialization helpers.
//!
//! Two output shapes are used by the engine:
//! - pretty, trailing-newline JSON for files a user may open (settings)
//! - compact canonical JSON for opaque payloads stored in the database
//!   (imported headers, bodies and auth blocks)

mod json;

pub use json::*;
