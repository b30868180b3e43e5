//! Curlew Application - Use cases and ports
//!
//! The application layer owns the rules of the collection engine: the
//! collection tree manager, the request sequencer and the request catalog.
//! Persistence is reached only through the [`ports::Store`] port, whose
//! adapters live in the infrastructure crate.

pub mod error;
pub mod ports;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult};
