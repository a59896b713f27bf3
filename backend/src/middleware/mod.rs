//! Request middleware.

pub mod trace;

pub use trace::{Trace, error_details_exposed};
