//! REST surface exposed to the blog backend.
//!
//! Versioned modules (currently `v1`) group related routes to keep the
//! interface stable while we iterate on the implementation details.

pub mod v1;
