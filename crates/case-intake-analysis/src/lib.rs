//! Case analysis primitives.
//!
//! The value object attached to intake cases, the deterministic scoring model
//! used when no remote analyzer is available, and normalization of responses
//! from a remote analyzer.

pub mod normalize;
pub mod payload;
pub mod scoring;

pub use normalize::*;
pub use payload::*;
pub use scoring::*;
