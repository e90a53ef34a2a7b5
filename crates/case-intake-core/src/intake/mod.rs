//! Public intake: form validation and submission.

mod form;
mod service;

pub use form::*;
pub use service::*;
