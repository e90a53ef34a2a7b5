//! Read-side helpers for the admin dashboard and partner view.

mod filter;
mod partner_form;
mod stats;

pub use filter::*;
pub use partner_form::*;
pub use stats::*;
