//! Domain models for the case intake system.

mod case;
mod partner;

pub use case::*;
pub use partner::*;

pub use case_intake_analysis::{Analysis, IntakePayload};
