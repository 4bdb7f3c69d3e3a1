//! Controls and their validation state.
//!
//! This module provides:
//!
//! - [`Control`]: A reactive value holder with dirty/blurred history and validation state
//! - [`ValidateStatus`] and [`Trigger`]: Validation outcome and visibility policy
//! - [`ValidateErrors`], [`ValidateError`], [`ErrorMessage`]: Ordered errors and their messages

#[allow(clippy::module_inception)]
mod control;
mod errors;
mod status;

pub use control::{Control, ControlId, Validator};
pub use errors::{ErrorContext, ErrorMessage, LocalizedMessage, MessageFn, ValidateError, ValidateErrors};
pub use status::{Trigger, ValidateStatus};
