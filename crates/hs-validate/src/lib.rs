//! Validation of raw HS codes.

mod validator;

pub use validator::{ValidateOptions, Validator};

pub use hs_model::{ErrorKind, ValidationResult, ValidationSummary, WarningKind};
