//! Schema trait for self-validating types.

use super::ValidationResult;
use super::Validator;

/// A type that knows how to validate itself.
pub trait Schema: Sized + 'static {
    /// Build the validator for this type.
    fn validator() -> Validator<Self>;

    /// Validate `self`, returning it back when valid.
    fn validate(self) -> ValidationResult<Self> {
        Self::validator().validate(self)
    }
}
