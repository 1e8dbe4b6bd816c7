//! Typed validation.
//!
//! A fluent [`Validator`] checks fields of a typed value and produces a
//! [`ValidationResult`]: either the value itself, or a mapping from dotted
//! field path to the first failing rule's message.
//!
//! # Example
//!
//! ```
//! use flowdeck_lib::validation::Validator;
//!
//! struct Signup {
//!     username: String,
//! }
//!
//! let validator = Validator::new()
//!     .field("username", |s: &Signup| &s.username)
//!         .required("Username is required")
//!         .min_length(3, "Username must be at least 3 characters")
//!     .build();
//!
//! let result = validator.validate(Signup { username: "al".into() });
//! assert_eq!(
//!     result.error_for("username"),
//!     Some("Username must be at least 3 characters")
//! );
//! ```

mod result;
mod schema;
mod validator;

pub use result::FieldErrors;
pub use result::ValidationResult;
pub use schema::Schema;
pub use validator::FieldBuilder;
pub use validator::Length;
pub use validator::Validator;
