//! Validator builder for fluent validation API.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

use super::result::FieldErrors;
use super::result::ValidationResult;

/// Type alias for validation rule closures.
type Rule<V> = Box<dyn Fn(&V) -> Result<(), String> + Send + Sync>;

/// Type alias for field accessor closures.
type Accessor<T, V> = Box<dyn Fn(&T) -> &V + Send + Sync>;

/// A finalized field: runs its rules and returns the first failure.
type Check<T> = Box<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// Internal representation of a field being validated.
struct FieldEntry<T> {
    path: String,
    check: Check<T>,
}

/// Builder for validating fields of a `T`.
///
/// Rules run in declaration order; the first failing rule of a field provides
/// that field's message.
pub struct Validator<T> {
    fields: Vec<FieldEntry<T>>,
}

impl<T: 'static> Validator<T> {
    /// Create a new validator.
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Add a field to validate, reached through `accessor`.
    pub fn field<V, A>(self, path: impl Into<String>, accessor: A) -> FieldBuilder<T, V>
    where
        V: 'static,
        A: Fn(&T) -> &V + Send + Sync + 'static,
    {
        FieldBuilder {
            validator: self,
            path: path.into(),
            accessor: Box::new(accessor),
            rules: Vec::new(),
        }
    }

    /// Run every field check against `value`.
    pub fn check(&self, value: &T) -> FieldErrors {
        let mut errors = FieldErrors::new();
        for field in &self.fields {
            if let Some(message) = (field.check)(value) {
                errors.insert(field.path.clone(), message);
            }
        }
        errors
    }

    /// Validate `value`, handing it back when every field passes.
    pub fn validate(&self, value: T) -> ValidationResult<T> {
        let errors = self.check(&value);
        if errors.is_empty() {
            ValidationResult::Valid(value)
        } else {
            ValidationResult::Invalid(errors)
        }
    }

    /// Paths of the validated fields, in declaration order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.path.as_str())
    }
}

impl<T: 'static> Default for Validator<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field(
                "fields",
                &self.fields.iter().map(|field| &field.path).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Builder for adding validation rules to a single field.
pub struct FieldBuilder<T, V> {
    validator: Validator<T>,
    path: String,
    accessor: Accessor<T, V>,
    rules: Vec<Rule<V>>,
}

impl<T: 'static, V: 'static> FieldBuilder<T, V> {
    /// Add a custom validation rule.
    pub fn rule<F>(mut self, f: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&V) -> bool + Send + Sync + 'static,
    {
        let msg = msg.into();
        self.rules
            .push(Box::new(move |v| if f(v) { Ok(()) } else { Err(msg.clone()) }));
        self
    }

    /// Continue to the next field.
    pub fn field<V2, A>(self, path: impl Into<String>, accessor: A) -> FieldBuilder<T, V2>
    where
        V2: 'static,
        A: Fn(&T) -> &V2 + Send + Sync + 'static,
    {
        self.build().field(path, accessor)
    }

    /// Finalize and validate `value`.
    pub fn validate(self, value: T) -> ValidationResult<T> {
        self.build().validate(value)
    }

    /// Finalize this field and return the validator.
    pub fn build(self) -> Validator<T> {
        let FieldBuilder {
            mut validator,
            path,
            accessor,
            rules,
        } = self;

        let check: Check<T> = Box::new(move |value: &T| {
            let field = accessor(value);
            rules.iter().find_map(|rule| rule(field).err())
        });

        validator.fields.push(FieldEntry { path, check });
        validator
    }
}

impl<T: 'static, V: Length + 'static> FieldBuilder<T, V> {
    /// Field must not be empty.
    pub fn required(self, msg: impl Into<String>) -> Self {
        self.rule(|v: &V| v.length() > 0, msg)
    }

    /// Field must have at least `min` characters or entries.
    pub fn min_length(self, min: usize, msg: impl Into<String>) -> Self {
        self.rule(move |v: &V| v.length() >= min, msg)
    }

    /// Field must have at most `max` characters or entries.
    pub fn max_length(self, max: usize, msg: impl Into<String>) -> Self {
        self.rule(move |v: &V| v.length() <= max, msg)
    }
}

/// Values with a length: characters for strings, entries for collections.
pub trait Length {
    fn length(&self) -> usize;
}

impl Length for String {
    fn length(&self) -> usize {
        self.chars().count()
    }
}

impl<U> Length for Vec<U> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<K, U> Length for BTreeMap<K, U> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<K, U, S> Length for HashMap<K, U, S> {
    fn length(&self) -> usize {
        self.len()
    }
}

impl<U: Length> Length for Option<U> {
    fn length(&self) -> usize {
        self.as_ref().map_or(0, Length::length)
    }
}
