//! Form editing error types

/// Errors that can occur while editing a form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    /// The form is read-only and rejects edits.
    #[error("Form is read-only")]
    ReadOnly,

    /// The referenced input key does not exist.
    #[error("Input '{key}' not found")]
    UnknownInput { key: String },

    /// Renaming would overwrite an existing input key.
    #[error("Input '{key}' already exists")]
    DuplicateInput { key: String },
}

impl FormError {
    /// Creates a new unknown input error.
    pub fn unknown_input(key: impl Into<String>) -> Self {
        Self::UnknownInput { key: key.into() }
    }

    /// Creates a new duplicate input error.
    pub fn duplicate_input(key: impl Into<String>) -> Self {
        Self::DuplicateInput { key: key.into() }
    }
}
