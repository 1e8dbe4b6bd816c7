//! Generic form state.

use std::fmt;

use crate::error::FormError;
use crate::validation::FieldErrors;
use crate::validation::ValidationResult;
use crate::validation::Validator;

/// A committed edit, as seen by subscribers.
#[derive(Debug)]
pub struct FormChange<'a, T> {
    /// Values after the edit.
    pub values: &'a T,
    /// Validation errors for those values.
    pub errors: &'a FieldErrors,
}

impl<T> FormChange<'_, T> {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Callback run after every committed edit of a dirty form.
pub type ChangeCallback<T> = Box<dyn FnMut(&FormChange<'_, T>) + Send>;

/// Handle returned by [`FormState::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

/// Values of a form together with their defaults and validation state.
///
/// Edits go through [`commit`](Self::commit). After each commit the values
/// are validated and, if they differ from the defaults, every subscriber is
/// notified. Subscribers stay registered until they are explicitly removed
/// with [`unsubscribe`](Self::unsubscribe) or the form is dropped.
pub struct FormState<T> {
    defaults: T,
    values: T,
    validator: Validator<T>,
    errors: FieldErrors,
    read_only: bool,
    subscribers: Vec<(Subscription, ChangeCallback<T>)>,
    next_subscription: u64,
}

impl<T: Clone + PartialEq + 'static> FormState<T> {
    /// Create a form starting at `defaults`.
    pub fn new(defaults: T, validator: Validator<T>) -> Self {
        let errors = validator.check(&defaults);
        Self {
            values: defaults.clone(),
            defaults,
            validator,
            errors,
            read_only: false,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Reject every edit when `read_only` is set.
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    pub fn values(&self) -> &T {
        &self.values
    }

    pub fn defaults(&self) -> &T {
        &self.defaults
    }

    /// Errors from the most recent validation.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Message for `path`, if that field failed.
    pub fn error_for(&self, path: &str) -> Option<&str> {
        self.errors.get(path)
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// `true` when the values differ from the defaults.
    pub fn is_dirty(&self) -> bool {
        self.values != self.defaults
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Register a change callback.
    pub fn subscribe<F>(&mut self, callback: F) -> Subscription
    where
        F: FnMut(&FormChange<'_, T>) + Send + 'static,
    {
        let subscription = Subscription(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((subscription, Box::new(callback)));
        subscription
    }

    /// Remove a change callback. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription);
        self.subscribers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Apply an edit, validate, and notify subscribers.
    pub fn commit(&mut self, edit: impl FnOnce(&mut T)) -> Result<(), FormError> {
        self.try_commit(|values| {
            edit(values);
            Ok(())
        })
    }

    /// Apply a fallible edit. A failed edit leaves the values untouched and
    /// notifies nobody.
    pub fn try_commit(
        &mut self,
        edit: impl FnOnce(&mut T) -> Result<(), FormError>,
    ) -> Result<(), FormError> {
        if self.read_only {
            return Err(FormError::ReadOnly);
        }

        let mut next = self.values.clone();
        edit(&mut next)?;
        self.values = next;
        self.errors = self.validator.check(&self.values);

        if !self.is_dirty() {
            log::debug!("Form edit matches defaults; not notifying");
            return Ok(());
        }

        log::debug!(
            "Form edit committed with {} errors, notifying {} subscribers",
            self.errors.len(),
            self.subscribers.len()
        );
        let change = FormChange {
            values: &self.values,
            errors: &self.errors,
        };
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&change);
        }
        Ok(())
    }

    /// Validate the current values now.
    pub fn trigger(&mut self) -> ValidationResult<T> {
        let result = self.validator.validate(self.values.clone());
        self.errors = result.errors().cloned().unwrap_or_default();
        result
    }

    /// Restore the defaults without notifying subscribers.
    pub fn reset(&mut self) {
        self.values = self.defaults.clone();
        self.errors = self.validator.check(&self.values);
    }
}

impl<T: fmt::Debug> fmt::Debug for FormState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormState")
            .field("values", &self.values)
            .field("errors", &self.errors)
            .field("read_only", &self.read_only)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    fn form() -> FormState<String> {
        let validator = Validator::new()
            .field("name", |s: &String| s)
            .required("Name is required")
            .build();
        FormState::new("initial".to_string(), validator)
    }

    fn recorder(form: &mut FormState<String>) -> (Subscription, Arc<Mutex<Vec<(String, bool)>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let subscription = form.subscribe(move |change| {
            sink.lock()
                .unwrap()
                .push((change.values.clone(), change.is_valid()));
        });
        (subscription, seen)
    }

    #[test]
    fn test_commit_notifies_with_validation() {
        let mut form = form();
        let (_, seen) = recorder(&mut form);

        form.commit(|v| *v = "changed".into()).unwrap();
        form.commit(|v| v.clear()).unwrap();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("changed".to_string(), true), (String::new(), false)]
        );
        assert_eq!(form.error_for("name"), Some("Name is required"));
    }

    #[test]
    fn test_edit_back_to_defaults_is_not_dirty() {
        let mut form = form();
        let (_, seen) = recorder(&mut form);

        form.commit(|v| *v = "initial".into()).unwrap();
        assert!(!form.is_dirty());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let mut form = form();
        let (subscription, seen) = recorder(&mut form);

        assert!(form.unsubscribe(subscription));
        assert!(!form.unsubscribe(subscription));
        form.commit(|v| *v = "changed".into()).unwrap();
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(form.subscriber_count(), 0);
    }

    #[test]
    fn test_read_only_rejects_edits() {
        let mut form = form().read_only(true);
        assert_eq!(form.commit(|v| v.clear()), Err(FormError::ReadOnly));
        assert_eq!(form.values(), "initial");
    }

    #[test]
    fn test_failed_edit_leaves_values_untouched() {
        let mut form = form();
        let result = form.try_commit(|v| {
            v.push_str(" partially");
            Err(FormError::unknown_input("missing"))
        });
        assert_eq!(result, Err(FormError::unknown_input("missing")));
        assert_eq!(form.values(), "initial");
    }

    #[test]
    fn test_reset_and_trigger() {
        let mut form = form();
        form.commit(|v| v.clear()).unwrap();
        assert!(form.trigger().is_invalid());
        form.reset();
        assert!(!form.is_dirty());
        assert!(form.trigger().is_valid());
    }
}
