//! Settings form of a code step.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::FormError;
use crate::model::CodeAction;
use crate::model::CodeActionSettings;
use crate::model::SourceCode;
use crate::validation::FieldErrors;
use crate::validation::Schema;
use crate::validation::Validator;

use super::state::FormChange;
use super::state::FormState;
use super::state::Subscription;

/// Help text shown above the inputs editor (markdown).
pub const INPUTS_HELP: &str = r#"
To use data from previous steps in your code, include them as pairs of keys and values below.

You can access these inputs in your code using `inputs.key`, where `key` is the name you assigned below.

**Warning: "const code" is the entry to the code, if it is removed or renamed, your step will fail.**
"#;

/// Editable part of a code step.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeSettings {
    pub source_code: SourceCode,
    pub input: BTreeMap<String, String>,
}

impl From<&CodeActionSettings> for CodeSettings {
    fn from(settings: &CodeActionSettings) -> Self {
        Self {
            source_code: settings.source_code.clone(),
            input: settings.input.clone(),
        }
    }
}

impl Schema for CodeSettings {
    fn validator() -> Validator<Self> {
        Validator::new()
            .field("sourceCode.code", |s: &CodeSettings| &s.source_code.code)
                .min_length(1, "You need to write a code snippet")
            .field("sourceCode.packageJson", |s: &CodeSettings| &s.source_code.package_json)
                .min_length(0, "You need to write a package.json snippet")
            .field("input", |s: &CodeSettings| &s.input)
                .rule(
                    |input: &BTreeMap<String, String>| input.keys().all(|k| !k.trim().is_empty()),
                    "Input keys cannot be empty",
                )
            .build()
    }
}

/// Settings form bound to one code step.
///
/// Every committed edit is validated. When the values are valid, the step
/// rebuilt with the new source and inputs is passed to `on_update_action`;
/// invalid values only surface as field errors.
///
/// # Example
///
/// ```ignore
/// let mut form = CodeSettingsForm::new(step, false, |action| builder.update_step(action));
/// form.set_input("email", "{{trigger.email}}")?;
/// form.set_code("export const code = async (inputs) => inputs.email;")?;
/// ```
pub struct CodeSettingsForm {
    step: CodeAction,
    form: FormState<CodeSettings>,
    propagation: Option<Subscription>,
}

impl CodeSettingsForm {
    /// Open the form for `step`.
    pub fn new<F>(step: CodeAction, read_only: bool, on_update_action: F) -> Self
    where
        F: FnMut(CodeAction) + Send + 'static,
    {
        let defaults = CodeSettings::from(&step.settings);
        let mut form = FormState::new(defaults, CodeSettings::validator()).read_only(read_only);

        let base = step.clone();
        let mut on_update_action = on_update_action;
        let propagation = form.subscribe(move |change: &FormChange<'_, CodeSettings>| {
            if !change.is_valid() {
                log::debug!("Code step '{}' has errors: {}", base.name, change.errors);
                return;
            }
            let action = base.with_new_code(
                change.values.source_code.clone(),
                change.values.input.clone(),
            );
            on_update_action(action);
        });

        Self {
            step,
            form,
            propagation: Some(propagation),
        }
    }

    pub fn set_code(&mut self, code: impl Into<String>) -> Result<(), FormError> {
        let code = code.into();
        self.form.commit(|s| s.source_code.code = code)
    }

    pub fn set_package_json(&mut self, package_json: impl Into<String>) -> Result<(), FormError> {
        let package_json = package_json.into();
        self.form.commit(|s| s.source_code.package_json = package_json)
    }

    /// Add an input or change its value.
    pub fn set_input(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        let (key, value) = (key.into(), value.into());
        self.form.commit(|s| {
            s.input.insert(key, value);
        })
    }

    pub fn remove_input(&mut self, key: &str) -> Result<(), FormError> {
        self.form.try_commit(|s| {
            s.input
                .remove(key)
                .map(|_| ())
                .ok_or_else(|| FormError::unknown_input(key))
        })
    }

    /// Rename an input, keeping its value.
    pub fn rename_input(&mut self, from: &str, to: impl Into<String>) -> Result<(), FormError> {
        let to = to.into();
        if from == to {
            return Ok(());
        }
        self.form.try_commit(|s| {
            if s.input.contains_key(&to) {
                return Err(FormError::duplicate_input(to));
            }
            let value = s
                .input
                .remove(from)
                .ok_or_else(|| FormError::unknown_input(from))?;
            s.input.insert(to, value);
            Ok(())
        })
    }

    /// Replace all inputs at once.
    pub fn replace_inputs(&mut self, input: BTreeMap<String, String>) -> Result<(), FormError> {
        self.form.commit(|s| s.input = input)
    }

    /// Stop propagating updates to the step. Later edits still validate.
    pub fn detach(&mut self) {
        if let Some(subscription) = self.propagation.take() {
            self.form.unsubscribe(subscription);
        }
    }

    /// The step the form was opened for.
    pub fn step(&self) -> &CodeAction {
        &self.step
    }

    pub fn values(&self) -> &CodeSettings {
        self.form.values()
    }

    pub fn errors(&self) -> &FieldErrors {
        self.form.errors()
    }

    /// Message shown under a form field; covers nested paths.
    pub fn message_for(&self, field: &str) -> Option<&str> {
        self.form.errors().first_under(field)
    }

    pub fn is_dirty(&self) -> bool {
        self.form.is_dirty()
    }

    pub fn is_read_only(&self) -> bool {
        self.form.is_read_only()
    }

    pub fn form_mut(&mut self) -> &mut FormState<CodeSettings> {
        &mut self.form
    }
}

impl fmt::Debug for CodeSettingsForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodeSettingsForm")
            .field("step", &self.step.name)
            .field("form", &self.form)
            .field("attached", &self.propagation.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::Mutex;

    use super::*;

    fn step() -> CodeAction {
        let mut input = BTreeMap::new();
        input.insert("name".to_string(), "{{trigger.name}}".to_string());
        CodeAction {
            name: "step_1".into(),
            display_name: "Greet".into(),
            valid: true,
            settings: CodeActionSettings {
                source_code: SourceCode {
                    code: "export const code = async (inputs) => `hi ${inputs.name}`;".into(),
                    package_json: "{}".into(),
                },
                input,
                error_handling_options: None,
            },
            next_action: None,
        }
    }

    fn open(read_only: bool) -> (CodeSettingsForm, Arc<Mutex<Vec<CodeAction>>>) {
        let updates = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&updates);
        let form = CodeSettingsForm::new(step(), read_only, move |action| {
            sink.lock().unwrap().push(action);
        });
        (form, updates)
    }

    #[test]
    fn test_valid_edit_propagates_rebuilt_step() {
        let (mut form, updates) = open(false);
        form.set_input("greeting", "hello").unwrap();

        let updates = updates.lock().unwrap();
        assert_eq!(updates.len(), 1);
        let action = &updates[0];
        assert_eq!(action.name, "step_1");
        assert_eq!(action.settings.input.get("greeting").map(String::as_str), Some("hello"));
        assert_eq!(action.settings.source_code, step().settings.source_code);
    }

    #[test]
    fn test_empty_code_reports_and_does_not_propagate() {
        let (mut form, updates) = open(false);
        form.set_code("").unwrap();

        assert!(updates.lock().unwrap().is_empty());
        assert_eq!(
            form.errors().get("sourceCode.code"),
            Some("You need to write a code snippet")
        );
        assert_eq!(
            form.message_for("sourceCode"),
            Some("You need to write a code snippet")
        );

        form.set_code("export const code = async () => 1;").unwrap();
        assert_eq!(updates.lock().unwrap().len(), 1);
        assert!(form.errors().is_empty());
    }

    #[test]
    fn test_empty_package_json_is_valid() {
        let (mut form, updates) = open(false);
        form.set_package_json("").unwrap();
        assert!(form.errors().is_empty());
        assert_eq!(updates.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_blank_input_key_is_invalid() {
        let (mut form, updates) = open(false);
        form.set_input("  ", "x").unwrap();
        assert_eq!(form.message_for("input"), Some("Input keys cannot be empty"));
        assert!(updates.lock().unwrap().is_empty());
    }

    #[test]
    fn test_rename_and_remove_inputs() {
        let (mut form, _) = open(false);
        form.rename_input("name", "full_name").unwrap();
        assert!(form.values().input.contains_key("full_name"));
        assert!(!form.values().input.contains_key("name"));

        assert_eq!(
            form.rename_input("missing", "x"),
            Err(FormError::unknown_input("missing"))
        );
        form.set_input("other", "1").unwrap();
        assert_eq!(
            form.rename_input("other", "full_name"),
            Err(FormError::duplicate_input("full_name"))
        );

        form.remove_input("other").unwrap();
        assert_eq!(
            form.remove_input("other"),
            Err(FormError::unknown_input("other"))
        );
    }

    #[test]
    fn test_read_only_form_rejects_edits() {
        let (mut form, updates) = open(true);
        assert_eq!(form.set_code("x"), Err(FormError::ReadOnly));
        assert!(!form.is_dirty());
        assert!(updates.lock().unwrap().is_empty());
    }

    #[test]
    fn test_detach_stops_propagation() {
        let (mut form, updates) = open(false);
        form.detach();
        form.set_input("a", "b").unwrap();
        assert!(updates.lock().unwrap().is_empty());
        assert!(form.is_dirty());
    }

    #[test]
    fn test_help_mentions_entry_point() {
        assert!(INPUTS_HELP.contains("inputs.key"));
        assert!(INPUTS_HELP.contains("\"const code\""));
    }
}
