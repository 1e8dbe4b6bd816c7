//! Flow steps: the trigger and the chain of actions behind it

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// What starts a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TriggerKind {
    Empty,
    PieceTrigger,
    Webhook,
}

/// The first step of a flow version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trigger {
    pub name: String,
    pub display_name: String,
    #[serde(rename = "type")]
    pub kind: TriggerKind,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub settings: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<Box<Action>>,
}

impl Trigger {
    /// Piece providing this trigger, for piece triggers.
    pub fn piece_name(&self) -> Option<&str> {
        match self.kind {
            TriggerKind::PieceTrigger => self.settings.get("pieceName")?.as_str(),
            _ => None,
        }
    }
}

/// One action step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Code(CodeAction),
    Piece(PieceAction),
    Branch(BranchAction),
    LoopOnItems(LoopOnItemsAction),
}

impl Action {
    pub fn name(&self) -> &str {
        match self {
            Self::Code(a) => &a.name,
            Self::Piece(a) => &a.name,
            Self::Branch(a) => &a.name,
            Self::LoopOnItems(a) => &a.name,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            Self::Code(a) => &a.display_name,
            Self::Piece(a) => &a.display_name,
            Self::Branch(a) => &a.display_name,
            Self::LoopOnItems(a) => &a.display_name,
        }
    }

    /// The step that runs after this one.
    pub fn next_action(&self) -> Option<&Action> {
        let next = match self {
            Self::Code(a) => &a.next_action,
            Self::Piece(a) => &a.next_action,
            Self::Branch(a) => &a.next_action,
            Self::LoopOnItems(a) => &a.next_action,
        };
        next.as_deref()
    }

    /// First steps of nested chains (branch arms, loop body).
    pub fn children(&self) -> Vec<&Action> {
        match self {
            Self::Branch(a) => a
                .on_success_action
                .iter()
                .chain(a.on_failure_action.iter())
                .map(|b| b.as_ref())
                .collect(),
            Self::LoopOnItems(a) => a.first_loop_action.iter().map(|b| b.as_ref()).collect(),
            _ => Vec::new(),
        }
    }

    pub fn piece_name(&self) -> Option<&str> {
        match self {
            Self::Piece(a) => Some(&a.settings.piece_name),
            _ => None,
        }
    }

    pub fn as_code(&self) -> Option<&CodeAction> {
        match self {
            Self::Code(a) => Some(a),
            _ => None,
        }
    }
}

// =============================================================================
// Code step
// =============================================================================

/// Source of a code step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCode {
    pub code: String,
    #[serde(default)]
    pub package_json: String,
}

/// Settings of a code step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeActionSettings {
    pub source_code: SourceCode,
    /// Values passed to the code as `inputs.<key>`.
    #[serde(default)]
    pub input: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_handling_options: Option<Value>,
}

/// A step that runs user code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeAction {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub valid: bool,
    pub settings: CodeActionSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<Box<Action>>,
}

impl CodeAction {
    /// Copy of this step with new source and inputs.
    ///
    /// Everything else (name, display name, validity, error handling, the
    /// following step) is preserved.
    pub fn with_new_code(&self, source_code: SourceCode, input: BTreeMap<String, String>) -> Self {
        let mut action = self.clone();
        action.settings.source_code = source_code;
        action.settings.input = input;
        action
    }
}

// =============================================================================
// Other steps
// =============================================================================

/// Settings of a piece step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceActionSettings {
    pub piece_name: String,
    #[serde(default)]
    pub piece_version: String,
    #[serde(default)]
    pub action_name: Option<String>,
    #[serde(default)]
    pub input: serde_json::Map<String, Value>,
}

/// A step that runs a piece action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceAction {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub valid: bool,
    pub settings: PieceActionSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<Box<Action>>,
}

/// A conditional step with success and failure arms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BranchAction {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub settings: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success_action: Option<Box<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_failure_action: Option<Box<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<Box<Action>>,
}

/// A step that runs its body once per item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopOnItemsAction {
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub valid: bool,
    #[serde(default)]
    pub settings: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_loop_action: Option<Box<Action>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_action: Option<Box<Action>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code_action() -> CodeAction {
        serde_json::from_str(
            r#"{
                "name": "step_1",
                "displayName": "Transform",
                "valid": true,
                "settings": {
                    "sourceCode": { "code": "export const code = async (inputs) => inputs.a;", "packageJson": "{}" },
                    "input": { "a": "{{trigger.body}}" }
                },
                "nextAction": {
                    "type": "LOOP_ON_ITEMS",
                    "name": "step_2",
                    "displayName": "Loop",
                    "settings": { "items": "{{step_1}}" }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_with_new_code_preserves_the_rest() {
        let action = code_action();
        let mut input = BTreeMap::new();
        input.insert("b".to_string(), "2".to_string());
        let source = SourceCode {
            code: "export const code = async () => 2;".into(),
            package_json: "{}".into(),
        };

        let updated = action.with_new_code(source.clone(), input.clone());
        assert_eq!(updated.settings.source_code, source);
        assert_eq!(updated.settings.input, input);
        assert_eq!(updated.name, action.name);
        assert_eq!(updated.display_name, action.display_name);
        assert_eq!(updated.valid, action.valid);
        assert_eq!(updated.next_action, action.next_action);
    }

    #[test]
    fn test_serializes_with_camel_case_and_type_tag() {
        let action = Action::Code(code_action());
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "CODE");
        assert_eq!(json["settings"]["sourceCode"]["packageJson"], "{}");
        assert_eq!(json["nextAction"]["type"], "LOOP_ON_ITEMS");
    }

    #[test]
    fn test_missing_package_json_defaults_to_empty() {
        let source: SourceCode = serde_json::from_str(r#"{ "code": "x" }"#).unwrap();
        assert_eq!(source.package_json, "");
    }
}
