//! Row entities and per-row action metadata.

use std::collections::BTreeMap;
use std::hash::Hash;

/// Trait for entities that can be displayed as table rows.
///
/// # Example
///
/// ```
/// use flowdeck_lib::table::TableRow;
///
/// #[derive(Clone)]
/// struct User {
///     id: u32,
///     name: String,
/// }
///
/// impl TableRow for User {
///     type Key = u32;
///
///     fn key(&self) -> u32 {
///         self.id
///     }
/// }
/// ```
pub trait TableRow: Clone + Send + Sync + 'static {
    /// The key type used to identify this row.
    type Key: Clone + Eq + Hash + ToString + Send + Sync + 'static;

    /// Return a unique key for this row.
    fn key(&self) -> Self::Key;
}

/// Whether a row action can currently be triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ActionState {
    #[default]
    Enabled,
    Disabled,
}

/// Per-row action states, keyed by action name.
///
/// Actions that are not listed are enabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowActions {
    states: BTreeMap<String, ActionState>,
}

impl RowActions {
    /// Creates an empty action map (everything enabled).
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the state of an action.
    pub fn with(mut self, action: impl Into<String>, state: ActionState) -> Self {
        self.states.insert(action.into(), state);
        self
    }

    /// Marks an action as disabled.
    pub fn disable(self, action: impl Into<String>) -> Self {
        self.with(action, ActionState::Disabled)
    }

    /// Marks an action as enabled.
    pub fn enable(self, action: impl Into<String>) -> Self {
        self.with(action, ActionState::Enabled)
    }

    /// Returns the state of an action.
    pub fn state(&self, action: &str) -> ActionState {
        self.states.get(action).copied().unwrap_or_default()
    }

    /// Returns `true` if the action can be triggered.
    pub fn is_enabled(&self, action: &str) -> bool {
        self.state(action) == ActionState::Enabled
    }

    /// Returns `true` if no action has an explicit state.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Iterates explicit action states in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, ActionState)> {
        self.states.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

/// A rendered row: the caller's entity plus its action metadata.
///
/// The entity is kept untouched; action metadata lives beside it.
#[derive(Debug, Clone, PartialEq)]
pub struct Row<T> {
    /// The caller's entity.
    pub data: T,
    /// Action states for this row.
    pub actions: RowActions,
}

impl<T> Row<T> {
    /// Wraps an entity with every action enabled.
    pub fn new(data: T) -> Self {
        Self {
            data,
            actions: RowActions::new(),
        }
    }

    /// Replaces the action metadata.
    pub fn with_actions(mut self, actions: RowActions) -> Self {
        self.actions = actions;
        self
    }

    /// Returns `true` if the named action is enabled for this row.
    pub fn is_action_enabled(&self, action: &str) -> bool {
        self.actions.is_enabled(action)
    }
}

impl<T: TableRow> Row<T> {
    /// Returns the entity's key.
    pub fn key(&self) -> T::Key {
        self.data.key()
    }
}

impl<T> From<T> for Row<T> {
    fn from(data: T) -> Self {
        Self::new(data)
    }
}
