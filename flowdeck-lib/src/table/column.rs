//! Column definitions and cell values.

use std::fmt;
use std::sync::Arc;

use super::row::Row;

// =============================================================================
// Cell
// =============================================================================

/// An interactive control embedded in a cell.
///
/// Clicking a control triggers the owning column's control handler instead
/// of the table's row-click handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    /// Name of the row action this control triggers.
    pub action: String,
    /// Label shown for the control.
    pub label: String,
}

/// The rendered value of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    /// Nothing to show.
    Empty,
    /// Plain text.
    Text(String),
    /// An interactive control.
    Control(Control),
}

impl Cell {
    /// Creates a text cell.
    pub fn text(content: impl Into<String>) -> Self {
        Cell::Text(content.into())
    }

    /// Creates a control cell for the given row action.
    pub fn control(action: impl Into<String>, label: impl Into<String>) -> Self {
        Cell::Control(Control {
            action: action.into(),
            label: label.into(),
        })
    }

    /// Returns the control if this cell holds one.
    pub fn as_control(&self) -> Option<&Control> {
        match self {
            Cell::Control(control) => Some(control),
            _ => None,
        }
    }
}

// =============================================================================
// Column
// =============================================================================

/// How wide a column renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColumnWidth {
    /// Fixed width in characters; longer content is truncated.
    Fixed(u16),
    /// Size to the widest header or cell.
    #[default]
    Auto,
}

/// Renders a cell from a row.
pub type CellFn<T> = Arc<dyn Fn(&Row<T>) -> Cell + Send + Sync>;

/// Invoked when a control cell in a column is clicked.
pub type ControlHandler<T> = Arc<dyn Fn(&Row<T>) + Send + Sync>;

/// A table column definition.
///
/// Rendering is pure: `cell` only derives a value from the row.
///
/// # Example
///
/// ```
/// use flowdeck_lib::table::{Cell, Column, Row};
///
/// let name: Column<(u32, String)> =
///     Column::new("name", "Name", |row: &Row<(u32, String)>| Cell::text(row.data.1.clone()));
///
/// let row = Row::new((1, "Daily report".to_string()));
/// assert_eq!(name.render(&row), Cell::text("Daily report"));
/// ```
pub struct Column<T> {
    id: String,
    header: String,
    width: ColumnWidth,
    cell: CellFn<T>,
    on_control: Option<ControlHandler<T>>,
}

impl<T> Column<T> {
    /// Create a new column with the given id, header and cell renderer.
    pub fn new<F>(id: impl Into<String>, header: impl Into<String>, cell: F) -> Self
    where
        F: Fn(&Row<T>) -> Cell + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            header: header.into(),
            width: ColumnWidth::Auto,
            cell: Arc::new(cell),
            on_control: None,
        }
    }

    /// Set a fixed width for this column.
    pub fn fixed(mut self, width: u16) -> Self {
        self.width = ColumnWidth::Fixed(width);
        self
    }

    /// Set auto width for this column.
    pub fn auto(mut self) -> Self {
        self.width = ColumnWidth::Auto;
        self
    }

    /// Set the handler for control cells in this column.
    pub fn on_control<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Row<T>) + Send + Sync + 'static,
    {
        self.on_control = Some(Arc::new(handler));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn width(&self) -> ColumnWidth {
        self.width
    }

    /// Render the cell for `row`.
    pub fn render(&self, row: &Row<T>) -> Cell {
        (self.cell)(row)
    }

    pub(crate) fn control_handler(&self) -> Option<&ControlHandler<T>> {
        self.on_control.as_ref()
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            width: self.width,
            cell: Arc::clone(&self.cell),
            on_control: self.on_control.clone(),
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("width", &self.width)
            .field("has_control_handler", &self.on_control.is_some())
            .finish()
    }
}
