//! Click dispatch for table rows and their embedded controls.

use super::column::Cell;
use super::controller::PaginatedTable;
use super::row::TableRow;

/// Where a click landed, by position on the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// Somewhere on the row outside any cell (padding, row border).
    Row { row: usize },
    /// Inside the cell at `column` of `row`.
    Cell { row: usize, column: usize },
}

impl ClickTarget {
    pub fn row_index(&self) -> usize {
        match self {
            Self::Row { row } | Self::Cell { row, .. } => *row,
        }
    }
}

/// What a click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// The row-click handler ran.
    RowClicked,
    /// A control's handler ran.
    ControlActivated { action: String },
    /// The click hit a control whose action is disabled for the row.
    ControlDisabled { action: String },
    /// Nothing handled the click.
    Ignored,
}

impl ClickOutcome {
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::RowClicked | Self::ControlActivated { .. })
    }
}

impl<T: TableRow> PaginatedTable<T> {
    /// Dispatch a click on the current page.
    ///
    /// A click on a control cell goes to the column's control handler and
    /// never to the row-click handler. Any other click on a rendered row
    /// invokes the row-click handler once with that row.
    pub fn click(&self, target: ClickTarget) -> ClickOutcome {
        // Handlers run without the state lock so they may call back into the table.
        let Some(row) = self.row(target.row_index()) else {
            return ClickOutcome::Ignored;
        };

        if let ClickTarget::Cell { column, .. } = target {
            let Some(column) = self.inner.columns.get(column) else {
                return ClickOutcome::Ignored;
            };

            if let Cell::Control(control) = column.render(&row) {
                if !row.is_action_enabled(&control.action) {
                    log::debug!("Ignoring click on disabled action '{}'", control.action);
                    return ClickOutcome::ControlDisabled {
                        action: control.action,
                    };
                }
                return match column.control_handler() {
                    Some(handler) => {
                        handler(&row);
                        ClickOutcome::ControlActivated {
                            action: control.action,
                        }
                    }
                    None => ClickOutcome::Ignored,
                };
            }
        }

        match &self.inner.on_row_click {
            Some(handler) => {
                handler(&row);
                ClickOutcome::RowClicked
            }
            None => ClickOutcome::Ignored,
        }
    }
}
