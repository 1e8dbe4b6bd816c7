//! Paginated table.
//!
//! A headless table over a cursor-paginated data source. The table owns the
//! transient view state of the current page; the caller supplies columns, a
//! [`DataSource`] and optional row-click and control handlers.
//!
//! # Types
//!
//! - [`PaginatedTable`] - the controller, built with [`PaginatedTable::builder`]
//! - [`Column`] / [`Cell`] - pure rendering of a row into cells
//! - [`Row`] / [`RowActions`] - an entity plus its per-row action states
//! - [`Page`] / [`Cursor`] / [`Pagination`] - cursor-based paging
//! - [`DataSource`] - where pages come from ([`FnSource`], [`MemorySource`])

mod click;
mod column;
mod controller;
mod page;
pub mod render;
mod row;
mod source;
mod state;

pub use click::ClickOutcome;
pub use click::ClickTarget;
pub use column::Cell;
pub use column::CellFn;
pub use column::Column;
pub use column::ColumnWidth;
pub use column::Control;
pub use column::ControlHandler;
pub use controller::PaginatedTable;
pub use controller::PaginatedTableBuilder;
pub use controller::RowActionsFn;
pub use controller::RowClickHandler;
pub use page::Cursor;
pub use page::DEFAULT_PAGE_SIZE;
pub use page::Page;
pub use page::Pagination;
pub use row::ActionState;
pub use row::Row;
pub use row::RowActions;
pub use row::TableRow;
pub use source::DataSource;
pub use source::FnSource;
pub use source::MemorySource;
pub use state::FetchOutcome;
pub use state::SkipReason;
pub use state::TableStatus;
