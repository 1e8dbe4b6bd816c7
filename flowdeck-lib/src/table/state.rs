//! Load status and transient view state of a paginated table.

use tokio_util::sync::CancellationToken;

use crate::error::FetchError;

use super::page::Cursor;
use super::row::Row;

/// Load status of a paginated table.
#[derive(Debug, Clone, Default)]
pub enum TableStatus {
    /// Nothing has been requested yet.
    #[default]
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The current page is loaded. Zero rows is a valid ready state.
    Ready,
    /// The last fetch failed; the previous rows are kept.
    Failed(FetchError),
}

impl TableStatus {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Get the error if the last fetch failed.
    pub fn as_error(&self) -> Option<&FetchError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Why a pagination trigger did not issue a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Another fetch is still pending.
    InFlight,
    /// No page has been loaded yet.
    NotLoaded,
    /// The current page is the last one.
    Exhausted,
    /// The current page is the first one.
    NoPrevious,
    /// Retry was requested but the last fetch did not fail.
    NoError,
    /// The table has been disposed.
    Disposed,
}

/// Result of a pagination trigger.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// A page was fetched and is now the current page.
    Loaded { rows: usize },
    /// The fetch failed; the table is in the failed state.
    Failed(FetchError),
    /// No fetch was issued.
    Skipped(SkipReason),
    /// The fetch was cancelled or superseded; its result was discarded.
    Cancelled,
}

impl FetchOutcome {
    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Returns the skip reason, if no fetch was issued.
    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Skipped(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Which way a request moves through the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    First,
    Next,
    Previous,
    Refresh,
}

/// A page request the table issued or wants to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Request {
    pub direction: Direction,
    pub cursor: Option<Cursor>,
}

impl Request {
    pub fn new(direction: Direction, cursor: Option<Cursor>) -> Self {
        Self { direction, cursor }
    }
}

/// The fetch currently pending.
#[derive(Debug)]
pub(crate) struct InFlight {
    pub generation: u64,
    pub cancel: CancellationToken,
    /// Status to restore if the fetch is cancelled.
    pub previous: TableStatus,
}

/// Transient view state, owned by one table instance.
#[derive(Debug)]
pub(crate) struct TableState<T> {
    pub status: TableStatus,
    /// Rows of the current page.
    pub rows: Vec<Row<T>>,
    /// Cursor that produced the current page.
    pub current_cursor: Option<Cursor>,
    /// Cursor of the page after the current one.
    pub next_cursor: Option<Cursor>,
    /// Cursors that produced the pages before the current one.
    pub history: Vec<Option<Cursor>>,
    /// Request to re-issue on retry.
    pub failed: Option<Request>,
    pub in_flight: Option<InFlight>,
    /// Bumped on every issued fetch; responses from older fetches are dropped.
    pub generation: u64,
    pub fetch_count: usize,
    /// Whether any page has been applied.
    pub loaded: bool,
    pub disposed: bool,
}

impl<T> Default for TableState<T> {
    fn default() -> Self {
        Self {
            status: TableStatus::Idle,
            rows: Vec::new(),
            current_cursor: None,
            next_cursor: None,
            history: Vec::new(),
            failed: None,
            in_flight: None,
            generation: 0,
            fetch_count: 0,
            loaded: false,
            disposed: false,
        }
    }
}

impl<T> TableState<T> {
    /// Replace the current page after a successful fetch of `request`.
    pub fn apply_page(&mut self, request: Request, rows: Vec<Row<T>>, next_cursor: Option<Cursor>) {
        match request.direction {
            Direction::First => self.history.clear(),
            Direction::Next => {
                let previous = self.current_cursor.take();
                self.history.push(previous);
            }
            Direction::Previous => {
                self.history.pop();
            }
            Direction::Refresh => {}
        }

        self.current_cursor = request.cursor;
        self.next_cursor = next_cursor;
        self.rows = rows;
        self.failed = None;
        self.loaded = true;
        self.status = TableStatus::Ready;
    }

    /// Record a failed fetch of `request`, keeping the current rows.
    pub fn apply_error(&mut self, request: Request, err: FetchError) {
        self.failed = Some(request);
        self.status = TableStatus::Failed(err);
    }
}
