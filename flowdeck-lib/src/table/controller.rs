//! The paginated table controller.

use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use tokio_util::sync::CancellationToken;

use crate::error::FetchError;
use crate::error::TableError;

use super::column::Column;
use super::page::DEFAULT_PAGE_SIZE;
use super::page::Page;
use super::page::Pagination;
use super::render;
use super::row::Row;
use super::row::RowActions;
use super::row::TableRow;
use super::source::DataSource;
use super::state::Direction;
use super::state::FetchOutcome;
use super::state::InFlight;
use super::state::Request;
use super::state::SkipReason;
use super::state::TableState;
use super::state::TableStatus;

/// Invoked with the clicked row.
pub type RowClickHandler<T> = Arc<dyn Fn(&Row<T>) + Send + Sync>;

/// Derives per-row action states from an entity.
pub type RowActionsFn<T> = Arc<dyn Fn(&T) -> RowActions + Send + Sync>;

/// A table over a cursor-paginated data source.
///
/// The handle is cheap to clone; all clones share one view state. At most one
/// fetch is in flight at a time: a trigger issued while another fetch is
/// pending is skipped without touching the data source.
///
/// # Example
///
/// ```ignore
/// let table = PaginatedTable::builder()
///     .column(Column::new("name", "Name", |row: &Row<Flow>| Cell::text(row.data.name())))
///     .source(FlowsSource::new(client, project_id))
///     .page_size(10)
///     .on_row_click(|row| navigate(&row.data.id))
///     .build()?;
///
/// table.load().await;
/// while table.can_next() {
///     table.next_page().await;
/// }
/// ```
pub struct PaginatedTable<T: TableRow> {
    pub(crate) inner: Arc<Inner<T>>,
}

pub(crate) struct Inner<T: TableRow> {
    pub columns: Vec<Column<T>>,
    pub source: Arc<dyn DataSource<T>>,
    pub page_size: usize,
    pub row_actions: Option<RowActionsFn<T>>,
    pub on_row_click: Option<RowClickHandler<T>>,
    /// Parent of every per-fetch token; cancelled on dispose.
    pub cancel: CancellationToken,
    pub state: Mutex<TableState<T>>,
}

/// Releases the in-flight slot when a pending trigger is dropped.
///
/// After `finish` the slot is already empty or owned by a newer generation,
/// so dropping the guard is a no-op.
struct ReleaseOnDrop<'a, T: TableRow> {
    table: &'a PaginatedTable<T>,
    generation: u64,
}

impl<T: TableRow> Drop for ReleaseOnDrop<'_, T> {
    fn drop(&mut self) {
        self.table.abandon(self.generation);
    }
}

/// A fetch that has been admitted and must be completed with `finish`.
struct Ticket {
    generation: u64,
    cancel: CancellationToken,
    request: Request,
}

impl<T: TableRow> PaginatedTable<T> {
    /// Creates a new builder.
    pub fn builder() -> PaginatedTableBuilder<T> {
        PaginatedTableBuilder::new()
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, TableState<T>> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Pagination triggers
    // =========================================================================

    /// Fetch the first page. This is the "mount" step.
    pub async fn load(&self) -> FetchOutcome {
        self.run(false, |_| Ok(Request::new(Direction::First, None)))
            .await
    }

    /// Fetch the first page again, cancelling any pending fetch.
    ///
    /// Use this when the query behind the data source changed. The response
    /// of the superseded fetch is discarded even if it arrives later.
    pub async fn reload(&self) -> FetchOutcome {
        self.run(true, |_| Ok(Request::new(Direction::First, None)))
            .await
    }

    /// Fetch the page after the current one.
    pub async fn next_page(&self) -> FetchOutcome {
        self.run(false, |state| {
            if !state.loaded {
                return Err(SkipReason::NotLoaded);
            }
            state
                .next_cursor
                .clone()
                .map(|cursor| Request::new(Direction::Next, Some(cursor)))
                .ok_or(SkipReason::Exhausted)
        })
        .await
    }

    /// Fetch the page before the current one.
    pub async fn previous_page(&self) -> FetchOutcome {
        self.run(false, |state| {
            state
                .history
                .last()
                .cloned()
                .map(|cursor| Request::new(Direction::Previous, cursor))
                .ok_or(SkipReason::NoPrevious)
        })
        .await
    }

    /// Fetch the current page again.
    pub async fn refresh(&self) -> FetchOutcome {
        self.run(false, |state| {
            if !state.loaded {
                return Err(SkipReason::NotLoaded);
            }
            Ok(Request::new(
                Direction::Refresh,
                state.current_cursor.clone(),
            ))
        })
        .await
    }

    /// Re-issue the request that last failed.
    pub async fn retry(&self) -> FetchOutcome {
        self.run(false, |state| state.failed.clone().ok_or(SkipReason::NoError))
            .await
    }

    /// Tear the table down.
    ///
    /// Cancels the pending fetch, if any. Later triggers are skipped and a
    /// response that arrives afterwards is never applied.
    pub fn dispose(&self) {
        let mut state = self.state();
        if state.disposed {
            return;
        }
        state.disposed = true;
        if let Some(in_flight) = state.in_flight.take() {
            in_flight.cancel.cancel();
            state.status = in_flight.previous;
        }
        self.inner.cancel.cancel();
        log::debug!("Table disposed after {} fetches", state.fetch_count);
    }

    async fn run<P>(&self, preempt: bool, plan: P) -> FetchOutcome
    where
        P: FnOnce(&TableState<T>) -> Result<Request, SkipReason>,
    {
        let ticket = match self.begin(preempt, plan) {
            Ok(ticket) => ticket,
            Err(reason) => {
                log::debug!("Page request skipped: {:?}", reason);
                return FetchOutcome::Skipped(reason);
            }
        };

        let pagination = Pagination {
            cursor: ticket.request.cursor.clone(),
            limit: self.inner.page_size,
        };
        log::debug!(
            "Fetching page (generation {}, cursor {:?}, limit {})",
            ticket.generation,
            pagination.cursor,
            pagination.limit
        );

        let _release = ReleaseOnDrop {
            table: self,
            generation: ticket.generation,
        };

        let result = tokio::select! {
            biased;
            _ = ticket.cancel.cancelled() => None,
            result = self.inner.source.fetch(pagination, ticket.cancel.clone()) => Some(result),
        };

        self.finish(ticket, result)
    }

    /// Free the in-flight slot of `generation` if it still holds it.
    ///
    /// Runs when a trigger's future is dropped before its fetch finished.
    fn abandon(&self, generation: u64) {
        let mut state = self.state();
        let is_current = state
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation == generation);
        if !is_current {
            return;
        }
        if let Some(in_flight) = state.in_flight.take() {
            log::debug!("Fetch generation {} abandoned by its caller", generation);
            in_flight.cancel.cancel();
            state.status = in_flight.previous;
        }
    }

    /// Admit a fetch. The in-flight slot is taken here, before the first
    /// suspension point.
    fn begin<P>(&self, preempt: bool, plan: P) -> Result<Ticket, SkipReason>
    where
        P: FnOnce(&TableState<T>) -> Result<Request, SkipReason>,
    {
        let mut state = self.state();
        if state.disposed {
            return Err(SkipReason::Disposed);
        }
        if state.in_flight.is_some() && !preempt {
            return Err(SkipReason::InFlight);
        }

        let request = plan(&state)?;

        let previous = match state.in_flight.take() {
            Some(superseded) => {
                log::debug!("Cancelling fetch generation {}", superseded.generation);
                superseded.cancel.cancel();
                superseded.previous
            }
            None => state.status.clone(),
        };

        state.generation += 1;
        state.fetch_count += 1;
        let generation = state.generation;
        let cancel = self.inner.cancel.child_token();
        state.in_flight = Some(InFlight {
            generation,
            cancel: cancel.clone(),
            previous,
        });
        state.status = TableStatus::Loading;

        Ok(Ticket {
            generation,
            cancel,
            request,
        })
    }

    fn finish(
        &self,
        ticket: Ticket,
        result: Option<Result<Page<T>, FetchError>>,
    ) -> FetchOutcome {
        let mut state = self.state();
        let is_current = state
            .in_flight
            .as_ref()
            .is_some_and(|in_flight| in_flight.generation == ticket.generation);
        if !is_current || state.disposed {
            log::warn!(
                "Discarding response of superseded fetch generation {}",
                ticket.generation
            );
            return FetchOutcome::Cancelled;
        }

        let Some(in_flight) = state.in_flight.take() else {
            return FetchOutcome::Cancelled;
        };

        match result {
            None => {
                state.status = in_flight.previous;
                FetchOutcome::Cancelled
            }
            Some(Ok(page)) => {
                let (items, next_cursor) = page.into_parts();
                let rows: Vec<Row<T>> = items
                    .into_iter()
                    .map(|item| self.wrap_row(item))
                    .collect();
                let count = rows.len();
                log::debug!(
                    "Loaded {} rows (generation {}, more: {})",
                    count,
                    ticket.generation,
                    next_cursor.is_some()
                );
                state.apply_page(ticket.request, rows, next_cursor);
                FetchOutcome::Loaded { rows: count }
            }
            Some(Err(err)) => {
                log::warn!("Page fetch failed: {}", err);
                state.apply_error(ticket.request, err.clone());
                FetchOutcome::Failed(err)
            }
        }
    }

    fn wrap_row(&self, item: T) -> Row<T> {
        match &self.inner.row_actions {
            Some(derive) => {
                let actions = derive(&item);
                Row::new(item).with_actions(actions)
            }
            None => Row::new(item),
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current load status.
    pub fn status(&self) -> TableStatus {
        self.state().status.clone()
    }

    /// The error of the last failed fetch, if the table is in the failed state.
    pub fn error(&self) -> Option<FetchError> {
        self.state().status.as_error().cloned()
    }

    /// Rows of the current page in source order.
    pub fn rows(&self) -> Vec<Row<T>> {
        self.state().rows.clone()
    }

    /// Row at `index` on the current page.
    pub fn row(&self, index: usize) -> Option<Row<T>> {
        self.state().rows.get(index).cloned()
    }

    /// Number of rows on the current page.
    pub fn row_count(&self) -> usize {
        self.state().rows.len()
    }

    /// Column definitions in display order.
    pub fn columns(&self) -> &[Column<T>] {
        &self.inner.columns
    }

    pub fn page_size(&self) -> usize {
        self.inner.page_size
    }

    /// Zero-based index of the current page.
    pub fn page_index(&self) -> usize {
        self.state().history.len()
    }

    /// Number of fetches issued so far.
    pub fn fetch_count(&self) -> usize {
        self.state().fetch_count
    }

    pub fn is_loading(&self) -> bool {
        self.state().in_flight.is_some()
    }

    pub fn is_disposed(&self) -> bool {
        self.state().disposed
    }

    /// Whether the "next page" control is enabled.
    pub fn can_next(&self) -> bool {
        let state = self.state();
        !state.disposed && state.in_flight.is_none() && state.loaded && state.next_cursor.is_some()
    }

    /// Whether the "previous page" control is enabled.
    pub fn can_previous(&self) -> bool {
        let state = self.state();
        !state.disposed && state.in_flight.is_none() && !state.history.is_empty()
    }

    /// `true` once a loaded page reported no next cursor.
    pub fn is_exhausted(&self) -> bool {
        let state = self.state();
        state.loaded && state.next_cursor.is_none()
    }

    /// Render the current page as aligned text lines, header first.
    pub fn render_text(&self) -> Vec<String> {
        let state = self.state();
        render::render_text(&self.inner.columns, &state.rows)
    }
}

impl<T: TableRow> Clone for PaginatedTable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: TableRow> fmt::Debug for PaginatedTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("PaginatedTable")
            .field("columns", &self.inner.columns.len())
            .field("page_size", &self.inner.page_size)
            .field("status", &state.status)
            .field("rows", &state.rows.len())
            .field("page_index", &state.history.len())
            .finish()
    }
}

// =============================================================================
// Builder
// =============================================================================

/// Builder for a [`PaginatedTable`].
pub struct PaginatedTableBuilder<T: TableRow> {
    columns: Vec<Column<T>>,
    source: Option<Arc<dyn DataSource<T>>>,
    page_size: usize,
    row_actions: Option<RowActionsFn<T>>,
    on_row_click: Option<RowClickHandler<T>>,
}

impl<T: TableRow> PaginatedTableBuilder<T> {
    /// Creates a builder with the default page size.
    pub fn new() -> Self {
        Self {
            columns: Vec::new(),
            source: None,
            page_size: DEFAULT_PAGE_SIZE,
            row_actions: None,
            on_row_click: None,
        }
    }

    /// Append a column.
    pub fn column(mut self, column: Column<T>) -> Self {
        self.columns.push(column);
        self
    }

    /// Append several columns.
    pub fn columns(mut self, columns: impl IntoIterator<Item = Column<T>>) -> Self {
        self.columns.extend(columns);
        self
    }

    /// Set the data source.
    pub fn source(mut self, source: impl DataSource<T> + 'static) -> Self {
        self.source = Some(Arc::new(source));
        self
    }

    /// Set the number of rows requested per page.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Derive action states for every fetched row.
    pub fn row_actions<F>(mut self, derive: F) -> Self
    where
        F: Fn(&T) -> RowActions + Send + Sync + 'static,
    {
        self.row_actions = Some(Arc::new(derive));
        self
    }

    /// Set the handler for clicks on a row outside its controls.
    pub fn on_row_click<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Row<T>) + Send + Sync + 'static,
    {
        self.on_row_click = Some(Arc::new(handler));
        self
    }

    /// Build the table. Nothing is fetched until [`PaginatedTable::load`].
    pub fn build(self) -> Result<PaginatedTable<T>, TableError> {
        let source = self.source.ok_or(TableError::MissingSource)?;
        if self.page_size == 0 {
            return Err(TableError::ZeroPageSize);
        }

        Ok(PaginatedTable {
            inner: Arc::new(Inner {
                columns: self.columns,
                source,
                page_size: self.page_size,
                row_actions: self.row_actions,
                on_row_click: self.on_row_click,
                cancel: CancellationToken::new(),
                state: Mutex::new(TableState::default()),
            }),
        })
    }
}

impl<T: TableRow> Default for PaginatedTableBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
