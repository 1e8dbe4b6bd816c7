//! Integration tests for the paginated table controller.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use flowdeck_lib::error::FetchError;
use flowdeck_lib::error::TableError;
use flowdeck_lib::table::{
    Cell, ClickOutcome, ClickTarget, Column, Cursor, DataSource, FetchOutcome, MemorySource, Page,
    PaginatedTable, Pagination, Row, RowActions, SkipReason, TableRow, TableStatus,
};

#[derive(Debug, Clone, PartialEq)]
struct Job {
    id: u32,
    name: String,
}

impl TableRow for Job {
    type Key = u32;

    fn key(&self) -> u32 {
        self.id
    }
}

fn jobs(n: u32) -> Vec<Job> {
    (1..=n)
        .map(|id| Job {
            id,
            name: format!("job-{}", id),
        })
        .collect()
}

fn name_column() -> Column<Job> {
    Column::new("name", "Name", |row: &Row<Job>| Cell::text(row.data.name.clone()))
}

fn ids(table: &PaginatedTable<Job>) -> Vec<u32> {
    table.rows().iter().map(|row| row.data.id).collect()
}

fn memory_table(n: u32, limit: usize) -> PaginatedTable<Job> {
    PaginatedTable::builder()
        .column(name_column())
        .source(MemorySource::new(jobs(n)))
        .page_size(limit)
        .build()
        .unwrap()
}

// =============================================================================
// Mock sources
// =============================================================================

/// Fails the first `failures` calls, then serves from memory.
struct FlakySource {
    inner: MemorySource<Job>,
    failures: AtomicUsize,
    calls: AtomicUsize,
}

impl FlakySource {
    fn new(n: u32, failures: usize) -> Self {
        Self {
            inner: MemorySource::new(jobs(n)),
            failures: AtomicUsize::new(failures),
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl DataSource<Job> for FlakySource {
    async fn fetch(
        &self,
        pagination: Pagination,
        _cancel: CancellationToken,
    ) -> Result<Page<Job>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failures.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failures.store(remaining - 1, Ordering::SeqCst);
            return Err(FetchError::new("upstream unavailable"));
        }
        self.inner.page(&pagination)
    }
}

/// Blocks every fetch until the test opens the gate.
struct GatedSource {
    inner: MemorySource<Job>,
    gate: Notify,
    started: Notify,
    calls: AtomicUsize,
    seen: Mutex<Vec<Pagination>>,
}

impl GatedSource {
    fn new(n: u32) -> Arc<Self> {
        Arc::new(Self {
            inner: MemorySource::new(jobs(n)),
            gate: Notify::new(),
            started: Notify::new(),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl DataSource<Job> for GatedSource {
    async fn fetch(
        &self,
        pagination: Pagination,
        _cancel: CancellationToken,
    ) -> Result<Page<Job>, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(pagination.clone());
        self.started.notify_one();
        self.gate.notified().await;
        self.inner.page(&pagination)
    }
}

// =============================================================================
// Paging
// =============================================================================

#[tokio::test]
async fn test_paging_yields_every_row_once_in_order() {
    for total in [0u32, 1, 3, 9, 10, 11, 25] {
        for limit in [1usize, 2, 3, 10, 50] {
            let table = memory_table(total, limit);
            let mut seen = Vec::new();

            assert!(table.load().await.is_loaded());
            seen.extend(ids(&table));
            while table.can_next() {
                assert!(table.next_page().await.is_loaded());
                seen.extend(ids(&table));
            }

            let expected: Vec<u32> = (1..=total).collect();
            assert_eq!(seen, expected, "total {} limit {}", total, limit);
            assert!(table.is_exhausted());
        }
    }
}

#[tokio::test]
async fn test_empty_page_is_ready_and_exhausted() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let table = PaginatedTable::builder()
        .column(name_column())
        .source(flowdeck_lib::table::FnSource::new(move |_: Pagination| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, FetchError>(Page::<Job>::empty()) }
        }))
        .build()
        .unwrap();

    assert!(table.load().await.is_loaded());
    assert!(table.status().is_ready());
    assert_eq!(table.row_count(), 0);
    assert!(!table.can_next());
    assert_eq!(
        table.next_page().await.skip_reason(),
        Some(SkipReason::Exhausted)
    );
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_next_page_before_load_is_skipped() {
    let table = memory_table(5, 2);
    assert!(table.status().is_idle());
    assert_eq!(
        table.next_page().await.skip_reason(),
        Some(SkipReason::NotLoaded)
    );
    assert_eq!(table.fetch_count(), 0);
}

#[tokio::test]
async fn test_previous_page_walks_back() {
    let table = memory_table(7, 3);
    table.load().await;
    table.next_page().await;
    table.next_page().await;
    assert_eq!(ids(&table), vec![7]);
    assert_eq!(table.page_index(), 2);

    assert!(table.previous_page().await.is_loaded());
    assert_eq!(ids(&table), vec![4, 5, 6]);
    assert!(table.previous_page().await.is_loaded());
    assert_eq!(ids(&table), vec![1, 2, 3]);
    assert!(!table.can_previous());
    assert_eq!(
        table.previous_page().await.skip_reason(),
        Some(SkipReason::NoPrevious)
    );
}

#[tokio::test]
async fn test_refresh_is_idempotent() {
    let table = memory_table(6, 4);
    table.load().await;
    table.next_page().await;
    let before = table.rows();

    assert!(table.refresh().await.is_loaded());
    assert_eq!(table.rows(), before);
    assert_eq!(table.page_index(), 1);
}

#[tokio::test]
async fn test_same_request_yields_same_page() {
    let source = MemorySource::new(jobs(12));
    let pagination = Pagination::after(Cursor::new("5"), 4);
    let first = source
        .fetch(pagination.clone(), CancellationToken::new())
        .await
        .unwrap();
    let second = source
        .fetch(pagination, CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Failure and retry
// =============================================================================

#[tokio::test]
async fn test_retry_after_failure_clears_error() {
    let source = Arc::new(FlakySource::new(3, 1));
    let table = PaginatedTable::builder()
        .column(name_column())
        .source(Arc::clone(&source))
        .build()
        .unwrap();

    match table.load().await {
        FetchOutcome::Failed(err) => assert_eq!(err.message(), "upstream unavailable"),
        other => panic!("expected failure, got {:?}", other),
    }
    assert!(table.status().is_failed());
    assert_eq!(table.row_count(), 0);

    assert!(table.retry().await.is_loaded());
    assert!(table.error().is_none());
    assert_eq!(ids(&table), vec![1, 2, 3]);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);

    assert_eq!(table.retry().await.skip_reason(), Some(SkipReason::NoError));
}

#[tokio::test]
async fn test_failed_next_page_keeps_previous_rows() {
    let source = Arc::new(FlakySource::new(6, 0));
    let table = PaginatedTable::builder()
        .column(name_column())
        .source(Arc::clone(&source))
        .page_size(3)
        .build()
        .unwrap();

    table.load().await;
    source.failures.store(1, Ordering::SeqCst);
    assert!(matches!(table.next_page().await, FetchOutcome::Failed(_)));
    assert_eq!(ids(&table), vec![1, 2, 3]);

    assert!(table.retry().await.is_loaded());
    assert_eq!(ids(&table), vec![4, 5, 6]);
    assert_eq!(table.page_index(), 1);
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test]
async fn test_second_trigger_while_pending_is_skipped() {
    let source = GatedSource::new(10);
    let table = PaginatedTable::builder()
        .column(name_column())
        .source(Arc::clone(&source))
        .page_size(2)
        .build()
        .unwrap();

    let loading = tokio::spawn({
        let table = table.clone();
        async move { table.load().await }
    });
    source.started.notified().await;

    assert!(table.is_loading());
    assert!(!table.can_next());
    assert_eq!(table.load().await.skip_reason(), Some(SkipReason::InFlight));
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    source.gate.notify_one();
    assert!(loading.await.unwrap().is_loaded());

    let next = tokio::spawn({
        let table = table.clone();
        async move { table.next_page().await }
    });
    source.started.notified().await;
    assert_eq!(
        table.next_page().await.skip_reason(),
        Some(SkipReason::InFlight)
    );
    source.gate.notify_one();
    assert!(next.await.unwrap().is_loaded());

    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert_eq!(ids(&table), vec![3, 4]);
    let cursors: Vec<Option<Cursor>> = source
        .seen
        .lock()
        .unwrap()
        .iter()
        .map(|p| p.cursor.clone())
        .collect();
    assert_eq!(cursors, vec![None, Some(Cursor::new("2"))]);
}

#[tokio::test]
async fn test_dispose_discards_pending_response() {
    let source = GatedSource::new(4);
    let table = PaginatedTable::builder()
        .column(name_column())
        .source(Arc::clone(&source))
        .build()
        .unwrap();

    let loading = tokio::spawn({
        let table = table.clone();
        async move { table.load().await }
    });
    source.started.notified().await;

    table.dispose();
    source.gate.notify_one();

    assert!(matches!(loading.await.unwrap(), FetchOutcome::Cancelled));
    assert_eq!(table.row_count(), 0);
    assert!(table.is_disposed());
    assert_eq!(table.load().await.skip_reason(), Some(SkipReason::Disposed));
}

#[tokio::test]
async fn test_reload_supersedes_pending_fetch() {
    let source = GatedSource::new(4);
    let table = PaginatedTable::builder()
        .column(name_column())
        .source(Arc::clone(&source))
        .build()
        .unwrap();

    let first = tokio::spawn({
        let table = table.clone();
        async move { table.load().await }
    });
    source.started.notified().await;

    let second = tokio::spawn({
        let table = table.clone();
        async move { table.reload().await }
    });
    source.started.notified().await;

    assert!(matches!(first.await.unwrap(), FetchOutcome::Cancelled));
    source.gate.notify_one();
    assert!(second.await.unwrap().is_loaded());
    assert_eq!(ids(&table), vec![1, 2, 3, 4]);
    assert_eq!(table.fetch_count(), 2);
}

#[tokio::test]
async fn test_dropped_trigger_releases_the_table() {
    let source = GatedSource::new(3);
    let table = PaginatedTable::builder()
        .column(name_column())
        .source(Arc::clone(&source))
        .build()
        .unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(10), table.load()).await;
    assert!(timed_out.is_err());

    assert!(!table.is_loading());
    assert!(table.status().is_idle());

    source.gate.notify_one();
    assert!(table.load().await.is_loaded());
    assert_eq!(ids(&table), vec![1, 2, 3]);
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_dropped_next_page_keeps_current_page() {
    let source = GatedSource::new(4);
    let table = PaginatedTable::builder()
        .column(name_column())
        .source(Arc::clone(&source))
        .page_size(2)
        .build()
        .unwrap();

    source.gate.notify_one();
    assert!(table.load().await.is_loaded());
    source.started.notified().await;

    let next = tokio::spawn({
        let table = table.clone();
        async move { table.next_page().await }
    });
    source.started.notified().await;
    next.abort();
    assert!(next.await.unwrap_err().is_cancelled());

    assert!(table.status().is_ready());
    assert!(table.can_next());
    assert_eq!(ids(&table), vec![1, 2]);

    source.gate.notify_one();
    assert!(table.next_page().await.is_loaded());
    assert_eq!(ids(&table), vec![3, 4]);
}

// =============================================================================
// Clicks
// =============================================================================

#[tokio::test]
async fn test_control_click_does_not_trigger_row_click() {
    let row_clicks = Arc::new(Mutex::new(Vec::new()));
    let archived = Arc::new(Mutex::new(Vec::new()));

    let table = PaginatedTable::builder()
        .column(name_column())
        .column(
            Column::new("archive", "", |_: &Row<Job>| Cell::control("archive", "Archive"))
                .on_control({
                    let archived = Arc::clone(&archived);
                    move |row: &Row<Job>| archived.lock().unwrap().push(row.data.id)
                }),
        )
        .source(MemorySource::new(jobs(3)))
        .row_actions(|job: &Job| {
            if job.id == 2 {
                RowActions::new().disable("archive")
            } else {
                RowActions::new()
            }
        })
        .on_row_click({
            let row_clicks = Arc::clone(&row_clicks);
            move |row: &Row<Job>| row_clicks.lock().unwrap().push(row.data.id)
        })
        .build()
        .unwrap();
    table.load().await;

    assert_eq!(
        table.click(ClickTarget::Cell { row: 0, column: 1 }),
        ClickOutcome::ControlActivated {
            action: "archive".to_string()
        }
    );
    assert_eq!(
        table.click(ClickTarget::Cell { row: 1, column: 1 }),
        ClickOutcome::ControlDisabled {
            action: "archive".to_string()
        }
    );
    assert_eq!(
        table.click(ClickTarget::Cell { row: 2, column: 0 }),
        ClickOutcome::RowClicked
    );
    assert_eq!(table.click(ClickTarget::Row { row: 1 }), ClickOutcome::RowClicked);
    assert_eq!(table.click(ClickTarget::Row { row: 9 }), ClickOutcome::Ignored);

    assert_eq!(*archived.lock().unwrap(), vec![1]);
    assert_eq!(*row_clicks.lock().unwrap(), vec![3, 2]);
}

// =============================================================================
// Builder and rendering
// =============================================================================

#[test]
fn test_build_requires_source_and_page_size() {
    let err = PaginatedTable::<Job>::builder()
        .column(name_column())
        .build()
        .unwrap_err();
    assert!(matches!(err, TableError::MissingSource));

    let err = PaginatedTable::builder()
        .column(name_column())
        .source(MemorySource::new(jobs(1)))
        .page_size(0)
        .build()
        .unwrap_err();
    assert!(matches!(err, TableError::ZeroPageSize));
}

#[tokio::test]
async fn test_render_text_after_load() {
    let table = memory_table(2, 10);
    table.load().await;
    assert!(matches!(table.status(), TableStatus::Ready));
    assert_eq!(table.render_text(), vec!["Name", "-----", "job-1", "job-2"]);
}
