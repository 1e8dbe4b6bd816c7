//! Data sources that feed a paginated table.

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::FetchError;

use super::page::Cursor;
use super::page::Page;
use super::page::Pagination;
use super::row::TableRow;

/// Asynchronous, cursor-paginated source of rows.
///
/// `cancel` fires when the table no longer wants the result (teardown or a
/// reload). Sources may stop early when it fires; the table drops the
/// pending call either way and never applies a late result.
#[async_trait]
pub trait DataSource<T>: Send + Sync {
    /// Fetch the page described by `pagination`.
    async fn fetch(
        &self,
        pagination: Pagination,
        cancel: CancellationToken,
    ) -> Result<Page<T>, FetchError>;
}

#[async_trait]
impl<T, S> DataSource<T> for Arc<S>
where
    T: Send + 'static,
    S: DataSource<T> + ?Sized,
{
    async fn fetch(
        &self,
        pagination: Pagination,
        cancel: CancellationToken,
    ) -> Result<Page<T>, FetchError> {
        (**self).fetch(pagination, cancel).await
    }
}

// =============================================================================
// FnSource
// =============================================================================

/// Data source backed by an async closure taking the pagination request.
///
/// # Example
///
/// ```
/// use flowdeck_lib::table::{FnSource, Page, Pagination};
/// use flowdeck_lib::error::FetchError;
///
/// let source = FnSource::new(|pagination: Pagination| async move {
///     let rows: Vec<u32> = (0..pagination.limit as u32).collect();
///     Ok::<_, FetchError>(Page::new(rows))
/// });
/// ```
pub struct FnSource<F> {
    f: F,
}

impl<F> FnSource<F> {
    /// Wrap a closure as a data source.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<T, F, Fut> DataSource<T> for FnSource<F>
where
    T: Send + 'static,
    F: Fn(Pagination) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Page<T>, FetchError>> + Send + 'static,
{
    async fn fetch(
        &self,
        pagination: Pagination,
        _cancel: CancellationToken,
    ) -> Result<Page<T>, FetchError> {
        (self.f)(pagination).await
    }
}

// =============================================================================
// MemorySource
// =============================================================================

/// Ordered in-memory data source.
///
/// The cursor is the key of the last row of a page. Reads never mutate the
/// store, so the same request always yields the same page.
#[derive(Debug, Clone)]
pub struct MemorySource<T> {
    rows: Arc<Vec<T>>,
}

impl<T: TableRow> MemorySource<T> {
    /// Creates a source serving `rows` in order.
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: Arc::new(rows),
        }
    }

    /// Returns the number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the source holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Serve one page synchronously.
    pub fn page(&self, pagination: &Pagination) -> Result<Page<T>, FetchError> {
        if pagination.limit == 0 {
            return Err(FetchError::new("limit must be at least 1").retryable(false));
        }

        let start = match &pagination.cursor {
            None => 0,
            Some(cursor) => {
                let position = self
                    .rows
                    .iter()
                    .position(|row| row.key().to_string() == cursor.as_str());
                match position {
                    Some(index) => index + 1,
                    None => {
                        return Err(
                            FetchError::new(format!("unknown cursor '{}'", cursor)).retryable(false)
                        );
                    }
                }
            }
        };

        let end = start.saturating_add(pagination.limit).min(self.rows.len());
        let items = self.rows[start.min(end)..end].to_vec();
        let next_cursor = if end < self.rows.len() {
            items.last().map(|row| Cursor::new(row.key().to_string()))
        } else {
            None
        };

        Ok(Page::new(items).with_next_cursor_opt(next_cursor))
    }
}

#[async_trait]
impl<T: TableRow> DataSource<T> for MemorySource<T> {
    async fn fetch(
        &self,
        pagination: Pagination,
        _cancel: CancellationToken,
    ) -> Result<Page<T>, FetchError> {
        self.page(&pagination)
    }
}
