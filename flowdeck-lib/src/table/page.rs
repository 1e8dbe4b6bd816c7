//! Cursor and page types for cursor-based pagination.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

/// Default number of rows requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Opaque continuation token handed out by a data source.
///
/// A cursor is only meaningful as input to the next fetch of the same query;
/// the table never inspects or constructs one itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Creates a cursor from its raw token.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the cursor and returns the raw token.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Cursor {
    fn from(token: String) -> Self {
        Self(token)
    }
}

impl From<&str> for Cursor {
    fn from(token: &str) -> Self {
        Self(token.to_string())
    }
}

/// Position and size of a page request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Pagination {
    /// Cursor returned by the previous page, `None` for the first page.
    pub cursor: Option<Cursor>,
    /// Maximum number of rows to return.
    pub limit: usize,
}

impl Pagination {
    /// Request for the first page.
    pub fn first(limit: usize) -> Self {
        Self {
            cursor: None,
            limit,
        }
    }

    /// Request for the page following `cursor`.
    pub fn after(cursor: Cursor, limit: usize) -> Self {
        Self {
            cursor: Some(cursor),
            limit,
        }
    }
}

/// A page of rows with the cursor for the page that follows it.
///
/// `next_cursor` being `None` marks the end of the sequence.
///
/// # Example
///
/// ```
/// use flowdeck_lib::table::{Cursor, Page};
///
/// let page = Page::new(vec![1, 2, 3]).with_next_cursor("3");
/// assert!(page.has_more());
/// assert_eq!(page.next_cursor(), Some(&Cursor::new("3")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    items: Vec<T>,
    next_cursor: Option<Cursor>,
}

impl<T> Page<T> {
    /// Creates a final page (no cursor) with the given items.
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            next_cursor: None,
        }
    }

    /// An empty final page.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Sets the cursor for the next page.
    pub fn with_next_cursor(mut self, cursor: impl Into<Cursor>) -> Self {
        self.next_cursor = Some(cursor.into());
        self
    }

    /// Sets or clears the cursor for the next page.
    pub fn with_next_cursor_opt(mut self, cursor: Option<Cursor>) -> Self {
        self.next_cursor = cursor;
        self
    }

    /// Returns the rows of this page in source order.
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Returns the cursor for the next page, if any.
    pub fn next_cursor(&self) -> Option<&Cursor> {
        self.next_cursor.as_ref()
    }

    /// Returns `true` if more pages follow.
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }

    /// Returns the number of rows in this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns `true` if this page has no rows.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Splits the page into its rows and next cursor.
    pub fn into_parts(self) -> (Vec<T>, Option<Cursor>) {
        (self.items, self.next_cursor)
    }

    /// Maps every row, keeping the cursor.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_cursor: self.next_cursor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_page() {
        let page: Page<u32> = Page::empty();
        assert!(page.is_empty());
        assert!(!page.has_more());
    }

    #[test]
    fn test_map_keeps_cursor() {
        let page = Page::new(vec![1, 2]).with_next_cursor("2").map(|n| n * 10);
        assert_eq!(page.items(), &[10, 20]);
        assert_eq!(page.next_cursor().map(Cursor::as_str), Some("2"));
    }

    #[test]
    fn test_cursor_serializes_as_plain_string() {
        let json = serde_json::to_string(&Cursor::new("abc")).unwrap();
        assert_eq!(json, "\"abc\"");
    }
}
