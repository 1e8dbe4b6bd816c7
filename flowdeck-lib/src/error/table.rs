//! Table configuration error types

/// Errors raised while building a paginated table.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    /// No data source was supplied to the builder.
    #[error("Table has no data source")]
    MissingSource,

    /// Page size must be at least one row.
    #[error("Page size must be at least 1")]
    ZeroPageSize,
}
