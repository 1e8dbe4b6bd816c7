//! Error types

mod api;
mod fetch;
mod form;
mod table;

pub use api::*;
pub use fetch::*;
pub use form::*;
pub use table::*;

/// Any error produced by this library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error from the flows HTTP API.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Error reported by a table data source.
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Error while editing a form.
    #[error(transparent)]
    Form(#[from] FormError),

    /// Invalid table configuration.
    #[error(transparent)]
    Table(#[from] TableError),
}
