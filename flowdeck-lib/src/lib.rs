//! Flowdeck core library
//!
//! A headless paginated table driven by cursor-paginated async data
//! sources, typed validation and form state, and the flow model and HTTP
//! client that the flows listing and code-step settings form build on.

pub mod api;
pub mod error;
pub mod flows;
pub mod form;
pub mod model;
pub mod table;
pub mod validation;

pub use error::Error;
