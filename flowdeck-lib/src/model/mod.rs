//! Typed models

mod flow;
mod step;

pub use flow::*;
pub use step::*;
