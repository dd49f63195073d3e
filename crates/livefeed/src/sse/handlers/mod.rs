//! Protocol handler implementations for common SSE patterns.
//!
//! - [`GenericSseHandler`]: heuristic classification with a configurable
//!   end-of-stream event

mod generic;

pub use generic::{DEFAULT_EOF_EVENT, GenericSseHandler};
