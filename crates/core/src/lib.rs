//! Core domain types, errors, and constants for the `kvcache` region index.
//!
//! ## Key Components
//!
//! - **`errors`**: Defines the primary `Error` enum and `Result` type alias,
//!   centralizing all failure modes of the index and resolver.
//! - **`query_box`**: `QueryBox`, the N-dimensional axis-aligned region used for
//!   cache keys, index entries and query decomposition.
//! - **`constants`**: Shared defaults such as the unbounded depth sentinel and
//!   the minimum-benefit threshold.

pub mod constants;
pub mod errors;
pub mod query_box;

pub use self::{
    constants::*,
    errors::{Error, Result},
    query_box::QueryBox,
};
