//! Output Generation
//!
//! Per-tick export streams, the edge list, and end-of-run reports.

pub mod centrality;
pub mod edges;
pub mod stats;
pub mod writer;

pub use centrality::*;
pub use edges::*;
pub use stats::*;
pub use writer::*;
