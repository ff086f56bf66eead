//! Estimation inputs and the adjacency derived from them.
//!
//! - `types`: site, region and actual rows
//! - `adjacency`: touches-or-overlaps region graph
//! - `estimation_data`: the validated, read-only bundle every estimator uses

pub mod adjacency;
mod estimation_data;
pub mod types;


pub use adjacency::{touches_or_overlaps, AdjacencyIndex};
pub use estimation_data::{EstimationData, SiteFilter};
pub use types::{Actual, Region, Site};
