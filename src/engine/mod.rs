pub mod cooccurrence;
pub mod manito;
pub mod meetings;

pub use cooccurrence::{build_full_graph, build_graph};
pub use manito::revealed_graph;
pub use meetings::{cumulative_series, top_n, RankedPerson};
