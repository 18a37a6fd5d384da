pub mod graph;
pub mod record;
pub mod series;

pub use graph::*;
pub use record::*;
pub use series::MeetingSeries;
