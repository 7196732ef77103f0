mod graph;
mod status;

pub use graph::{NextAction, StatusGraph, StatusNode};
pub use status::{CaseStatus, Phase, Role};
