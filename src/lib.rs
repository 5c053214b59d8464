//! Radar visualization of recorded traceroute captures: captures are merged into
//! one hop graph, laid out on concentric rings and replayed as paced draw
//! instructions.

pub mod capture;
pub mod config;
pub mod geo;
pub mod graph;
pub mod layout;
pub mod render;
pub mod snapshot;

mod util;
