use std::time::{Duration, SystemTime};

use anyhow::Result;

use crate::capture::{Capture, CaptureSource};
use crate::geo::TableGeocoder;
use crate::graph::{HopGraph, build_graph};

/// Everything one render cycle reads. Never mutated once built; a reload
/// produces a new snapshot.
#[derive(Debug, Default)]
pub struct Snapshot {
    pub captures: Vec<Capture>,
    pub graph: HopGraph,
    pub geocoder: TableGeocoder,
}

impl Snapshot {
    pub fn collect(source: &dyn CaptureSource) -> Result<Self> {
        Ok(Self::from_captures(source.list_captures()?))
    }

    pub fn from_captures(captures: Vec<Capture>) -> Self {
        let graph = build_graph(&captures);
        let geocoder = TableGeocoder::from_captures(&captures);
        Self {
            captures,
            graph,
            geocoder,
        }
    }

    /// Index of the first capture recorded within the live window, if any.
    pub fn first_live(&self, now: SystemTime, window: Duration) -> Option<usize> {
        self.captures
            .iter()
            .position(|capture| capture.is_live(now, window))
    }
}
