use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::geo::GeoPoint;
use crate::layout::{AngleMode, PathAngle, RadialParams};
use crate::render::{Pacing, Surface};

/// Radar settings, loadable from a JSON file. Missing keys keep their defaults.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RadarConfig {
    pub tree_rings: usize,
    pub tree_max_radius: f64,
    pub root_angle_deg: f64,
    /// Hop the tree view starts from; the first capture root when unset.
    pub root_address: Option<String>,
    pub angle_mode: AngleMode,
    pub path_angle: PathAngle,
    /// Observer location used as the heading reference.
    pub origin: Option<GeoPoint>,
    pub capture_limit: usize,
    pub traces_dir: Option<PathBuf>,
    pub trace_interval_minutes: f64,
    pub live_window_minutes: u64,
    pub pacing: Pacing,
}

impl Default for RadarConfig {
    fn default() -> Self {
        Self {
            tree_rings: 17,
            tree_max_radius: 350.0,
            root_angle_deg: 76.0,
            root_address: None,
            angle_mode: AngleMode::FixedRoot,
            path_angle: PathAngle::AddressDigest,
            origin: None,
            capture_limit: 50,
            traces_dir: None,
            trace_interval_minutes: 10.0,
            live_window_minutes: 20,
            pacing: Pacing::default(),
        }
    }
}

impl RadarConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("config is not valid JSON")
    }

    pub fn radial_params(&self, surface: &Surface) -> RadialParams {
        RadialParams {
            center: surface.center,
            root_angle_deg: self.root_angle_deg,
            ring_count: self.tree_rings,
            max_radius: self.tree_max_radius,
            angle_mode: self.angle_mode,
        }
    }

    /// Trace text lives in a `traces` directory next to the captures directory
    /// unless configured otherwise.
    pub fn traces_dir_for(&self, captures_dir: &Path) -> PathBuf {
        if let Some(dir) = &self.traces_dir {
            return dir.clone();
        }
        captures_dir
            .parent()
            .map(|parent| parent.join("traces"))
            .unwrap_or_else(|| PathBuf::from("traces"))
    }

    /// Out-of-range or non-finite values saturate instead of failing.
    pub fn trace_interval(&self) -> Duration {
        let seconds = self.trace_interval_minutes * 60.0;
        if seconds.is_nan() || seconds <= 0.0 {
            return Duration::ZERO;
        }
        Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
    }

    pub fn live_window(&self) -> Duration {
        Duration::from_secs(self.live_window_minutes.saturating_mul(60))
    }
}
