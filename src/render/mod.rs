//! Turns layouts into ordered draw instructions and paces them.

mod instructions;
mod sequencer;
mod svg;

pub use instructions::{
    DrawInstruction, FillKind, Surface, path_instructions, ring_instructions, tree_instructions,
};
pub use sequencer::{Cue, CueAction, Pacing, RenderPlan, RenderSequencer};
pub use svg::write_svg;

use crate::capture::Capture;
use crate::config::RadarConfig;
use crate::geo::GeocodeResolver;
use crate::graph::HopGraph;
use crate::layout::{PathParams, path_layout, radial_layout};

/// Render cycle for the merged hop tree rooted at `root`.
pub fn plan_tree_cycle(
    graph: &HopGraph,
    root: &str,
    config: &RadarConfig,
    surface: &Surface,
) -> RenderPlan {
    let pacing = &config.pacing;
    let rings = ring_instructions(surface.center, config.tree_max_radius, config.tree_rings);
    let placed = radial_layout(graph, root, &config.radial_params(surface));
    let groups = tree_instructions(&placed, surface.marker_radius);

    RenderPlan::new()
        .rings(rings, pacing)
        .groups(groups, pacing.tree_start_ms, pacing.tree_step_ms)
        .finish()
}

/// Render cycle for one capture walked hop by hop, with its raw trace text.
pub fn plan_capture_cycle(
    capture: &Capture,
    config: &RadarConfig,
    surface: &Surface,
    geocoder: Option<&dyn GeocodeResolver>,
) -> RenderPlan {
    let pacing = &config.pacing;
    let hops = capture.filtered_hops();
    let rings = ring_instructions(surface.center, surface.max_radius, hops.len());
    let params = PathParams {
        center: surface.center,
        max_radius: surface.max_radius,
        angle: config.path_angle,
        origin: config.origin,
    };
    let points = path_layout(hops, &params, geocoder);
    let groups = path_instructions(&points, surface);

    RenderPlan::new()
        .rings(rings, pacing)
        .groups(groups, pacing.first_hop_ms, pacing.hop_step_ms)
        .trace_lines(&capture.raw_lines, pacing)
        .finish()
}

/// Configured root when the graph knows it, otherwise the first capture root.
pub fn tree_root<'a>(graph: &'a HopGraph, config: &'a RadarConfig) -> Option<&'a str> {
    config
        .root_address
        .as_deref()
        .filter(|address| graph.contains(address))
        .or_else(|| graph.roots().first().copied())
}
