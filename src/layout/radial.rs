use std::collections::HashSet;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::graph::HopGraph;

use super::{LayoutPoint, Point, ring_step};

/// Total fan-out of the first ring, in degrees. Deeper rings split it further.
const FAN_DEGREES: f64 = 30.0;

/// What a sibling's angular offset is added to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AngleMode {
    /// Every node is offset from the single root angle.
    #[default]
    FixedRoot,
    /// Every node is offset from its parent's final angle.
    Compounding,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RadialParams {
    pub center: Point,
    pub root_angle_deg: f64,
    pub ring_count: usize,
    pub max_radius: f64,
    pub angle_mode: AngleMode,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlacedNode {
    pub address: String,
    pub level: usize,
    pub sibling_index: usize,
    pub point: LayoutPoint,
    /// Where the edge into this node starts; the center for the root.
    pub parent_position: Point,
}

/// Angular offset in degrees of the `index`-th sibling on ring `level`:
/// the first child sits one piece clockwise, odd children swing
/// counter-clockwise and even children clockwise, each further out.
pub fn sibling_offset(level: usize, index: usize) -> f64 {
    let piece = FAN_DEGREES / (level as f64 + 1.0);
    if index == 0 {
        piece
    } else if index % 2 == 0 {
        piece * (index as f64 + 1.0)
    } else {
        -piece * index as f64
    }
}

struct Frame<'a> {
    address: &'a str,
    level: usize,
    sibling_index: usize,
    parent_angle_deg: f64,
    parent_position: Point,
}

/// Places every node reachable from `root` in depth-first pre-order. A node is
/// placed at most once per call; descent stops at `node_count` levels.
pub fn radial_layout(graph: &HopGraph, root: &str, params: &RadialParams) -> Vec<PlacedNode> {
    let Some((root_key, _)) = graph.nodes.get_key_value(root) else {
        debug!(root, "layout root not in graph");
        return Vec::new();
    };

    let increase = ring_step(params.max_radius, params.ring_count);
    let depth_limit = graph.node_count();
    let mut visited = HashSet::with_capacity(graph.node_count());
    let mut placed = Vec::with_capacity(graph.node_count());
    let mut capped = false;

    let mut stack = vec![Frame {
        address: root_key.as_str(),
        level: 0,
        sibling_index: 0,
        parent_angle_deg: params.root_angle_deg,
        parent_position: params.center,
    }];

    while let Some(frame) = stack.pop() {
        if frame.level >= depth_limit {
            capped = true;
            continue;
        }
        if !visited.insert(frame.address) {
            continue;
        }

        let base = match params.angle_mode {
            AngleMode::FixedRoot => params.root_angle_deg,
            AngleMode::Compounding => frame.parent_angle_deg,
        };
        let angle_deg = base + sibling_offset(frame.level, frame.sibling_index);
        let radius = frame.level as f64 * increase;
        let point = LayoutPoint::from_polar(params.center, radius, angle_deg);

        placed.push(PlacedNode {
            address: frame.address.to_owned(),
            level: frame.level,
            sibling_index: frame.sibling_index,
            point,
            parent_position: frame.parent_position,
        });

        let Some(node) = graph.get(frame.address) else {
            continue;
        };

        // Reversed so the first branch is popped, and therefore placed, first.
        for (index, child) in node.branches.iter().enumerate().rev() {
            stack.push(Frame {
                address: child.as_str(),
                level: frame.level + 1,
                sibling_index: index,
                parent_angle_deg: angle_deg,
                parent_position: point.position,
            });
        }
    }

    if capped {
        warn!(root, depth_limit, "radial layout hit the depth cap");
    }

    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::Capture;
    use crate::graph::build_graph;

    fn params(angle_mode: AngleMode) -> RadialParams {
        RadialParams {
            center: Point::new(650.0, 540.0),
            root_angle_deg: 76.0,
            ring_count: 17,
            max_radius: 350.0,
            angle_mode,
        }
    }

    fn capture(id: &str, hops: &[&str]) -> Capture {
        let lines = hops.iter().map(|hop| format!("1: {hop} (1ms)")).collect();
        Capture::new(id, lines, Vec::new())
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn fan_graph() -> HopGraph {
        build_graph(&[
            capture("1", &["10.1.10.1", "72.14.1.1", "8.8.8.8"]),
            capture("2", &["10.1.10.1", "64.233.1.1"]),
            capture("3", &["10.1.10.1", "72.14.1.1", "1.1.1.1"]),
            capture("4", &["10.1.10.1", "151.101.1.1"]),
            capture("5", &["10.1.10.1", "104.16.1.1"]),
        ])
    }

    #[test]
    fn sibling_offsets_on_first_ring() {
        let piece = 30.0;
        assert!(close(sibling_offset(0, 0), piece));
        assert!(close(sibling_offset(0, 1), -piece));
        assert!(close(sibling_offset(0, 2), piece * 3.0));
        assert!(close(sibling_offset(0, 3), -piece * 3.0));
        assert!(close(sibling_offset(0, 4), piece * 5.0));
    }

    #[test]
    fn sibling_offsets_on_third_ring() {
        let piece = 10.0;
        assert!(close(sibling_offset(2, 0), piece));
        assert!(close(sibling_offset(2, 1), -piece));
        assert!(close(sibling_offset(2, 2), piece * 3.0));
        assert!(close(sibling_offset(2, 3), -piece * 3.0));
        assert!(close(sibling_offset(2, 4), piece * 5.0));
    }

    #[test]
    fn pre_order_places_parents_first() {
        let graph = fan_graph();
        let placed = radial_layout(&graph, "10.1.10.1", &params(AngleMode::FixedRoot));

        let order = placed.iter().map(|node| node.address.as_str()).collect::<Vec<_>>();
        assert_eq!(
            order,
            vec![
                "10.1.10.1",
                "72.14.1.1",
                "8.8.8.8",
                "1.1.1.1",
                "64.233.1.1",
                "151.101.1.1",
                "104.16.1.1",
            ]
        );
        assert_eq!(placed.len(), graph.node_count());
    }

    #[test]
    fn radius_grows_with_depth_and_is_never_negative() {
        let graph = fan_graph();
        let placed = radial_layout(&graph, "10.1.10.1", &params(AngleMode::FixedRoot));
        let step = 350.0 / 17.0;

        for node in &placed {
            assert!(node.point.radius >= 0.0);
            assert!(close(node.point.radius, node.level as f64 * step));
        }

        let root = &placed[0];
        assert!(close(root.point.radius, 0.0));
        assert_eq!(root.parent_position, Point::new(650.0, 540.0));
    }

    #[test]
    fn fixed_root_mode_offsets_from_root_angle() {
        let graph = fan_graph();
        let placed = radial_layout(&graph, "10.1.10.1", &params(AngleMode::FixedRoot));
        let by_address = |address: &str| {
            placed
                .iter()
                .find(|node| node.address == address)
                .expect("node placed")
        };

        // 1.1.1.1 is the second child of 72.14.1.1 on ring 2.
        let leaf = by_address("1.1.1.1");
        assert_eq!((leaf.level, leaf.sibling_index), (2, 1));
        assert!(close(leaf.point.angle_deg(), 76.0 + sibling_offset(2, 1)));

        let hop = by_address("151.101.1.1");
        assert_eq!((hop.level, hop.sibling_index), (1, 2));
        assert!(close(hop.point.angle_deg(), 76.0 + sibling_offset(1, 2)));
    }

    #[test]
    fn compounding_mode_offsets_from_parent_angle() {
        let graph = fan_graph();
        let placed = radial_layout(&graph, "10.1.10.1", &params(AngleMode::Compounding));
        let by_address = |address: &str| {
            placed
                .iter()
                .find(|node| node.address == address)
                .expect("node placed")
        };

        let root_angle = 76.0 + sibling_offset(0, 0);
        let parent_angle = root_angle + sibling_offset(1, 0);
        let leaf = by_address("1.1.1.1");
        assert!(close(leaf.point.angle_deg(), parent_angle + sibling_offset(2, 1)));

        let parent = by_address("72.14.1.1");
        assert_eq!(leaf.parent_position, parent.point.position);
    }

    #[test]
    fn convergent_parents_place_child_once() {
        let graph = build_graph(&[
            capture("1", &["10.0.0.1", "10.0.0.2", "10.0.0.9"]),
            capture("2", &["10.0.0.1", "10.0.0.3", "10.0.0.9"]),
        ]);
        let placed = radial_layout(&graph, "10.0.0.1", &params(AngleMode::FixedRoot));

        let hits = placed.iter().filter(|node| node.address == "10.0.0.9").count();
        assert_eq!(hits, 1);
        assert_eq!(placed.len(), 4);
    }

    #[test]
    fn cycles_terminate() {
        let graph = build_graph(&[capture("1", &["1.1.1.1", "2.2.2.2", "1.1.1.1", "3.3.3.3"])]);
        let placed = radial_layout(&graph, "1.1.1.1", &params(AngleMode::FixedRoot));

        let order = placed.iter().map(|node| node.address.as_str()).collect::<Vec<_>>();
        assert_eq!(order, vec!["1.1.1.1", "2.2.2.2", "3.3.3.3"]);
    }

    #[test]
    fn unknown_root_places_nothing() {
        let graph = fan_graph();
        assert!(radial_layout(&graph, "192.0.2.1", &params(AngleMode::FixedRoot)).is_empty());
    }

    #[test]
    fn layout_is_deterministic() {
        let graph = fan_graph();
        let first = radial_layout(&graph, "10.1.10.1", &params(AngleMode::FixedRoot));
        let second = radial_layout(&graph, "10.1.10.1", &params(AngleMode::FixedRoot));
        assert_eq!(first, second);
    }
}
