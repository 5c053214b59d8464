use std::collections::HashSet;

use crate::layout::{PathPoint, PlacedNode, Point, ring_step};
use crate::util::node_key;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FillKind {
    /// Node of the merged hop tree.
    Tree,
    /// Intermediate hop of a single capture.
    Hop,
    /// Final hop of a single capture.
    Destination,
}

impl FillKind {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            Self::Tree => [0xaa, 0xff, 0x56],
            Self::Hop => [0xaa, 0x22, 0x22],
            Self::Destination => [0x77, 0xcc, 0x98],
        }
    }

    pub fn hex(self) -> String {
        let [r, g, b] = self.rgb();
        format!("#{r:02x}{g:02x}{b:02x}")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum DrawInstruction {
    Ring {
        center: Point,
        radius: f64,
    },
    PlaceNode {
        id: String,
        position: Point,
        radius: f64,
        fill: FillKind,
        label: String,
    },
    Connect {
        from: Point,
        to: Point,
    },
}

/// Geometry of a drawing target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
    pub center: Point,
    pub max_radius: f64,
    pub marker_radius: f64,
    pub destination_radius: f64,
    pub font_size: f64,
    pub stroke_width: f64,
}

impl Surface {
    pub const SCREEN: Self = Self {
        width: 1300.0,
        height: 1080.0,
        center: Point::new(650.0, 540.0),
        max_radius: 350.0,
        marker_radius: 3.0,
        destination_radius: 5.0,
        font_size: 8.0,
        stroke_width: 1.0,
    };

    pub const PRINT: Self = Self {
        width: 7680.0,
        height: 4320.0,
        center: Point::new(3840.0, 2160.0),
        max_radius: 2160.0,
        marker_radius: 12.0,
        destination_radius: 18.0,
        font_size: 40.0,
        stroke_width: 2.0,
    };
}

/// `count` concentric rings, the first at radius 1.
pub fn ring_instructions(center: Point, max_radius: f64, count: usize) -> Vec<DrawInstruction> {
    let increase = ring_step(max_radius, count);
    (0..count)
        .map(|ring| DrawInstruction::Ring {
            center,
            radius: 1.0 + ring as f64 * increase,
        })
        .collect()
}

/// One `[PlaceNode, Connect]` group per distinct tree node, in placement order.
pub fn tree_instructions(placed: &[PlacedNode], marker_radius: f64) -> Vec<Vec<DrawInstruction>> {
    let mut drawn = HashSet::with_capacity(placed.len());
    placed
        .iter()
        .filter_map(|node| {
            let id = node_key(&node.address);
            if !drawn.insert(id.clone()) {
                return None;
            }
            Some(vec![
                DrawInstruction::PlaceNode {
                    id,
                    position: node.point.position,
                    radius: marker_radius,
                    fill: FillKind::Tree,
                    label: node.address.clone(),
                },
                DrawInstruction::Connect {
                    from: node.parent_position,
                    to: node.point.position,
                },
            ])
        })
        .collect()
}

/// One group per hop of a capture path: its marker and the line from the
/// previous hop.
pub fn path_instructions(points: &[PathPoint], surface: &Surface) -> Vec<Vec<DrawInstruction>> {
    points
        .iter()
        .map(|point| {
            let (radius, fill) = if point.is_destination {
                (surface.destination_radius, FillKind::Destination)
            } else {
                (surface.marker_radius, FillKind::Hop)
            };

            let mut group = vec![DrawInstruction::PlaceNode {
                id: format!("ip-{}", point.address),
                position: point.point.position,
                radius,
                fill,
                label: point.label.clone(),
            }];
            if let Some(previous) = point.previous {
                group.push(DrawInstruction::Connect {
                    from: previous,
                    to: point.point.position,
                });
            }
            group
        })
        .collect()
}
