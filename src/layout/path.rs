use serde::Deserialize;
use tracing::debug;

use crate::capture::HopRecord;
use crate::geo::{GeoPoint, GeocodeResolver, compute_heading, heading_angle};
use crate::util::address_digest;

use super::{LayoutPoint, Point, ring_step};

/// How a path hop picks its angle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathAngle {
    /// Octet sum of the hop's own address, mod 360.
    #[default]
    AddressDigest,
    /// Bearing from the hop's geocoded location to the origin (or the previous
    /// hop). Unresolvable locations fall back to 0.
    Heading,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathParams {
    pub center: Point,
    pub max_radius: f64,
    pub angle: PathAngle,
    pub origin: Option<GeoPoint>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PathPoint {
    pub level: usize,
    /// Row index of the hop in the capture table.
    pub row_index: usize,
    pub address: String,
    pub label: String,
    pub point: LayoutPoint,
    /// Start of the connecting line; `None` for the first hop.
    pub previous: Option<Point>,
    pub is_destination: bool,
}

#[derive(Default)]
struct Walk {
    points: Vec<PathPoint>,
    previous: Option<Point>,
    previous_location: Option<GeoPoint>,
}

/// Lays one capture's filtered hops out on a straight walk from the center,
/// one ring per hop.
pub fn path_layout(
    hops: &[HopRecord],
    params: &PathParams,
    geocoder: Option<&dyn GeocodeResolver>,
) -> Vec<PathPoint> {
    let increase = ring_step(params.max_radius, hops.len());
    let last = hops.len().saturating_sub(1);

    let walk = hops.iter().enumerate().fold(Walk::default(), |mut walk, (level, hop)| {
        let address = hop.address().unwrap_or_default();

        let angle_deg = match params.angle {
            PathAngle::AddressDigest => address_digest(address),
            PathAngle::Heading => {
                let location = geocoder.and_then(|resolver| {
                    resolver
                        .resolve(&hop.location_text())
                        .map_err(|error| debug!(address, "geocode failed: {error:#}"))
                        .ok()
                });
                let reference = params.origin.or(walk.previous_location);
                let heading = location
                    .zip(reference)
                    .map(|(current, reference)| compute_heading(current, reference));
                walk.previous_location = location;
                heading_angle(heading)
            }
        };

        let point = LayoutPoint::from_polar(params.center, level as f64 * increase, angle_deg);
        let label = if level == 0 {
            hop.root_label()
        } else {
            hop.hop_label()
        };

        walk.points.push(PathPoint {
            level,
            row_index: hop.index,
            address: address.to_owned(),
            label,
            point,
            previous: if level == 0 { None } else { walk.previous },
            is_destination: level == last,
        });
        walk.previous = Some(point.position);
        walk
    });

    walk.points
}
