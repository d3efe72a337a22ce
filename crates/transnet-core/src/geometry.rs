//! Planar geometry primitives and the [`GeometryService`] capability.
//!
//! The inference only ever asks three questions of geometry: is a node inside a
//! station area, does a line cross a station area, and how far apart are two
//! station centroids. Those questions form the [`GeometryService`] trait so a
//! spatial database or a full geometry library can answer them instead.
//! [`PlanarGeometry`] answers them directly on projected coordinates.
//!
//! Coordinates are Web-Mercator metres ([`Point`]); [`GeoPoint`] holds WGS84
//! degrees for reporting and converts in both directions.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Web-Mercator sphere radius in metres (EPSG:3857).
pub const MERCATOR_RADIUS: f64 = 6_378_137.0;

const EPSILON: f64 = 1e-9;

/// A projected point in metres.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn approx_eq(&self, other: &Point) -> bool {
        self.distance(other) <= EPSILON
    }

    /// Inverse Web-Mercator projection.
    pub fn to_geo(&self) -> GeoPoint {
        let lon = (self.x / MERCATOR_RADIUS).to_degrees();
        let lat = (2.0 * (self.y / MERCATOR_RADIUS).exp().atan() - PI / 2.0).to_degrees();
        GeoPoint { lat, lon }
    }
}

/// A WGS84 coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    #[inline]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Forward Web-Mercator projection.
    pub fn to_mercator(&self) -> Point {
        let x = MERCATOR_RADIUS * self.lon.to_radians();
        let y = MERCATOR_RADIUS * (PI / 4.0 + self.lat.to_radians() / 2.0).tan().ln();
        Point { x, y }
    }
}

/// An ordered path of points.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LineString(pub Vec<Point>);

impl LineString {
    pub fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[Point] {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = (&Point, &Point)> {
        self.0.windows(2).map(|w| (&w[0], &w[1]))
    }

    pub fn length(&self) -> f64 {
        self.segments().map(|(a, b)| a.distance(b)).sum()
    }
}

/// The footprint of a station: a closed ring for area features, a single
/// point for node features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Area {
    /// Closed ring; the first point is repeated at the end.
    Polygon(Vec<Point>),
    Point(Point),
}

impl Area {
    /// Area-weighted centroid for polygons, falling back to the vertex mean for
    /// degenerate rings.
    pub fn centroid(&self) -> Point {
        match self {
            Area::Point(p) => *p,
            Area::Polygon(ring) => polygon_centroid(ring),
        }
    }
}

fn polygon_centroid(ring: &[Point]) -> Point {
    if ring.is_empty() {
        return Point::default();
    }
    let mut twice_area = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for w in ring.windows(2) {
        let cross = w[0].x * w[1].y - w[1].x * w[0].y;
        twice_area += cross;
        cx += (w[0].x + w[1].x) * cross;
        cy += (w[0].y + w[1].y) * cross;
    }
    if twice_area.abs() <= EPSILON {
        let n = ring.len() as f64;
        return Point::new(
            ring.iter().map(|p| p.x).sum::<f64>() / n,
            ring.iter().map(|p| p.y).sum::<f64>() / n,
        );
    }
    Point::new(cx / (3.0 * twice_area), cy / (3.0 * twice_area))
}

/// Spatial predicates consumed by the inference.
pub trait GeometryService {
    /// Whether `point` lies in the interior of `area`. A point area contains only
    /// its own coordinate.
    fn contains(&self, point: &Point, area: &Area) -> bool;

    /// Whether `line` runs both through the interior and the exterior of `area`.
    fn crosses(&self, line: &LineString, area: &Area) -> bool;

    /// Distance between the centroids of two areas.
    fn centroid_distance(&self, a: &Area, b: &Area) -> f64 {
        a.centroid().distance(&b.centroid())
    }
}

/// Straightforward planar predicates on projected coordinates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    Inside,
    Boundary,
    Outside,
}

impl PlanarGeometry {
    fn locate(point: &Point, ring: &[Point]) -> Location {
        for w in ring.windows(2) {
            if on_segment(point, &w[0], &w[1]) {
                return Location::Boundary;
            }
        }
        // even-odd ray casting
        let mut inside = false;
        for w in ring.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            if (a.y > point.y) != (b.y > point.y) {
                let x_cross = a.x + (point.y - a.y) * (b.x - a.x) / (b.y - a.y);
                if point.x < x_cross {
                    inside = !inside;
                }
            }
        }
        if inside {
            Location::Inside
        } else {
            Location::Outside
        }
    }
}

impl GeometryService for PlanarGeometry {
    fn contains(&self, point: &Point, area: &Area) -> bool {
        match area {
            Area::Point(p) => p.approx_eq(point),
            Area::Polygon(ring) if ring.len() >= 4 => {
                Self::locate(point, ring) == Location::Inside
            }
            Area::Polygon(_) => false,
        }
    }

    fn crosses(&self, line: &LineString, area: &Area) -> bool {
        let ring = match area {
            Area::Polygon(ring) if ring.len() >= 4 => ring,
            _ => return false,
        };
        let points = line.points();
        if points.len() < 2 {
            return false;
        }

        // Probe vertices and segment midpoints; a line crosses when it has
        // probes strictly on both sides of the boundary.
        let mut inside = false;
        let mut outside = false;
        let midpoints = line
            .segments()
            .map(|(a, b)| Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0));
        for probe in points.iter().copied().chain(midpoints) {
            match Self::locate(&probe, ring) {
                Location::Inside => inside = true,
                Location::Outside => outside = true,
                Location::Boundary => {}
            }
            if inside && outside {
                return true;
            }
        }

        // A segment can pass straight through a narrow ring between probes.
        line.segments().any(|(a, b)| {
            ring.windows(2)
                .any(|edge| segments_properly_intersect(a, b, &edge[0], &edge[1]))
        })
    }
}

fn orientation(a: &Point, b: &Point, c: &Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn on_segment(p: &Point, a: &Point, b: &Point) -> bool {
    orientation(a, b, p).abs() <= EPSILON
        && p.x >= a.x.min(b.x) - EPSILON
        && p.x <= a.x.max(b.x) + EPSILON
        && p.y >= a.y.min(b.y) - EPSILON
        && p.y <= a.y.max(b.y) + EPSILON
}

fn segments_properly_intersect(p1: &Point, p2: &Point, q1: &Point, q2: &Point) -> bool {
    let d1 = orientation(q1, q2, p1);
    let d2 = orientation(q1, q2, p2);
    let d3 = orientation(p1, p2, q1);
    let d4 = orientation(p1, p2, q2);
    d1 * d2 < 0.0 && d3 * d4 < 0.0
}
