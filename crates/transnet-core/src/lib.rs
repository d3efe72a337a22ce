//! # transnet-core: Power Topology Domain Model
//!
//! Provides the entities and predicates used to reconstruct electrical circuits from a
//! crowd-sourced graph of power-infrastructure features (OpenStreetMap-style nodes, ways
//! and tags).
//!
//! ## Design Philosophy
//!
//! The raw data is a flat collection of geometric features:
//! - **Stations**: substations, plants and generators (closed rings or single points)
//! - **Lines**: power lines and cables referencing an ordered list of graph nodes
//!
//! Circuits are not present in the data. They are inferred by tracing lines from one
//! station to another, and the result of such a trace is a [`Relation`]. Accepted
//! relations become [`Circuit`]s.
//!
//! Everything the inference needs from the outside world sits behind two traits:
//! - [`GeometryService`]: point containment, line crossing and centroid distance
//! - [`TopologyStore`]: feature loading, containment lookups and ground-truth queries
//!
//! ## Quick Start
//!
//! ```rust
//! use transnet_core::*;
//!
//! let ring = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(10.0, 0.0),
//!     Point::new(10.0, 10.0),
//!     Point::new(0.0, 10.0),
//!     Point::new(0.0, 0.0),
//! ];
//! let station = Station::new(StationId::new(1), Area::Polygon(ring), StationKind::Substation)
//!     .with_voltage(Some("110000;220000".to_string()));
//!
//! let mut topology = Topology::new();
//! topology.insert_station(station);
//! assert_eq!(topology.station_count(), 1);
//! ```
//!
//! ## ID System
//!
//! Every element carries a newtype ID wrapping the source feature id (`i64`, as in OSM):
//! [`StationId`], [`LineId`], [`NodeId`] and [`RelationId`]. Stations and lines both
//! originate from ways, so their raw ids share one namespace and can be compared with
//! ground-truth relation member lists.
//!
//! ## Modules
//!
//! - [`geometry`] - Planar geometry primitives and the [`GeometryService`] seam
//! - [`tags`] - Voltage / reference matching and tag value parsing
//! - [`model`] - Station, Line, Relation and Circuit
//! - [`topology`] - The owned entity repository and the external store/sink traits
//! - [`graph_utils`] - Circuit graph statistics and Graphviz export

use serde::{Deserialize, Serialize};

pub mod error;
pub mod geometry;
pub mod graph_utils;
pub mod model;
pub mod tags;
pub mod topology;
pub mod units;

pub use error::{TransnetError, TransnetResult};
pub use geometry::{Area, GeoPoint, GeometryService, LineString, PlanarGeometry, Point};
pub use graph_utils::*;
pub use model::{Circuit, Line, LineKind, Member, Relation, Station, StationKind};
pub use tags::{
    continuation_matches, have_common_voltage, parse_power, ref_matches, tokens, TokenPolicy,
};
pub use topology::{CircuitSink, Topology, TopologyStore};
pub use units::Watts;

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StationId(i64);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(i64);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(i64);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(i64);

macro_rules! impl_feature_id {
    ($type:ident, $label:literal) => {
        impl $type {
            #[inline]
            pub fn new(value: i64) -> Self {
                $type(value)
            }
            #[inline]
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }
    };
}

impl_feature_id!(StationId, "Station");
impl_feature_id!(LineId, "Line");
impl_feature_id!(NodeId, "Node");
impl_feature_id!(RelationId, "Relation");
