//! The owned entity repository and the traits at the system boundary.
//!
//! [`Topology`] holds every loaded station and line keyed by id. Both maps are
//! ordered, so iteration is ascending by id and traversals that take the first
//! matching line are deterministic. A topology is passed explicitly to the
//! inference; independent runs (or tests) simply use independent topologies.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::error::TransnetResult;
use crate::geometry::GeometryService;
use crate::model::{Circuit, Line, Station};
use crate::{LineId, NodeId, RelationId, StationId};

/// Source of features and ground truth.
///
/// Implementations apply the domain filters when loading (voltage class
/// membership, closed rings, minimum node counts). Lookups that find nothing
/// return `Ok(None)` / empty collections; `Err` is reserved for the store itself
/// failing.
pub trait TopologyStore {
    /// Substations whose voltage intersects `voltage_classes`.
    fn load_stations(&self, voltage_classes: &[String]) -> TransnetResult<Vec<Station>>;

    /// Power plants and generators, area and point features alike.
    fn load_plants(&self) -> TransnetResult<Vec<Station>>;

    /// Lines and cables whose voltage intersects `voltage_classes`.
    fn load_lines(&self, voltage_classes: &[String]) -> TransnetResult<Vec<Line>>;

    /// The first of `candidates` whose area contains `node` at a voltage common
    /// with `voltage`.
    fn find_containing_station(
        &self,
        node: NodeId,
        candidates: &[&Station],
        voltage: Option<&str>,
    ) -> TransnetResult<Option<StationId>>;

    /// Ground-truth relations that have `station` as a member and a voltage in
    /// `voltage_classes`.
    fn ground_truth_relations(
        &self,
        station: StationId,
        voltage_classes: &[String],
    ) -> TransnetResult<Vec<RelationId>>;

    /// Raw member ids of a ground-truth relation.
    fn ground_truth_relation_members(&self, relation: RelationId)
        -> TransnetResult<BTreeSet<i64>>;
}

/// Downstream consumer of accepted circuits.
pub trait CircuitSink {
    /// Write `circuits` to `destination` once, preserving their order.
    fn publish(&self, circuits: &[Circuit], destination: &Path) -> TransnetResult<()>;
}

/// Stations and lines of one inference run.
#[derive(Debug, Clone, Default)]
pub struct Topology {
    stations: BTreeMap<StationId, Station>,
    lines: BTreeMap<LineId, Line>,
}

impl Topology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        stations: impl IntoIterator<Item = Station>,
        lines: impl IntoIterator<Item = Line>,
    ) -> Self {
        let mut topology = Self::new();
        for station in stations {
            topology.insert_station(station);
        }
        for line in lines {
            topology.insert_line(line);
        }
        topology
    }

    /// Load substations, plants and lines from `store`. A plant sharing an id
    /// with a substation replaces it.
    pub fn load<S: TopologyStore + ?Sized>(
        store: &S,
        voltage_classes: &[String],
    ) -> TransnetResult<Self> {
        let stations = store.load_stations(voltage_classes)?;
        let plants = store.load_plants()?;
        let lines = store.load_lines(voltage_classes)?;
        Ok(Self::from_parts(stations.into_iter().chain(plants), lines))
    }

    pub fn insert_station(&mut self, station: Station) -> Option<Station> {
        self.stations.insert(station.id, station)
    }

    pub fn insert_line(&mut self, line: Line) -> Option<Line> {
        self.lines.insert(line.id, line)
    }

    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.get(&id)
    }

    pub fn station_mut(&mut self, id: StationId) -> Option<&mut Station> {
        self.stations.get_mut(&id)
    }

    pub fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(&id)
    }

    /// Stations in ascending id order.
    pub fn stations(&self) -> impl Iterator<Item = &Station> {
        self.stations.values()
    }

    /// Lines in ascending id order.
    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.lines.values()
    }

    pub fn station_ids(&self) -> Vec<StationId> {
        self.stations.keys().copied().collect()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Stations whose centroid lies within `radius` of the centroid of `seed`,
    /// the seed itself included.
    pub fn neighborhood<G: GeometryService + ?Sized>(
        &self,
        seed: StationId,
        radius: f64,
        geometry: &G,
    ) -> Vec<StationId> {
        let Some(origin) = self.stations.get(&seed) else {
            return Vec::new();
        };
        self.stations
            .values()
            .filter(|candidate| {
                candidate.id == seed
                    || geometry.centroid_distance(&origin.area, &candidate.area) <= radius
            })
            .map(|candidate| candidate.id)
            .collect()
    }

    /// Resolve ids to station references, skipping unknown ids.
    pub fn station_refs(&self, ids: &[StationId]) -> Vec<&Station> {
        ids.iter().filter_map(|id| self.stations.get(id)).collect()
    }

    /// Ids of lines that have `node` among their nodes, ascending.
    pub fn lines_at_node(&self, node: NodeId) -> Vec<LineId> {
        self.lines
            .values()
            .filter(|line| line.contains_node(node))
            .map(|line| line.id)
            .collect()
    }

    /// Forget all covered-line bookkeeping.
    pub fn reset_coverage(&mut self) {
        for station in self.stations.values_mut() {
            station.covered_line_ids.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Area, LineString, PlanarGeometry, Point};
    use crate::model::{LineKind, StationKind};

    fn point_station(id: i64, x: f64, y: f64) -> Station {
        Station::new(
            StationId::new(id),
            Area::Point(Point::new(x, y)),
            StationKind::Generator,
        )
    }

    fn line(id: i64, nodes: &[i64]) -> Line {
        Line::new(
            LineId::new(id),
            nodes.iter().copied().map(NodeId::new).collect(),
            LineString::default(),
            LineKind::Line,
        )
    }

    #[test]
    fn test_neighborhood_measures_from_seed() {
        let topology = Topology::from_parts(
            vec![
                point_station(1, 0.0, 0.0),
                point_station(2, 1000.0, 0.0),
                point_station(3, 500_000.0, 0.0),
            ],
            Vec::new(),
        );
        let near = topology.neighborhood(StationId::new(1), 300_000.0, &PlanarGeometry);
        assert_eq!(near, vec![StationId::new(1), StationId::new(2)]);

        let from_far = topology.neighborhood(StationId::new(3), 300_000.0, &PlanarGeometry);
        assert_eq!(from_far, vec![StationId::new(3)]);

        assert!(topology
            .neighborhood(StationId::new(99), 300_000.0, &PlanarGeometry)
            .is_empty());
    }

    #[test]
    fn test_lines_iterate_in_id_order() {
        let topology = Topology::from_parts(
            Vec::new(),
            vec![line(30, &[1, 2]), line(10, &[2, 3]), line(20, &[2, 4])],
        );
        let ids: Vec<_> = topology.lines().map(|l| l.id.value()).collect();
        assert_eq!(ids, vec![10, 20, 30]);
        assert_eq!(
            topology.lines_at_node(NodeId::new(2)),
            vec![LineId::new(10), LineId::new(20), LineId::new(30)]
        );
        assert_eq!(topology.lines_at_node(NodeId::new(4)), vec![LineId::new(20)]);
    }

    #[test]
    fn test_reset_coverage() {
        let mut topology = Topology::from_parts(vec![point_station(1, 0.0, 0.0)], Vec::new());
        topology
            .station_mut(StationId::new(1))
            .unwrap()
            .cover_line(LineId::new(4));
        topology.reset_coverage();
        assert!(!topology
            .station(StationId::new(1))
            .unwrap()
            .has_covered(LineId::new(4)));
    }
}
