//! In-memory [`TopologyStore`] over a loaded [`Dataset`].
//!
//! Coordinates are projected to Web-Mercator metres on construction, so the
//! neighborhood radius and all geometry predicates work in metres.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use anyhow::Result;
use transnet_core::{
    have_common_voltage, parse_power, tokens, Area, GeoPoint, GeometryService, Line, LineId,
    LineKind, LineString, NodeId, PlanarGeometry, Point, RelationId, Station, StationId,
    StationKind, TokenPolicy, TopologyStore, TransnetError, TransnetResult,
};

use crate::dataset::{load_dataset, Dataset, NodeRecord, RelationRecord, WayRecord};
use crate::diagnostics::IngestDiagnostics;

/// Minimum node count of a closed station ring (three corners plus closure).
const MIN_RING_NODES: usize = 4;

/// What a way's `power` tag makes of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Feature {
    Substation(StationKind),
    Plant(StationKind),
    Line(LineKind),
}

impl Feature {
    fn classify(power: Option<&str>) -> Option<Self> {
        let power = power?;
        if let Some(kind) = LineKind::from_tag(power) {
            return Some(Feature::Line(kind));
        }
        let kind = StationKind::from_tag(power)?;
        if kind.is_generation() {
            Some(Feature::Plant(kind))
        } else {
            Some(Feature::Substation(kind))
        }
    }

    fn category(&self) -> &'static str {
        match self {
            Feature::Substation(_) => "station",
            Feature::Plant(_) => "plant",
            Feature::Line(_) => "line",
        }
    }
}

pub struct MemoryStore {
    points: HashMap<i64, Point>,
    /// Ascending by id
    ways: Vec<WayRecord>,
    /// Tagged nodes that may be point plants, ascending by id
    tagged_nodes: Vec<NodeRecord>,
    relations: BTreeMap<i64, RelationRecord>,
    geometry: PlanarGeometry,
}

impl MemoryStore {
    pub fn new(dataset: Dataset) -> Self {
        let points = dataset
            .nodes
            .iter()
            .map(|n| (n.id, GeoPoint::new(n.lat, n.lon).to_mercator()))
            .collect();
        let mut tagged_nodes: Vec<NodeRecord> = dataset
            .nodes
            .into_iter()
            .filter(|n| !n.tags.is_empty())
            .collect();
        tagged_nodes.sort_by_key(|n| n.id);
        let mut ways = dataset.ways;
        ways.sort_by_key(|w| w.id);
        let relations = dataset.relations.into_iter().map(|r| (r.id, r)).collect();
        Self {
            points,
            ways,
            tagged_nodes,
            relations,
            geometry: PlanarGeometry,
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(load_dataset(path)?))
    }

    /// Projected position of a node.
    pub fn node_point(&self, node: NodeId) -> Option<Point> {
        self.points.get(&node.value()).copied()
    }

    pub fn geometry(&self) -> &PlanarGeometry {
        &self.geometry
    }

    /// Feature counts and every way the loaders drop or degrade.
    pub fn diagnose(&self, voltage_classes: &[String]) -> IngestDiagnostics {
        let mut diag = IngestDiagnostics::new();
        diag.stats.nodes = self.points.len();
        diag.stats.ways = self.ways.len();
        diag.stats.relations = self.relations.len();

        for way in &self.ways {
            let Some(feature) = Feature::classify(way.tag("power")) else {
                continue;
            };
            let entity = format!("Way {}", way.id);
            match feature {
                Feature::Substation(kind) => {
                    if !in_voltage_classes(normalized_voltage(way).as_deref(), voltage_classes) {
                        continue;
                    }
                    match self.station_from_way(way, kind) {
                        Ok(_) => diag.stats.stations += 1,
                        Err(reason) => diag.add_error(feature.category(), &reason, &entity),
                    }
                }
                Feature::Plant(kind) => match self.station_from_way(way, kind) {
                    Ok(_) => diag.stats.plants += 1,
                    Err(reason) => diag.add_error(feature.category(), &reason, &entity),
                },
                Feature::Line(_) => {
                    if !in_voltage_classes(way.tag("voltage"), voltage_classes) {
                        continue;
                    }
                    if way.nodes.len() < 2 {
                        diag.add_error(feature.category(), "fewer than 2 nodes", &entity);
                        continue;
                    }
                    diag.stats.lines += 1;
                    for node in way.nodes.iter().filter(|id| !self.points.contains_key(id)) {
                        diag.add_warning(
                            feature.category(),
                            &format!("path skips unknown node {node}"),
                            &entity,
                        );
                    }
                    if let Some(cables) = way.tag("cables") {
                        if cables.trim().parse::<u32>().is_err() {
                            diag.add_warning(
                                feature.category(),
                                &format!("unparsable cables tag '{cables}'"),
                                &entity,
                            );
                        }
                    }
                }
            }
        }
        diag.stats.plants += self.point_plants().count();
        diag.stats.ground_truth_relations = self
            .relations
            .values()
            .filter(|r| in_voltage_classes(r.tag("voltage"), voltage_classes))
            .count();
        diag
    }

    fn station_from_way(&self, way: &WayRecord, kind: StationKind) -> Result<Station, String> {
        if way.nodes.len() < MIN_RING_NODES {
            return Err(format!(
                "ring has {} node(s), at least {} required",
                way.nodes.len(),
                MIN_RING_NODES
            ));
        }
        if !way.is_closed() {
            return Err("ring is not closed".to_string());
        }
        let ring = way
            .nodes
            .iter()
            .map(|id| {
                self.points
                    .get(id)
                    .copied()
                    .ok_or_else(|| format!("ring references unknown node {id}"))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut station = Station::new(StationId::new(way.id), Area::Polygon(ring), kind)
            .with_name(way.tag("name").map(str::to_string))
            .with_reference(way.tag("ref").map(str::to_string))
            .with_voltage(normalized_voltage(way))
            .with_nodes(way.nodes.iter().copied().map(NodeId::new).collect());
        if kind.is_generation() {
            let output = way
                .tag("plant:output:electricity")
                .or_else(|| way.tag("generator:output:electricity"));
            station = station.with_nominal_power(parse_power(output));
        }
        Ok(station)
    }

    fn point_plants(&self) -> impl Iterator<Item = (&NodeRecord, StationKind)> + '_ {
        self.tagged_nodes.iter().filter_map(|node| {
            let power = node.tags.get("power")?;
            let kind = StationKind::from_tag(power).filter(StationKind::is_generation)?;
            Some((node, kind))
        })
    }

    fn ways_of<'s>(
        &'s self,
        wanted: impl Fn(Feature) -> bool + 's,
    ) -> impl Iterator<Item = (&'s WayRecord, Feature)> + 's {
        self.ways.iter().filter_map(move |way| {
            let feature = Feature::classify(way.tag("power"))?;
            wanted(feature).then_some((way, feature))
        })
    }
}

impl TopologyStore for MemoryStore {
    fn load_stations(&self, voltage_classes: &[String]) -> TransnetResult<Vec<Station>> {
        Ok(self
            .ways_of(|f| matches!(f, Feature::Substation(_)))
            .filter(|(way, _)| in_voltage_classes(normalized_voltage(way).as_deref(), voltage_classes))
            .filter_map(|(way, feature)| match feature {
                Feature::Substation(kind) => self.station_from_way(way, kind).ok(),
                _ => None,
            })
            .collect())
    }

    fn load_plants(&self) -> TransnetResult<Vec<Station>> {
        let mut plants: Vec<Station> = self
            .ways_of(|f| matches!(f, Feature::Plant(_)))
            .filter_map(|(way, feature)| match feature {
                Feature::Plant(kind) => self.station_from_way(way, kind).ok(),
                _ => None,
            })
            .collect();

        for (node, kind) in self.point_plants() {
            let Some(point) = self.points.get(&node.id).copied() else {
                continue;
            };
            let tag = |key: &str| node.tags.get(key).cloned();
            let output = node
                .tags
                .get("plant:output:electricity")
                .or_else(|| node.tags.get("generator:output:electricity"))
                .map(String::as_str);
            plants.push(
                Station::new(StationId::new(node.id), Area::Point(point), kind)
                    .with_name(tag("name"))
                    .with_reference(tag("ref"))
                    .with_voltage(tag("voltage").map(|v| v.replace(',', ";")))
                    .with_nominal_power(parse_power(output)),
            );
        }
        Ok(plants)
    }

    fn load_lines(&self, voltage_classes: &[String]) -> TransnetResult<Vec<Line>> {
        Ok(self
            .ways_of(|f| matches!(f, Feature::Line(_)))
            .filter(|(way, _)| {
                in_voltage_classes(normalized_voltage(way).as_deref(), voltage_classes)
            })
            .filter(|(way, _)| way.nodes.len() >= 2)
            .filter_map(|(way, feature)| {
                let Feature::Line(kind) = feature else {
                    return None;
                };
                let path = way
                    .nodes
                    .iter()
                    .filter_map(|id| self.points.get(id).copied())
                    .collect();
                let cables = way.tag("cables").and_then(|c| c.trim().parse().ok());
                Some(
                    Line::new(
                        LineId::new(way.id),
                        way.nodes.iter().copied().map(NodeId::new).collect(),
                        LineString::new(path),
                        kind,
                    )
                    .with_voltage(normalized_voltage(way))
                    .with_name(way.tag("name").map(str::to_string))
                    .with_reference(way.tag("ref").map(str::to_string))
                    .with_cables(cables),
                )
            })
            .collect())
    }

    fn find_containing_station(
        &self,
        node: NodeId,
        candidates: &[&Station],
        voltage: Option<&str>,
    ) -> TransnetResult<Option<StationId>> {
        let point = self
            .node_point(node)
            .ok_or_else(|| TransnetError::Lookup(format!("unknown node {}", node)))?;
        Ok(candidates
            .iter()
            .find(|station| {
                have_common_voltage(voltage, station.voltage())
                    && self.geometry.contains(&point, &station.area)
            })
            .map(|station| station.id))
    }

    fn ground_truth_relations(
        &self,
        station: StationId,
        voltage_classes: &[String],
    ) -> TransnetResult<Vec<RelationId>> {
        Ok(self
            .relations
            .values()
            .filter(|r| r.members.contains(&station.value()))
            .filter(|r| in_voltage_classes(r.tag("voltage"), voltage_classes))
            .map(|r| RelationId::new(r.id))
            .collect())
    }

    fn ground_truth_relation_members(
        &self,
        relation: RelationId,
    ) -> TransnetResult<BTreeSet<i64>> {
        self.relations
            .get(&relation.value())
            .map(|r| r.members.iter().copied().collect())
            .ok_or_else(|| TransnetError::Lookup(format!("unknown relation {}", relation)))
    }
}

/// Voltages are sometimes comma-separated.
fn normalized_voltage(way: &WayRecord) -> Option<String> {
    way.tag("voltage").map(|v| v.replace(',', ";"))
}

fn in_voltage_classes(voltage: Option<&str>, voltage_classes: &[String]) -> bool {
    voltage.is_some_and(|v| {
        tokens(v, TokenPolicy::Semicolon).any(|t| voltage_classes.iter().any(|c| c == t))
    })
}
