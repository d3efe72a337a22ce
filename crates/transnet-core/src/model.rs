//! Domain entities: stations, lines, candidate relations and accepted circuits.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::geometry::{Area, GeoPoint, LineString};
use crate::units::Watts;
use crate::{LineId, NodeId, RelationId, StationId};

/// Feature type of a station, from its `power` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    Station,
    Substation,
    Plant,
    Generator,
}

impl StationKind {
    /// Map a `power` tag value. `sub_station` is a common misspelling of
    /// `substation` and is accepted.
    pub fn from_tag(value: &str) -> Option<Self> {
        match value.trim() {
            "station" => Some(StationKind::Station),
            "substation" | "sub_station" => Some(StationKind::Substation),
            "plant" => Some(StationKind::Plant),
            "generator" => Some(StationKind::Generator),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            StationKind::Station => "station",
            StationKind::Substation => "substation",
            StationKind::Plant => "plant",
            StationKind::Generator => "generator",
        }
    }

    pub fn is_generation(&self) -> bool {
        matches!(self, StationKind::Plant | StationKind::Generator)
    }
}

/// Feature type of a line, from its `power` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    Line,
    Cable,
    MinorLine,
}

impl LineKind {
    pub fn from_tag(value: &str) -> Option<Self> {
        match value.trim() {
            "line" => Some(LineKind::Line),
            "cable" => Some(LineKind::Cable),
            "minor_line" => Some(LineKind::MinorLine),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LineKind::Line => "line",
            LineKind::Cable => "cable",
            LineKind::MinorLine => "minor_line",
        }
    }
}

/// A substation or generation site.
#[derive(Debug, Clone)]
pub struct Station {
    pub id: StationId,
    pub area: Area,
    pub kind: StationKind,
    pub name: Option<String>,
    pub reference: Option<String>,
    /// Semicolon-joined voltage magnitudes, e.g. `110000;220000`
    pub voltage: Option<String>,
    /// Parsed generator/plant output; zero for substations
    pub nominal_power: Watts,
    /// Ring node ids for area features, empty for point features
    pub nodes: Vec<NodeId>,
    /// Geographic centroid (WGS84)
    pub centroid: GeoPoint,
    /// Lines already consumed by a relation that starts or ends here
    pub covered_line_ids: BTreeSet<LineId>,
}

impl Station {
    pub fn new(id: StationId, area: Area, kind: StationKind) -> Self {
        let centroid = area.centroid().to_geo();
        Self {
            id,
            area,
            kind,
            name: None,
            reference: None,
            voltage: None,
            nominal_power: Watts(0.0),
            nodes: Vec::new(),
            centroid,
            covered_line_ids: BTreeSet::new(),
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_voltage(mut self, voltage: Option<String>) -> Self {
        self.voltage = voltage;
        self
    }

    pub fn with_nominal_power(mut self, power: Watts) -> Self {
        self.nominal_power = power;
        self
    }

    pub fn with_nodes(mut self, nodes: Vec<NodeId>) -> Self {
        self.nodes = nodes;
        self
    }

    pub fn voltage(&self) -> Option<&str> {
        self.voltage.as_deref()
    }

    /// Record `line` as consumed at this station. Returns `false` if it already was.
    pub fn cover_line(&mut self, line: LineId) -> bool {
        self.covered_line_ids.insert(line)
    }

    pub fn has_covered(&self, line: LineId) -> bool {
        self.covered_line_ids.contains(&line)
    }
}

impl std::fmt::Display for Station {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} [{}] voltage={} ({:.5}, {:.5})",
            self.kind.label(),
            self.id.value(),
            self.name.as_deref().unwrap_or("-"),
            self.voltage.as_deref().unwrap_or("-"),
            self.centroid.lat,
            self.centroid.lon,
        )
    }
}

/// A power line or cable segment.
#[derive(Debug, Clone)]
pub struct Line {
    pub id: LineId,
    pub path: LineString,
    pub kind: LineKind,
    pub name: Option<String>,
    /// Semicolon-joined circuit references, e.g. `303;304`
    pub reference: Option<String>,
    pub voltage: Option<String>,
    pub cables: Option<u32>,
    pub nodes: Vec<NodeId>,
}

impl Line {
    pub fn new(id: LineId, nodes: Vec<NodeId>, path: LineString, kind: LineKind) -> Self {
        Self {
            id,
            path,
            kind,
            name: None,
            reference: None,
            voltage: None,
            cables: None,
            nodes,
        }
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub fn with_reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_voltage(mut self, voltage: Option<String>) -> Self {
        self.voltage = voltage;
        self
    }

    pub fn with_cables(mut self, cables: Option<u32>) -> Self {
        self.cables = cables;
        self
    }

    pub fn first_node(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    pub fn last_node(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Both path endpoints, if the line has at least two nodes.
    pub fn endpoints(&self) -> Option<(NodeId, NodeId)> {
        match (self.first_node(), self.last_node()) {
            (Some(first), Some(last)) if self.nodes.len() >= 2 => Some((first, last)),
            _ => None,
        }
    }

    /// A line whose endpoints coincide cannot connect two places.
    pub fn is_self_loop(&self) -> bool {
        matches!(self.endpoints(), Some((first, last)) if first == last)
    }

    pub fn contains_node(&self, node: NodeId) -> bool {
        self.nodes.contains(&node)
    }

    /// The endpoint opposite to `node`. A node that is not the first endpoint
    /// (including interior nodes) continues towards the first endpoint.
    pub fn far_end(&self, node: NodeId) -> Option<NodeId> {
        let (first, last) = self.endpoints()?;
        Some(if first == node { last } else { first })
    }

    pub fn voltage(&self) -> Option<&str> {
        self.voltage.as_deref()
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl std::fmt::Display for Line {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} [{}] ref={} voltage={} cables={}",
            self.kind.label(),
            self.id.value(),
            self.name.as_deref().unwrap_or("-"),
            self.reference.as_deref().unwrap_or("-"),
            self.voltage.as_deref().unwrap_or("-"),
            self.cables.map_or_else(|| "-".to_string(), |c| c.to_string()),
        )
    }
}

/// One element of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "lowercase")]
pub enum Member {
    Station(StationId),
    Line(LineId),
}

impl Member {
    /// The raw feature id, comparable with ground-truth member lists.
    pub fn raw_id(&self) -> i64 {
        match self {
            Member::Station(id) => id.value(),
            Member::Line(id) => id.value(),
        }
    }

    pub fn is_station(&self) -> bool {
        matches!(self, Member::Station(_))
    }

    pub fn as_line(&self) -> Option<LineId> {
        match self {
            Member::Line(id) => Some(*id),
            Member::Station(_) => None,
        }
    }

    pub fn as_station(&self) -> Option<StationId> {
        match self {
            Member::Station(id) => Some(*id),
            Member::Line(_) => None,
        }
    }
}

/// A candidate circuit trace: the seed station, then lines, then (once closed)
/// the far station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub members: Vec<Member>,
    /// The reference token this trace followed, if any
    pub traced_ref: Option<String>,
}

impl Relation {
    /// Start a trace at `seed` leaving through `line`.
    pub fn start(seed: StationId, line: LineId, traced_ref: Option<String>) -> Self {
        Self {
            members: vec![Member::Station(seed), Member::Line(line)],
            traced_ref,
        }
    }

    pub fn from_members(members: Vec<Member>) -> Self {
        Self {
            members,
            traced_ref: None,
        }
    }

    pub fn push_line(&mut self, line: LineId) {
        self.members.push(Member::Line(line));
    }

    pub fn push_station(&mut self, station: StationId) {
        self.members.push(Member::Station(station));
    }

    /// A copy of this relation extended by `line`.
    pub fn extended_with(&self, line: LineId) -> Self {
        let mut next = self.clone();
        next.push_line(line);
        next
    }

    pub fn seed(&self) -> Option<StationId> {
        self.members.first().and_then(Member::as_station)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn station_count(&self) -> usize {
        self.members.iter().filter(|m| m.is_station()).count()
    }

    pub fn lines(&self) -> impl Iterator<Item = LineId> + '_ {
        self.members.iter().filter_map(Member::as_line)
    }

    pub fn first_line(&self) -> Option<LineId> {
        self.lines().next()
    }

    pub fn last_line(&self) -> Option<LineId> {
        self.lines().last()
    }

    /// Exactly two stations and at least one line between them.
    pub fn is_valid(&self) -> bool {
        self.station_count() == 2 && self.len() >= 3
    }

    /// The two terminal stations of a closed relation.
    pub fn endpoints(&self) -> Option<(StationId, StationId)> {
        let first = self.members.first()?.as_station()?;
        let last = self.members.last()?.as_station()?;
        (self.len() >= 3).then_some((first, last))
    }

    pub fn member_ids(&self) -> BTreeSet<i64> {
        self.members.iter().map(Member::raw_id).collect()
    }
}

impl std::fmt::Display for Relation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .members
            .iter()
            .map(|m| match m {
                Member::Station(id) => id.to_string(),
                Member::Line(id) => id.to_string(),
            })
            .collect();
        write!(f, "{}", parts.join(" -> "))
    }
}

/// An accepted relation with the attributes of its first line and its score
/// against ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Circuit {
    pub members: Vec<Member>,
    pub voltage: Option<String>,
    pub name: Option<String>,
    pub reference: Option<String>,
    pub traced_ref: Option<String>,
    /// Overlap with the best-matching ground-truth relation, in `[0, 1]`
    pub accuracy: f64,
    pub matched_relation: Option<RelationId>,
}

impl Circuit {
    /// Build a circuit from a closed relation, taking voltage, name and
    /// reference from `first_line`.
    pub fn from_relation(relation: Relation, first_line: &Line) -> Self {
        Self {
            members: relation.members,
            voltage: first_line.voltage.clone(),
            name: first_line.name.clone(),
            reference: first_line.reference.clone(),
            traced_ref: relation.traced_ref,
            accuracy: 0.0,
            matched_relation: None,
        }
    }

    pub fn endpoints(&self) -> Option<(StationId, StationId)> {
        let first = self.members.first()?.as_station()?;
        let last = self.members.last()?.as_station()?;
        Some((first, last))
    }

    pub fn lines(&self) -> impl Iterator<Item = LineId> + '_ {
        self.members.iter().filter_map(Member::as_line)
    }

    pub fn member_ids(&self) -> BTreeSet<i64> {
        self.members.iter().map(Member::raw_id).collect()
    }
}
