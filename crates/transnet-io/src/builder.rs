//! Programmatic construction of datasets.
//!
//! Tests and demos describe a grid in terms of stations, lines and relations;
//! the builder turns them into raw nodes, ways and tags the same way an OSM
//! extract would carry them. Station outlines are generated as small closed
//! squares with fresh node ids.
//!
//! # Example
//! ```
//! use transnet_io::{DatasetBuilder, LineInput, StationInput};
//!
//! let mut builder = DatasetBuilder::new();
//! builder.add_station(StationInput::substation(1, 50.0, 8.0).voltage("220000"));
//! builder.add_station(StationInput::substation(2, 50.0, 8.1).voltage("220000"));
//! builder.add_node(100, 50.0, 8.0);
//! builder.add_node(101, 50.0, 8.1);
//! builder.add_line(LineInput::new(10, &[100, 101]).voltage("220000"));
//! let dataset = builder.build();
//! assert_eq!(dataset.ways.len(), 3);
//! ```

use crate::dataset::{Dataset, NodeRecord, RelationRecord, Tags, WayRecord};
use crate::store::MemoryStore;

/// First id handed out for generated outline nodes.
const GENERATED_NODE_BASE: i64 = 1_000_000_000;

/// Default half edge length of a generated station outline, in degrees.
const DEFAULT_HALF_SIZE: f64 = 0.002;

/// Generic input data for a station or plant outline
#[derive(Debug, Clone)]
pub struct StationInput {
    pub id: i64,
    pub power: String,
    pub lat: f64,
    pub lon: f64,
    pub half_size: f64,
    pub voltage: Option<String>,
    pub name: Option<String>,
    pub reference: Option<String>,
    /// `plant:output:electricity`
    pub output: Option<String>,
    /// Leave the ring open (rejected by the store)
    pub open: bool,
}

impl StationInput {
    pub fn new(id: i64, power: &str, lat: f64, lon: f64) -> Self {
        Self {
            id,
            power: power.to_string(),
            lat,
            lon,
            half_size: DEFAULT_HALF_SIZE,
            voltage: None,
            name: None,
            reference: None,
            output: None,
            open: false,
        }
    }

    pub fn substation(id: i64, lat: f64, lon: f64) -> Self {
        Self::new(id, "substation", lat, lon)
    }

    pub fn plant(id: i64, lat: f64, lon: f64) -> Self {
        Self::new(id, "plant", lat, lon)
    }

    pub fn voltage(mut self, voltage: &str) -> Self {
        self.voltage = Some(voltage.to_string());
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    pub fn output(mut self, output: &str) -> Self {
        self.output = Some(output.to_string());
        self
    }

    pub fn half_size(mut self, degrees: f64) -> Self {
        self.half_size = degrees;
        self
    }

    pub fn open(mut self) -> Self {
        self.open = true;
        self
    }
}

/// Generic input data for a line or cable way
#[derive(Debug, Clone)]
pub struct LineInput {
    pub id: i64,
    pub nodes: Vec<i64>,
    pub power: String,
    pub voltage: Option<String>,
    pub name: Option<String>,
    pub reference: Option<String>,
    pub cables: Option<String>,
}

impl LineInput {
    pub fn new(id: i64, nodes: &[i64]) -> Self {
        Self {
            id,
            nodes: nodes.to_vec(),
            power: "line".to_string(),
            voltage: None,
            name: None,
            reference: None,
            cables: None,
        }
    }

    pub fn power(mut self, power: &str) -> Self {
        self.power = power.to_string();
        self
    }

    pub fn voltage(mut self, voltage: &str) -> Self {
        self.voltage = Some(voltage.to_string());
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.name = Some(name.to_string());
        self
    }

    pub fn reference(mut self, reference: &str) -> Self {
        self.reference = Some(reference.to_string());
        self
    }

    pub fn cables(mut self, cables: &str) -> Self {
        self.cables = Some(cables.to_string());
        self
    }
}

/// Builder for datasets from station, line and relation inputs.
pub struct DatasetBuilder {
    dataset: Dataset,
    next_generated_node: i64,
}

impl Default for DatasetBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self {
            dataset: Dataset::default(),
            next_generated_node: GENERATED_NODE_BASE,
        }
    }

    pub fn add_node(&mut self, id: i64, lat: f64, lon: f64) -> &mut Self {
        self.dataset.nodes.push(NodeRecord {
            id,
            lat,
            lon,
            tags: Tags::new(),
        });
        self
    }

    pub fn add_tagged_node(
        &mut self,
        id: i64,
        lat: f64,
        lon: f64,
        tags: &[(&str, &str)],
    ) -> &mut Self {
        self.dataset.nodes.push(NodeRecord {
            id,
            lat,
            lon,
            tags: to_tags(tags),
        });
        self
    }

    pub fn add_way(&mut self, id: i64, nodes: &[i64], tags: &[(&str, &str)]) -> &mut Self {
        self.dataset.ways.push(WayRecord {
            id,
            nodes: nodes.to_vec(),
            tags: to_tags(tags),
        });
        self
    }

    /// A square outline around the input's centre. Returns the ring node ids,
    /// closing node included.
    pub fn add_station(&mut self, input: StationInput) -> Vec<i64> {
        let h = input.half_size;
        let corners = [
            (input.lat - h, input.lon - h),
            (input.lat - h, input.lon + h),
            (input.lat + h, input.lon + h),
            (input.lat + h, input.lon - h),
        ];
        let mut ring = Vec::with_capacity(5);
        for (lat, lon) in corners {
            let id = self.next_generated_node;
            self.next_generated_node += 1;
            self.add_node(id, lat, lon);
            ring.push(id);
        }
        if !input.open {
            ring.push(ring[0]);
        }

        let mut tags = Tags::new();
        tags.insert("power".to_string(), input.power);
        insert_opt(&mut tags, "voltage", input.voltage);
        insert_opt(&mut tags, "name", input.name);
        insert_opt(&mut tags, "ref", input.reference);
        insert_opt(&mut tags, "plant:output:electricity", input.output);
        self.dataset.ways.push(WayRecord {
            id: input.id,
            nodes: ring.clone(),
            tags,
        });
        ring
    }

    pub fn add_line(&mut self, input: LineInput) -> &mut Self {
        let mut tags = Tags::new();
        tags.insert("power".to_string(), input.power);
        insert_opt(&mut tags, "voltage", input.voltage);
        insert_opt(&mut tags, "name", input.name);
        insert_opt(&mut tags, "ref", input.reference);
        insert_opt(&mut tags, "cables", input.cables);
        self.dataset.ways.push(WayRecord {
            id: input.id,
            nodes: input.nodes,
            tags,
        });
        self
    }

    /// A ground-truth `route=power` relation.
    pub fn add_relation(&mut self, id: i64, members: &[i64], voltage: Option<&str>) -> &mut Self {
        let mut tags = Tags::new();
        tags.insert("route".to_string(), "power".to_string());
        insert_opt(&mut tags, "voltage", voltage.map(str::to_string));
        self.dataset.relations.push(RelationRecord {
            id,
            members: members.to_vec(),
            tags,
        });
        self
    }

    pub fn build(self) -> Dataset {
        self.dataset
    }

    pub fn build_store(self) -> MemoryStore {
        MemoryStore::new(self.dataset)
    }
}

fn to_tags(tags: &[(&str, &str)]) -> Tags {
    tags.iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn insert_opt(tags: &mut Tags, key: &str, value: Option<String>) {
    if let Some(value) = value {
        tags.insert(key.to_string(), value);
    }
}
