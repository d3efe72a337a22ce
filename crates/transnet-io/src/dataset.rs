//! JSON OSM-extract format.
//!
//! A dataset is a flat dump of the features relevant to power topology:
//!
//! ```json
//! {
//!   "nodes": [{ "id": 1, "lat": 50.0, "lon": 8.0 }],
//!   "ways": [{ "id": 10, "nodes": [1, 2], "tags": { "power": "line", "voltage": "220000" } }],
//!   "relations": [{ "id": 100, "members": [10, 20], "tags": { "route": "power" } }]
//! }
//! ```
//!
//! Relation members are raw way/node ids; the type of each member is not
//! needed for scoring.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Tags = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: i64,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: Tags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WayRecord {
    pub id: i64,
    pub nodes: Vec<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: Tags,
}

impl WayRecord {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// First and last node coincide.
    pub fn is_closed(&self) -> bool {
        self.nodes.len() >= 2 && self.nodes.first() == self.nodes.last()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationRecord {
    pub id: i64,
    pub members: Vec<i64>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tags: Tags,
}

impl RelationRecord {
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub ways: Vec<WayRecord>,
    #[serde(default)]
    pub relations: Vec<RelationRecord>,
}

/// Structural problems that make a dataset unusable.
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("duplicate node id {0}")]
    DuplicateNode(i64),
    #[error("duplicate way id {0}")]
    DuplicateWay(i64),
    #[error("duplicate relation id {0}")]
    DuplicateRelation(i64),
    #[error("node {id} has invalid coordinates ({lat}, {lon})")]
    InvalidCoordinates { id: i64, lat: f64, lon: f64 },
}

impl Dataset {
    /// Ids must be unique per element type and coordinates within WGS84 bounds.
    pub fn validate(&self) -> std::result::Result<(), DatasetError> {
        let mut seen = HashSet::new();
        for node in &self.nodes {
            if !seen.insert(node.id) {
                return Err(DatasetError::DuplicateNode(node.id));
            }
            if !(-90.0..=90.0).contains(&node.lat) || !(-180.0..=180.0).contains(&node.lon) {
                return Err(DatasetError::InvalidCoordinates {
                    id: node.id,
                    lat: node.lat,
                    lon: node.lon,
                });
            }
        }
        seen.clear();
        for way in &self.ways {
            if !seen.insert(way.id) {
                return Err(DatasetError::DuplicateWay(way.id));
            }
        }
        seen.clear();
        for relation in &self.relations {
            if !seen.insert(relation.id) {
                return Err(DatasetError::DuplicateRelation(relation.id));
            }
        }
        Ok(())
    }
}

pub fn parse_dataset(json: &str) -> Result<Dataset> {
    let dataset: Dataset = serde_json::from_str(json).context("parsing dataset JSON")?;
    dataset.validate()?;
    Ok(dataset)
}

pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading dataset '{}'", path.display()))?;
    parse_dataset(&content).with_context(|| format!("loading dataset '{}'", path.display()))
}

pub fn save_dataset(dataset: &Dataset, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let output = serde_json::to_string_pretty(dataset)?;
    fs::write(path, output).with_context(|| format!("writing dataset '{}'", path.display()))?;
    Ok(())
}
