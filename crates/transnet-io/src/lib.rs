//! # transnet-io: Dataset Ingestion & Circuit Output
//!
//! Reads crowd-sourced power-infrastructure extracts and writes inferred circuits.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use transnet_core::TopologyStore;
//! use transnet_io::MemoryStore;
//!
//! fn main() -> anyhow::Result<()> {
//!     let store = MemoryStore::from_path("extract.json")?;
//!     let classes = vec!["220000".to_string(), "380000".to_string()];
//!     let lines = store.load_lines(&classes)?;
//!     println!("Lines: {}", lines.len());
//!     Ok(())
//! }
//! ```
//!
//! ## Module Overview
//!
//! - [`dataset`] - JSON extract model (nodes, ways, relations with tags)
//! - [`builder`] - Programmatic dataset construction for tests and demos
//! - [`store`] - [`MemoryStore`], the in-memory `TopologyStore`
//! - [`diagnostics`] - Feature counts and dropped/degraded ways
//! - [`sink`] - JSON circuit sink and Graphviz export
//!
//! ## Feature Rules
//!
//! | Feature | `power` tag | Requirements |
//! |---------|-------------|--------------|
//! | Substation | `station`, `substation`, `sub_station` | closed ring, ≥4 nodes, tracked voltage |
//! | Plant | `plant`, `generator` | closed ring with ≥4 nodes, or a tagged node |
//! | Line | `line`, `cable`, `minor_line` | ≥2 nodes, tracked voltage |
//!
//! Ground-truth relations are matched to stations by member id and filtered by
//! voltage class.

pub mod builder;
pub mod dataset;
pub mod diagnostics;
pub mod sink;
pub mod store;

pub use builder::{DatasetBuilder, LineInput, StationInput};
pub use dataset::{load_dataset, parse_dataset, save_dataset, Dataset, DatasetError};
pub use diagnostics::{IngestDiagnostics, IngestIssue, IngestStats, Severity};
pub use sink::{load_circuits, write_circuit_graph, CircuitDocument, JsonCircuitSink};
pub use store::MemoryStore;
