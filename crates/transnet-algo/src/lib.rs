//! # transnet-algo: Circuit Inference
//!
//! Reconstructs electrical circuits from the flat station/line topology in
//! [`transnet_core`] and scores them against ground-truth relations.
//!
//! ## Inference
//!
//! [`CircuitInference`] starts at a seed station and follows every emanating line from
//! node to node. At each node it either finds the containing station (the trace closes)
//! or picks continuation lines whose voltage overlaps and whose reference or name
//! matches. Each closed trace is a [`Relation`](transnet_core::Relation) of the form
//! `station, line, ..., line, station`.
//!
//! Traces fail on three conditions, reported as [`TraceOutcome`]:
//! - **Loop**: the trace returns to a node it already passed
//! - **Duplicate**: the next line was already assigned to a circuit at the target
//! - **Unclosed**: no station and no continuation at the current end
//!
//! ## Assembly and Validation
//!
//! - [`assemble`]: promotes relations with two stations and at least one line to circuits
//! - [`CircuitValidator`]: Jaccard overlap with the ground-truth relations at the seed
//! - [`CircuitPipeline`]: loads the topology and runs the three steps per seed
//!
//! ## Example
//!
//! ```ignore
//! use transnet_algo::{CircuitPipeline, InferenceConfig};
//! use transnet_core::PlanarGeometry;
//!
//! let config = InferenceConfig::default();
//! let pipeline = CircuitPipeline::new(&store, &PlanarGeometry, &config);
//! let mut topology = pipeline.load_topology()?;
//! let seeds = topology.station_ids();
//! let report = pipeline.run(&mut topology, &seeds);
//! println!("{} circuits", report.circuit_count());
//! ```

pub mod assembler;
pub mod config;
pub mod inference;
pub mod pipeline;
pub mod report;
pub mod validation;

pub use assembler::{assemble, Assembly};
pub use config::InferenceConfig;
pub use inference::{trace_refs, CircuitInference, Trace, TraceOutcome};
pub use pipeline::{CircuitPipeline, RunReport, SeedReport, TraceCounts};
pub use report::{format_circuit, overpass_query};
pub use validation::{average_accuracy, overlap_accuracy, CircuitValidator, Validation};
