//! End-to-end runs: load a topology, trace seeds, assemble and score circuits.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::info;
use transnet_core::{
    Circuit, GeometryService, Relation, RelationId, StationId, Topology, TopologyStore,
    TransnetResult,
};

use crate::assembler::{assemble, Assembly};
use crate::config::InferenceConfig;
use crate::inference::{CircuitInference, Trace, TraceOutcome};
use crate::validation::{average_accuracy, CircuitValidator};

/// How the traces of one seed ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TraceCounts {
    pub closed: usize,
    pub loops: usize,
    pub duplicates: usize,
    pub unclosed: usize,
}

impl TraceCounts {
    pub fn from_traces(traces: &[Trace]) -> Self {
        let mut counts = TraceCounts::default();
        for trace in traces {
            match trace.outcome {
                TraceOutcome::Closed => counts.closed += 1,
                TraceOutcome::Loop => counts.loops += 1,
                TraceOutcome::Duplicate => counts.duplicates += 1,
                TraceOutcome::Unclosed => counts.unclosed += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.closed + self.loops + self.duplicates + self.unclosed
    }
}

/// Result of inferring and scoring the circuits of one seed station.
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub seed: StationId,
    pub traces: TraceCounts,
    pub circuits: Vec<Circuit>,
    pub corrupt: Vec<Relation>,
    /// `None` when no circuit qualified
    pub average_accuracy: Option<f64>,
    /// Ground-truth relations matched by at least one circuit
    pub covered_relations: BTreeSet<RelationId>,
    /// All ground-truth relations at the seed
    pub existing_relations: BTreeSet<RelationId>,
}

impl SeedReport {
    pub fn coverage_summary(&self) -> String {
        format!(
            "{} of {} covered.",
            self.covered_relations.len(),
            self.existing_relations.len()
        )
    }
}

impl std::fmt::Display for SeedReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(average) = self.average_accuracy else {
            return write!(f, "{}: could not obtain any circuit", self.seed);
        };
        writeln!(
            f,
            "{}: {} circuit(s), average accuracy {:.1}%",
            self.seed,
            self.circuits.len(),
            average * 100.0
        )?;
        writeln!(f, "{}", self.coverage_summary())?;
        let ids = |set: &BTreeSet<RelationId>| {
            set.iter()
                .map(|id| id.value().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        };
        writeln!(f, "[{}] (Estimated)", ids(&self.covered_relations))?;
        write!(f, "[{}] (Existing)", ids(&self.existing_relations))
    }
}

/// Reports of a multi-seed run, in seed order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub seeds: Vec<SeedReport>,
}

impl RunReport {
    pub fn circuits(&self) -> impl Iterator<Item = &Circuit> {
        self.seeds.iter().flat_map(|seed| seed.circuits.iter())
    }

    pub fn circuit_count(&self) -> usize {
        self.seeds.iter().map(|seed| seed.circuits.len()).sum()
    }

    pub fn average_accuracy(&self) -> Option<f64> {
        let circuits: Vec<Circuit> = self.circuits().cloned().collect();
        average_accuracy(&circuits)
    }
}

/// Wires the engine, assembler and validator to one store and geometry.
pub struct CircuitPipeline<'a, S: ?Sized, G: ?Sized> {
    store: &'a S,
    geometry: &'a G,
    config: &'a InferenceConfig,
}

impl<'a, S, G> CircuitPipeline<'a, S, G>
where
    S: TopologyStore + ?Sized,
    G: GeometryService + ?Sized,
{
    pub fn new(store: &'a S, geometry: &'a G, config: &'a InferenceConfig) -> Self {
        Self {
            store,
            geometry,
            config,
        }
    }

    pub fn load_topology(&self) -> TransnetResult<Topology> {
        self.config.validate()?;
        let topology = Topology::load(self.store, &self.config.voltage_classes)?;
        info!(
            "Found {} stations and {} lines",
            topology.station_count(),
            topology.line_count()
        );
        Ok(topology)
    }

    /// Trace, assemble and score the circuits of `seed`. Covered-line state in
    /// `topology` is updated and shared with later calls.
    pub fn run_seed(&self, topology: &mut Topology, seed: StationId) -> SeedReport {
        let engine = CircuitInference::new(self.store, self.geometry, self.config);
        let traces = engine.trace_station(topology, seed);
        let counts = TraceCounts::from_traces(&traces);

        let Assembly {
            mut circuits,
            corrupt,
        } = assemble(traces.into_iter().map(|trace| trace.relation), topology);

        let validator = CircuitValidator::new(self.store, &self.config.voltage_classes);
        let mut covered_relations = BTreeSet::new();
        for circuit in &mut circuits {
            let validation = validator.validate(circuit);
            circuit.accuracy = validation.accuracy;
            circuit.matched_relation = validation.relation;
            if let Some(relation) = validation.relation {
                covered_relations.insert(relation);
            }
        }
        let existing_relations = validator.existing_relations(seed);
        let average_accuracy = average_accuracy(&circuits);

        info!(
            "{}: {} trace(s), {} circuit(s), {} corrupt, {} of {} ground-truth relation(s) covered",
            seed,
            counts.total(),
            circuits.len(),
            corrupt.len(),
            covered_relations.len(),
            existing_relations.len()
        );

        SeedReport {
            seed,
            traces: counts,
            circuits,
            corrupt,
            average_accuracy,
            covered_relations,
            existing_relations,
        }
    }

    /// Run `seeds` one after another over the same topology.
    pub fn run(&self, topology: &mut Topology, seeds: &[StationId]) -> RunReport {
        let seeds = seeds
            .iter()
            .map(|seed| self.run_seed(topology, *seed))
            .collect();
        RunReport { seeds }
    }
}
