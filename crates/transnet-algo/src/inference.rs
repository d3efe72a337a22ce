//! Circuit inference: tracing lines out of a seed station until they reach
//! another station.
//!
//! # Algorithm
//!
//! 1. The *neighborhood* of the seed is every station whose centroid lies within
//!    [`InferenceConfig::neighborhood_radius`] of the seed's centroid. Only these
//!    stations can terminate a trace.
//! 2. A line *leaves* the seed when it crosses the seed area and one of its two
//!    endpoints lies inside the seed area at a common voltage.
//! 3. Each leaving line is traced once per reference token (`ref=12;13` carries
//!    two circuits on one physical way).
//! 4. From the current node the trace either reaches a neighborhood station, or
//!    continues over the first line (ascending id) that touches the node, has a
//!    common voltage and matches the traced `ref`/`name`. A failed continuation
//!    is abandoned and the next candidate at the same node is tried.
//! 5. Every node a trace expands is remembered for the rest of that trace,
//!    including nodes on abandoned branches. Arriving at such a node again is a
//!    loop, so a trace expands each node at most once.
//!
//! Loops, dead ends and already-covered connections are ordinary outcomes
//! ([`TraceOutcome`]), not errors.
//!
//! # Covered lines
//!
//! Every station remembers the lines through which relations left or entered
//! it. A line is traced out of a station at most once, and a trace arriving at a
//! station through a line that station already saw is a duplicate. The
//! bookkeeping lives in the [`Topology`], so it carries over between seeds of the
//! same run: relations found earlier suppress later ones over the same line.

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, warn};
use transnet_core::{
    continuation_matches, have_common_voltage, tokens, GeometryService, LineId, NodeId,
    Relation, Station, StationId, TokenPolicy, Topology, TopologyStore,
};

use crate::config::InferenceConfig;

/// How a single trace ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceOutcome {
    /// Reached a second station
    Closed,
    /// Came back to the seed station or to a node the trace already expanded
    Loop,
    /// Reached a station through a line that station had already covered
    Duplicate,
    /// Ran out of matching lines
    Unclosed,
}

impl TraceOutcome {
    pub fn is_closed(self) -> bool {
        self == TraceOutcome::Closed
    }

    fn rank(self) -> u8 {
        match self {
            TraceOutcome::Unclosed => 0,
            TraceOutcome::Duplicate => 1,
            TraceOutcome::Loop => 2,
            TraceOutcome::Closed => 3,
        }
    }

    /// The more specific of two failures.
    fn worse(self, other: TraceOutcome) -> TraceOutcome {
        if other.rank() > self.rank() {
            other
        } else {
            self
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TraceOutcome::Closed => "closed",
            TraceOutcome::Loop => "loop",
            TraceOutcome::Duplicate => "duplicate",
            TraceOutcome::Unclosed => "could not close circuit",
        }
    }
}

impl std::fmt::Display for TraceOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A relation together with how its trace ended. Failed traces keep the
/// relation as it stood where the failure was decided.
#[derive(Debug, Clone)]
pub struct Trace {
    pub relation: Relation,
    pub outcome: TraceOutcome,
}

impl Trace {
    fn new(relation: Relation, outcome: TraceOutcome) -> Self {
        Self { relation, outcome }
    }

    pub fn is_closed(&self) -> bool {
        self.outcome.is_closed()
    }
}

/// A line leaving the seed: `entry` lies inside the seed, `exit` is where the
/// trace continues.
#[derive(Debug, Clone, Copy)]
struct Exit {
    line: LineId,
    entry: NodeId,
    exit: NodeId,
}

/// Attributes a trace carries from the line that left the seed.
struct TraceContext<'c> {
    seed: StationId,
    voltage: Option<&'c str>,
    reference: Option<&'c str>,
    name: Option<&'c str>,
    neighborhood: &'c [StationId],
}

/// The recursive circuit tracer.
pub struct CircuitInference<'a, S: ?Sized, G: ?Sized> {
    store: &'a S,
    geometry: &'a G,
    config: &'a InferenceConfig,
}

impl<'a, S, G> CircuitInference<'a, S, G>
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

    /// Closed relations starting at `seed`.
    pub fn infer_relations(&self, topology: &mut Topology, seed: StationId) -> Vec<Relation> {
        self.trace_station(topology, seed)
            .into_iter()
            .filter(Trace::is_closed)
            .map(|trace| trace.relation)
            .collect()
    }

    /// Every trace attempted from `seed`, successful or not, in the order the
    /// leaving lines were found.
    pub fn trace_station(&self, topology: &mut Topology, seed: StationId) -> Vec<Trace> {
        let neighborhood =
            topology.neighborhood(seed, self.config.neighborhood_radius, self.geometry);
        let exits = self.emanating_lines(topology, seed);
        debug!(
            "{} has {} leaving line(s) and {} station(s) in reach",
            seed,
            exits.len(),
            neighborhood.len()
        );

        let mut traces = Vec::new();
        for exit in exits {
            let Some(station) = topology.station_mut(seed) else {
                break;
            };
            if !station.cover_line(exit.line) {
                debug!("{} already traced from {}", exit.line, seed);
                continue;
            }
            let Some(line) = topology.line(exit.line) else {
                continue;
            };
            debug!("tracing {} out of {}", line, seed);
            let voltage = line.voltage.clone();
            let name = line.name.clone();
            let refs = trace_refs(line.reference(), self.config.token_policy);

            for reference in refs {
                let ctx = TraceContext {
                    seed,
                    voltage: voltage.as_deref(),
                    reference: reference.as_deref(),
                    name: name.as_deref(),
                    neighborhood: &neighborhood,
                };
                let relation = Relation::start(seed, exit.line, reference.clone());
                let mut covered_nodes = HashSet::from([exit.entry]);
                let trace = self.extend(
                    topology,
                    &ctx,
                    relation,
                    exit.exit,
                    exit.line,
                    &mut covered_nodes,
                );
                debug!("trace {} ended: {}", trace.relation, trace.outcome);
                traces.push(trace);
            }
        }
        traces
    }

    fn emanating_lines(&self, topology: &Topology, seed: StationId) -> Vec<Exit> {
        let Some(station) = topology.station(seed) else {
            warn!("{} is not part of the loaded topology", seed);
            return Vec::new();
        };
        let candidates = [station];
        topology
            .lines()
            .filter(|line| !line.is_self_loop())
            .filter_map(|line| {
                let (first, last) = line.endpoints()?;
                if !self.geometry.crosses(&line.path, &station.area) {
                    return None;
                }
                let inside = |node| {
                    self.containing_station(node, &candidates, line.voltage()) == Some(seed)
                };
                if inside(first) {
                    Some(Exit {
                        line: line.id,
                        entry: first,
                        exit: last,
                    })
                } else if inside(last) {
                    Some(Exit {
                        line: line.id,
                        entry: last,
                        exit: first,
                    })
                } else {
                    None
                }
            })
            .collect()
    }

    fn extend(
        &self,
        topology: &mut Topology,
        ctx: &TraceContext<'_>,
        mut relation: Relation,
        node: NodeId,
        from_line: LineId,
        covered_nodes: &mut HashSet<NodeId>,
    ) -> Trace {
        let reached = {
            let neighbors = topology.station_refs(ctx.neighborhood);
            self.containing_station(node, &neighbors, ctx.voltage)
        };

        if let Some(station_id) = reached {
            if station_id == ctx.seed {
                debug!("encountered loop back into {}", station_id);
                return Trace::new(relation, TraceOutcome::Loop);
            }
            let Some(station) = topology.station_mut(station_id) else {
                return Trace::new(relation, TraceOutcome::Unclosed);
            };
            if !station.cover_line(from_line) {
                debug!("relation with {} at {} already covered", from_line, station_id);
                return Trace::new(relation, TraceOutcome::Duplicate);
            }
            relation.push_station(station_id);
            return Trace::new(relation, TraceOutcome::Closed);
        }

        let continuations = self.continuations(topology, ctx, node, from_line);
        if continuations.is_empty() {
            debug!("could not close circuit at {}", node);
            return Trace::new(relation, TraceOutcome::Unclosed);
        }
        if covered_nodes.contains(&node) {
            debug!("encountered loop at {}", node);
            return Trace::new(relation, TraceOutcome::Loop);
        }

        covered_nodes.insert(node);
        let mut failure = TraceOutcome::Unclosed;
        for (line_id, next) in continuations {
            debug!("following {} from {} to {}", line_id, node, next);
            let attempt = relation.extended_with(line_id);
            let trace = self.extend(topology, ctx, attempt, next, line_id, covered_nodes);
            if trace.is_closed() {
                return trace;
            }
            failure = failure.worse(trace.outcome);
        }
        Trace::new(relation, failure)
    }

    /// Lines that may continue the trace at `node`, with the node each one leads
    /// to, in ascending line id order.
    fn continuations(
        &self,
        topology: &Topology,
        ctx: &TraceContext<'_>,
        node: NodeId,
        from_line: LineId,
    ) -> Vec<(LineId, NodeId)> {
        topology
            .lines_at_node(node)
            .into_iter()
            .filter(|&id| id != from_line)
            .filter_map(|id| topology.line(id))
            .filter(|line| !line.is_self_loop())
            .filter(|line| have_common_voltage(ctx.voltage, line.voltage()))
            .filter(|line| {
                continuation_matches(
                    ctx.reference,
                    ctx.name,
                    line.reference(),
                    line.name(),
                    self.config.token_policy,
                )
            })
            .filter_map(|line| line.far_end(node).map(|next| (line.id, next)))
            .collect()
    }

    fn containing_station(
        &self,
        node: NodeId,
        candidates: &[&Station],
        voltage: Option<&str>,
    ) -> Option<StationId> {
        match self
            .store
            .find_containing_station(node, candidates, voltage)
        {
            Ok(found) => found,
            Err(err) => {
                warn!(
                    "containment lookup for {} failed, treating as not found: {}",
                    node, err
                );
                None
            }
        }
    }
}

/// The reference tokens to trace for a line: one per distinct non-empty token,
/// or a single unreferenced trace.
pub fn trace_refs(reference: Option<&str>, policy: TokenPolicy) -> Vec<Option<String>> {
    let mut refs: Vec<Option<String>> = Vec::new();
    if let Some(reference) = reference {
        for token in tokens(reference, policy).filter(|t| !t.is_empty()) {
            let token = Some(token.to_string());
            if !refs.contains(&token) {
                refs.push(token);
            }
        }
    }
    if refs.is_empty() {
        refs.push(None);
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_refs_splits_tokens() {
        assert_eq!(
            trace_refs(Some("12;13"), TokenPolicy::Semicolon),
            vec![Some("12".to_string()), Some("13".to_string())]
        );
        assert_eq!(
            trace_refs(Some("12, 13"), TokenPolicy::SemicolonOrComma),
            vec![Some("12".to_string()), Some("13".to_string())]
        );
    }

    #[test]
    fn test_trace_refs_skips_empty_and_repeated_tokens() {
        assert_eq!(
            trace_refs(Some("12;;12; "), TokenPolicy::Semicolon),
            vec![Some("12".to_string())]
        );
        assert_eq!(trace_refs(Some(""), TokenPolicy::Semicolon), vec![None]);
        assert_eq!(trace_refs(None, TokenPolicy::Semicolon), vec![None]);
    }

    #[test]
    fn test_outcome_ranking_prefers_specific_failures() {
        assert_eq!(
            TraceOutcome::Unclosed.worse(TraceOutcome::Loop),
            TraceOutcome::Loop
        );
        assert_eq!(
            TraceOutcome::Loop.worse(TraceOutcome::Duplicate),
            TraceOutcome::Loop
        );
        assert_eq!(
            TraceOutcome::Unclosed.worse(TraceOutcome::Duplicate),
            TraceOutcome::Duplicate
        );
        assert!(!TraceOutcome::Loop.is_closed());
        assert_eq!(TraceOutcome::Unclosed.to_string(), "could not close circuit");
    }
}
