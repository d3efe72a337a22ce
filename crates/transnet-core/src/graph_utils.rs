use crate::model::Circuit;
use crate::topology::Topology;
use crate::StationId;
use anyhow::{anyhow, Result};
use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// Accepted circuits as an undirected multigraph: stations are nodes, every
/// circuit is an edge between its two endpoints (parallel circuits stay
/// separate edges).
#[derive(Debug, Default)]
pub struct CircuitGraph {
    pub graph: UnGraph<StationId, usize>,
    index: HashMap<StationId, NodeIndex>,
}

impl CircuitGraph {
    /// Edge weights are indices into `circuits`. Circuits without two station
    /// endpoints are skipped.
    pub fn from_circuits(circuits: &[Circuit]) -> Self {
        let mut graph = CircuitGraph::default();
        for (idx, circuit) in circuits.iter().enumerate() {
            if let Some((from, to)) = circuit.endpoints() {
                let a = graph.node(from);
                let b = graph.node(to);
                graph.graph.add_edge(a, b, idx);
            }
        }
        graph
    }

    fn node(&mut self, station: StationId) -> NodeIndex {
        if let Some(idx) = self.index.get(&station) {
            return *idx;
        }
        let idx = self.graph.add_node(station);
        self.index.insert(station, idx);
        idx
    }

    pub fn node_index(&self, station: StationId) -> Option<NodeIndex> {
        self.index.get(&station).copied()
    }

    /// Number of circuits attached to `station`.
    pub fn degree(&self, station: StationId) -> usize {
        self.node_index(station)
            .map(|idx| self.graph.edges(idx).count())
            .unwrap_or(0)
    }
}

/// Summary statistics of a circuit graph (density/degree/connected components).
#[derive(Debug)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub connected_components: usize,
    pub min_degree: usize,
    pub avg_degree: f64,
    pub max_degree: usize,
    pub density: f64,
}

/// Calculates graph-level statistics such as density, degree distribution, and component counts.
pub fn graph_stats(circuits: &CircuitGraph) -> Result<GraphStats> {
    let graph = &circuits.graph;
    let node_count = graph.node_count();
    let edge_count = graph.edge_count();
    let mut degrees = Vec::with_capacity(node_count);
    for node in graph.node_indices() {
        degrees.push(graph.edges(node).count());
    }
    let min_degree = *degrees.iter().min().unwrap_or(&0);
    let max_degree = *degrees.iter().max().unwrap_or(&0);
    let avg_degree = if node_count == 0 {
        0.0
    } else {
        degrees.iter().copied().sum::<usize>() as f64 / node_count as f64
    };
    let density = if node_count < 2 {
        0.0
    } else {
        2.0 * edge_count as f64 / (node_count as f64 * (node_count as f64 - 1.0))
    };
    let connected_components = connected_components(graph);
    Ok(GraphStats {
        node_count,
        edge_count,
        connected_components,
        min_degree,
        avg_degree,
        max_degree,
        density,
    })
}

/// Export the circuit graph to a DOT string (Graphviz). Station names come from
/// `topology` when available.
pub fn export_graph(
    circuits: &CircuitGraph,
    source: &[Circuit],
    topology: &Topology,
    format: &str,
) -> Result<String> {
    match format.to_ascii_lowercase().as_str() {
        "graphviz" | "dot" => Ok(render_dot(circuits, source, topology)),
        other => Err(anyhow!("unsupported graph export format '{other}'")),
    }
}

fn render_dot(circuits: &CircuitGraph, source: &[Circuit], topology: &Topology) -> String {
    let graph = &circuits.graph;
    let mut buffer = String::new();
    buffer.push_str("graph transnet_circuits {\n");
    for node in graph.node_indices() {
        let station = graph[node];
        let label = topology
            .station(station)
            .and_then(|s| s.name.clone())
            .unwrap_or_else(|| station.value().to_string());
        buffer.push_str(&format!(
            "  s{} [label=\"{}\"];\n",
            station.value(),
            sanitize_label(&label)
        ));
    }
    for edge in graph.edge_references() {
        let source_id = graph[edge.source()].value();
        let target_id = graph[edge.target()].value();
        let label = source
            .get(*edge.weight())
            .map(edge_label)
            .unwrap_or_default();
        buffer.push_str(&format!(
            "  s{source_id} -- s{target_id} [label=\"{}\"];\n",
            sanitize_label(&label)
        ));
    }
    buffer.push('}');
    buffer
}

fn edge_label(circuit: &Circuit) -> String {
    let reference = circuit
        .traced_ref
        .as_deref()
        .or(circuit.reference.as_deref())
        .unwrap_or("");
    match circuit.voltage.as_deref() {
        Some(voltage) if !reference.is_empty() => format!("{reference} @ {voltage}"),
        Some(voltage) => voltage.to_string(),
        None => reference.to_string(),
    }
}

fn sanitize_label(label: &str) -> String {
    label.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Member, Relation};
    use crate::LineId;

    fn circuit(from: i64, line: i64, to: i64, voltage: &str) -> Circuit {
        let mut relation = Relation::start(StationId::new(from), LineId::new(line), None);
        relation.push_station(StationId::new(to));
        Circuit {
            members: relation.members,
            voltage: Some(voltage.to_string()),
            name: None,
            reference: Some(line.to_string()),
            traced_ref: None,
            accuracy: 0.0,
            matched_relation: None,
        }
    }

    #[test]
    fn test_circuit_graph_keeps_parallel_circuits() {
        let circuits = vec![
            circuit(1, 10, 2, "220000"),
            circuit(1, 11, 2, "380000"),
            circuit(2, 12, 3, "220000"),
        ];
        let graph = CircuitGraph::from_circuits(&circuits);
        let stats = graph_stats(&graph).unwrap();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_count, 3);
        assert_eq!(stats.connected_components, 1);
        assert_eq!(graph.degree(StationId::new(2)), 3);
        assert_eq!(graph.degree(StationId::new(99)), 0);
    }

    #[test]
    fn test_circuit_without_endpoints_is_skipped() {
        let open = Circuit {
            members: vec![Member::Station(StationId::new(1)), Member::Line(LineId::new(3))],
            voltage: None,
            name: None,
            reference: None,
            traced_ref: None,
            accuracy: 0.0,
            matched_relation: None,
        };
        let graph = CircuitGraph::from_circuits(&[open]);
        assert_eq!(graph.graph.edge_count(), 0);
    }

    #[test]
    fn test_export_dot() {
        let circuits = vec![circuit(1, 10, 2, "220000")];
        let graph = CircuitGraph::from_circuits(&circuits);
        let dot = export_graph(&graph, &circuits, &Topology::new(), "dot").unwrap();
        assert!(dot.starts_with("graph transnet_circuits {"));
        assert!(dot.contains("s1 -- s2 [label=\"10 @ 220000\"]"));
        assert!(export_graph(&graph, &circuits, &Topology::new(), "png").is_err());
    }
}
