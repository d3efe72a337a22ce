//! Writers for accepted circuits: a JSON [`CircuitSink`] and Graphviz export.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use transnet_core::{
    export_graph, graph_stats, Circuit, CircuitGraph, CircuitSink, GraphStats, Topology,
    TransnetResult,
};

/// Document written by [`JsonCircuitSink`].
#[derive(Debug, Serialize, Deserialize)]
pub struct CircuitDocument {
    pub circuit_count: usize,
    pub circuits: Vec<Circuit>,
}

/// Writes circuits as one pretty-printed JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCircuitSink;

impl CircuitSink for JsonCircuitSink {
    fn publish(&self, circuits: &[Circuit], destination: &Path) -> TransnetResult<()> {
        let document = CircuitDocument {
            circuit_count: circuits.len(),
            circuits: circuits.to_vec(),
        };
        let output = serde_json::to_string_pretty(&document)?;
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(destination, output)?;
        Ok(())
    }
}

/// Read circuits written by [`JsonCircuitSink`].
pub fn load_circuits(path: impl AsRef<Path>) -> Result<Vec<Circuit>> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading circuits '{}'", path.display()))?;
    let document: CircuitDocument = serde_json::from_str(&content)
        .with_context(|| format!("parsing circuits '{}'", path.display()))?;
    Ok(document.circuits)
}

/// Write the circuit multigraph as Graphviz DOT and return its statistics.
pub fn write_circuit_graph(
    circuits: &[Circuit],
    topology: &Topology,
    path: impl AsRef<Path>,
) -> Result<GraphStats> {
    let path = path.as_ref();
    let graph = CircuitGraph::from_circuits(circuits);
    let dot = export_graph(&graph, circuits, topology, "dot")?;
    fs::write(path, dot).with_context(|| format!("writing graph '{}'", path.display()))?;
    graph_stats(&graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use transnet_core::{LineId, Member, RelationId, StationId};

    fn circuit(from: i64, line: i64, to: i64) -> Circuit {
        Circuit {
            members: vec![
                Member::Station(StationId::new(from)),
                Member::Line(LineId::new(line)),
                Member::Station(StationId::new(to)),
            ],
            voltage: Some("220000".into()),
            name: None,
            reference: Some("12".into()),
            traced_ref: Some("12".into()),
            accuracy: 1.0,
            matched_relation: Some(RelationId::new(900)),
        }
    }

    #[test]
    fn test_publish_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("circuits.json");
        let circuits = vec![circuit(2, 20, 3), circuit(1, 10, 2)];
        JsonCircuitSink.publish(&circuits, &path).unwrap();

        let loaded = load_circuits(&path).unwrap();
        assert_eq!(loaded, circuits);
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"circuit_count\": 2"));
        assert!(raw.contains("\"matched_relation\": 900"));
    }

    #[test]
    fn test_publish_empty_list() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("circuits.json");
        JsonCircuitSink.publish(&[], &path).unwrap();
        assert!(load_circuits(&path).unwrap().is_empty());
    }

    #[test]
    fn test_write_circuit_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("circuits.dot");
        let circuits = vec![circuit(1, 10, 2), circuit(1, 11, 2)];
        let stats = write_circuit_graph(&circuits, &Topology::new(), &path).unwrap();
        assert_eq!(stats.node_count, 2);
        assert_eq!(stats.edge_count, 2);
        let dot = fs::read_to_string(&path).unwrap();
        assert!(dot.starts_with("graph transnet_circuits {"));
        assert!(dot.contains("s1 -- s2"));
    }
}
