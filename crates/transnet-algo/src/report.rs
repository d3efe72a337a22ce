//! Human-readable rendering of circuits and run summaries.

use std::fmt::Write as _;

use transnet_core::{Area, Circuit, Member, Topology};

/// Multi-line listing of a circuit: a header with voltage/name/ref and score,
/// then one line per member.
pub fn format_circuit(index: usize, circuit: &Circuit, topology: &Topology) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Circuit {index}: voltage={} name={} ref={}",
        circuit.voltage.as_deref().unwrap_or("-"),
        circuit.name.as_deref().unwrap_or("-"),
        circuit
            .traced_ref
            .as_deref()
            .or(circuit.reference.as_deref())
            .unwrap_or("-"),
    );
    for member in &circuit.members {
        let line = match member {
            Member::Station(id) => topology
                .station(*id)
                .map(|s| s.to_string())
                .unwrap_or_else(|| id.to_string()),
            Member::Line(id) => topology
                .line(*id)
                .map(|l| l.to_string())
                .unwrap_or_else(|| id.to_string()),
        };
        let _ = writeln!(out, "  {line}");
    }
    match circuit.matched_relation {
        Some(relation) => {
            let _ = write!(
                out,
                "  accuracy {:.1}% against {}",
                circuit.accuracy * 100.0,
                relation
            );
        }
        None => {
            let _ = write!(out, "  no matching ground-truth relation");
        }
    }
    out
}

/// An Overpass API query that fetches every member of the circuit, for checking
/// it on a map. Point stations are queried as nodes, everything else as ways.
pub fn overpass_query(circuit: &Circuit, topology: &Topology) -> String {
    let mut query = String::from("(");
    for member in &circuit.members {
        let kind = match member {
            Member::Station(id) => match topology.station(*id).map(|s| &s.area) {
                Some(Area::Point(_)) => "node",
                _ => "way",
            },
            Member::Line(_) => "way",
        };
        let _ = write!(query, "{kind}({});", member.raw_id());
    }
    query.push_str(");out body;>;out skel qt;");
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use transnet_core::{LineId, Point, Station, StationId, StationKind};

    fn circuit() -> Circuit {
        Circuit {
            members: vec![
                Member::Station(StationId::new(1)),
                Member::Line(LineId::new(10)),
                Member::Station(StationId::new(2)),
            ],
            voltage: Some("220000".into()),
            name: None,
            reference: Some("12;13".into()),
            traced_ref: Some("12".into()),
            accuracy: 0.5,
            matched_relation: None,
        }
    }

    #[test]
    fn test_overpass_query_distinguishes_point_stations() {
        let plant = Station::new(
            StationId::new(2),
            Area::Point(Point::new(0.0, 0.0)),
            StationKind::Generator,
        );
        let topology = Topology::from_parts(vec![plant], Vec::new());
        assert_eq!(
            overpass_query(&circuit(), &topology),
            "(way(1);way(10);node(2););out body;>;out skel qt;"
        );
    }

    #[test]
    fn test_format_circuit_lists_members() {
        let text = format_circuit(3, &circuit(), &Topology::new());
        assert!(text.starts_with("Circuit 3: voltage=220000 name=- ref=12"));
        assert!(text.contains("  Line#10"));
        assert!(text.ends_with("no matching ground-truth relation"));
    }
}
