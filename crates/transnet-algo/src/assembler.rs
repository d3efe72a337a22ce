//! Promotion of raw relations to circuits.

use tracing::debug;
use transnet_core::{Circuit, Relation, Topology};

/// Relations split into accepted circuits and corrupt leftovers.
#[derive(Debug, Clone, Default)]
pub struct Assembly {
    pub circuits: Vec<Circuit>,
    /// Relations without exactly two stations and a line between them, or whose
    /// first line is unknown. Kept for diagnostics only.
    pub corrupt: Vec<Relation>,
}

/// Accept every relation with exactly two stations and at least three members,
/// deriving voltage, name and reference from its first line. Order is
/// preserved.
pub fn assemble(relations: impl IntoIterator<Item = Relation>, topology: &Topology) -> Assembly {
    let mut assembly = Assembly::default();
    for relation in relations {
        if !relation.is_valid() {
            assembly.corrupt.push(relation);
            continue;
        }
        let first_line = relation.first_line().and_then(|id| topology.line(id));
        match first_line {
            Some(line) => {
                let circuit = Circuit::from_relation(relation, line);
                assembly.circuits.push(circuit);
            }
            None => {
                debug!("relation {} references an unknown first line", relation);
                assembly.corrupt.push(relation);
            }
        }
    }
    assembly
}

#[cfg(test)]
mod tests {
    use super::*;
    use transnet_core::{Line, LineId, LineKind, LineString, Member, NodeId, StationId};

    fn topology_with_line(id: i64) -> Topology {
        let line = Line::new(
            LineId::new(id),
            vec![NodeId::new(1), NodeId::new(2)],
            LineString::default(),
            LineKind::Line,
        )
        .with_voltage(Some("380000".to_string()))
        .with_name(Some("Ost".to_string()))
        .with_reference(Some("401".to_string()));
        Topology::from_parts(Vec::new(), vec![line])
    }

    fn station(id: i64) -> Member {
        Member::Station(StationId::new(id))
    }

    fn line(id: i64) -> Member {
        Member::Line(LineId::new(id))
    }

    #[test]
    fn test_two_member_relation_is_corrupt() {
        let topology = topology_with_line(10);
        let relation = Relation::from_members(vec![station(1), line(10)]);
        let assembly = assemble(vec![relation], &topology);
        assert!(assembly.circuits.is_empty());
        assert_eq!(assembly.corrupt.len(), 1);
    }

    #[test]
    fn test_three_member_relation_becomes_circuit() {
        let topology = topology_with_line(10);
        let relation = Relation::from_members(vec![station(1), line(10), station(2)]);
        let assembly = assemble(vec![relation], &topology);
        assert!(assembly.corrupt.is_empty());
        let circuit = &assembly.circuits[0];
        assert_eq!(circuit.voltage.as_deref(), Some("380000"));
        assert_eq!(circuit.name.as_deref(), Some("Ost"));
        assert_eq!(circuit.reference.as_deref(), Some("401"));
    }

    #[test]
    fn test_three_station_relation_is_corrupt() {
        let topology = topology_with_line(10);
        let relation = Relation::from_members(vec![
            station(1),
            line(10),
            station(2),
            line(10),
            station(3),
        ]);
        let assembly = assemble(vec![relation], &topology);
        assert!(assembly.circuits.is_empty());
        assert_eq!(assembly.corrupt.len(), 1);
    }

    #[test]
    fn test_unknown_first_line_is_corrupt() {
        let topology = topology_with_line(10);
        let relation = Relation::from_members(vec![station(1), line(99), station(2)]);
        let assembly = assemble(vec![relation], &topology);
        assert!(assembly.circuits.is_empty());
        assert_eq!(assembly.corrupt.len(), 1);
    }

    #[test]
    fn test_order_is_preserved() {
        let topology = topology_with_line(10);
        let relations = vec![
            Relation::from_members(vec![station(1), line(10), station(3)]),
            Relation::from_members(vec![station(1)]),
            Relation::from_members(vec![station(1), line(10), station(2)]),
        ];
        let assembly = assemble(relations, &topology);
        let ends: Vec<_> = assembly
            .circuits
            .iter()
            .filter_map(|c| c.endpoints())
            .map(|(_, to)| to.value())
            .collect();
        assert_eq!(ends, vec![3, 2]);
        assert_eq!(assembly.corrupt.len(), 1);
    }
}
