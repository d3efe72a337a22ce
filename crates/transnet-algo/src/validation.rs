//! Scoring of inferred circuits against ground-truth relations.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::warn;
use transnet_core::{Circuit, RelationId, StationId, TopologyStore};

/// Best ground-truth match for one circuit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Validation {
    pub relation: Option<RelationId>,
    /// In `[0, 1]`; zero when nothing overlaps
    pub accuracy: f64,
}

impl Validation {
    pub fn unmatched() -> Self {
        Self {
            relation: None,
            accuracy: 0.0,
        }
    }
}

/// Jaccard overlap of two member-id sets: shared members over all members.
/// Two empty sets score zero.
pub fn overlap_accuracy(circuit: &BTreeSet<i64>, truth: &BTreeSet<i64>) -> f64 {
    let union = circuit.union(truth).count();
    if union == 0 {
        return 0.0;
    }
    circuit.intersection(truth).count() as f64 / union as f64
}

/// Arithmetic mean of the circuits' accuracies, `None` without circuits.
pub fn average_accuracy(circuits: &[Circuit]) -> Option<f64> {
    if circuits.is_empty() {
        return None;
    }
    Some(circuits.iter().map(|c| c.accuracy).sum::<f64>() / circuits.len() as f64)
}

/// Compares circuits with the ground-truth relations of their seed station.
pub struct CircuitValidator<'a, S: ?Sized> {
    store: &'a S,
    voltage_classes: &'a [String],
}

impl<'a, S> CircuitValidator<'a, S>
where
    S: TopologyStore + ?Sized,
{
    pub fn new(store: &'a S, voltage_classes: &'a [String]) -> Self {
        Self {
            store,
            voltage_classes,
        }
    }

    /// Ground-truth relations at `station` in the tracked voltage classes. A
    /// failed lookup counts as none.
    pub fn existing_relations(&self, station: StationId) -> BTreeSet<RelationId> {
        match self
            .store
            .ground_truth_relations(station, self.voltage_classes)
        {
            Ok(ids) => ids.into_iter().collect(),
            Err(err) => {
                warn!("ground-truth lookup for {} failed: {}", station, err);
                BTreeSet::new()
            }
        }
    }

    /// Best-matching ground-truth relation for `circuit`, searched among the
    /// relations of its seed station. Ties go to the lowest relation id.
    pub fn validate(&self, circuit: &Circuit) -> Validation {
        let Some((seed, _)) = circuit.endpoints() else {
            return Validation::unmatched();
        };
        let members = circuit.member_ids();
        let mut best = Validation::unmatched();
        for relation in self.existing_relations(seed) {
            let truth = match self.store.ground_truth_relation_members(relation) {
                Ok(truth) => truth,
                Err(err) => {
                    warn!("could not load members of {}: {}", relation, err);
                    continue;
                }
            };
            let accuracy = overlap_accuracy(&members, &truth);
            if accuracy > best.accuracy {
                best = Validation {
                    relation: Some(relation),
                    accuracy,
                };
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use transnet_core::{LineId, Member};

    fn set(ids: &[i64]) -> BTreeSet<i64> {
        ids.iter().copied().collect()
    }

    fn circuit_with_accuracy(accuracy: f64) -> Circuit {
        Circuit {
            members: vec![
                Member::Station(StationId::new(1)),
                Member::Line(LineId::new(2)),
                Member::Station(StationId::new(3)),
            ],
            voltage: None,
            name: None,
            reference: None,
            traced_ref: None,
            accuracy,
            matched_relation: None,
        }
    }

    #[test]
    fn test_overlap_accuracy_bounds() {
        assert_relative_eq!(overlap_accuracy(&set(&[1, 2, 3]), &set(&[1, 2, 3])), 1.0);
        assert_relative_eq!(overlap_accuracy(&set(&[1, 2]), &set(&[3, 4])), 0.0);
        assert_relative_eq!(overlap_accuracy(&set(&[1, 2, 3]), &set(&[1, 3, 4])), 0.5);
        assert_relative_eq!(overlap_accuracy(&set(&[]), &set(&[])), 0.0);
        let partial = overlap_accuracy(&set(&[1, 2, 3, 4]), &set(&[1]));
        assert!((0.0..=1.0).contains(&partial));
    }

    #[test]
    fn test_average_accuracy_without_circuits_is_none() {
        assert_eq!(average_accuracy(&[]), None);
    }

    #[test]
    fn test_average_accuracy_is_mean() {
        let circuits = vec![circuit_with_accuracy(1.0), circuit_with_accuracy(0.5)];
        assert_relative_eq!(average_accuracy(&circuits).unwrap(), 0.75);
    }
}
