use crate::graph::PersonGraph;
use crate::model::Sex;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// A resolved spousal pair with canonical member ordering.
///
/// Derived once per layout run, never mutated. `person1` is the member whose
/// recorded sex marks the conventional first role (male); when both members
/// share a role or it is unspecified, discovery order is preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Couple {
    /// Stable identifier derived from both member ids.
    pub id: String,
    pub person1: String,
    pub person2: String,
}

impl Couple {
    pub fn contains(&self, id: &str) -> bool {
        self.person1 == id || self.person2 == id
    }

    pub fn other(&self, id: &str) -> Option<&str> {
        if self.person1 == id {
            Some(&self.person2)
        } else if self.person2 == id {
            Some(&self.person1)
        } else {
            None
        }
    }
}

/// All couples of a dataset plus the person-to-couple mapping.
#[derive(Debug, Default)]
pub struct CoupleSet {
    couples: Vec<Couple>,
    by_person: FxHashMap<String, usize>,
}

impl CoupleSet {
    /// Derive the couple set from the graph.
    ///
    /// A couple forms when a person's spouse pointer resolves to a record
    /// whose own pointer is absent or points back (one-directional pointers
    /// are tolerated, conflicting ones are not), both members share a
    /// generation level, and neither member was already consumed by an
    /// earlier pair.
    pub fn resolve(graph: &PersonGraph) -> Self {
        let mut couples: Vec<Couple> = Vec::new();
        let mut by_person: FxHashMap<String, usize> = FxHashMap::default();

        for person in graph.persons() {
            if by_person.contains_key(person.id.as_str()) {
                continue;
            }
            let Some(partner) = graph.spouse_target(person) else {
                continue;
            };
            if by_person.contains_key(partner.id.as_str()) {
                continue;
            }
            match partner.spouse.as_deref() {
                None => {}
                Some(back) if back == person.id => {}
                Some(_) => continue,
            }
            if graph.level(&person.id) != graph.level(&partner.id) {
                // Cross-generation spouse pointers are a data anomaly; both
                // members fall back to independent positioning.
                tracing::warn!(
                    person = %person.id,
                    spouse = %partner.id,
                    "spouse pointer crosses generations, not forming a couple"
                );
                continue;
            }

            let (first, second) = match (person.sex, partner.sex) {
                (_, Some(Sex::Male)) if person.sex != Some(Sex::Male) => (partner, person),
                _ => (person, partner),
            };

            let idx = couples.len();
            by_person.insert(first.id.clone(), idx);
            by_person.insert(second.id.clone(), idx);
            couples.push(Couple {
                id: format!("{}+{}", first.id, second.id),
                person1: first.id.clone(),
                person2: second.id.clone(),
            });
        }

        Self { couples, by_person }
    }

    pub fn couple_of(&self, person_id: &str) -> Option<&Couple> {
        self.by_person.get(person_id).map(|&i| &self.couples[i])
    }

    pub fn couples(&self) -> &[Couple] {
        &self.couples
    }

    pub fn len(&self) -> usize {
        self.couples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.couples.is_empty()
    }
}
