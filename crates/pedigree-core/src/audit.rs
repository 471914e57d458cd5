use crate::couple::CoupleSet;
use crate::graph::PersonGraph;
use std::fmt;

/// A dataset irregularity the layout tolerates but a data owner should fix.
#[derive(Debug, Clone, PartialEq)]
pub enum Anomaly {
    MissingReference {
        person: String,
        field: &'static str,
        target: String,
    },
    ConflictingSpouse {
        person: String,
        spouse: String,
    },
    CrossGenerationSpouse {
        person: String,
        spouse: String,
    },
    AncestryCycle {
        person: String,
    },
    NonIsoDate {
        person: String,
        field: &'static str,
        value: String,
    },
    SharedChild {
        child: String,
        parents: Vec<String>,
    },
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Anomaly::MissingReference {
                person,
                field,
                target,
            } => write!(f, "{person}: {field} reference {target:?} does not exist"),
            Anomaly::ConflictingSpouse { person, spouse } => write!(
                f,
                "{person}: spouse pointer to {spouse} is not reciprocated"
            ),
            Anomaly::CrossGenerationSpouse { person, spouse } => write!(
                f,
                "{person}: spouse {spouse} sits on a different generation"
            ),
            Anomaly::AncestryCycle { person } => {
                write!(f, "{person}: ancestry cycle cut, treated as a root")
            }
            Anomaly::NonIsoDate {
                person,
                field,
                value,
            } => write!(f, "{person}: {field} {value:?} is not ISO YYYY-MM-DD"),
            Anomaly::SharedChild { child, parents } => write!(
                f,
                "{child}: listed under parents who are not a couple ({})",
                parents.join(", ")
            ),
        }
    }
}

/// Scan a dataset for irregularities, in dataset order. None of these stop a
/// layout run; the `check` CLI command reports them.
pub fn audit(graph: &PersonGraph) -> Vec<Anomaly> {
    let couples = CoupleSet::resolve(graph);
    let mut out: Vec<Anomaly> = Vec::new();

    for person in graph.persons() {
        for (field, refs) in [("parents", &person.parents), ("children", &person.children)] {
            for target in refs {
                if !graph.contains(target) {
                    out.push(Anomaly::MissingReference {
                        person: person.id.clone(),
                        field,
                        target: target.clone(),
                    });
                }
            }
        }

        if let Some(spouse_id) = person.spouse.as_deref() {
            match graph.get(spouse_id) {
                None => out.push(Anomaly::MissingReference {
                    person: person.id.clone(),
                    field: "spouse",
                    target: spouse_id.to_string(),
                }),
                Some(spouse) => {
                    let reciprocated = spouse
                        .spouse
                        .as_deref()
                        .is_none_or(|back| back == person.id);
                    if !reciprocated {
                        out.push(Anomaly::ConflictingSpouse {
                            person: person.id.clone(),
                            spouse: spouse_id.to_string(),
                        });
                    } else if graph.level(&person.id) != graph.level(spouse_id) {
                        out.push(Anomaly::CrossGenerationSpouse {
                            person: person.id.clone(),
                            spouse: spouse_id.to_string(),
                        });
                    }
                }
            }
        }

        for (field, value) in [("dob", &person.dob), ("dod", &person.dod)] {
            if let Some(value) = value {
                if chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").is_err() {
                    out.push(Anomaly::NonIsoDate {
                        person: person.id.clone(),
                        field,
                        value: value.clone(),
                    });
                }
            }
        }
    }

    for id in graph.cyclic_ids() {
        out.push(Anomaly::AncestryCycle {
            person: id.to_string(),
        });
    }

    // A child reachable from two parents who are not a recognized couple is
    // laid out first-wins; flag it so the data can be corrected.
    for person in graph.persons() {
        let parents = graph.resolvable_parents(person);
        if parents.len() == 2 {
            let paired = couples
                .couple_of(&parents[0].id)
                .is_some_and(|c| c.contains(&parents[1].id));
            if !paired {
                out.push(Anomaly::SharedChild {
                    child: person.id.clone(),
                    parents: parents.iter().map(|p| p.id.clone()).collect(),
                });
            }
        }
    }

    out
}
