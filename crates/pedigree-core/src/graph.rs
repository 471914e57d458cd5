use crate::model::Person;
use indexmap::IndexSet;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;

/// Ancestry chains deeper than this are treated as cyclic data and cut.
const MAX_ANCESTRY_DEPTH: usize = 512;

/// In-memory index of person records keyed by id.
///
/// Built once per layout run. Answers O(1) lookups and carries the memoized
/// generation level of every person, computed eagerly at construction so all
/// queries borrow `&self`.
#[derive(Debug)]
pub struct PersonGraph {
    persons: Vec<Person>,
    index: FxHashMap<String, usize>,
    levels: FxHashMap<String, i32>,
    cyclic: IndexSet<String>,
}

impl PersonGraph {
    pub fn new(persons: Vec<Person>) -> Self {
        let mut index: FxHashMap<String, usize> = FxHashMap::default();
        for (i, p) in persons.iter().enumerate() {
            if index.contains_key(p.id.as_str()) {
                // Loaders reject duplicates; a graph built straight from
                // records keeps the first occurrence.
                tracing::warn!(id = %p.id, "duplicate person id, keeping first record");
                continue;
            }
            index.insert(p.id.clone(), i);
        }

        let mut levels: FxHashMap<String, i32> = FxHashMap::default();
        let mut cyclic: IndexSet<String> = IndexSet::new();
        let mut in_progress: FxHashSet<String> = FxHashSet::default();
        for p in &persons {
            resolve_level(
                &persons,
                &index,
                &mut levels,
                &mut cyclic,
                &mut in_progress,
                &p.id,
                0,
            );
        }

        for id in &cyclic {
            tracing::warn!(id = %id, "ancestry cycle detected, person treated as a root");
        }

        Self {
            persons,
            index,
            levels,
            cyclic,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Person> {
        self.index.get(id).map(|&i| &self.persons[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// All records in dataset order.
    pub fn persons(&self) -> &[Person] {
        &self.persons
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// Memoized generation level: 0 for a root, `1 + max(parent levels)`
    /// otherwise. `None` only for an unknown id.
    pub fn level(&self, id: &str) -> Option<i32> {
        self.levels.get(id).copied()
    }

    /// Ids where an ancestry cycle was cut during level computation, in
    /// discovery order.
    pub fn cyclic_ids(&self) -> impl Iterator<Item = &str> {
        self.cyclic.iter().map(|s| s.as_str())
    }

    /// Parent references that resolve to an existing record.
    pub fn resolvable_parents(&self, person: &Person) -> Vec<&Person> {
        person
            .parents
            .iter()
            .filter_map(|pid| self.get(pid))
            .collect()
    }

    /// The record this person's own spouse pointer resolves to, if any.
    /// Symmetry is not checked here; that is the couple resolver's job.
    pub fn spouse_target(&self, person: &Person) -> Option<&Person> {
        let spouse_id = person.spouse.as_deref()?;
        if spouse_id == person.id {
            return None;
        }
        self.get(spouse_id)
    }

    /// Resolvable children in sibling order: ascending lexical `dob`, with a
    /// stable sort so children missing a date keep their dataset order. This
    /// ordering is shared by the width estimator, the layout engine, and the
    /// link router.
    pub fn children_sorted(&self, person: &Person) -> Vec<&Person> {
        let mut children: Vec<&Person> = person
            .children
            .iter()
            .filter_map(|cid| self.get(cid))
            .collect();
        children.sort_by(|a, b| dob_order(a.dob.as_deref(), b.dob.as_deref()));
        children
    }
}

/// Sibling comparator: lexical on `dob`, equal when either date is absent so
/// a stable sort preserves dataset order for undated children.
pub fn dob_order(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

fn resolve_level(
    persons: &[Person],
    index: &FxHashMap<String, usize>,
    levels: &mut FxHashMap<String, i32>,
    cyclic: &mut IndexSet<String>,
    in_progress: &mut FxHashSet<String>,
    id: &str,
    depth: usize,
) -> i32 {
    if let Some(&level) = levels.get(id) {
        return level;
    }
    if depth > MAX_ANCESTRY_DEPTH {
        cyclic.insert(id.to_string());
        levels.insert(id.to_string(), 0);
        return 0;
    }

    in_progress.insert(id.to_string());
    let person = &persons[index[id]];

    // A parent reference is unresolvable if the id is unknown or if following
    // it would re-enter a node already on the traversal stack (cyclic data).
    // Unresolvable references are ignored rather than failing the dataset.
    let mut parent_levels: Vec<i32> = Vec::new();
    for pid in &person.parents {
        if !index.contains_key(pid.as_str()) {
            continue;
        }
        if in_progress.contains(pid.as_str()) {
            cyclic.insert(pid.clone());
            continue;
        }
        parent_levels.push(resolve_level(
            persons,
            index,
            levels,
            cyclic,
            in_progress,
            pid,
            depth + 1,
        ));
    }

    let level = match parent_levels.iter().max() {
        Some(max) => max + 1,
        None => spouse_level(persons, index, levels, cyclic, in_progress, person, depth),
    };

    in_progress.remove(id);
    levels.insert(id.to_string(), level);
    level
}

/// Tie-break for a person with no resolvable parents: adopt the spouse's
/// generation when the spouse itself has resolvable parents (someone marrying
/// into the tree sits on their partner's row), otherwise level 0.
fn spouse_level(
    persons: &[Person],
    index: &FxHashMap<String, usize>,
    levels: &mut FxHashMap<String, i32>,
    cyclic: &mut IndexSet<String>,
    in_progress: &mut FxHashSet<String>,
    person: &Person,
    depth: usize,
) -> i32 {
    let Some(spouse_id) = person.spouse.as_deref() else {
        return 0;
    };
    if spouse_id == person.id || !index.contains_key(spouse_id) {
        return 0;
    }
    if in_progress.contains(spouse_id) {
        return 0;
    }
    let spouse = &persons[index[spouse_id]];
    let spouse_has_parents = spouse
        .parents
        .iter()
        .any(|pid| index.contains_key(pid.as_str()));
    if !spouse_has_parents {
        return 0;
    }
    resolve_level(
        persons,
        index,
        levels,
        cyclic,
        in_progress,
        spouse_id,
        depth + 1,
    )
}
