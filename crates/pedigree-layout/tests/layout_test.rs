use pedigree_core::Person;
use pedigree_layout::{LayoutConfig, LayoutNode, layout_family_tree};

fn person(id: &str) -> Person {
    Person {
        id: id.to_string(),
        first_name: String::new(),
        last_name: String::new(),
        dob: None,
        dod: None,
        sex: None,
        spouse: None,
        parents: Vec::new(),
        children: Vec::new(),
        married: false,
        picture: None,
        notes: None,
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

fn person_positions(layout: &pedigree_layout::FamilyTreeLayout) -> Vec<(&str, f64, f64, i32)> {
    layout
        .nodes
        .iter()
        .filter_map(|n| match n {
            LayoutNode::Person {
                id, x, y, generation,
            } => Some((id.as_str(), *x, *y, *generation)),
            LayoutNode::CoupleMarker { .. } => None,
        })
        .collect()
}

fn position_of<'a>(nodes: &'a [(&str, f64, f64, i32)], id: &str) -> &'a (&'a str, f64, f64, i32) {
    nodes
        .iter()
        .find(|(nid, ..)| *nid == id)
        .unwrap_or_else(|| panic!("{id} missing from layout"))
}

#[test]
fn empty_dataset_yields_empty_layout() {
    let layout = layout_family_tree(Vec::new(), &LayoutConfig::default()).expect("layout ok");
    assert!(layout.nodes.is_empty());
    assert!(layout.links.is_empty());
    assert!(layout.couples.is_empty());
    assert!(layout.bounds.is_none());
}

#[test]
fn single_person_is_canvas_centered() {
    let config = LayoutConfig::default();
    let layout = layout_family_tree(vec![person("only")], &config).expect("layout ok");

    assert_eq!(layout.nodes.len(), 1);
    assert!(layout.links.is_empty());
    let LayoutNode::Person {
        x, y, generation, ..
    } = &layout.nodes[0]
    else {
        panic!("expected a person node");
    };
    assert!(approx_eq(*x, config.canvas_width / 2.0));
    assert!(approx_eq(
        *y,
        config.min_margin + config.card_height / 2.0
    ));
    assert_eq!(*generation, 0);
}

#[test]
fn childless_couple_sits_couple_spacing_apart() {
    let config = LayoutConfig::default();
    let mut a = person("a");
    a.spouse = Some("b".to_string());
    let mut b = person("b");
    b.spouse = Some("a".to_string());

    let layout = layout_family_tree(vec![a, b], &config).expect("layout ok");
    let persons = person_positions(&layout);
    assert_eq!(persons.len(), 2);

    let (_, ax, ay, _) = position_of(&persons, "a");
    let (_, bx, by, _) = position_of(&persons, "b");
    assert!(approx_eq((bx - ax).abs(), config.couple_spacing));
    assert!(approx_eq(*ay, *by));

    let markers: Vec<_> = layout
        .nodes
        .iter()
        .filter(|n| matches!(n, LayoutNode::CoupleMarker { .. }))
        .collect();
    assert_eq!(markers.len(), 1);
    let LayoutNode::CoupleMarker { x, .. } = markers[0] else {
        unreachable!();
    };
    assert!(approx_eq(*x, (ax + bx) / 2.0));

    // Only the spousal connector, no parent-child segments.
    assert_eq!(layout.links.len(), 1);
    assert!(layout.links[0].is_horizontal());
}

#[test]
fn children_are_ordered_by_dob() {
    let config = LayoutConfig::default();
    let mut father = person("father");
    father.spouse = Some("mother".to_string());
    father.children = vec!["younger".to_string(), "older".to_string()];
    let mut mother = person("mother");
    mother.spouse = Some("father".to_string());
    mother.children = vec!["younger".to_string(), "older".to_string()];
    let mut younger = person("younger");
    younger.dob = Some("2000-01-01".to_string());
    younger.parents = vec!["father".to_string(), "mother".to_string()];
    let mut older = person("older");
    older.dob = Some("1998-01-01".to_string());
    older.parents = vec!["father".to_string(), "mother".to_string()];

    let layout =
        layout_family_tree(vec![father, mother, younger, older], &config).expect("layout ok");
    let persons = person_positions(&layout);

    let (_, younger_x, ..) = position_of(&persons, "younger");
    let (_, older_x, ..) = position_of(&persons, "older");
    assert!(
        older_x < younger_x,
        "earlier dob must sit left: older at {older_x}, younger at {younger_x}"
    );

    // Children are centered under the couple midpoint.
    let (_, fx, ..) = position_of(&persons, "father");
    let (_, mx, ..) = position_of(&persons, "mother");
    assert!(approx_eq((older_x + younger_x) / 2.0, (fx + mx) / 2.0));
}

#[test]
fn unmarried_parents_resolve_independently() {
    let config = LayoutConfig::default();
    let mut father = person("father");
    father.children = vec!["kid".to_string()];
    let mut mother = person("mother");
    mother.children = vec!["kid".to_string()];
    let mut kid = person("kid");
    kid.parents = vec!["father".to_string(), "mother".to_string()];

    let layout = layout_family_tree(vec![father, mother, kid], &config).expect("layout ok");
    let persons = person_positions(&layout);
    assert_eq!(persons.len(), 3);
    assert!(layout.couples.is_empty());

    let (_, _, _, kid_gen) = position_of(&persons, "kid");
    assert_eq!(*kid_gen, 1);

    // Two independent solo-parent connectors: two stubs land on the child's
    // top edge.
    let (_, kid_x, kid_y, _) = position_of(&persons, "kid");
    let kid_top = kid_y - config.card_height / 2.0;
    let stubs = layout
        .links
        .iter()
        .filter(|s| s.is_vertical() && approx_eq(s.x1, *kid_x) && approx_eq(s.y2, kid_top))
        .count();
    assert_eq!(stubs, 2);
}

#[test]
fn disconnected_family_units_do_not_collide() {
    let config = LayoutConfig::default();
    let mut a1 = person("a1");
    a1.spouse = Some("a2".to_string());
    let mut a2 = person("a2");
    a2.spouse = Some("a1".to_string());
    let mut b1 = person("b1");
    b1.spouse = Some("b2".to_string());
    let mut b2 = person("b2");
    b2.spouse = Some("b1".to_string());

    let layout = layout_family_tree(vec![a1, a2, b1, b2], &config).expect("layout ok");
    let persons = person_positions(&layout);

    let unit_a_right = ["a1", "a2"]
        .iter()
        .map(|id| position_of(&persons, id).1)
        .fold(f64::NEG_INFINITY, f64::max)
        + config.card_width / 2.0;
    let unit_b_left = ["b1", "b2"]
        .iter()
        .map(|id| position_of(&persons, id).1)
        .fold(f64::INFINITY, f64::min)
        - config.card_width / 2.0;
    assert!(
        unit_a_right < unit_b_left,
        "family units overlap: {unit_a_right} vs {unit_b_left}"
    );
}

#[test]
fn sibling_subtrees_never_overlap() {
    let config = LayoutConfig::default();
    let mut father = person("father");
    father.spouse = Some("mother".to_string());
    father.children = vec!["c1".to_string(), "c2".to_string(), "c3".to_string()];
    let mut mother = person("mother");
    mother.spouse = Some("father".to_string());

    let mut c1 = person("c1");
    c1.parents = vec!["father".to_string()];
    c1.children = vec!["g1".to_string(), "g2".to_string(), "g3".to_string()];
    let mut c2 = person("c2");
    c2.parents = vec!["father".to_string()];
    let mut c3 = person("c3");
    c3.parents = vec!["father".to_string()];
    c3.children = vec!["g4".to_string(), "g5".to_string()];

    let mut dataset = vec![father, mother, c1, c2, c3];
    for g in ["g1", "g2", "g3", "g4", "g5"] {
        let mut grandchild = person(g);
        grandchild.parents = vec![if g < "g4" { "c1" } else { "c3" }.to_string()];
        dataset.push(grandchild);
    }

    let layout = layout_family_tree(dataset, &config).expect("layout ok");
    let persons = person_positions(&layout);
    assert_eq!(persons.len(), 10);

    // Within every generation row of this marry-in-free dataset, adjacent
    // cards keep at least a card width between centers.
    let mut by_row: std::collections::BTreeMap<i32, Vec<f64>> = std::collections::BTreeMap::new();
    for (_, x, _, generation) in &persons {
        by_row.entry(*generation).or_default().push(*x);
    }
    for (generation, xs) in &mut by_row {
        xs.sort_by(|a, b| a.partial_cmp(b).unwrap());
        for pair in xs.windows(2) {
            assert!(
                pair[1] - pair[0] >= config.card_width,
                "cards overlap on generation {generation}: {pair:?}"
            );
        }
    }
}

#[test]
fn couples_are_tightened_to_exact_spacing() {
    let config = LayoutConfig::default();
    // Two root families whose children marry each other: each spouse is
    // reached via a different parent edge, so their raw positions drift.
    let mut a1 = person("a1");
    a1.spouse = Some("a2".to_string());
    a1.children = vec!["am".to_string()];
    let mut a2 = person("a2");
    a2.spouse = Some("a1".to_string());
    let mut b1 = person("b1");
    b1.spouse = Some("b2".to_string());
    b1.children = vec!["bm".to_string()];
    let mut b2 = person("b2");
    b2.spouse = Some("b1".to_string());

    let mut am = person("am");
    am.parents = vec!["a1".to_string()];
    am.spouse = Some("bm".to_string());
    am.children = vec!["c".to_string()];
    let mut bm = person("bm");
    bm.parents = vec!["b1".to_string()];
    bm.spouse = Some("am".to_string());
    bm.children = vec!["c".to_string()];
    let mut c = person("c");
    c.parents = vec!["am".to_string(), "bm".to_string()];

    let layout =
        layout_family_tree(vec![a1, a2, b1, b2, am, bm, c], &config).expect("layout ok");
    let persons = person_positions(&layout);

    let (_, am_x, _, am_gen) = position_of(&persons, "am");
    let (_, bm_x, _, _) = position_of(&persons, "bm");
    assert_eq!(*am_gen, 1);
    assert!(
        approx_eq((bm_x - am_x).abs(), config.couple_spacing),
        "tightening must leave exactly couple_spacing: {am_x} vs {bm_x}"
    );

    // Their child was deferred until both spouses landed, so it is centered
    // under the pair, not under one parent.
    let (_, c_x, _, c_gen) = position_of(&persons, "c");
    assert_eq!(*c_gen, 2);
    assert!(approx_eq(*c_x, (am_x + bm_x) / 2.0));
}

#[test]
fn marry_in_spouse_is_parked_next_to_partner() {
    let config = LayoutConfig::default();
    let mut root = person("root");
    root.children = vec!["heir".to_string()];
    let mut heir = person("heir");
    heir.parents = vec!["root".to_string()];
    heir.spouse = Some("inlaw".to_string());
    let mut inlaw = person("inlaw");
    inlaw.spouse = Some("heir".to_string());

    let layout = layout_family_tree(vec![root, heir, inlaw], &config).expect("layout ok");
    let persons = person_positions(&layout);

    let (_, heir_x, heir_y, heir_gen) = position_of(&persons, "heir");
    let (_, inlaw_x, inlaw_y, inlaw_gen) = position_of(&persons, "inlaw");
    assert_eq!(*heir_gen, 1);
    assert_eq!(*inlaw_gen, 1, "in-law adopts the partner's generation");
    assert!(approx_eq(*heir_y, *inlaw_y));
    assert!(approx_eq((inlaw_x - heir_x).abs(), config.couple_spacing));
}

#[test]
fn every_person_appears_exactly_once() {
    let config = LayoutConfig::default();
    // Messy dataset: dangling refs, a shared child under non-couple parents,
    // a marry-in spouse.
    let mut adam = person("adam");
    adam.spouse = Some("eve".to_string());
    adam.children = vec!["cain".to_string(), "abel".to_string(), "seth".to_string()];
    let mut eve = person("eve");
    eve.spouse = Some("adam".to_string());
    eve.children = vec!["cain".to_string(), "ghost".to_string()];
    let mut cain = person("cain");
    cain.parents = vec!["adam".to_string(), "eve".to_string()];
    cain.spouse = Some("awan".to_string());
    cain.children = vec!["enoch".to_string()];
    let mut awan = person("awan");
    awan.spouse = Some("cain".to_string());
    let mut abel = person("abel");
    abel.parents = vec!["adam".to_string(), "eve".to_string()];
    abel.children = vec!["enosh".to_string()];
    let mut seth = person("seth");
    seth.parents = vec!["adam".to_string(), "eve".to_string()];
    seth.children = vec!["enosh".to_string()];
    let mut enoch = person("enoch");
    enoch.parents = vec!["cain".to_string(), "awan".to_string()];
    let mut enosh = person("enosh");
    enosh.parents = vec!["abel".to_string(), "seth".to_string()];

    let dataset = vec![adam, eve, cain, awan, abel, seth, enoch, enosh];
    let ids: Vec<String> = dataset.iter().map(|p| p.id.clone()).collect();
    let layout = layout_family_tree(dataset, &config).expect("layout ok");
    let persons = person_positions(&layout);

    assert_eq!(persons.len(), ids.len());
    for id in &ids {
        position_of(&persons, id);
    }

    // Generations strictly increase along parent edges.
    let (_, _, _, cain_gen) = position_of(&persons, "cain");
    let (_, _, _, enoch_gen) = position_of(&persons, "enoch");
    assert!(enoch_gen > cain_gen);
}

#[test]
fn layout_is_idempotent() {
    let config = LayoutConfig::default();
    let build = || {
        let mut a = person("a");
        a.spouse = Some("b".to_string());
        a.children = vec!["c".to_string()];
        let mut b = person("b");
        b.spouse = Some("a".to_string());
        let mut c = person("c");
        c.parents = vec!["a".to_string(), "b".to_string()];
        vec![a, b, c]
    };

    let first = layout_family_tree(build(), &config).expect("layout ok");
    let second = layout_family_tree(build(), &config).expect("layout ok");
    assert_eq!(first.nodes, second.nodes);
    assert_eq!(first.links, second.links);
    assert_eq!(first.couples, second.couples);
}

#[test]
fn node_list_serializes_with_explicit_discriminants() {
    let config = LayoutConfig::default();
    let mut a = person("a");
    a.spouse = Some("b".to_string());
    let mut b = person("b");
    b.spouse = Some("a".to_string());

    let layout = layout_family_tree(vec![a, b], &config).expect("layout ok");
    let value = serde_json::to_value(&layout).expect("serialize");

    let kinds: Vec<&str> = value["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["kind"].as_str().expect("tagged discriminant"))
        .collect();
    assert_eq!(kinds, vec!["person", "person", "coupleMarker"]);
    assert_eq!(value["links"][0]["y1"], value["links"][0]["y2"]);
}

#[test]
fn bounds_cover_all_nodes_and_links() {
    let config = LayoutConfig::default();
    let mut a = person("a");
    a.spouse = Some("b".to_string());
    a.children = vec!["c".to_string(), "d".to_string()];
    let mut b = person("b");
    b.spouse = Some("a".to_string());
    let mut c = person("c");
    c.parents = vec!["a".to_string()];
    let mut d = person("d");
    d.parents = vec!["a".to_string()];

    let layout = layout_family_tree(vec![a, b, c, d], &config).expect("layout ok");
    let bounds = layout.bounds.expect("bounds present");

    for node in &layout.nodes {
        let (x, y) = node.position();
        assert!(x >= bounds.min_x && x <= bounds.max_x);
        assert!(y >= bounds.min_y && y <= bounds.max_y);
    }
    for seg in &layout.links {
        for (x, y) in [(seg.x1, seg.y1), (seg.x2, seg.y2)] {
            assert!(x >= bounds.min_x && x <= bounds.max_x);
            assert!(y >= bounds.min_y && y <= bounds.max_y);
        }
    }
}
