use det_k_decomp::{DetKDecomp, Hypergraph, Hypertree};

/// Checks the width bound and all four decomposition conditions.
fn assert_valid(ht: &Hypertree, g: &mut Hypergraph, k: usize) {
    assert!(ht.ht_width() <= k, "width {} exceeds k = {k}", ht.ht_width());
    assert_eq!(ht.check_cond1(g), None, "some hyperedge is uncovered");
    assert_eq!(ht.check_cond2(g), None, "chi occurrences are disconnected");
    assert!(ht.check_cond3(g).is_none(), "chi escapes the lambda vertices");
    assert!(ht.check_cond4(g).is_none(), "lambda vertices leak into the subtree");
}

fn decompose(g: &mut Hypergraph, k: usize, seed: u64) -> Option<Hypertree> {
    assert!(g.is_connected());
    DetKDecomp::new(g, k, seed).run()
}

#[test]
fn triangle_of_binary_edges() {
    let mut g = Hypergraph::from_edge_lists(&[&["a", "b"], &["b", "c"], &["a", "c"]]);
    let ht = decompose(&mut g, 2, 0).expect("triangle decomposes with k = 2");
    assert_valid(&ht, &mut g, 2);
    assert_eq!(ht.ht_width(), 2);
    // two nodes: a width-2 root and a single-edge child
    assert_eq!(ht.nr_children(), 1);
    assert_eq!(ht.child(0).nr_children(), 0);
    assert_eq!(ht.lambda().len() + ht.child(0).lambda().len(), 3);

    assert!(decompose(&mut g, 1, 0).is_none());
}

#[test]
fn single_ternary_edge() {
    let mut g = Hypergraph::from_edge_lists(&[&["a", "b", "c"]]);
    let ht = decompose(&mut g, 1, 0).expect("one edge is one node");
    assert_valid(&ht, &mut g, 1);
    assert_eq!(ht.ht_width(), 1);
    assert_eq!(ht.lambda(), &[0]);
    assert_eq!(ht.chi(), &[0, 1, 2]);
    assert_eq!(ht.nr_children(), 0);
}

#[test]
fn four_cycle() {
    let mut g =
        Hypergraph::from_edge_lists(&[&["a", "b"], &["b", "c"], &["c", "d"], &["a", "d"]]);
    let ht = decompose(&mut g, 2, 1).expect("4-cycle decomposes with k = 2");
    assert_valid(&ht, &mut g, 2);

    let mut g2 =
        Hypergraph::from_edge_lists(&[&["a", "b"], &["b", "c"], &["c", "d"], &["a", "d"]]);
    assert!(decompose(&mut g2, 1, 1).is_none());
}

#[test]
fn reduce_then_decompose_remaining_edge() {
    let mut g = Hypergraph::from_edge_lists(&[&["a", "b", "c"], &["a", "b", "c", "d"]]);
    g.reduce(false);
    g.update_comp_sizes();
    g.update_neighbourhood();
    assert_eq!(g.nr_edges(), 1);
    assert_eq!(g.edge(1).covered_ids(), &[0]);

    let ht = decompose(&mut g, 1, 0).expect("single remaining edge");
    assert_valid(&ht, &mut g, 1);
    assert_eq!(ht.lambda(), &[1]);
}

#[test]
fn disconnected_input_is_detected() {
    let g = Hypergraph::from_edge_lists(&[
        &["a", "b"],
        &["b", "c"],
        &["a", "c"],
        &["x", "y"],
        &["y", "z"],
        &["x", "z"],
    ]);
    // callers must pre-check connectedness and keep the engine out
    assert!(!g.is_connected());
}

#[test]
fn five_clique_of_binary_edges() {
    let names = ["a", "b", "c", "d", "e"];
    let mut lists: Vec<Vec<&str>> = Vec::new();
    for i in 0..names.len() {
        for j in i + 1..names.len() {
            lists.push(vec![names[i], names[j]]);
        }
    }
    let lists: Vec<&[&str]> = lists.iter().map(Vec::as_slice).collect();
    let mut g = Hypergraph::from_edge_lists(&lists);
    let ht = decompose(&mut g, 3, 2).expect("K5 decomposes with k = 3");
    assert_valid(&ht, &mut g, 3);
}

#[test]
fn k_at_least_edge_count_gives_trivial_tree() {
    let mut g = Hypergraph::from_edge_lists(&[&["a", "b"], &["b", "c"], &["c", "a"]]);
    let ht = decompose(&mut g, 3, 0).expect("trivial bound");
    assert_valid(&ht, &mut g, 3);
    // the free-root base case splits into at most two nodes
    assert!(ht.nr_children() <= 1);
}

#[test]
#[should_panic(expected = "illegal hypertree-width")]
fn k_zero_is_rejected() {
    let mut g = Hypergraph::from_edge_lists(&[&["a", "b"]]);
    DetKDecomp::new(&mut g, 0, 0);
}

#[test]
fn empty_edge_set_yields_no_tree() {
    let mut g = Hypergraph::from_edge_lists(&[]);
    assert!(DetKDecomp::new(&mut g, 1, 0).run().is_none());
}

#[test]
fn wider_instances_stay_valid() {
    // 3x3 grid cells as ternary-ish hyperedges sharing corners
    let mut g = Hypergraph::from_edge_lists(&[
        &["v00", "v01", "v10"],
        &["v01", "v02", "v11"],
        &["v10", "v11", "v20"],
        &["v11", "v12", "v21"],
        &["v02", "v12", "v22"],
        &["v20", "v21", "v22"],
    ]);
    for k in 2..=4 {
        let mut g2 = g.clone();
        if let Some(ht) = decompose(&mut g2, k, 13) {
            assert_valid(&ht, &mut g, k);
            return;
        }
    }
    panic!("no decomposition found up to k = 4");
}

#[test]
fn gml_output_is_deterministic_under_seed() {
    let run = || {
        let mut g = Hypergraph::from_edge_lists(&[
            &["a", "b", "c"],
            &["c", "d"],
            &["d", "e", "f"],
            &["f", "a"],
            &["b", "e"],
        ]);
        let mut ht = DetKDecomp::new(&mut g, 2, 99).run().unwrap();
        let mut buf = Vec::new();
        ht.write_gml(&mut g, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    };
    assert_eq!(run(), run());
}

#[test]
fn post_processing_keeps_tree_valid() {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    let mut g = Hypergraph::from_edge_lists(&[
        &["a", "b"],
        &["b", "c"],
        &["c", "d"],
        &["d", "a"],
        &["a", "c"],
    ]);
    let mut ht = decompose(&mut g, 2, 4).expect("chordal 4-cycle");
    assert_valid(&ht, &mut g, 2);

    ht.shrink(false);
    assert_eq!(ht.check_cond1(&mut g), None);
    assert_eq!(ht.check_cond2(&mut g), None);

    let mut rng = StdRng::seed_from_u64(0);
    ht.elim_cov_edges(&mut g, &mut rng);
    assert!(ht.check_cond3(&mut g).is_none());
}

#[test]
fn mcs_weights_record_the_preorder() {
    let mut g = Hypergraph::from_edge_lists(&[&["a", "b"], &["b", "c"], &["c", "d"]]);
    DetKDecomp::new(&mut g, 1, 8).run().unwrap();
    let mut weights: Vec<i64> = g.edges().map(|e| e.weight()).collect();
    weights.sort_unstable();
    assert_eq!(weights, vec![0, 1, 2]);
}
