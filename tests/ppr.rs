use proptest::prelude::*;
use trustwalk::{
    personalization_vector, personalized_pagerank, personalized_pagerank_run, ppr_step, CsrGraph,
    PprConfig, WeightedGraphRef,
};

/// Adjacency-list adapter, to check the engines do not depend on the CSR type.
#[derive(Debug, Clone)]
struct WeightedAdjListGraph {
    adj: Vec<Vec<usize>>,
    wts: Vec<Vec<f64>>,
}

impl WeightedAdjListGraph {
    fn from_edges(n: usize, edges: &[(usize, usize, f64)]) -> Self {
        let mut adj = vec![Vec::new(); n];
        let mut wts = vec![Vec::new(); n];
        for &(u, v, w) in edges {
            adj[u].push(v);
            wts[u].push(w);
        }
        Self { adj, wts }
    }
}

impl WeightedGraphRef for WeightedAdjListGraph {
    fn node_count(&self) -> usize {
        self.adj.len()
    }

    fn neighbors_and_weights_ref(&self, node: usize) -> (&[usize], &[f64]) {
        let nbrs = self.adj.get(node).map(Vec::as_slice).unwrap_or(&[]);
        let wts = self.wts.get(node).map(Vec::as_slice).unwrap_or(&[]);
        (nbrs, wts)
    }
}

fn edge_list() -> impl Strategy<Value = (usize, Vec<(usize, usize, f64)>)> {
    (1usize..16).prop_flat_map(|n| {
        (Just(n), prop::collection::vec((0..n, 0..n, 0.01f64..10.0), 0..48))
    })
}

fn seed_list(n: usize) -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..n, 1..4)
}

fn l1(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).abs()).sum()
}

#[test]
fn single_sink_chain() {
    // 0 -> 1 -> 2, 2 has no out-edges.
    let g = CsrGraph::from_triples(3, &[(0, 1, 1.0), (1, 2, 1.0)]).unwrap();
    let cfg = PprConfig { alpha: 0.15, tolerance: 1e-10, max_iterations: 1000 };
    let run = personalized_pagerank_run(&g, cfg, &[0]);
    assert!(run.converged);

    let s: f64 = run.scores.iter().sum();
    assert!((s - 1.0).abs() < 1e-9, "sum={s}");
    assert!(run.scores[0] > run.scores[1] && run.scores[1] > run.scores[2], "{:?}", run.scores);

    // Closed form for this chain: r1 = 0.85 r0, r2 = 0.85 r1.
    let r0 = 1.0 / (1.0 + 0.85 + 0.85 * 0.85);
    assert!((run.scores[0] - r0).abs() < 1e-8);
    assert!((run.scores[1] - 0.85 * r0).abs() < 1e-8);
}

#[test]
fn disconnected_node_scores_zero() {
    // Node 3 has no edges at all and is not a seed.
    let g = CsrGraph::from_triples(4, &[(0, 1, 1.0), (1, 2, 1.0), (2, 0, 1.0)]).unwrap();
    let scores = personalized_pagerank(&g, PprConfig::default(), &[0]);
    assert_eq!(scores[3], 0.0);
}

#[test]
fn duplicate_seed_doubles_personalization() {
    let p = personalization_vector(&[0, 0, 1], 4);
    assert!((p[0] - 2.0 / 3.0).abs() < 1e-12);
    assert!((p[1] - 1.0 / 3.0).abs() < 1e-12);

    // With no edges every node is a sink, so the fixed point is p itself.
    let g = CsrGraph::from_edges(4, &[]).unwrap();
    let scores = personalized_pagerank(&g, PprConfig::default(), &[0, 0, 1]);
    assert!((scores[0] - 2.0 / 3.0).abs() < 1e-9);
    assert!((scores[1] - 1.0 / 3.0).abs() < 1e-9);
}

#[test]
fn heavier_edge_gets_more_mass() {
    let g = CsrGraph::from_triples(3, &[(0, 1, 3.0), (0, 2, 1.0)]).unwrap();
    let scores = personalized_pagerank(&g, PprConfig::default(), &[0]);
    assert!(scores[1] > scores[2], "{scores:?}");
    assert!((scores[1] / scores[2] - 3.0).abs() < 1e-6);
}

#[test]
fn higher_alpha_keeps_more_mass_on_seed() {
    let g = CsrGraph::from_triples(3, &[(0, 1, 1.0), (1, 2, 1.0), (2, 1, 1.0)]).unwrap();
    let low = personalized_pagerank(&g, PprConfig { alpha: 0.15, ..PprConfig::default() }, &[0]);
    let high = personalized_pagerank(&g, PprConfig { alpha: 0.85, ..PprConfig::default() }, &[0]);
    assert!(high[0] > low[0]);
}

#[cfg(feature = "parallel")]
#[test]
fn parallel_is_thread_count_invariant() {
    use trustwalk::personalized_pagerank_run_parallel;

    // Large enough to span several chunks: a ring with weighted chords and every
    // hundredth node a sink.
    let n = 20_000;
    let mut edges = Vec::new();
    for u in 0..n {
        if u % 100 == 99 {
            continue;
        }
        edges.push((u, (u + 1) % n, 1.0));
        edges.push((u, (u * 7 + 13) % n, 0.5 + (u % 5) as f64));
    }
    let g = CsrGraph::from_triples(n, &edges).unwrap();
    let cfg = PprConfig { alpha: 0.2, tolerance: 1e-10, max_iterations: 200 };
    let seeds = [0, 4_321, 17_000];

    let pool1 = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let pool4 = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();
    let a = pool1.install(|| personalized_pagerank_run_parallel(&g, cfg, &seeds));
    let b = pool4.install(|| personalized_pagerank_run_parallel(&g, cfg, &seeds));
    assert_eq!(a.scores, b.scores);
    assert_eq!(a.iterations, b.iterations);

    let serial = personalized_pagerank_run(&g, cfg, &seeds);
    assert!(l1(&a.scores, &serial.scores) < 1e-9);
}

proptest! {
    // Property: the CSR layout is consistent with the edge list it was built from.
    #[test]
    fn prop_csr_invariants((n, edges) in edge_list()) {
        let g = CsrGraph::from_triples(n, &edges).unwrap();
        let rs = g.row_start();
        prop_assert_eq!(rs.len(), n + 1);
        prop_assert_eq!(rs[0], 0);
        prop_assert_eq!(rs[n], edges.len());
        prop_assert!(rs.windows(2).all(|w| w[0] <= w[1]));

        for i in 0..n {
            let row: f64 = g.neighbor_weights()[rs[i]..rs[i + 1]].iter().sum();
            prop_assert!((row - g.out_weight_sum(i)).abs() < 1e-9);
            prop_assert_eq!(g.out_weight_sum(i) == 0.0, rs[i] == rs[i + 1]);

            // Row keeps the input order of that node's edges.
            let expected: Vec<(usize, f64)> =
                edges.iter().filter(|e| e.0 == i).map(|e| (e.1, e.2)).collect();
            let got: Vec<(usize, f64)> = g.neighbors(i).collect();
            prop_assert_eq!(got, expected);
        }
    }

    // Property: every iterate sums to 1 and stays non-negative.
    #[test]
    fn prop_ppr_conserves_mass(
        (n, edges, seeds) in edge_list().prop_flat_map(|(n, e)| (Just(n), Just(e), seed_list(n))),
        alpha in 0.05f64..0.95,
    ) {
        let g = CsrGraph::from_triples(n, &edges).unwrap();
        let p = personalization_vector(&seeds, n);
        let mut r = p.clone();
        let mut next = vec![0.0; n];
        for _ in 0..30 {
            ppr_step(&g, alpha, &p, &r, &mut next);
            std::mem::swap(&mut r, &mut next);
            let s: f64 = r.iter().sum();
            prop_assert!((s - 1.0).abs() < 1e-9, "sum={}", s);
            prop_assert!(r.iter().all(|&x| x >= 0.0));
        }
    }

    // Property: one more step from a converged result moves less than the tolerance.
    #[test]
    fn prop_ppr_converged_is_near_fixed_point(
        (n, edges, seeds) in edge_list().prop_flat_map(|(n, e)| (Just(n), Just(e), seed_list(n))),
        alpha in 0.1f64..0.9,
    ) {
        let g = CsrGraph::from_triples(n, &edges).unwrap();
        let cfg = PprConfig { alpha, tolerance: 1e-8, max_iterations: 10_000 };
        let run = personalized_pagerank_run(&g, cfg, &seeds);
        prop_assert!(run.converged);

        let p = personalization_vector(&seeds, n);
        let mut next = vec![0.0; n];
        let diff = ppr_step(&g, alpha, &p, &run.scores, &mut next);
        prop_assert!(diff < cfg.tolerance, "diff={}", diff);
        prop_assert!(l1(&next, &run.scores) < cfg.tolerance);
    }

    // Property: the engine only sees the trait, so any adapter gives the same answer.
    #[test]
    fn prop_adapter_matches_csr(
        (n, edges, seeds) in edge_list().prop_flat_map(|(n, e)| (Just(n), Just(e), seed_list(n))),
    ) {
        let csr = CsrGraph::from_triples(n, &edges).unwrap();
        let adj = WeightedAdjListGraph::from_edges(n, &edges);
        let a = personalized_pagerank(&csr, PprConfig::default(), &seeds);
        let b = personalized_pagerank(&adj, PprConfig::default(), &seeds);
        prop_assert!(l1(&a, &b) < 1e-12);
    }
}
