use etymon_core::{
    floyd_warshall, graded_credit, select_nearest, GraphemeDistance, RelatednessGraph, ScanPolicy,
    PLACEHOLDER,
};
use ndarray::Array2;
use proptest::prelude::*;

fn rendering() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        Just(Some(PLACEHOLDER.to_string())),
        Just(Some("  ".to_string())),
        proptest::string::string_regex("[a-zæøþð]{1,8}")
            .unwrap()
            .prop_map(Some),
    ]
}

/// Symmetric, zero-diagonal weights; some edges missing
fn symmetric_graph() -> impl Strategy<Value = Array2<f64>> {
    (2usize..=6).prop_flat_map(|n| {
        proptest::collection::vec(proptest::option::weighted(0.8, 0.0f64..2.0), n * n).prop_map(
            move |cells| {
                let mut weights = Array2::<f64>::zeros((n, n));
                for i in 0..n {
                    for j in (i + 1)..n {
                        let w = cells[i * n + j].unwrap_or(f64::INFINITY);
                        weights[[i, j]] = w;
                        weights[[j, i]] = w;
                    }
                }
                weights
            },
        )
    })
}

fn usable(cell: &Option<String>) -> Option<&str> {
    cell.as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty() && *r != PLACEHOLDER)
}

proptest! {
    #[test]
    fn selector_returns_argmin_of_usable(
        headword in "[a-z]{1,8}",
        cells in proptest::collection::vec(rendering(), 1..7),
    ) {
        let candidates = cells.iter().map(|c| c.as_deref()).enumerate();
        let estimate = select_nearest(&GraphemeDistance, &headword, candidates, ScanPolicy::Full);

        let usable_distances: Vec<(usize, f64)> = cells
            .iter()
            .enumerate()
            .filter_map(|(idx, c)| {
                usable(c).map(|r| (idx, etymon_phonetic::grapheme_edit_distance(&headword, r)))
            })
            .collect();

        match estimate {
            None => prop_assert!(usable_distances.is_empty()),
            Some(est) => {
                let min = usable_distances
                    .iter()
                    .map(|&(_, d)| d)
                    .fold(f64::INFINITY, f64::min);
                prop_assert_eq!(est.distance, min);
                let first = usable_distances.iter().find(|&&(_, d)| d == min).unwrap().0;
                prop_assert_eq!(est.language, first);
                prop_assert!(!est.rendering.trim().is_empty());
                prop_assert_ne!(est.rendering.as_str(), PLACEHOLDER);
            }
        }
    }

    #[test]
    fn shortest_paths_are_a_fixed_point(weights in symmetric_graph()) {
        let graph = RelatednessGraph::new(weights).unwrap();
        let paths = graph.shortest_paths();

        let mut again = paths.as_array().clone();
        floyd_warshall(&mut again);
        for (x, y) in again.iter().zip(paths.as_array().iter()) {
            prop_assert!(x == y || (x - y).abs() < 1e-9, "{} != {}", x, y);
        }
    }

    #[test]
    fn shortest_paths_keep_zero_diagonal_and_symmetry(weights in symmetric_graph()) {
        let n = weights.nrows();
        let graph = RelatednessGraph::new(weights.clone()).unwrap();
        let paths = graph.shortest_paths();

        for i in 0..n {
            prop_assert_eq!(paths.get(i, i), Some(0.0));
            for j in 0..n {
                let (a, b) = (paths.get(i, j).unwrap(), paths.get(j, i).unwrap());
                prop_assert!(a == b || (a - b).abs() < 1e-9);
                prop_assert!(a <= weights[[i, j]]);
            }
        }
    }

    #[test]
    fn credit_is_monotone_and_clamped(a in 0.0f64..3.0, b in 0.0f64..3.0) {
        let (near, far) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(graded_credit(near) >= graded_credit(far));
        prop_assert!(graded_credit(far) >= 0.0);
        if far >= 1.0 {
            prop_assert_eq!(graded_credit(far), 0.0);
        }
    }
}
