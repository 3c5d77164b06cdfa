//! Property tests for the comparator algebra (`Index`, `Score`, `System`)
//! and `bounded_merge`'s sortedness/bound/conservation postconditions.

use std::cmp::Ordering;

use bestfirst::{bounded_merge, ConditionResult, Index, Score, System, Working, WorkingConcreteSystem};
use proptest::prelude::*;

#[derive(Debug)]
struct Leaf {
    score: Score,
    index: Index,
}

impl std::fmt::Display for Leaf {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "leaf")
    }
}

impl Working for Leaf {
    fn generate_children(&self, _max_count: usize) -> bestfirst::EngineResult<Vec<System>> {
        Ok(Vec::new())
    }
    fn is_complete(&self) -> bool {
        true
    }
}

impl WorkingConcreteSystem for Leaf {
    fn score(&self) -> &Score {
        &self.score
    }
    fn index(&self) -> &Index {
        &self.index
    }
    fn update_score(&mut self, new_score: Score) -> bestfirst::EngineResult<()> {
        self.score = new_score;
        Ok(())
    }
}

/// Builds a committed score out of a sequence of ratios, one single-atom
/// group per ratio.
fn score_from_ratios(ratios: &[f64]) -> Score {
    let mut score = Score::new();
    for &ratio in ratios {
        score = score
            .extend_condition(ConditionResult::new("c", ratio).unwrap(), true)
            .unwrap()
            .commit()
            .unwrap();
    }
    score
}

fn index_from_path(path: &[u64]) -> Index {
    let mut index = Index::new();
    for &value in path {
        index = index.extend(value).unwrap().commit().unwrap();
    }
    index
}

fn system_from(ratios: &[f64], path: &[u64]) -> System {
    System::WorkingConcrete(Box::new(Leaf {
        score: score_from_ratios(ratios),
        index: index_from_path(path),
    }))
}

fn ratio_vec() -> impl Strategy<Value = Vec<f64>> {
    prop::collection::vec(0.0f64..=1.0, 0..6)
}

fn path_vec() -> impl Strategy<Value = Vec<u64>> {
    prop::collection::vec(0u64..1000, 0..6)
}

fn reverse(ord: Ordering) -> Ordering {
    match ord {
        Ordering::Less => Ordering::Greater,
        Ordering::Greater => Ordering::Less,
        Ordering::Equal => Ordering::Equal,
    }
}

proptest! {
    #[test]
    fn index_cmp_is_antisymmetric(a in path_vec(), b in path_vec()) {
        let (ia, ib) = (index_from_path(&a), index_from_path(&b));
        prop_assert_eq!(ia.cmp(&ib), reverse(ib.cmp(&ia)));
    }

    #[test]
    fn index_cmp_is_transitive(a in path_vec(), b in path_vec(), c in path_vec()) {
        let (ia, ib, ic) = (index_from_path(&a), index_from_path(&b), index_from_path(&c));
        if ia <= ib && ib <= ic {
            prop_assert!(ia <= ic);
        }
    }

    #[test]
    fn score_cmp_is_antisymmetric(a in ratio_vec(), b in ratio_vec()) {
        let (sa, sb) = (score_from_ratios(&a), score_from_ratios(&b));
        prop_assert_eq!(sa.cmp(&sb), reverse(sb.cmp(&sa)));
    }

    #[test]
    fn score_cmp_is_transitive(a in ratio_vec(), b in ratio_vec(), c in ratio_vec()) {
        let (sa, sb, sc) = (score_from_ratios(&a), score_from_ratios(&b), score_from_ratios(&c));
        if sa <= sb && sb <= sc {
            prop_assert!(sa <= sc);
        }
    }

    #[test]
    fn score_cmp_is_total(a in ratio_vec(), b in ratio_vec()) {
        let (sa, sb) = (score_from_ratios(&a), score_from_ratios(&b));
        let ord = sa.cmp(&sb);
        prop_assert!(ord == Ordering::Less || ord == Ordering::Equal || ord == Ordering::Greater);
        prop_assert_eq!(sa == sb, ord == Ordering::Equal);
    }

    #[test]
    fn all_successful_groups_outrank_any_with_a_failure(
        a_ratios in prop::collection::vec(0.01f64..=1.0, 1..4),
        b_ratios in prop::collection::vec(0.01f64..=1.0, 0..3),
    ) {
        let a = score_from_ratios(&a_ratios);
        let mut b_all = b_ratios.clone();
        b_all.push(0.0);
        let b = score_from_ratios(&b_all);
        prop_assert!(a > b);
    }

    #[test]
    fn system_cmp_is_antisymmetric(
        a_ratios in ratio_vec(), a_path in path_vec(),
        b_ratios in ratio_vec(), b_path in path_vec(),
    ) {
        let a = system_from(&a_ratios, &a_path);
        let b = system_from(&b_ratios, &b_path);
        prop_assert_eq!(a.cmp(&b), reverse(b.cmp(&a)));
    }

    #[test]
    fn bounded_merge_is_sorted_bounded_and_conserves_elements(
        frontier_ratios in prop::collection::vec(
            prop::collection::vec(0.0f64..=1.0, 0..8),
            1..4,
        ),
        max_n in 0usize..20,
    ) {
        let total_in: usize = frontier_ratios.iter().map(Vec::len).sum();
        let mut next_idx = 0u64;
        let frontiers: Vec<Vec<System>> = frontier_ratios
            .into_iter()
            .map(|ratios| {
                let mut frontier: Vec<System> = ratios
                    .into_iter()
                    .map(|ratio| {
                        let sys = system_from(&[ratio], &[next_idx]);
                        next_idx += 1;
                        sys
                    })
                    .collect();
                frontier.sort_by(|a, b| b.cmp(a));
                frontier
            })
            .collect();

        let outcome = bounded_merge(frontiers, max_n, None).unwrap();

        prop_assert!(outcome.merged.windows(2).all(|w| w[0] >= w[1]));
        prop_assert!(outcome.merged.len() <= max_n);
        prop_assert!(outcome.removed.iter().all(|f| !f.is_empty()));

        let total_out: usize = outcome.merged.len() + outcome.removed.iter().map(Vec::len).sum::<usize>();
        prop_assert_eq!(total_out, total_in);

        if total_in <= max_n {
            prop_assert_eq!(outcome.merged.len(), total_in);
            prop_assert!(outcome.removed.is_empty());
        }
    }
}
