/// This module implements a variant of
/// [pathfinding's astar function](https://docs.rs/pathfinding/latest/pathfinding/directed/astar/index.html)
/// with an explicit closed set, a deterministic tie-break on the heuristic and an optional
/// expansion budget. All bookkeeping lives in a map allocated per call, so nothing from an
/// earlier search can leak into the next one.
use fxhash::FxBuildHasher;
use indexmap::map::Entry::{Occupied, Vacant};
use indexmap::IndexMap;
use num_traits::Zero;

type FxIndexMap<K, V> = IndexMap<K, V, FxBuildHasher>;

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::hash::Hash;

/// Per-search bookkeeping for one discovered node.
#[derive(Clone, Copy, Debug)]
struct NodeRecord<C> {
    parent: usize,
    cost: C,
    closed: bool,
}

struct SmallestCostHolder<K> {
    estimated_cost: K,
    heuristic: K,
    cost: K,
    index: usize,
}

impl<K: PartialEq> Eq for SmallestCostHolder<K> {}

impl<K: PartialEq> PartialEq for SmallestCostHolder<K> {
    fn eq(&self, other: &Self) -> bool {
        self.estimated_cost.eq(&other.estimated_cost)
            && self.heuristic.eq(&other.heuristic)
            && self.index == other.index
    }
}

impl<K: Ord> PartialOrd for SmallestCostHolder<K> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<K: Ord> Ord for SmallestCostHolder<K> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap, so every key is reversed: smallest estimated cost first,
        // then smallest heuristic, then the node that was discovered first.
        other
            .estimated_cost
            .cmp(&self.estimated_cost)
            .then_with(|| other.heuristic.cmp(&self.heuristic))
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Result of a single [astar] call.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchOutcome<N, C> {
    /// Path from start to goal, both included, with its accumulated cost.
    Found {
        path: Vec<N>,
        cost: C,
        expanded: usize,
    },
    /// The open set ran empty.
    Exhausted { expanded: usize },
    /// The expansion budget ran out.
    BudgetExceeded { expanded: usize },
}

fn reverse_path<N, C>(records: &FxIndexMap<N, NodeRecord<C>>, start: usize) -> Vec<N>
where
    N: Eq + Hash + Clone,
{
    let mut path: Vec<N> = itertools::unfold(start, |i| {
        records.get_index(*i).map(|(node, record)| {
            *i = record.parent;
            node.clone()
        })
    })
    .collect();
    path.reverse();
    path
}

pub fn astar<N, C, FN, IN, FH, FS>(
    start: &N,
    mut successors: FN,
    mut heuristic: FH,
    mut success: FS,
    max_expansions: Option<usize>,
) -> SearchOutcome<N, C>
where
    N: Eq + Hash + Clone,
    C: Zero + Ord + Copy,
    FN: FnMut(&N) -> IN,
    IN: IntoIterator<Item = (N, C)>,
    FH: FnMut(&N) -> C,
    FS: FnMut(&N) -> bool,
{
    let start_h = heuristic(start);
    let mut to_see = BinaryHeap::new();
    to_see.push(SmallestCostHolder {
        estimated_cost: start_h,
        heuristic: start_h,
        cost: Zero::zero(),
        index: 0,
    });
    let mut records: FxIndexMap<N, NodeRecord<C>> = FxIndexMap::default();
    records.insert(
        start.clone(),
        NodeRecord {
            parent: usize::MAX,
            cost: Zero::zero(),
            closed: false,
        },
    );
    let mut expanded = 0;
    while let Some(SmallestCostHolder { cost, index, .. }) = to_see.pop() {
        let successors = {
            // We may have inserted a node several times into the binary heap if we found
            // a better way to access it. Only the entry carrying the recorded cost counts.
            match records.get_index_mut(index) {
                Some((_, record)) if !record.closed && cost <= record.cost => record.closed = true,
                _ => continue,
            }
            let Some((node, _)) = records.get_index(index) else {
                continue;
            };
            if success(node) {
                let path = reverse_path(&records, index);
                return SearchOutcome::Found {
                    path,
                    cost,
                    expanded,
                };
            }
            if max_expansions.is_some_and(|limit| expanded >= limit) {
                return SearchOutcome::BudgetExceeded { expanded };
            }
            expanded += 1;
            successors(node)
        };
        for (successor, move_cost) in successors {
            let new_cost = cost + move_cost;
            let h; // heuristic(&successor)
            let n; // index for successor
            match records.entry(successor) {
                Vacant(e) => {
                    h = heuristic(e.key());
                    n = e.index();
                    e.insert(NodeRecord {
                        parent: index,
                        cost: new_cost,
                        closed: false,
                    });
                }
                Occupied(mut e) => {
                    if !e.get().closed && e.get().cost > new_cost {
                        h = heuristic(e.key());
                        n = e.index();
                        e.insert(NodeRecord {
                            parent: index,
                            cost: new_cost,
                            closed: false,
                        });
                    } else {
                        continue;
                    }
                }
            }

            to_see.push(SmallestCostHolder {
                estimated_cost: new_cost + h,
                heuristic: h,
                cost: new_cost,
                index: n,
            });
        }
    }
    SearchOutcome::Exhausted { expanded }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Nodes on a line, 0..=len, with unit steps.
    fn line(len: i32) -> impl FnMut(&i32) -> Vec<(i32, i32)> {
        move |&n| {
            [n - 1, n + 1]
                .into_iter()
                .filter(|m| (0..=len).contains(m))
                .map(|m| (m, 1))
                .collect()
        }
    }

    #[test]
    fn finds_path_on_a_line() {
        let outcome = astar(&0, line(5), |&n| 5 - n, |&n| n == 5, None);
        match outcome {
            SearchOutcome::Found { path, cost, .. } => {
                assert_eq!(path, vec![0, 1, 2, 3, 4, 5]);
                assert_eq!(cost, 5);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn start_is_goal() {
        let outcome = astar(&3, line(5), |_| 0, |&n| n == 3, None);
        assert_eq!(
            outcome,
            SearchOutcome::Found {
                path: vec![3],
                cost: 0,
                expanded: 0
            }
        );
    }

    #[test]
    fn unreachable_goal_exhausts() {
        let outcome = astar(&0, line(3), |_| 0, |&n| n == 10, None);
        assert_eq!(outcome, SearchOutcome::Exhausted { expanded: 4 });
    }

    #[test]
    fn budget_stops_search() {
        let outcome = astar(&0, line(100), |_| 0, |&n| n == 100, Some(10));
        assert_eq!(outcome, SearchOutcome::BudgetExceeded { expanded: 10 });
    }

    #[test]
    fn cheaper_route_replaces_parent() {
        // 0 -> 1 costs 10 directly, or 2 via node 2.
        let successors = |&n: &u8| -> Vec<(u8, u32)> {
            match n {
                0 => vec![(1, 10), (2, 1)],
                2 => vec![(1, 1)],
                _ => vec![],
            }
        };
        let outcome = astar(&0, successors, |_| 0, |&n| n == 1, None);
        match outcome {
            SearchOutcome::Found { path, cost, .. } => {
                assert_eq!(path, vec![0, 2, 1]);
                assert_eq!(cost, 2);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[test]
    fn ties_prefer_lower_heuristic() {
        // Both branches reach the goal with equal cost. Node 2 has the smaller heuristic, so the
        // search expands it first and routes through it although node 1 was discovered first.
        let successors = |&n: &u8| -> Vec<(u8, u32)> {
            match n {
                0 => vec![(1, 1), (2, 2)],
                1 => vec![(3, 2)],
                2 => vec![(3, 1)],
                _ => vec![],
            }
        };
        let heuristic = |&n: &u8| match n {
            0 => 3,
            1 => 2,
            2 => 1,
            _ => 0,
        };
        let outcome = astar(&0, successors, heuristic, |&n| n == 3, None);
        match outcome {
            SearchOutcome::Found { path, .. } => assert_eq!(path, vec![0, 2, 3]),
            other => panic!("unexpected outcome {other:?}"),
        }
    }
}
