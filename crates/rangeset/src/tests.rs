use std::collections::BTreeSet;

use cmd_util::env::env_config;
use proptest::prelude::*;

use crate::RangeSet;

/// Check the canonical form: intervals sorted, non-empty, neither touching
/// nor overlapping, and the maintained cardinality matching the intervals.
fn check_invariants(set: &RangeSet) {
    let intervals: Vec<_> = set.iter().collect();
    let mut total = 0u64;
    for &(lo, hi) in &intervals {
        assert!(lo <= hi, "inverted interval ({lo}, {hi})");
        total += hi - lo + 1;
    }
    for w in intervals.windows(2) {
        let (_, prev_hi) = w[0];
        let (next_lo, _) = w[1];
        assert!(
            next_lo > prev_hi + 1,
            "intervals touch or overlap: {:?}",
            &w
        );
    }
    assert_eq!(set.len(), total);
}

#[derive(proptest_derive::Arbitrary, Debug)]
enum Action {
    Add(#[proptest(strategy = "0u64..256")] u64),
    Discard(#[proptest(strategy = "0u64..256")] u64),
    InsertRange(
        #[proptest(strategy = "0u64..256")] u64,
        #[proptest(strategy = "0u64..64")] u64,
    ),
}

#[derive(Default)]
struct Test {
    set: RangeSet,
    model: BTreeSet<u64>,
}

impl Test {
    fn execute(&mut self, action: Action) {
        match action {
            Action::Add(v) => {
                self.set.add(v);
                self.model.insert(v);
            },
            Action::Discard(v) => {
                self.set.discard(v);
                self.model.remove(&v);
            },
            Action::InsertRange(lo, span) => {
                let hi = lo + span;
                self.set.insert_range(lo, hi);
                self.model.extend(lo..=hi);
            },
        }
        check_invariants(&self.set);
    }

    fn check_matches_model(&self) {
        assert_eq!(self.set.len(), self.model.len() as u64);
        for v in 0..=512u64 {
            assert_eq!(self.set.contains(v), self.model.contains(&v), "at {v}");
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256 * env_config("COORDINATOR_PROPTEST_MULTIPLIER", 1),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn proptest_model(actions in prop::collection::vec(any::<Action>(), 1..64)) {
        let mut test = Test::default();
        for action in actions {
            test.execute(action);
        }
        test.check_matches_model();
    }

    #[test]
    fn proptest_from_values_round_trip(values in prop::collection::vec(0u64..512, 0..128)) {
        let set = RangeSet::from_values(values.iter().copied());
        check_invariants(&set);
        let model: BTreeSet<u64> = values.iter().copied().collect();
        assert_eq!(set.len(), model.len() as u64);
        for v in 0..=600u64 {
            assert_eq!(set.contains(v), model.contains(&v), "at {v}");
        }
    }

    #[test]
    fn proptest_add_discard_idempotent(
        values in prop::collection::vec(0u64..128, 0..64),
        v in 0u64..128,
    ) {
        let mut set = RangeSet::from_values(values);

        let mut once = set.clone();
        once.add(v);
        let mut twice = once.clone();
        twice.add(v);
        assert_eq!(once, twice);

        set.discard(v);
        let mut again = set.clone();
        again.discard(v);
        assert_eq!(set, again);
    }

    #[test]
    fn proptest_filter_range_law(
        values in prop::collection::vec(0u64..128, 0..64),
        lo in 0u64..160,
        hi in 0u64..160,
    ) {
        let set = RangeSet::from_values(values.iter().copied());
        let members: BTreeSet<u64> = values.iter().copied().collect();
        let expected: Vec<u64> = if lo > hi {
            Vec::new()
        } else {
            (lo..=hi).filter(|v| !members.contains(v)).collect()
        };
        assert_eq!(set.filter_range(lo, hi), expected);
    }

    #[test]
    fn proptest_union_commutes(
        a in prop::collection::vec(0u64..192, 0..64),
        b in prop::collection::vec(0u64..192, 0..64),
    ) {
        let a = RangeSet::from_values(a);
        let b = RangeSet::from_values(b);
        let ab = a.union(&b);
        let ba = b.union(&a);
        check_invariants(&ab);
        assert_eq!(ab, ba);
        for v in 0..=256u64 {
            assert_eq!(ab.contains(v), a.contains(v) || b.contains(v), "at {v}");
        }
    }
}

#[test]
fn test_run_shapes() {
    let mut set = RangeSet::from_values([1, 2, 3, 5, 7, 8, 9]);
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![(1, 3), (5, 5), (7, 9)]);
    assert_eq!(set.filter_range(1, 10), vec![4, 6, 10]);
    assert!(!set.contains(6));

    set.add(4);
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![(1, 5), (7, 9)]);

    set.discard(2);
    assert_eq!(
        set.iter().collect::<Vec<_>>(),
        vec![(1, 1), (3, 5), (7, 9)]
    );
    check_invariants(&set);
}

#[test]
fn test_filter_range_inverted_bounds_is_empty() {
    let set = RangeSet::from_values([1, 2, 3]);
    assert!(set.filter_range(10, 2).is_empty());
}

#[test]
fn test_filter_range_of_empty_set() {
    let set = RangeSet::new();
    assert_eq!(set.filter_range(3, 7), vec![3, 4, 5, 6, 7]);
}

#[test]
fn test_union_with_empty_is_copy() {
    let a = RangeSet::from_values([4, 5, 9]);
    let empty = RangeSet::new();
    assert_eq!(a.union(&empty), a);
    assert_eq!(empty.union(&a), a);
}

#[test]
fn test_discard_absent_is_noop() {
    let mut set = RangeSet::from_values([1, 2, 3]);
    let before = set.clone();
    set.discard(10);
    assert_eq!(set, before);
}

#[test]
fn test_extremes() {
    let mut set = RangeSet::new();
    set.add(u64::MAX);
    set.add(u64::MAX - 1);
    assert_eq!(
        set.iter().collect::<Vec<_>>(),
        vec![(u64::MAX - 1, u64::MAX)]
    );
    assert!(set.contains(u64::MAX));
    assert_eq!(set.filter_range(u64::MAX - 2, u64::MAX), vec![u64::MAX - 2]);

    set.add(0);
    assert_eq!(set.len(), 3);
    set.discard(u64::MAX);
    assert!(!set.contains(u64::MAX));
    check_invariants(&set);
}

#[test]
fn test_insert_range_bridges_gaps() {
    let mut set = RangeSet::from_values([1, 2, 8, 9]);
    set.insert_range(4, 6);
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![(1, 2), (4, 6), (8, 9)]);
    set.insert_range(3, 7);
    assert_eq!(set.iter().collect::<Vec<_>>(), vec![(1, 9)]);
    assert_eq!(set.len(), 9);
}
