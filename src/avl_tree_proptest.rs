#![cfg(test)]

// Property tests for BalancedTree kept inside the crate next to the
// implementation they exercise.

use crate::avl_tree::{BalancedTree, InsertOutcome};
use proptest::prelude::*;
use std::collections::BTreeMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Search(usize),
    RemoveMatching(u8),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<i16>, Vec<OpI>)> {
    proptest::collection::vec(any::<i16>(), 1..=24).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Search),
            1 => (2u8..6).prop_map(OpI::RemoveMatching),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::BTreeMap.
// Invariants exercised across random operation sequences:
// - Duplicate keys are rejected with the value handed back, model unchanged.
// - `search` agrees with the model for present and absent keys.
// - `remove` returns the owned entry iff the model held it; len drops by one.
// - `remove_matching` removes exactly the entries the model would.
// - In-order iteration equals the model's sorted entries.
// - After every op the order, height and balance invariants hold.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: BalancedTree<i16, i32> = BalancedTree::new();
        let mut model: BTreeMap<i16, i32> = BTreeMap::new();

        for op in ops {
            match op {
                OpI::Insert(i, v) => {
                    let k = pool[i];
                    let already = model.contains_key(&k);
                    match sut.insert(k, v) {
                        InsertOutcome::Inserted => {
                            prop_assert!(!already, "insert must fail on duplicate");
                            model.insert(k, v);
                        }
                        InsertOutcome::AlreadyPresent(back) => {
                            prop_assert!(already, "duplicate only when key exists");
                            prop_assert_eq!(back, v);
                        }
                    }
                }
                OpI::Remove(i) => {
                    let k = pool[i];
                    let before = sut.len();
                    match (sut.remove(&k), model.remove(&k)) {
                        (Some((kk, vv)), Some(mv)) => {
                            prop_assert_eq!(kk, k);
                            prop_assert_eq!(vv, mv);
                            prop_assert_eq!(sut.len(), before - 1);
                        }
                        (None, None) => prop_assert_eq!(sut.len(), before),
                        (s, m) => prop_assert!(false, "remove mismatch: {:?} vs {:?}", s, m),
                    }
                }
                OpI::Search(i) => {
                    let k = pool[i];
                    prop_assert_eq!(sut.search(&k), model.get(&k));
                }
                OpI::RemoveMatching(m) => {
                    let m = m as i32;
                    let expected = model.values().filter(|v| v.rem_euclid(m) == 0).count();
                    model.retain(|_, v| v.rem_euclid(m) != 0);
                    let removed = sut.remove_matching(|_, v| v.rem_euclid(m) == 0);
                    prop_assert_eq!(removed, expected);
                }
                OpI::Iterate => {
                    let s: Vec<_> = sut.iter().map(|(k, v)| (*k, *v)).collect();
                    let m: Vec<_> = model.iter().map(|(k, v)| (*k, *v)).collect();
                    prop_assert_eq!(s, m);
                }
            }

            // Post-conditions after each op
            prop_assert_eq!(sut.validate(), Ok(()));
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }
    }
}

// Property: any subset removed by predicate leaves a valid AVL tree holding
// exactly the complement, whatever shape the tree had.
proptest! {
    #![proptest_config(ProptestConfig { cases: 128, .. ProptestConfig::default() })]
    #[test]
    fn prop_remove_matching_keeps_complement(
        keys in proptest::collection::btree_set(any::<u16>(), 0..400),
        mask in any::<u64>(),
    ) {
        let mut sut: BalancedTree<u16, ()> = keys.iter().map(|&k| (k, ())).collect();
        let doomed = |k: u16| mask & (1 << (k % 64)) != 0;

        let removed = sut.remove_matching(|k, _| doomed(*k));

        let kept: Vec<u16> = keys.iter().copied().filter(|&k| !doomed(k)).collect();
        prop_assert_eq!(removed, keys.len() - kept.len());
        prop_assert_eq!(sut.iter().map(|(k, _)| *k).collect::<Vec<_>>(), kept);
        prop_assert_eq!(sut.validate(), Ok(()));
    }
}
