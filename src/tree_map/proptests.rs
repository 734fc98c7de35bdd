use super::TreeMap;
use crate::Error;
use proptest::collection::btree_set as pset;
use proptest::collection::vec as pvec;
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Operation {
    Put(u16, u32),
    Get(u16),
    Remove(u16),
    ContainsKey(u16),
}

// Keys come from a small range so that overwrites, hits and misses all show
// up often. `Put` is weighted above `Remove` so the map tends to grow.
fn op_strategy() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (0..200u16, any::<u32>()).prop_map(|(k, v)| Operation::Put(k, v)),
        2 => (0..200u16).prop_map(Operation::Get),
        2 => (0..200u16).prop_map(Operation::Remove),
        1 => (0..200u16).prop_map(Operation::ContainsKey),
    ]
}

// A set of distinct keys together with some permutation of it.
fn keys_and_permutation() -> impl Strategy<Value = (Vec<i32>, Vec<i32>)> {
    pset(any::<i32>(), 0..300)
        .prop_map(|keys| keys.into_iter().collect::<Vec<_>>())
        .prop_flat_map(|keys| (Just(keys.clone()), Just(keys).prop_shuffle()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    // Every lookup is validated against a std BTreeMap at every step, and the
    // final contents must match in both iteration directions.
    #[test]
    fn behaves_like_btreemap(
        seed in any::<u64>(),
        ops in pvec(op_strategy(), 1..1_000),
    ) {
        let mut map = TreeMap::with_seed(seed);
        let mut reference = BTreeMap::new();

        for op in ops {
            match op {
                Operation::Put(k, v) => {
                    prop_assert_eq!(reference.insert(k, v), map.put(k, v).unwrap());
                }
                Operation::Get(k) => {
                    prop_assert_eq!(reference.get(&k), map.get(&k).ok());
                }
                Operation::Remove(k) => {
                    prop_assert_eq!(reference.remove(&k).ok_or(Error::NotFound), map.remove(&k));
                }
                Operation::ContainsKey(k) => {
                    prop_assert_eq!(reference.contains_key(&k), map.contains_key(&k));
                }
            }
            prop_assert_eq!(reference.len(), map.len());
        }

        prop_assert!(reference.iter().eq(map.iter()));
        prop_assert!(reference.iter().rev().eq(map.iter().rev()));
        prop_assert_eq!(reference.iter().next(), map.first());
        prop_assert_eq!(reference.iter().next_back(), map.last());
    }

    #[test]
    fn drains_to_empty(
        seed in any::<u64>(),
        (keys, removal_order) in keys_and_permutation(),
    ) {
        let mut map = TreeMap::with_seed(seed);
        for &k in &keys {
            map.put(k, k.wrapping_neg()).unwrap();
        }
        prop_assert_eq!(keys.len(), map.len());

        let copy = map.clone();
        for &k in &removal_order {
            prop_assert_eq!(Ok(k.wrapping_neg()), map.remove(&k));
        }

        prop_assert!(map.is_empty());
        prop_assert!(!map.cursor().has_next());
        prop_assert_eq!(keys.len(), copy.len());
        prop_assert!(copy.iter().map(|(k, _)| *k).eq(keys.iter().copied()));
    }
}
