#![cfg(test)]

// Property tests for ChainedHashMap kept inside the crate so every step can
// also check the table's internal layout (bin placement, chaining once).

use crate::chained_hash_map::ChainedHashMap;
use crate::config::MapConfig;
use crate::error::ErrorKind;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

#[derive(Clone, Debug)]
enum Op {
    Put(usize, i32),
    Erase(usize),
    Get(usize),
    GetOrDefault(usize),
    HasValue(i32),
    Clear,
    Iterate,
    /// Walk a cursor over the whole map, erasing entries whose value parity
    /// matches.
    CursorSweep(bool),
}

// Keys are drawn from a small pool so puts overwrite and erases hit often.
fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            6 => (idx.clone(), -50i32..50).prop_map(|(i, v)| Op::Put(i, v)),
            2 => idx.clone().prop_map(Op::Erase),
            2 => idx.clone().prop_map(Op::Get),
            1 => idx.clone().prop_map(Op::GetOrDefault),
            1 => (-50i32..50).prop_map(Op::HasValue),
            1 => Just(Op::Clear),
            1 => Just(Op::Iterate),
            1 => any::<bool>().prop_map(Op::CursorSweep),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

fn byte_sum(k: &String) -> i64 {
    k.bytes().map(i64::from).sum::<i64>() - 300
}

fn constant(_: &String) -> i64 {
    0
}

fn fail(e: crate::MapError) -> TestCaseError {
    TestCaseError::fail(e.to_string())
}

// State-machine equivalence against std::collections::HashMap.
// After every op:
// - every entry sits in the bin its hash compresses to, chained once;
// - len() equals the model's size and the number of iterated entries;
// - len / bins <= load_threshold;
// - every model key is retrievable with its model value.
fn run(
    mut sut: ChainedHashMap<String, i32>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        let before = sut.mod_count();
        match op {
            Op::Put(i, v) => {
                let k = pool[i].clone();
                let prev = sut.put(k.clone(), v);
                prop_assert_eq!(prev, model.insert(k, v));
                if prev.is_some() {
                    prop_assert_eq!(sut.mod_count(), before, "overwrite is not structural");
                } else {
                    prop_assert!(sut.mod_count() > before);
                }
            }
            Op::Erase(i) => {
                let k = &pool[i];
                match (sut.erase(k), model.remove(k)) {
                    (Ok(v), Some(mv)) => {
                        prop_assert_eq!(v, mv);
                        prop_assert_eq!(sut.mod_count(), before + 1);
                    }
                    (Err(e), None) => {
                        prop_assert_eq!(e.kind(), ErrorKind::NotFound);
                        prop_assert_eq!(sut.mod_count(), before);
                    }
                    (got, want) => {
                        prop_assert!(false, "erase mismatch: {:?} vs {:?}", got, want);
                    }
                }
                prop_assert!(!sut.has_key(k));
            }
            Op::Get(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.get(k), model.get(k));
                prop_assert_eq!(sut.has_key(k), model.contains_key(k));
            }
            Op::GetOrDefault(i) => {
                let k = pool[i].clone();
                let expected = *model.entry(k.clone()).or_default();
                prop_assert_eq!(*sut.get_or_insert_default(k), expected);
            }
            Op::HasValue(v) => {
                prop_assert_eq!(sut.has_value(&v), model.values().any(|&mv| mv == v));
            }
            Op::Clear => {
                let bins = sut.bins();
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.bins(), bins, "clear keeps the bin count");
                prop_assert_eq!(sut.mod_count(), before + 1);
            }
            Op::Iterate => {
                let s: BTreeSet<_> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m: BTreeSet<_> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s, m);
            }
            Op::CursorSweep(even) => {
                let expected_visits = sut.len();
                let mut visited = 0;
                let mut c = sut.cursor();
                while !c.is_end() {
                    let v = *c.value(&sut).map_err(fail)?;
                    visited += 1;
                    if (v.rem_euclid(2) == 0) == even {
                        let (k, removed) = c.erase(&mut sut).map_err(fail)?;
                        prop_assert_eq!(model.remove(&k), Some(removed));
                    }
                    c.advance(&sut).map_err(fail)?;
                }
                prop_assert_eq!(visited, expected_visits, "cursor visits each entry once");
            }
        }

        sut.table().assert_consistent();
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.iter().count(), sut.len());
        prop_assert!(sut.load_factor() <= sut.load_threshold());
        for (k, v) in &model {
            prop_assert_eq!(sut.get(k), Some(v));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(
        (pool, ops) in arb_scenario(),
        bins in 1usize..=4,
        threshold in 0.25f64..3.0,
    ) {
        let sut = ChainedHashMap::with_config(
            MapConfig::new()
                .with_hash(byte_sum)
                .with_initial_bins(bins)
                .with_load_threshold(threshold),
        )
        .unwrap();
        run(sut, &pool, ops)?;
    }
}

// Same invariants with every key hashing to 0: one long chain in bin 0 no
// matter how often the table grows.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut = ChainedHashMap::with_hash(constant).unwrap();
        run(sut, &pool, ops)?;
    }
}
