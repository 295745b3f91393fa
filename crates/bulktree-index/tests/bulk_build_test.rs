//! Bulk build and query integration tests.
//!
//! Covers:
//! - Fixed scenarios: duplicates across a leaf boundary, strictly increasing
//!   keys, all-identical keys, probes outside the key range
//! - Randomized comparison of every query against a linear-scan model
//! - Structural invariants across capacities
//! - Sharing a built tree between threads

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::thread;

use bulktree_index::{
    build_bulk, BulkTree, BulkTreeError, IndexConfig, IndexEntry, LessThan, RowId,
};

// =============================================================================
// Helpers
// =============================================================================

/// Entries whose row id is their position in the input.
fn positional(keys: &[i64]) -> Vec<IndexEntry<i64>> {
    keys.iter()
        .enumerate()
        .map(|(i, &k)| IndexEntry::new(k, i as RowId))
        .collect()
}

fn build(entries: &[IndexEntry<i64>], capacity: usize) -> BulkTree<i64> {
    BulkTree::build(entries, &IndexConfig::with_capacity(capacity)).unwrap()
}

/// Linear-scan answers over the raw input.
struct Model<'a> {
    entries: &'a [IndexEntry<i64>],
}

impl<'a> Model<'a> {
    fn first_ge(&self, key: i64) -> usize {
        self.entries
            .iter()
            .position(|e| e.key >= key)
            .unwrap_or(self.entries.len())
    }

    fn lookup(&self, key: i64) -> Option<RowId> {
        self.entries.iter().find(|e| e.key == key).map(|e| e.row_id)
    }

    fn greater_or_equal(&self, key: i64) -> Option<RowId> {
        self.entries.get(self.first_ge(key)).map(|e| e.row_id)
    }

    fn less_than(&self, key: i64) -> LessThan {
        let position = self.first_ge(key);
        if position == self.entries.len() {
            LessThan::EndOfKeyspace
        } else if position == 0 {
            LessThan::NotFound
        } else {
            LessThan::Found(self.entries[position - 1].row_id)
        }
    }

    fn duplicates(&self, key: i64) -> Vec<RowId> {
        self.entries
            .iter()
            .filter(|e| e.key == key)
            .map(|e| e.row_id)
            .collect()
    }
}

/// Sorted keys with random gaps and random duplicate runs.
fn random_keys(rng: &mut StdRng, len: usize, max_run: usize) -> Vec<i64> {
    let mut keys = Vec::with_capacity(len);
    let mut key: i64 = rng.gen_range(-50..50);
    while keys.len() < len {
        let run = rng.gen_range(1..=max_run).min(len - keys.len());
        keys.extend(std::iter::repeat(key).take(run));
        key += rng.gen_range(1..5);
    }
    keys
}

fn assert_matches_model(tree: &BulkTree<i64>, entries: &[IndexEntry<i64>]) {
    let model = Model { entries };
    let min = entries[0].key;
    let max = entries[entries.len() - 1].key;
    for key in (min - 3)..=(max + 3) {
        assert_eq!(tree.lookup(&key), model.lookup(key), "lookup({key})");
        assert_eq!(
            tree.greater_or_equal(&key),
            model.greater_or_equal(key),
            "greater_or_equal({key})"
        );
        assert_eq!(tree.less_than(&key), model.less_than(key), "less_than({key})");
        assert_eq!(
            tree.duplicates(&key).collect::<Vec<_>>(),
            model.duplicates(key),
            "duplicates({key})"
        );
    }
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_duplicate_across_leaf_boundary() {
    let entries: Vec<IndexEntry<i64>> =
        vec![(1, 0).into(), (3, 1).into(), (3, 2).into(), (5, 3).into()];
    let tree = build(&entries, 2);

    assert_eq!(tree.lookup(&3), Some(1));
    assert_eq!(tree.greater_or_equal(&4), Some(3));
    assert_eq!(tree.less_than(&3), LessThan::Found(0));

    assert_eq!(tree.stats().overflow_leaves, 1);
    assert_eq!(tree.duplicates(&3).collect::<Vec<_>>(), vec![1, 2]);
    tree.check_invariants().unwrap();
}

#[test]
fn test_strictly_increasing_keys() {
    let keys: Vec<i64> = (0..100).map(|k| k * 10).collect();
    let entries = positional(&keys);
    let tree = build(&entries, 4);

    let stats = tree.stats();
    assert_eq!(stats.indexed_leaves, 25);
    assert_eq!(stats.overflow_leaves, 0);
    // 25 leaves under inner nodes that keep at least 3 children after a
    // split: a handful of levels, not a chain.
    assert!(tree.height() >= 3, "height {}", tree.height());
    assert!(tree.height() <= 6, "height {}", tree.height());

    for (i, &key) in keys.iter().enumerate() {
        assert_eq!(tree.lookup(&key), Some(i as RowId), "lookup({key})");
    }
    for key in [-1, 5, 15, 995, 1000, 12345] {
        assert_eq!(tree.lookup(&key), None, "lookup({key})");
    }
    tree.check_invariants().unwrap();
}

#[test]
fn test_all_keys_identical() {
    let entries = positional(&[42; 50]);
    let tree = build(&entries, 4);

    let stats = tree.stats();
    assert_eq!(stats.indexed_leaves, 1);
    assert_eq!(stats.overflow_leaves, 12);
    assert_eq!(tree.height(), 2);

    assert_eq!(tree.lookup(&42), Some(0));
    assert_eq!(tree.greater_or_equal(&42), Some(0));
    assert_eq!(tree.greater_or_equal(&41), Some(0));
    assert_eq!(tree.less_than(&42), LessThan::NotFound);
    assert_eq!(tree.less_than(&43), LessThan::EndOfKeyspace);

    let all: Vec<RowId> = tree.duplicates(&42).collect();
    assert_eq!(all, (0..50).collect::<Vec<RowId>>());

    let leaves: Vec<bool> = tree.leaves().map(|(_, leaf)| leaf.is_overflow()).collect();
    assert!(!leaves[0]);
    assert!(leaves[1..].iter().all(|&overflow| overflow));
    tree.check_invariants().unwrap();
}

#[test]
fn test_probes_outside_key_range() {
    let entries = positional(&[10, 20, 20, 30, 40, 50]);
    for capacity in [2, 3, 8] {
        let tree = build(&entries, capacity);

        assert_eq!(tree.less_than(&5), LessThan::NotFound);
        assert_eq!(tree.greater_or_equal(&5), Some(0));
        assert_eq!(tree.lookup(&5), None);

        assert_eq!(tree.greater_or_equal(&51), None);
        assert_eq!(tree.less_than(&51), LessThan::EndOfKeyspace);
        assert_eq!(tree.lookup(&51), None);

        assert_eq!(tree.less_than(&10), LessThan::NotFound);
        assert_eq!(tree.less_than(&50), LessThan::Found(4));
    }
}

#[test]
fn test_duplicate_run_reaches_overflow_from_less_than() {
    // capacity 2: [1, 2] [2, 2](overflow) [2](overflow) [3, 4]
    let entries = positional(&[1, 2, 2, 2, 2, 3, 4]);
    let tree = build(&entries, 2);

    assert_eq!(tree.stats().overflow_leaves, 2);
    // 3 starts an indexed leaf; its predecessor is the tail of the overflow
    // run in front of it.
    assert_eq!(tree.less_than(&3), LessThan::Found(4));
    assert_eq!(tree.less_than(&2), LessThan::Found(0));
    assert_eq!(tree.greater_or_equal(&2), Some(1));
    assert_eq!(tree.duplicates(&2).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
    tree.check_invariants().unwrap();
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn test_first_occurrence_round_trip() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    for capacity in 2..10 {
        let keys = random_keys(&mut rng, 500, 12);
        let entries = positional(&keys);
        let tree = build(&entries, capacity);

        for (i, entry) in entries.iter().enumerate() {
            let first = i == 0 || entries[i - 1].key != entry.key;
            if first {
                assert_eq!(tree.lookup(&entry.key), Some(entry.row_id));
            }
        }
    }
}

#[test]
fn test_random_inputs_match_model() {
    let mut rng = StdRng::seed_from_u64(7);
    for round in 0..40 {
        let len = rng.gen_range(1..400);
        let max_run = if round % 4 == 0 { 1 } else { rng.gen_range(1..20) };
        let capacity = rng.gen_range(2..12);
        let keys = random_keys(&mut rng, len, max_run);
        let entries = positional(&keys);
        let tree = build(&entries, capacity);

        tree.check_invariants().unwrap();
        assert_matches_model(&tree, &entries);
    }
}

#[test]
fn test_caller_row_ids_are_preserved() {
    let pairs: Vec<(i64, RowId)> = vec![(1, 900), (1, 901), (2, 17), (8, 3), (8, 4), (9, 1)];
    let tree = BulkTree::from_pairs(&pairs, &IndexConfig::with_capacity(2)).unwrap();

    assert_eq!(tree.lookup(&1), Some(900));
    assert_eq!(tree.lookup(&8), Some(3));
    assert_eq!(tree.greater_or_equal(&3), Some(3));
    assert_eq!(tree.less_than(&8), LessThan::Found(17));
    assert_eq!(tree.duplicates(&1).collect::<Vec<_>>(), vec![900, 901]);

    let chained: Vec<(i64, RowId)> = tree.iter().map(|e| (e.key, e.row_id)).collect();
    assert_eq!(chained, pairs);
}

#[test]
fn test_queries_are_idempotent_and_build_is_deterministic() {
    let mut rng = StdRng::seed_from_u64(99);
    let keys = random_keys(&mut rng, 300, 6);
    let entries = positional(&keys);
    let config = IndexConfig::with_capacity(5);

    let a = build_bulk(&entries, &config).unwrap();
    let b = build_bulk(&entries, &config).unwrap();
    assert_eq!(a.stats(), b.stats());

    for key in keys.iter().copied().step_by(7) {
        let first = (a.lookup(&key), a.greater_or_equal(&key), a.less_than(&key));
        let again = (a.lookup(&key), a.greater_or_equal(&key), a.less_than(&key));
        let other = (b.lookup(&key), b.greater_or_equal(&key), b.less_than(&key));
        assert_eq!(first, again);
        assert_eq!(first, other);
    }
}

#[test]
fn test_range_from_yields_sorted_suffix() {
    let mut rng = StdRng::seed_from_u64(3);
    let keys = random_keys(&mut rng, 200, 8);
    let entries = positional(&keys);
    let tree = build(&entries, 3);

    for probe in [keys[0] - 1, keys[50], keys[199], keys[199] + 1] {
        let expected: Vec<RowId> = entries
            .iter()
            .filter(|e| e.key >= probe)
            .map(|e| e.row_id)
            .collect();
        let actual: Vec<RowId> = tree.range_from(&probe).map(|e| e.row_id).collect();
        assert_eq!(actual, expected, "range_from({probe})");
    }
}

// =============================================================================
// Configuration and errors
// =============================================================================

#[test]
fn test_build_errors() {
    let entries = positional(&[3, 2, 1]);
    let err = BulkTree::build(&entries, &IndexConfig::default()).unwrap_err();
    assert!(matches!(err, BulkTreeError::UnsortedInput { position: 1 }));

    let err = BulkTree::<i64>::build(&[], &IndexConfig::default()).unwrap_err();
    assert!(matches!(err, BulkTreeError::EmptyInput));

    let err = BulkTree::build(&positional(&[1]), &IndexConfig::with_capacity(0)).unwrap_err();
    assert!(matches!(err, BulkTreeError::InvalidCapacity { capacity: 0, min: 2, .. }));

    // Rejected before any node is allocated.
    let pairs = [(1i64, 0 as RowId), (2, 1)];
    let err = BulkTree::from_pairs(&pairs, &IndexConfig::with_capacity(usize::MAX)).unwrap_err();
    assert!(matches!(err, BulkTreeError::InvalidCapacity { capacity: usize::MAX, .. }));
}

#[test]
fn test_config_from_json() {
    let config = IndexConfig::from_json(r#"{"node_capacity": 3, "validate_input": false}"#).unwrap();
    let tree = build_bulk(&positional(&[1, 2, 3, 4, 5, 6, 7]), &config).unwrap();
    assert_eq!(tree.capacity(), 3);
    assert!(!tree.config().validate_input);
    assert_eq!(tree.stats().indexed_leaves, 3);
}

#[test]
fn test_trace_index_without_subscriber() {
    let entries = positional(&[1, 1, 2, 3]);
    let tree = build(&entries, 2);
    tree.trace_index(&entries);
    assert_eq!(tree.lookup(&1), Some(0));
}

#[test]
fn test_trees_with_different_capacities_coexist() {
    let entries = positional(&(0..64).collect::<Vec<_>>());
    let small = build(&entries, 2);
    let large = build(&entries, 32);

    assert_eq!(small.capacity(), 2);
    assert_eq!(large.capacity(), 32);
    assert!(small.height() > large.height());
    for key in 0..64 {
        assert_eq!(small.lookup(&key), large.lookup(&key));
    }
}

// =============================================================================
// Sharing
// =============================================================================

#[test]
fn test_shared_reads_across_threads() {
    let keys: Vec<i64> = (0..2_000).map(|k| k / 3).collect();
    let entries = positional(&keys);
    let tree = Arc::new(build(&entries, 16));

    let handles: Vec<_> = (0..4)
        .map(|t| {
            let tree = Arc::clone(&tree);
            thread::spawn(move || {
                for key in (t..667).step_by(4) {
                    assert_eq!(tree.lookup(&(key as i64)), Some(key as RowId * 3));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
}
