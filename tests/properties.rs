//! Property-based tests for ThreadedTree.
//!
//! Every law is checked against a sorted `Vec` model: equal keys are kept in
//! insertion order, which is where the tree places them.

use proptest::prelude::*;
use tbst::{Error, Format, ThreadedTree};

fn entries<K: Clone, V: Clone>(tree: &ThreadedTree<K, V>) -> Vec<(K, V)> {
    tree.iter()
        .map(|entry| (entry.key().clone(), entry.value().clone()))
        .collect()
}

fn model<K: Ord + Clone, V: Clone>(pairs: &[(K, V)]) -> Vec<(K, V)> {
    let mut sorted = pairs.to_vec();
    // Stable, so duplicates keep their insertion order.
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    sorted
}

fn compact_pairs(max_size: usize) -> impl Strategy<Value = Vec<(u8, char)>> {
    prop::collection::vec((0u8..10, prop::char::range('a', 'z')), 0..max_size)
}

// =============================================================================
// Ordering and Size
// =============================================================================

proptest! {
    /// Inorder traversal yields the entries sorted by key.
    #[test]
    fn prop_inorder_is_sorted(pairs in prop::collection::vec((any::<i16>(), any::<u32>()), 0..200)) {
        let tree: ThreadedTree<i16, u32> = pairs.iter().copied().collect();
        prop_assert_eq!(entries(&tree), model(&pairs));
    }

    /// The stored length always matches a full walk.
    #[test]
    fn prop_len_matches_walk(pairs in prop::collection::vec((0u8..32, any::<u8>()), 0..100)) {
        let tree: ThreadedTree<u8, u8> = pairs.iter().copied().collect();
        prop_assert_eq!(tree.len(), pairs.len());
        prop_assert_eq!(tree.iter().count(), tree.len());
    }

    /// Every inserted key can be found.
    #[test]
    fn prop_find_after_insert(pairs in prop::collection::vec((any::<i32>(), any::<i32>()), 1..100)) {
        let tree: ThreadedTree<i32, i32> = pairs.iter().copied().collect();
        for (key, _) in &pairs {
            let entry = tree.find(key);
            prop_assert!(entry.is_some());
            prop_assert_eq!(*entry.unwrap().key(), *key);
        }
    }
}

// =============================================================================
// Remove Laws
// =============================================================================

proptest! {
    /// Removing a unique key makes it unreachable and shrinks the tree by one.
    #[test]
    fn prop_remove_unique_key(
        keys in prop::collection::btree_set(any::<u16>(), 1..100),
        pick in any::<prop::sample::Index>()
    ) {
        let keys: Vec<u16> = keys.into_iter().collect();
        let target = keys[pick.index(keys.len())];
        let mut tree: ThreadedTree<u16, u16> = keys.iter().map(|&key| (key, key)).collect();

        prop_assert_eq!(tree.remove(&target), Ok(target));
        prop_assert!(tree.find(&target).is_none());
        prop_assert_eq!(tree.len(), keys.len() - 1);

        let remaining: Vec<u16> = tree.iter().map(|entry| *entry.key()).collect();
        let expected: Vec<u16> = keys.iter().copied().filter(|&key| key != target).collect();
        prop_assert_eq!(remaining, expected);
    }

    /// Removing an absent key fails and changes nothing.
    #[test]
    fn prop_remove_absent_key(pairs in prop::collection::vec((0u8..50, any::<u8>()), 0..50), key in 50u8..) {
        let mut tree: ThreadedTree<u8, u8> = pairs.iter().copied().collect();
        let before = entries(&tree);

        prop_assert_eq!(tree.remove(&key), Err(Error::KeyNotFound));
        prop_assert_eq!(entries(&tree), before);
    }

    /// Draining every key in any order empties the tree.
    #[test]
    fn prop_remove_all(pairs in prop::collection::vec((0u8..20, any::<u8>()), 0..80), seed in any::<u64>()) {
        let mut tree: ThreadedTree<u8, u8> = pairs.iter().copied().collect();
        let mut keys: Vec<u8> = pairs.iter().map(|&(key, _)| key).collect();
        keys.sort_by_key(|&key| (key as u64).wrapping_mul(seed | 1).rotate_left(17));

        for (removed, key) in keys.iter().enumerate() {
            prop_assert!(tree.remove(key).is_ok());
            prop_assert_eq!(tree.len(), pairs.len() - removed - 1);
        }
        prop_assert!(tree.is_empty());
        prop_assert_eq!(tree.iter().next().map(|_| ()), None);
    }
}

// =============================================================================
// Encode/Decode Laws
// =============================================================================

proptest! {
    /// decode(encode(t)) reproduces the entries and the shape.
    #[test]
    fn prop_compact_round_trip(pairs in compact_pairs(40)) {
        let tree: ThreadedTree<u8, char> = pairs.iter().copied().collect();
        let encoded = tree.encode().unwrap();

        let mut copy = ThreadedTree::new();
        copy.decode(&encoded).unwrap();

        prop_assert_eq!(copy.len(), tree.len());
        prop_assert_eq!(entries(&copy), entries(&tree));
        prop_assert_eq!(copy.print_preorder(), tree.print_preorder());
        prop_assert_eq!(copy.encode().unwrap(), encoded);
    }

    /// The framed format carries arbitrary keys and values.
    #[test]
    fn prop_framed_round_trip(pairs in prop::collection::vec((any::<i64>(), ".{0,8}"), 0..40)) {
        let tree: ThreadedTree<i64, String> = pairs.iter().cloned().collect();
        let encoded = tree.encode_with(Format::Framed).unwrap();

        let mut copy = ThreadedTree::new();
        copy.decode_with(Format::Framed, &encoded).unwrap();

        prop_assert_eq!(entries(&copy), entries(&tree));
        prop_assert_eq!(copy.encode_with(Format::Framed).unwrap(), encoded);
    }

    /// Round-tripping survives removals in between.
    #[test]
    fn prop_round_trip_after_removals(pairs in compact_pairs(40), removals in prop::collection::vec(0u8..10, 0..20)) {
        let mut tree: ThreadedTree<u8, char> = pairs.iter().copied().collect();
        for key in &removals {
            let _ = tree.remove(key);
        }

        let mut copy = ThreadedTree::new();
        copy.decode(&tree.encode().unwrap()).unwrap();
        prop_assert_eq!(entries(&copy), entries(&tree));
        prop_assert_eq!(copy.len(), tree.len());
    }

    /// Arbitrary text never panics the decoder.
    #[test]
    fn prop_decode_never_panics(input in "[0-9a-z/:]{0,24}") {
        let mut tree = ThreadedTree::<u8, char>::new();
        let _ = tree.decode(&input);
        let _ = tree.decode_with(Format::Framed, &input);
        prop_assert_eq!(tree.iter().count(), tree.len());
    }
}
