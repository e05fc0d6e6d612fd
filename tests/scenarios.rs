use std::ops::ControlFlow;

use tbst::{DecodeErrorKind, Error, Format, Side, ThreadedTree};

fn pairs(tree: &ThreadedTree<u8, char>) -> Vec<(u8, char)> {
    tree.iter()
        .map(|entry| (*entry.key(), *entry.value()))
        .collect()
}

#[test]
fn duplicate_key_goes_right() {
    let mut tree = ThreadedTree::new();
    for (key, value) in [5, 3, 8, 3, 9].into_iter().zip(['a', 'b', 'c', 'd', 'e']) {
        tree.insert(key, value);
    }

    assert_eq!(
        pairs(&tree),
        [(3, 'b'), (3, 'd'), (5, 'a'), (8, 'c'), (9, 'e')]
    );
    assert_eq!(tree.len(), 5);

    let mut right_children = Vec::new();
    tree.traverse_preorder(|position, &key, _| {
        if position.side == Some(Side::Right) {
            right_children.push(key);
        }
        ControlFlow::<()>::Continue(())
    });
    assert_eq!(right_children, [3, 8, 9]);
}

#[test]
fn encode_decode_into_fresh_tree() {
    let tree: ThreadedTree<u8, char> = [2, 1, 3].into_iter().zip(['x', 'y', 'z']).collect();
    let encoded = tree.encode().unwrap();

    let mut fresh = ThreadedTree::new();
    fresh.decode(&encoded).unwrap();

    assert_eq!(pairs(&fresh), pairs(&tree));
    assert_eq!(fresh.len(), 3);
}

#[test]
fn remove_missing_leaves_tree_alone() {
    let mut empty = ThreadedTree::<u8, char>::new();
    assert_eq!(empty.remove(&4), Err(Error::KeyNotFound));
    assert_eq!(empty.len(), 0);

    let mut tree = ThreadedTree::singleton(4u8, 'k');
    assert_eq!(tree.remove(&5), Err(Error::KeyNotFound));
    assert_eq!(tree.len(), 1);
    assert_eq!(pairs(&tree), [(4, 'k')]);
}

#[test]
fn remove_duplicates_one_at_a_time() {
    let mut tree: ThreadedTree<u8, char> = [(4, 'a'), (4, 'b'), (2, 'c'), (4, 'd')].into_iter().collect();

    assert_eq!(tree.remove(&4), Ok('a'));
    assert_eq!(pairs(&tree), [(2, 'c'), (4, 'b'), (4, 'd')]);
    assert_eq!(tree.remove(&4), Ok('b'));
    assert_eq!(tree.remove(&4), Ok('d'));
    assert_eq!(tree.remove(&4), Err(Error::KeyNotFound));
    assert_eq!(pairs(&tree), [(2, 'c')]);
}

#[test]
fn find_and_contains() {
    let tree: ThreadedTree<String, u32> = [("m", 1), ("c", 2), ("x", 3)]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect();

    assert_eq!(*tree.find("c").unwrap().value(), 2);
    assert!(tree.contains_key("x"));
    assert!(!tree.contains_key("a"));
    assert_eq!(format!("{tree:?}"), r#"{"c": 2, "m": 1, "x": 3}"#);
}

#[test]
fn clear_then_reuse() {
    let mut tree: ThreadedTree<u8, char> = (0..10).zip('a'..).collect();
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.encode().unwrap(), "/");

    tree.insert(1, 'z');
    assert_eq!(pairs(&tree), [(1, 'z')]);
}

#[test]
fn decode_error_reports_offset() {
    let mut tree = ThreadedTree::<u8, char>::new();
    let err = tree.decode("5a3b//8c/").unwrap_err();
    assert_eq!(err.kind, DecodeErrorKind::UnexpectedEnd);
    assert_eq!(err.offset, 9);
    assert_eq!(err.to_string(), "unexpected end of input at offset 9");

    let err = tree.decode_with(Format::Framed, "1:5").unwrap_err();
    assert_eq!(Error::from(err.clone()), Error::Decode(err));
}
