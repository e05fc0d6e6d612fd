//! An unbalanced binary search tree with threaded links.
//!
//! Every node that lacks a left or right child keeps a non-owning link to its
//! inorder predecessor or successor in that slot instead, so the whole tree can
//! be walked in order without a stack or parent pointers.
//!
//! ```
//! use tbst::ThreadedTree;
//!
//! let mut tree = ThreadedTree::new();
//! for (key, value) in [(5, 'a'), (3, 'b'), (8, 'c')] {
//!     tree.insert(key, value);
//! }
//!
//! let keys: Vec<u8> = tree.iter().map(|entry| *entry.key()).collect();
//! assert_eq!(keys, [3, 5, 8]);
//!
//! let encoded = tree.encode().unwrap();
//! assert_eq!(encoded, "5a3b//8c//");
//!
//! let mut copy = ThreadedTree::<u8, char>::new();
//! copy.decode(&encoded).unwrap();
//! assert_eq!(copy.len(), 3);
//! ```

#![cfg_attr(feature = "unchecked", allow(unused_mut))]

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::mem;
use std::ops::ControlFlow;

#[cfg_attr(feature = "unchecked", path = "shared_unchecked.rs")]
#[cfg_attr(not(feature = "unchecked"), path = "shared_checked.rs")]
mod shared;

mod codec;
mod error;
mod node;
mod traverse;

pub use codec::Format;
pub use error::{DecodeError, DecodeErrorKind, EncodeError, Error};
pub use node::{Entry, Side};
pub use shared::Ref;
pub use traverse::{Iter, Position, Preorder};

use node::{Link, Node};

/// Binary search tree whose empty child slots hold threads to the
/// inorder neighbours.
///
/// Equal keys are allowed. A key equal to an existing one is placed to the
/// right of it, so equal keys come out of the inorder walk in insertion order.
pub struct ThreadedTree<K, V> {
    root: Option<Node<K, V>>,
    length: usize,
}

impl<K, V> ThreadedTree<K, V> {
    #[inline]
    pub fn new() -> Self {
        ThreadedTree {
            root: None,
            length: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Drops every node, following child links only.
    pub fn clear(&mut self) {
        let mut stack: Vec<Node<K, V>> = self.root.take().into_iter().collect();
        while let Some(node) = stack.pop() {
            let mut data = node.get_mut();
            for side in [Side::Left, Side::Right] {
                if let Link::Child(child) = mem::replace(data.link_mut(side), Link::Empty) {
                    stack.push(child);
                }
            }
        }
        self.length = 0;
    }
}

impl<K: Ord, V> ThreadedTree<K, V> {
    pub fn singleton(key: K, value: V) -> Self {
        ThreadedTree {
            root: Some(Node::leaf(key, value)),
            length: 1,
        }
    }

    pub fn insert(&mut self, key: K, value: V) {
        let mut node = match self.root.as_ref().map(Node::shallow_clone) {
            Some(root) => root,
            None => {
                self.root = Some(Node::leaf(key, value));
                self.length = 1;
                return;
            }
        };

        loop {
            let side = if key < node.get().key {
                Side::Left
            } else {
                Side::Right
            };

            match node.child_on(side) {
                Some(next) => node = next,
                None => {
                    let mut parent = node.get_mut();
                    // The new leaf takes over the parent's thread on this side
                    // and threads back to the parent on the other.
                    let inherited = mem::replace(parent.link_mut(side), Link::Empty);
                    let back = Link::thread_to(&node);
                    let leaf = match side {
                        Side::Left => Node::new(key, value, inherited, back),
                        Side::Right => Node::new(key, value, back, inherited),
                    };
                    *parent.link_mut(side) = Link::Child(leaf);
                    break;
                }
            }
        }

        self.length += 1;
    }

    /// Looks up an entry. With equal keys, the one closest to the root wins.
    pub fn find<Q>(&self, query: &Q) -> Option<Entry<'_, K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_with_parent(query)
            .map(|(node, _)| Entry::new(node))
    }

    #[inline]
    pub fn contains_key<Q>(&self, query: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_with_parent(query).is_some()
    }

    /// Removes the entry `find` would return and gives back its value.
    pub fn remove<Q>(&mut self, query: &Q) -> Result<V, Error>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let (node, parent) = self.find_with_parent(query).ok_or(Error::KeyNotFound)?;

        let (has_left, has_right) = {
            let data = node.get();
            (data.left.is_child(), data.right.is_child())
        };

        let (_, value) = if has_left && has_right {
            log::trace!("removing a node with two children through its successor");

            let Some(right) = node.child_on(Side::Right) else {
                shared::unreachable!("node was checked to have a right child")
            };
            let (successor, successor_parent) = right.descend(Side::Left);
            let successor_parent = match successor_parent {
                Some(parent) => (parent, Side::Left),
                None => (node.shallow_clone(), Side::Right),
            };

            // Relabel the node with its successor's entry. The successor node
            // then carries the removed entry out of the tree.
            {
                let mut data = node.get_mut();
                let mut next = successor.get_mut();
                mem::swap(&mut data.key, &mut next.key);
                mem::swap(&mut data.value, &mut next.value);
            }

            self.unlink(successor, Some(successor_parent))
        } else {
            self.unlink(node, parent)
        };

        self.length -= 1;
        Ok(value)
    }

    /// Returns the matching node together with its structural parent and
    /// the side of the parent it hangs from.
    fn find_with_parent<Q>(&self, query: &Q) -> Option<(Node<K, V>, Option<(Node<K, V>, Side)>)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut node = self.root.as_ref()?.shallow_clone();
        let mut parent = None;

        loop {
            let ordering = query.cmp(<K as Borrow<Q>>::borrow(&node.get().key));
            let side = match ordering {
                Ordering::Equal => return Some((node, parent)),
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };

            let next = node.child_on(side)?;
            parent = Some((mem::replace(&mut node, next), side));
        }
    }

    /// Detaches a node with at most one child and returns its entry.
    fn unlink(&mut self, node: Node<K, V>, parent: Option<(Node<K, V>, Side)>) -> (K, V) {
        let replacement = {
            let mut data = node.get_mut();
            match (data.left.is_child(), data.right.is_child()) {
                (false, false) => {
                    log::trace!("unlinking a leaf");
                    // The parent inherits the leaf's thread on the side the
                    // leaf hung from.
                    match &parent {
                        Some((_, side)) => mem::replace(data.link_mut(*side), Link::Empty),
                        None => Link::Empty,
                    }
                }
                (true, true) => shared::unreachable!("can't unlink a node with two children"),
                (has_left, _) => {
                    log::trace!("unlinking a node with one child");
                    let side = if has_left { Side::Left } else { Side::Right };
                    let inherited = mem::replace(data.link_mut(side.opposite()), Link::Empty);
                    let child = mem::replace(data.link_mut(side), Link::Empty);

                    // The far edge of the spliced subtree threaded to the
                    // removed node; point it past the node instead.
                    if let Some(subtree) = child.child() {
                        let (edge, _) = subtree.shallow_clone().descend(side.opposite());
                        *edge.get_mut().link_mut(side.opposite()) = inherited;
                    }

                    child
                }
            }
        };

        match parent {
            Some((parent, side)) => *parent.get_mut().link_mut(side) = replacement,
            None => self.root = replacement.into_child(),
        }

        node.into_entry()
    }
}

impl<K, V> Drop for ThreadedTree<K, V> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<K, V> Default for ThreadedTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies the tree shape node by node, then threads the copy.
impl<K: Clone, V: Clone> Clone for ThreadedTree<K, V> {
    fn clone(&self) -> Self {
        let Some(root) = &self.root else {
            return Self::new();
        };

        let copy = |node: &Node<K, V>| {
            let data = node.get();
            Node::leaf(data.key.clone(), data.value.clone())
        };

        let mut tree = ThreadedTree {
            root: Some(copy(root)),
            length: self.length,
        };

        if let Some(new_root) = &tree.root {
            let mut stack = vec![(root.shallow_clone(), new_root.shallow_clone())];
            while let Some((source, target)) = stack.pop() {
                for side in [Side::Left, Side::Right] {
                    if let Some(child) = source.child_on(side) {
                        let twin = copy(&child);
                        *target.get_mut().link_mut(side) = Link::Child(twin.shallow_clone());
                        stack.push((child, twin));
                    }
                }
            }
            traverse::thread_subtree(new_root);
        }

        tree.length = tree.count();
        tree
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for ThreadedTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = ThreadedTree::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for ThreadedTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ThreadedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        self.traverse_inorder(|key, value| {
            map.entry(key, value);
            ControlFlow::<()>::Continue(())
        });
        map.finish()
    }
}
