use std::fmt;
use std::iter::FusedIterator;
use std::marker::PhantomData;
use std::ops::ControlFlow;

use crate::node::{Entry, Link, Node, Side};
use crate::ThreadedTree;

/// Where a node sits relative to the root, as seen by a preorder walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub depth: usize,
    /// Side of the parent the node hangs from, `None` for the root.
    pub side: Option<Side>,
}

impl<K, V> ThreadedTree<K, V> {
    /// Visits every entry in ascending key order by following threads.
    ///
    /// Returning `ControlFlow::Break` from `visit` stops the walk and the
    /// break value is handed back.
    pub fn traverse_inorder<B, F>(&self, mut visit: F) -> Option<B>
    where
        F: FnMut(&K, &V) -> ControlFlow<B>,
    {
        let mut cursor = self.first();
        while let Some(node) = cursor {
            {
                let data = node.get();
                if let ControlFlow::Break(result) = visit(&data.key, &data.value) {
                    return Some(result);
                }
            }
            cursor = node.neighbour(Side::Right);
        }
        None
    }

    /// Visits every entry root first, descending through child links only.
    pub fn traverse_preorder<B, F>(&self, mut visit: F) -> Option<B>
    where
        F: FnMut(Position, &K, &V) -> ControlFlow<B>,
    {
        let mut stack: Vec<(Node<K, V>, Position)> = self
            .root
            .iter()
            .map(|root| {
                let position = Position {
                    depth: 0,
                    side: None,
                };
                (root.shallow_clone(), position)
            })
            .collect();

        while let Some((node, position)) = stack.pop() {
            let data = node.get();
            if let ControlFlow::Break(result) = visit(position, &data.key, &data.value) {
                return Some(result);
            }

            for side in [Side::Right, Side::Left] {
                if let Some(child) = data.link(side).child() {
                    let position = Position {
                        depth: position.depth + 1,
                        side: Some(side),
                    };
                    stack.push((child.shallow_clone(), position));
                }
            }
        }
        None
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            next: self.first(),
            remaining: self.length,
            _tree: PhantomData,
        }
    }

    /// Preorder dump of the tree shape, one node per line.
    ///
    /// ```text
    /// 5/a
    ///   L 3/b
    ///     R 3/d
    ///   R 8/c
    /// ```
    pub fn preorder(&self) -> Preorder<'_, K, V> {
        Preorder { tree: self }
    }

    pub fn print_preorder(&self) -> String
    where
        K: fmt::Display,
        V: fmt::Display,
    {
        self.preorder().to_string()
    }

    /// Number of nodes reachable by the threaded walk.
    pub(crate) fn count(&self) -> usize {
        let mut count = 0;
        self.traverse_inorder(|_, _| {
            count += 1;
            ControlFlow::<()>::Continue(())
        });
        count
    }

    fn first(&self) -> Option<Node<K, V>> {
        let root = self.root.as_ref()?;
        Some(root.shallow_clone().descend(Side::Left).0)
    }
}

/// Rebuilds every thread below `root`, assuming all child links are in place.
pub(crate) fn thread_subtree<K, V>(root: &Node<K, V>) {
    let mut stack = Vec::new();
    let mut cursor = Some(root.shallow_clone());
    let mut prev: Option<Node<K, V>> = None;

    loop {
        while let Some(node) = cursor {
            cursor = node.child_on(Side::Left);
            stack.push(node);
        }
        let Some(node) = stack.pop() else { break };
        cursor = node.child_on(Side::Right);

        {
            let mut data = node.get_mut();
            if !data.left.is_child() {
                data.left = prev.as_ref().map_or(Link::Empty, Link::thread_to);
            }
        }
        if let Some(prev) = &prev {
            let mut data = prev.get_mut();
            if !data.right.is_child() {
                data.right = Link::thread_to(&node);
            }
        }
        prev = Some(node);
    }

    if let Some(last) = prev {
        let mut data = last.get_mut();
        if !data.right.is_child() {
            data.right = Link::Empty;
        }
    }
}

/// Inorder iterator over a [`ThreadedTree`], created by [`ThreadedTree::iter`].
pub struct Iter<'a, K, V> {
    next: Option<Node<K, V>>,
    remaining: usize,
    _tree: PhantomData<&'a ThreadedTree<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = Entry<'a, K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next.take()?;
        self.next = node.neighbour(Side::Right);
        self.remaining = self.remaining.saturating_sub(1);
        Some(Entry::new(node))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V> IntoIterator for &'a ThreadedTree<K, V> {
    type Item = Entry<'a, K, V>;
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Display adapter returned by [`ThreadedTree::preorder`].
pub struct Preorder<'a, K, V> {
    tree: &'a ThreadedTree<K, V>,
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Preorder<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed = self.tree.traverse_preorder(|position, key, value| {
            let tag = match position.side {
                None => "",
                Some(Side::Left) => "L ",
                Some(Side::Right) => "R ",
            };
            let indent = position.depth * 2;
            match writeln!(f, "{:indent$}{tag}{key}/{value}", "") {
                Ok(()) => ControlFlow::Continue(()),
                Err(err) => ControlFlow::Break(err),
            }
        });

        match failed {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}
