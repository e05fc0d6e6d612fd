use std::fmt;
use std::marker::PhantomData;
use std::mem;

use crate::shared::{self, RcCell, Ref, RefMut, WeakCell};

/// Which side of its parent a node hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// One side of a node.
///
/// `Child` owns the subtree below it. `Thread` points at the inorder
/// predecessor (left side) or successor (right side) without owning it.
/// `Empty` is only found left of the minimum and right of the maximum.
pub(crate) enum Link<K, V> {
    Empty,
    Child(Node<K, V>),
    Thread(WeakCell<NodeData<K, V>>),
}

pub(crate) struct NodeData<K, V> {
    pub key: K,
    pub value: V,
    pub left: Link<K, V>,
    pub right: Link<K, V>,
}

pub(crate) struct Node<K, V>(RcCell<NodeData<K, V>>);

impl<K, V> Link<K, V> {
    pub fn thread_to(node: &Node<K, V>) -> Self {
        Link::Thread(node.0.downgrade())
    }

    pub fn is_child(&self) -> bool {
        matches!(self, Link::Child(_))
    }

    pub fn child(&self) -> Option<&Node<K, V>> {
        match self {
            Link::Child(node) => Some(node),
            _ => None,
        }
    }

    pub fn into_child(self) -> Option<Node<K, V>> {
        match self {
            Link::Child(node) => Some(node),
            _ => None,
        }
    }

    /// The node this link leads to, whether it owns it or not.
    pub fn target(&self) -> Option<Node<K, V>> {
        match self {
            Link::Empty => None,
            Link::Child(node) => Some(node.shallow_clone()),
            Link::Thread(weak) => Some(Node(weak.upgrade().unwrap_or_else(|| {
                shared::unreachable!("thread outlived the node it points to")
            }))),
        }
    }

    #[cfg(test)]
    pub fn points_to(&self, node: &Node<K, V>) -> bool {
        match self {
            Link::Empty => false,
            Link::Child(child) => child.ptr_eq(node),
            Link::Thread(weak) => weak.points_to(&node.0),
        }
    }
}

impl<K, V> NodeData<K, V> {
    pub fn link(&self, side: Side) -> &Link<K, V> {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn link_mut(&mut self, side: Side) -> &mut Link<K, V> {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

impl<K, V> Node<K, V> {
    pub fn new(key: K, value: V, left: Link<K, V>, right: Link<K, V>) -> Self {
        Node(RcCell::new(NodeData {
            key,
            value,
            left,
            right,
        }))
    }

    pub fn leaf(key: K, value: V) -> Self {
        Self::new(key, value, Link::Empty, Link::Empty)
    }

    pub fn get(&self) -> Ref<'_, NodeData<K, V>> {
        self.0.get()
    }

    pub fn get_mut(&self) -> RefMut<'_, NodeData<K, V>> {
        self.0.get_mut()
    }

    #[cfg(test)]
    pub fn ptr_eq(&self, rhs: &Self) -> bool {
        self.0.ptr_eq(&rhs.0)
    }

    pub fn shallow_clone(&self) -> Self {
        Node(self.0.shallow_clone())
    }

    pub fn child_on(&self, side: Side) -> Option<Self> {
        self.get().link(side).child().map(Node::shallow_clone)
    }

    /// Follows child links on `side` as far as they go.
    /// Returns the node reached and its parent, if any step was taken.
    pub fn descend(self, side: Side) -> (Self, Option<Self>) {
        let mut node = self;
        let mut parent = None;
        while let Some(next) = node.child_on(side) {
            parent = Some(mem::replace(&mut node, next));
        }
        (node, parent)
    }

    /// Inorder predecessor (`Left`) or successor (`Right`).
    pub fn neighbour(&self, side: Side) -> Option<Self> {
        match self.child_on(side) {
            Some(child) => Some(child.descend(side.opposite()).0),
            None => self.get().link(side).target(),
        }
    }

    /// Consumes a node that was already unlinked from the tree.
    pub fn into_entry(self) -> (K, V) {
        match self.0.try_unwrap() {
            Ok(data) => (data.key, data.value),
            Err(_) => shared::unreachable!("unlinked node is still owned by the tree"),
        }
    }
}

/// Handle to an entry of a [`ThreadedTree`](crate::ThreadedTree).
///
/// It borrows the tree, so the tree can't change while it is alive.
pub struct Entry<'a, K, V> {
    node: Node<K, V>,
    _tree: PhantomData<&'a ()>,
}

impl<'a, K, V> Entry<'a, K, V> {
    pub(crate) fn new(node: Node<K, V>) -> Self {
        Entry {
            node,
            _tree: PhantomData,
        }
    }

    pub fn key(&self) -> Ref<'_, K> {
        shared::map_ref(self.node.get(), |data| &data.key)
    }

    pub fn value(&self) -> Ref<'_, V> {
        shared::map_ref(self.node.get(), |data| &data.value)
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Entry<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.node.get();
        f.debug_tuple("Entry")
            .field(&data.key)
            .field(&data.value)
            .finish()
    }
}
