use std::cmp::Ordering;

use serde::{
    Deserialize,
    Serialize,
};

/// Orders terms by due time, ties broken by the term itself.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SchedulingKey {
    pub due: i64,
    pub term: String,
}

impl SchedulingKey {
    pub fn new(due: i64, term: impl Into<String>) -> Self {
        Self { due, term: term.into() }
    }
}

type Link<K> = Option<Box<Node<K>>>;

#[derive(Debug)]
struct Node<K> {
    key: K,
    priority: u32,
    size: usize,
    left: Link<K>,
    right: Link<K>,
}

impl<K> Node<K> {
    fn new(key: K) -> Self {
        Self { key, priority: rand::random(), size: 1, left: None, right: None }
    }

    fn update(&mut self) {
        self.size = 1 + size(&self.left) + size(&self.right);
    }
}

fn size<K>(link: &Link<K>) -> usize {
    link.as_ref().map_or(0, |node| node.size)
}

// (keys < key, keys >= key)
fn split<K: Ord>(link: Link<K>, key: &K) -> (Link<K>, Link<K>) {
    match link {
        None => (None, None),
        Some(mut node) => {
            if node.key < *key {
                let (left, right) = split(node.right.take(), key);
                node.right = left;
                node.update();
                (Some(node), right)
            } else {
                let (left, right) = split(node.left.take(), key);
                node.left = right;
                node.update();
                (left, Some(node))
            }
        }
    }
}

// every key in `left` must be smaller than every key in `right`
fn merge<K>(left: Link<K>, right: Link<K>) -> Link<K> {
    match (left, right) {
        (None, right) => right,
        (left, None) => left,
        (Some(mut left), Some(mut right)) => {
            if left.priority > right.priority {
                left.right = merge(left.right.take(), Some(right));
                left.update();
                Some(left)
            } else {
                right.left = merge(Some(left), right.left.take());
                right.update();
                Some(right)
            }
        }
    }
}

fn remove<K: Ord>(link: &mut Link<K>, key: &K) -> bool {
    let Some(node) = link.as_mut() else {
        return false;
    };

    let removed = match key.cmp(&node.key) {
        Ordering::Less => remove(&mut node.left, key),
        Ordering::Greater => remove(&mut node.right, key),
        Ordering::Equal => {
            let left = node.left.take();
            let right = node.right.take();
            *link = merge(left, right);
            return true;
        }
    };

    if removed {
        node.update();
    }
    removed
}

/// Ordered set with positional access: a treap whose nodes track their
/// subtree size, giving expected O(log n) insert, remove, rank and select.
#[derive(Debug)]
pub struct RankedSet<K> {
    root: Link<K>,
}

impl<K> Default for RankedSet<K> {
    fn default() -> Self {
        Self { root: None }
    }
}

impl<K: Ord> RankedSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        size(&self.root)
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns false if the key was already present.
    pub fn insert(&mut self, key: K) -> bool {
        if self.contains(&key) {
            return false;
        }
        let (left, right) = split(self.root.take(), &key);
        self.root = merge(merge(left, Some(Box::new(Node::new(key)))), right);
        true
    }

    /// Removing a missing key is a no-op that returns false.
    pub fn remove(&mut self, key: &K) -> bool {
        remove(&mut self.root, key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.rank(key).is_some()
    }

    /// Zero based position of `key` in sorted order.
    pub fn rank(&self, key: &K) -> Option<usize> {
        let mut node = self.root.as_deref();
        let mut rank = 0;
        while let Some(current) = node {
            match key.cmp(&current.key) {
                Ordering::Less => node = current.left.as_deref(),
                Ordering::Greater => {
                    rank += size(&current.left) + 1;
                    node = current.right.as_deref();
                }
                Ordering::Equal => return Some(rank + size(&current.left)),
            }
        }
        None
    }

    /// Number of keys strictly smaller than `key`, present or not.
    pub fn count_below(&self, key: &K) -> usize {
        let mut node = self.root.as_deref();
        let mut count = 0;
        while let Some(current) = node {
            if current.key < *key {
                count += size(&current.left) + 1;
                node = current.right.as_deref();
            } else {
                node = current.left.as_deref();
            }
        }
        count
    }

    /// The key at sorted position `index`.
    pub fn select(&self, index: usize) -> Option<&K> {
        let mut node = self.root.as_deref();
        let mut index = index;
        while let Some(current) = node {
            let left_size = size(&current.left);
            match index.cmp(&left_size) {
                Ordering::Less => node = current.left.as_deref(),
                Ordering::Equal => return Some(&current.key),
                Ordering::Greater => {
                    index -= left_size + 1;
                    node = current.right.as_deref();
                }
            }
        }
        None
    }

    pub fn first(&self) -> Option<&K> {
        self.select(0)
    }

    pub fn clear(&mut self) {
        self.root = None;
    }

    /// In-order traversal.
    pub fn iter(&self) -> Iter<'_, K> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left(self.root.as_deref());
        iter
    }
}

pub struct Iter<'a, K> {
    stack: Vec<&'a Node<K>>,
}

impl<'a, K> Iter<'a, K> {
    fn push_left(&mut self, mut node: Option<&'a Node<K>>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left(node.right.as_deref());
        Some(&node.key)
    }
}

impl<K: Ord> FromIterator<K> for RankedSet<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = RankedSet::new();
        for key in iter {
            set.insert(key);
        }
        set
    }
}
