//! # Member index.
//!
//! An unbalanced binary search tree keyed by member id. The shape of the tree depends entirely on
//! insertion order, so ascending inserts degrade it into a list. Lookup, insertion, traversal and
//! release walk the tree iteratively. Removal recurses once per level of the tree.
//!
//! Saved files list members in ascending id order, so a tree loaded from one is always a list
//! leaning on its higher links. Removing the largest id from such a tree recurses once per
//! member, which can exhaust the stack on large rosters.

use std::{cmp::Ordering, fmt};

use crate::member::{Level, Member, MemberMut};

/// The outcome of inserting a member into a [`Tree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum Inserted {
    /// A new node now holds the member.
    Inserted,
    /// A member with the same id already exists. The tree is unchanged.
    Duplicate,
    /// The member's names could not be duplicated. The tree is unchanged.
    AllocationFailed,
}

type Link = Option<Box<Node>>;

/// An ordered index of members. This structure contains the root node of the tree and serves as
/// the entrypoint for all tree operations.
#[derive(Default)]
pub struct Tree {
    root: Link,
}

struct Node {
    member: Member,
    /// Members with smaller ids.
    lower: Link,
    /// Members with larger ids.
    higher: Link,
}

impl Node {
    fn new(member: Member) -> Box<Self> {
        Box::new(Self {
            member,
            lower: None,
            higher: None,
        })
    }
}

impl Tree {
    /// Creates an empty tree.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None }
    }

    /// Insert a copy of the given member. The tree owns its own duplicate of the names, the
    /// caller keeps `member`.
    ///
    /// Inserting an id that is already present leaves the existing member untouched.
    pub fn insert(&mut self, member: &Member) -> Inserted {
        let Some(slot) = self.vacant_slot(member.id()) else {
            return Inserted::Duplicate;
        };
        match member.try_clone() {
            Ok(copy) => {
                *slot = Some(Node::new(copy));
                Inserted::Inserted
            }
            Err(err) => {
                tracing::warn!(id = member.id(), %err, "failed to duplicate member");
                Inserted::AllocationFailed
            }
        }
    }

    /// Insert the given member, moving it into the tree without copying its names.
    ///
    /// Inserting an id that is already present drops `member` and leaves the existing member
    /// untouched.
    pub fn insert_owned(&mut self, member: Member) -> Inserted {
        let Some(slot) = self.vacant_slot(member.id()) else {
            return Inserted::Duplicate;
        };
        *slot = Some(Node::new(member));
        Inserted::Inserted
    }

    /// Returns the empty link where a member with the given id belongs, or `None` if the id is
    /// already taken.
    fn vacant_slot(&mut self, id: u32) -> Option<&mut Link> {
        let mut link = &mut self.root;
        while let Some(node) = link {
            link = match id.cmp(&node.member.id()) {
                Ordering::Less => &mut node.lower,
                Ordering::Greater => &mut node.higher,
                Ordering::Equal => return None,
            };
        }
        Some(link)
    }

    /// Search for the member with the given id.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Member> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match id.cmp(&node.member.id()) {
                Ordering::Less => node.lower.as_deref(),
                Ordering::Greater => node.higher.as_deref(),
                Ordering::Equal => return Some(&node.member),
            };
        }
        None
    }

    /// Search for the member with the given id, returning a handle that can change its level and
    /// paid flag.
    pub fn get_mut(&mut self, id: u32) -> Option<MemberMut<'_>> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            current = match id.cmp(&node.member.id()) {
                Ordering::Less => node.lower.as_deref_mut(),
                Ordering::Greater => node.higher.as_deref_mut(),
                Ordering::Equal => return Some(MemberMut::new(&mut node.member)),
            };
        }
        None
    }

    /// Returns true if a member with the given id exists.
    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    /// Set the level of the member with the given id. Returns the new level, or `None` if no such
    /// member exists.
    pub fn set_level(&mut self, id: u32, level: Level) -> Option<Level> {
        self.get_mut(id).map(|mut member| member.set_level(level))
    }

    /// Set the paid flag of the member with the given id. Returns the new flag, or `None` if no
    /// such member exists.
    pub fn set_paid(&mut self, id: u32, paid: bool) -> Option<bool> {
        self.get_mut(id).map(|mut member| member.set_paid(paid))
    }

    /// Remove the member with the given id and return it. Returns `None` and leaves the tree
    /// unchanged if no such member exists.
    pub fn remove(&mut self, id: u32) -> Option<Member> {
        let (root, removed) = remove_from(self.root.take(), id);
        self.root = root;
        removed
    }

    /// Returns the number of members in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        let mut stack: Vec<&Node> = self.root.as_deref().into_iter().collect();
        let mut count = 0;
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.lower.as_deref());
            stack.extend(node.higher.as_deref());
        }
        count
    }

    /// Returns true if the tree holds no members.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of nodes on the longest path from the root to a leaf.
    #[must_use]
    pub fn height(&self) -> usize {
        let mut stack: Vec<(&Node, usize)> =
            self.root.as_deref().map(|n| (n, 1)).into_iter().collect();
        let mut height = 0;
        while let Some((node, depth)) = stack.pop() {
            height = height.max(depth);
            stack.extend(node.lower.as_deref().map(|n| (n, depth + 1)));
            stack.extend(node.higher.as_deref().map(|n| (n, depth + 1)));
        }
        height
    }

    /// Find the member with the smallest id.
    #[must_use]
    pub fn min(&self) -> Option<&Member> {
        let mut node = self.root.as_deref()?;
        while let Some(lower) = node.lower.as_deref() {
            node = lower;
        }
        Some(&node.member)
    }

    /// Find the member with the largest id.
    #[must_use]
    pub fn max(&self) -> Option<&Member> {
        let mut node = self.root.as_deref()?;
        while let Some(higher) = node.higher.as_deref() {
            node = higher;
        }
        Some(&node.member)
    }

    /// Iterate over all members in ascending id order.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.descend(self.root.as_deref());
        iter
    }

    /// Release every member. Children are released strictly before their parent.
    pub fn clear(&mut self) {
        let mut stack: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            if let Some(child) = node.lower.take().or_else(|| node.higher.take()) {
                stack.push(node);
                stack.push(child);
            }
        }
    }
}

/// Remove `id` from the subtree rooted at `link`, returning the new subtree root together with
/// the removed member.
fn remove_from(link: Link, id: u32) -> (Link, Option<Member>) {
    let Some(mut node) = link else {
        return (None, None);
    };
    match id.cmp(&node.member.id()) {
        Ordering::Less => {
            let (lower, removed) = remove_from(node.lower.take(), id);
            node.lower = lower;
            (Some(node), removed)
        }
        Ordering::Greater => {
            let (higher, removed) = remove_from(node.higher.take(), id);
            node.higher = higher;
            (Some(node), removed)
        }
        Ordering::Equal => match (node.lower.take(), node.higher.take()) {
            (None, None) => (None, Some(node.member)),
            (Some(child), None) | (None, Some(child)) => (Some(child), Some(node.member)),
            (Some(lower), Some(higher)) => {
                // The inorder successor is the leftmost node on the higher side.
                let mut successor = higher.as_ref();
                while let Some(next) = successor.lower.as_ref() {
                    successor = next;
                }
                let successor_id = successor.member.id();
                let (higher, successor) = remove_from(Some(higher), successor_id);
                let successor = successor.expect("[bug] inorder successor must exist");
                let removed = std::mem::replace(&mut node.member, successor);
                node.lower = Some(lower);
                node.higher = higher;
                (Some(node), Some(removed))
            }
        },
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        self.clear();
    }
}

impl Extend<Member> for Tree {
    fn extend<T: IntoIterator<Item = Member>>(&mut self, iter: T) {
        for member in iter {
            let _ = self.insert_owned(member);
        }
    }
}

impl FromIterator<Member> for Tree {
    fn from_iter<T: IntoIterator<Item = Member>>(iter: T) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a Member;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the members of a [`Tree`] in ascending id order.
#[derive(Debug)]
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn descend(&mut self, mut node: Option<&'a Node>) {
        while let Some(n) = node {
            self.stack.push(n);
            node = n.lower.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Member;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.descend(node.higher.as_deref());
        Some(&node.member)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node").field("member", &self.member).finish_non_exhaustive()
    }
}

impl fmt::Debug for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.root.as_deref() else {
            return writeln!(f, "empty");
        };
        let mut stack = vec![(0, "root", root)];
        while let Some((level, side, node)) = stack.pop() {
            let indent = "  ".repeat(level);
            writeln!(
                f,
                "{indent}[{side}] {:>5}: {} {}",
                node.member.id(),
                node.member.first_name(),
                node.member.last_name()
            )?;
            if let Some(higher) = node.higher.as_deref() {
                stack.push((level + 1, "higher", higher));
            }
            if let Some(lower) = node.lower.as_deref() {
                stack.push((level + 1, "lower", lower));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    use super::{Inserted, Node, Tree};
    use crate::member::{Level, Member};

    fn member(id: u32) -> Member {
        let level = Level::from((id % 5) as u16);
        Member::new(&format!("first{id}"), &format!("last{id}"), id, level, id % 2 == 0)
    }

    fn tree_of(ids: &[u32]) -> Tree {
        let mut tree = Tree::new();
        for &id in ids {
            assert_eq!(tree.insert(&member(id)), Inserted::Inserted);
        }
        tree
    }

    fn ids(tree: &Tree) -> Vec<u32> {
        tree.iter().map(Member::id).collect()
    }

    /// Checks that every id lies strictly within the bounds inherited from its ancestors.
    fn assert_ordered(tree: &Tree) {
        let mut stack: Vec<(&Node, Option<u32>, Option<u32>)> =
            tree.root.as_deref().map(|n| (n, None, None)).into_iter().collect();
        while let Some((node, low, high)) = stack.pop() {
            let id = node.member.id();
            assert!(low.map_or(true, |low| low < id), "{id} must be above {low:?}");
            assert!(high.map_or(true, |high| id < high), "{id} must be below {high:?}");
            stack.extend(node.lower.as_deref().map(|n| (n, low, Some(id))));
            stack.extend(node.higher.as_deref().map(|n| (n, Some(id), high)));
        }
    }

    #[test]
    fn test_empty_tree() {
        let mut tree = Tree::default();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert!(tree.get(1).is_none());
        assert!(tree.get_mut(1).is_none());
        assert!(tree.remove(1).is_none());
        assert!(tree.min().is_none());
        assert!(tree.max().is_none());
        assert_eq!(format!("{tree:?}"), "empty\n");
    }

    #[test]
    fn test_insert_and_traverse() {
        let tree = tree_of(&[50, 20, 80, 10, 30]);
        assert_eq!(ids(&tree), vec![10, 20, 30, 50, 80]);
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.height(), 3);
        assert_eq!(tree.min().map(Member::id), Some(10));
        assert_eq!(tree.max().map(Member::id), Some(80));
        assert_ordered(&tree);
    }

    #[test]
    fn test_insert_keeps_independent_copy() {
        let mut tree = Tree::new();
        let original = Member::new("Ada", "Lovelace", 42, Level::Platinum, true);
        assert_eq!(tree.insert(&original), Inserted::Inserted);
        drop(original);
        let found = tree.get(42).expect("member must exist");
        assert_eq!(found, &Member::new("Ada", "Lovelace", 42, Level::Platinum, true));
    }

    #[test]
    fn test_insert_duplicate_is_ignored() {
        let mut tree = tree_of(&[50, 20, 80]);
        let imposter = Member::new("Someone", "Else", 20, Level::Gold, false);
        assert_eq!(tree.insert(&imposter), Inserted::Duplicate);
        assert_eq!(tree.insert_owned(imposter), Inserted::Duplicate);
        assert_eq!(tree.len(), 3);
        assert_eq!(tree.get(20), Some(&member(20)));
    }

    #[test]
    fn test_get_mut_changes_only_mutable_fields() {
        let mut tree = tree_of(&[50, 20, 80]);
        {
            let mut handle = tree.get_mut(80).expect("member must exist");
            assert_eq!(handle.set_level(Level::Platinum), Level::Platinum);
            assert!(!handle.set_paid(false));
        }
        let found = tree.get(80).expect("member must exist");
        assert_eq!(found.level(), Level::Platinum);
        assert!(!found.paid());
        assert_eq!(found.first_name(), "first80");
        assert_eq!(ids(&tree), vec![20, 50, 80]);
    }

    #[test]
    fn test_set_on_absent_member() {
        let mut tree = tree_of(&[50]);
        assert_eq!(tree.set_level(7, Level::Gold), None);
        assert_eq!(tree.set_paid(7, true), None);
        assert_eq!(tree.set_level(50, Level::Unknown(9)), Some(Level::Unknown(9)));
        assert_eq!(tree.set_paid(50, false), Some(false));
        assert_eq!(tree.get(50).map(Member::level), Some(Level::Unknown(9)));
    }

    #[test]
    fn test_remove_two_children_promotes_successor() {
        let mut tree = tree_of(&[50, 20, 80, 10, 30]);
        let removed = tree.remove(50).expect("member must exist");
        assert_eq!(removed, member(50));
        assert_eq!(ids(&tree), vec![10, 20, 30, 80]);
        let root = tree.root.as_deref().expect("root must exist");
        assert_eq!(root.member, member(80));
        assert!(root.higher.is_none());
        assert_ordered(&tree);
    }

    #[test]
    fn test_remove_successor_deep_in_higher_subtree() {
        let mut tree = tree_of(&[50, 20, 80, 70, 90, 60, 65]);
        assert_eq!(tree.remove(50).map(|m| m.id()), Some(50));
        let root = tree.root.as_deref().expect("root must exist");
        assert_eq!(root.member.id(), 60);
        assert_eq!(ids(&tree), vec![20, 60, 65, 70, 80, 90]);
        assert_ordered(&tree);
    }

    #[test]
    fn test_remove_leaf_and_single_child() {
        let mut tree = tree_of(&[50, 20, 80, 10, 90]);
        assert_eq!(tree.remove(10).map(|m| m.id()), Some(10));
        assert_eq!(ids(&tree), vec![20, 50, 80, 90]);
        assert_eq!(tree.remove(80).map(|m| m.id()), Some(80));
        assert_eq!(ids(&tree), vec![20, 50, 90]);
        let root = tree.root.as_deref().expect("root must exist");
        assert_eq!(root.higher.as_deref().map(|n| n.member.id()), Some(90));
        assert_ordered(&tree);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut tree = tree_of(&[50, 20, 80, 10, 30]);
        assert!(tree.remove(55).is_none());
        assert_eq!(tree.len(), 5);
        assert_eq!(ids(&tree), vec![10, 20, 30, 50, 80]);
    }

    #[test]
    fn test_remove_root_until_empty() {
        let mut tree = tree_of(&[2, 1, 3]);
        for expected in [2, 3, 1] {
            let root_id = tree.root.as_deref().map(|n| n.member.id());
            assert_eq!(root_id, Some(expected));
            assert!(tree.remove(expected).is_some());
        }
        assert!(tree.is_empty());
    }

    #[test]
    fn test_clear_releases_everything() {
        let mut tree = tree_of(&[50, 20, 80, 10, 30]);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.insert(&member(1)), Inserted::Inserted);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn test_degenerate_shape() {
        let count = 10_000;
        let tree: Tree = (0..count).map(member).collect();
        assert_eq!(tree.len(), count as usize);
        assert_eq!(tree.height(), count as usize);
        assert!(tree.iter().map(Member::id).eq(0..count));
        drop(tree);
    }

    #[test]
    fn test_from_iter_first_wins() {
        let tree: Tree = vec![
            Member::new("First", "One", 1, Level::Basic, true),
            Member::new("Second", "One", 1, Level::Gold, false),
            member(2),
        ]
        .into_iter()
        .collect();
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(1).map(Member::first_name), Some("First"));
    }

    #[test]
    fn test_debug_shape() {
        let tree = tree_of(&[2, 1, 3]);
        let expected = "[root]     2: first2 last2\n  [lower]     1: first1 last1\n  [higher]     3: first3 last3\n";
        assert_eq!(format!("{tree:?}"), expected);
    }

    macro_rules! test_random_orders {
        ($name:ident, $seed:expr, $count:expr) => {
            #[test]
            fn $name() {
                let mut rng = StdRng::seed_from_u64($seed);
                let mut inserts: Vec<u32> = (0..$count).map(|i| i * 3).collect();
                inserts.shuffle(&mut rng);

                let mut tree = Tree::new();
                for &id in &inserts {
                    assert_eq!(tree.insert(&member(id)), Inserted::Inserted);
                }
                assert_ordered(&tree);
                assert_eq!(tree.len(), inserts.len());
                for &id in &inserts {
                    assert_eq!(tree.get(id), Some(&member(id)));
                    assert!(tree.get(id + 1).is_none());
                }

                let mut expected = inserts.clone();
                expected.sort_unstable();
                assert_eq!(ids(&tree), expected);

                let mut removals = inserts.clone();
                removals.shuffle(&mut rng);
                for (removed, &id) in removals.iter().enumerate() {
                    assert_eq!(tree.remove(id), Some(member(id)));
                    assert!(tree.remove(id).is_none());
                    assert_eq!(tree.len(), inserts.len() - removed - 1);
                    assert_ordered(&tree);
                }
                assert!(tree.is_empty());
                assert!(tree.root.is_none());
            }
        };
    }

    test_random_orders!(random_orders_small, 7, 16);
    test_random_orders!(random_orders_medium, 42, 256);
    test_random_orders!(random_orders_large, 1_337, 2_048);
}
