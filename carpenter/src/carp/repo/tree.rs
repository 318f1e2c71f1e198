use std::fmt;
use std::sync::Arc;

use crate::carp::error::{CarpError, CarpResult};
use crate::carp::memory::MemoryBudget;
use crate::carp::{Item, Supp};

/// Index of a node in the repository arena. The first `size` indices are
/// the top-level nodes; node `i < size` represents the item set `{i}`.
pub type NodeId = usize;

const NODE_BYTES: usize = std::mem::size_of::<RepoNode>();

/// Item order along paths and within sibling lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    /// Whether item `a` comes before item `b` in this order.
    #[inline]
    pub fn precedes(self, a: Item, b: Item) -> bool {
        match self {
            Direction::Ascending => a < b,
            Direction::Descending => a > b,
        }
    }

    pub fn from_sign(dir: i32) -> Self {
        if dir < 0 {
            Direction::Descending
        } else {
            Direction::Ascending
        }
    }

    pub fn sign(self) -> i32 {
        match self {
            Direction::Ascending => 1,
            Direction::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RepoNode {
    pub(crate) item: Item,
    pub(crate) supp: Supp,
    pub(crate) sibling: Option<NodeId>,
    pub(crate) children: Option<NodeId>,
}

impl RepoNode {
    fn new(item: Item, supp: Supp) -> Self {
        Self {
            item,
            supp,
            sibling: None,
            children: None,
        }
    }
}

/// Prefix tree of item sets that keeps, per path, the largest support
/// recorded for that exact item set.
pub struct RepoTree {
    pub(crate) nodes: Vec<RepoNode>,
    free: Vec<NodeId>,
    pub(crate) size: usize,
    pub(crate) dir: Direction,
    /// Support of the empty set.
    pub(crate) supp: Supp,
    used: usize,
    peak: usize,
    budget: Arc<MemoryBudget>,
}

/// Iterator over a sibling list.
pub struct Siblings<'a> {
    tree: &'a RepoTree,
    next: Option<NodeId>,
}

impl Iterator for Siblings<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.next?;
        self.next = self.tree.nodes[id].sibling;
        Some(id)
    }
}

impl RepoTree {
    /// Tree over `size` items with an unlimited memory budget.
    pub fn new(size: usize, dir: Direction) -> Self {
        let budget = Arc::new(MemoryBudget::unlimited());
        budget.allocate(size * NODE_BYTES).ok();
        Self::build(size, dir, budget)
    }

    /// Tree over `size` items whose nodes are charged to `budget`.
    pub fn with_budget(
        size: usize,
        dir: Direction,
        budget: Arc<MemoryBudget>,
    ) -> CarpResult<Self> {
        budget.allocate(size.saturating_mul(NODE_BYTES))?;
        Ok(Self::build(size, dir, budget))
    }

    fn build(size: usize, dir: Direction, budget: Arc<MemoryBudget>) -> Self {
        let nodes = (0..size).map(|item| RepoNode::new(item, 0)).collect();
        Self {
            nodes,
            free: Vec::new(),
            size,
            dir,
            supp: 0,
            used: 0,
            peak: 0,
            budget,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dir(&self) -> Direction {
        self.dir
    }

    /// Support of the empty set.
    pub fn supp(&self) -> Supp {
        self.supp
    }

    /// Number of nodes, top-level nodes included.
    pub fn node_count(&self) -> usize {
        self.used + self.size
    }

    /// Largest number of nodes the tree ever had.
    pub fn node_max(&self) -> usize {
        self.peak + self.size
    }

    pub fn budget(&self) -> &Arc<MemoryBudget> {
        &self.budget
    }

    pub(crate) fn children(&self, id: NodeId) -> Siblings<'_> {
        Siblings {
            tree: self,
            next: self.nodes[id].children,
        }
    }

    /// Top-level nodes in tree order.
    pub(crate) fn tops(&self) -> impl Iterator<Item = NodeId> + '_ {
        let size = self.size;
        let descending = self.dir == Direction::Descending;
        (0..size).map(move |i| if descending { size - 1 - i } else { i })
    }

    /// Position of `item` among the children of `parent`: the last sibling
    /// before it and the first sibling not before it.
    fn seek(&self, parent: NodeId, item: Item) -> (Option<NodeId>, Option<NodeId>) {
        let mut prev = None;
        let mut cur = self.nodes[parent].children;
        while let Some(id) = cur {
            if !self.dir.precedes(self.nodes[id].item, item) {
                break;
            }
            prev = cur;
            cur = self.nodes[id].sibling;
        }
        (prev, cur)
    }

    /// Allocate a chain `items[0] -> items[1] -> ...` of new nodes, each
    /// carrying `supp`. Either the whole chain is created or nothing is.
    fn alloc_chain(&mut self, items: &[Item], supp: Supp) -> CarpResult<NodeId> {
        let count = items.len();
        self.budget.allocate(count * NODE_BYTES)?;
        let fresh = count.saturating_sub(self.free.len());
        if self.nodes.try_reserve(fresh).is_err() {
            self.budget.deallocate(count * NODE_BYTES);
            return Err(CarpError::alloc_failed::<RepoNode>(fresh));
        }
        let mut below = None;
        for &item in items.iter().rev() {
            let mut node = RepoNode::new(item, supp);
            node.children = below;
            let id = match self.free.pop() {
                Some(id) => {
                    self.nodes[id] = node;
                    id
                }
                None => {
                    self.nodes.push(node);
                    self.nodes.len() - 1
                }
            };
            below = Some(id);
        }
        self.used += count;
        self.peak = self.peak.max(self.used);
        // items is non-empty whenever a chain is requested
        below.ok_or_else(|| CarpError::invalid("empty node chain"))
    }

    fn release(&mut self, id: NodeId) {
        self.free.push(id);
        self.used -= 1;
        self.budget.deallocate(NODE_BYTES);
    }

    /// Release a sibling list and everything below it.
    fn release_list(&mut self, mut cur: Option<NodeId>) {
        while let Some(id) = cur {
            let node = self.nodes[id];
            self.release_list(node.children);
            self.release(id);
            cur = node.sibling;
        }
    }

    /// Insert an item set (items in tree order) or raise its support.
    ///
    /// Every prefix on the path gets its support raised to at least `supp`.
    /// Returns whether any stored support changed or a node was created.
    pub fn add(&mut self, items: &[Item], supp: Supp) -> CarpResult<bool> {
        let mut changed = false;
        if supp > self.supp {
            self.supp = supp;
            changed = true;
        }
        let Some((&first, mut rest)) = items.split_first() else {
            return Ok(changed);
        };
        let mut node = first;
        loop {
            if supp > self.nodes[node].supp {
                self.nodes[node].supp = supp;
                changed = true;
            }
            let Some((&item, tail)) = rest.split_first() else {
                return Ok(changed);
            };
            let (prev, next) = self.seek(node, item);
            match next {
                Some(child) if self.nodes[child].item == item => {
                    node = child;
                    rest = tail;
                }
                _ => {
                    let head = self.alloc_chain(rest, supp)?;
                    self.nodes[head].sibling = next;
                    match prev {
                        Some(p) => self.nodes[p].sibling = Some(head),
                        None => self.nodes[node].children = Some(head),
                    }
                    return Ok(true);
                }
            }
        }
    }

    /// Stored support of an item set (items in tree order), `None` if the
    /// path does not exist. A top-level node with zero support is absent.
    pub fn get(&self, items: &[Item]) -> Option<Supp> {
        let Some((&first, rest)) = items.split_first() else {
            return Some(self.supp);
        };
        let mut node = first;
        for &item in rest {
            match self.seek(node, item).1 {
                Some(child) if self.nodes[child].item == item => node = child,
                _ => return None,
            }
        }
        let supp = self.nodes[node].supp;
        (node >= self.size || supp > 0).then_some(supp)
    }

    /// Whether the tree holds a superset of `items` (in tree order) with a
    /// support of at least `min`. For the empty set this is the empty set
    /// support itself.
    pub fn has_superset(&self, items: &[Item], min: Supp) -> bool {
        self.has_superset_excluding(items, min, None)
    }

    /// Like [`RepoTree::has_superset`], but `exclude` never counts as a
    /// match (it is treated as if its support were below `min`).
    pub fn has_superset_excluding(
        &self,
        items: &[Item],
        min: Supp,
        exclude: Option<NodeId>,
    ) -> bool {
        let Some(&first) = items.first() else {
            return self.supp >= min;
        };
        if items.len() == 1 {
            if self.reaches(first, min, exclude) {
                return true;
            }
        } else if self.superset_below(self.nodes[first].children, &items[1..], min, exclude) {
            return true;
        }
        // supersets that start with an item preceding items[0]
        match self.dir {
            Direction::Descending => (first + 1..self.size)
                .any(|top| self.superset_below(self.nodes[top].children, items, min, exclude)),
            Direction::Ascending => (0..first)
                .rev()
                .any(|top| self.superset_below(self.nodes[top].children, items, min, exclude)),
        }
    }

    #[inline]
    fn reaches(&self, id: NodeId, min: Supp, exclude: Option<NodeId>) -> bool {
        exclude != Some(id) && self.nodes[id].supp >= min
    }

    /// Match `items` in order along some path starting in the sibling list
    /// `node`, skipping nodes with other items.
    fn superset_below(
        &self,
        mut node: Option<NodeId>,
        mut items: &[Item],
        min: Supp,
        exclude: Option<NodeId>,
    ) -> bool {
        while let Some(id) = node {
            let current = &self.nodes[id];
            if self.dir.precedes(items[0], current.item) {
                break;
            }
            if current.item == items[0] {
                if items.len() == 1 {
                    return self.reaches(id, min, exclude);
                }
                items = &items[1..];
            } else if self.superset_below(current.sibling, items, min, exclude) {
                return true;
            }
            if !self.reaches(id, min, exclude) {
                return false;
            }
            node = current.children;
        }
        false
    }

    /// Remove every non-top node with a support below `min`, together with
    /// its subtree. Top-level nodes below `min` are reset to zero support.
    pub fn prune(&mut self, min: Supp) {
        for top in 0..self.size {
            let head = self.nodes[top].children;
            self.nodes[top].children = self.prune_list(head, min);
            if self.nodes[top].supp < min {
                self.nodes[top].supp = 0;
            }
        }
    }

    fn prune_list(&mut self, head: Option<NodeId>, min: Supp) -> Option<NodeId> {
        let mut first = None;
        let mut last: Option<NodeId> = None;
        let mut cur = head;
        while let Some(id) = cur {
            cur = self.nodes[id].sibling;
            let children = self.nodes[id].children;
            self.nodes[id].children = self.prune_list(children, min);
            if self.nodes[id].supp < min {
                let rest = self.nodes[id].children.take();
                self.release_list(rest);
                self.release(id);
                continue;
            }
            self.nodes[id].sibling = None;
            match last {
                Some(prev) => self.nodes[prev].sibling = Some(id),
                None => first = Some(id),
            }
            last = Some(id);
        }
        first
    }

    /// Release all nodes one by one, keeping the tree usable.
    pub fn clear(&mut self) {
        for top in 0..self.size {
            let head = self.nodes[top].children.take();
            self.release_list(head);
            self.nodes[top].supp = 0;
        }
        self.supp = 0;
    }
}

impl Drop for RepoTree {
    fn drop(&mut self) {
        self.budget.deallocate((self.size + self.used) * NODE_BYTES);
    }
}

impl fmt::Debug for RepoTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RepoTree")
            .field("size", &self.size)
            .field("dir", &self.dir)
            .field("supp", &self.supp)
            .field("node_count", &self.node_count())
            .finish()
    }
}

impl fmt::Display for RepoTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "*:{}", self.supp)?;
        for top in 0..self.size {
            let node = &self.nodes[top];
            if node.supp == 0 {
                continue;
            }
            writeln!(f, "   {}:{}", top, node.supp)?;
            self.show(f, node.children, 2)?;
        }
        write!(f, "nodes: {}", self.node_count())
    }
}

impl RepoTree {
    fn show(
        &self,
        f: &mut fmt::Formatter<'_>,
        mut cur: Option<NodeId>,
        indent: usize,
    ) -> fmt::Result {
        while let Some(id) = cur {
            let node = &self.nodes[id];
            writeln!(f, "{}{}:{}", "   ".repeat(indent), node.item, node.supp)?;
            self.show(f, node.children, indent + 1)?;
            cur = node.sibling;
        }
        Ok(())
    }
}
