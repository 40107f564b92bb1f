//! Rank-indexed skip list ordered by `(score, member)`.
//!
//! Nodes live in an arena and refer to each other by index. Forward links
//! carry a span (how many level-0 positions the link jumps), which lets rank
//! queries run in O(log n) without walking the bottom level. The single
//! backward link at level 0 and the tail handle are plain indices; only the
//! forward links define the structure.

use crate::types::border::RangeBorder;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

pub const MAX_LEVEL: usize = 16;

type NodeId = usize;

const HEADER: NodeId = 0;

/// A `(member, score)` pair stored in an ordered collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub member: Vec<u8>,
    pub score: f64,
}

impl Element {
    pub fn new(member: impl Into<Vec<u8>>, score: f64) -> Self {
        Element {
            member: member.into(),
            score,
        }
    }

    /// Strictly before `(score, member)` in collection order.
    fn sorts_before(&self, score: f64, member: &[u8]) -> bool {
        self.score < score || (self.score == score && self.member.as_slice() < member)
    }

    /// At or before `(score, member)` in collection order.
    fn sorts_at_or_before(&self, score: f64, member: &[u8]) -> bool {
        self.score < score || (self.score == score && self.member.as_slice() <= member)
    }
}

/// Source of node heights for new insertions.
pub trait LevelSource {
    /// Returns a level in `1..=MAX_LEVEL`.
    fn next_level(&mut self) -> usize;
}

/// Coin-flip levels: each extra level is taken with probability 1/4.
#[derive(Debug, Clone)]
pub struct RandomLevels<R = StdRng> {
    rng: R,
}

impl RandomLevels<StdRng> {
    pub fn new() -> Self {
        RandomLevels {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        RandomLevels {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomLevels<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomLevels<R> {
    pub fn with_rng(rng: R) -> Self {
        RandomLevels { rng }
    }
}

impl<R: Rng> LevelSource for RandomLevels<R> {
    fn next_level(&mut self) -> usize {
        let mut level = 1;
        while level < MAX_LEVEL && self.rng.gen_ratio(1, 4) {
            level += 1;
        }
        level
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Level {
    forward: Option<NodeId>,
    span: u64,
}

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    backward: Option<NodeId>,
    levels: Vec<Level>,
}

#[derive(Debug, Clone)]
pub struct OrderedList<L = RandomLevels> {
    nodes: Vec<Node>,
    free: Vec<NodeId>,
    tail: Option<NodeId>,
    level: usize,
    length: u64,
    levels: L,
}

impl OrderedList<RandomLevels> {
    pub fn new() -> Self {
        Self::with_level_source(RandomLevels::new())
    }
}

impl Default for OrderedList<RandomLevels> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: LevelSource> OrderedList<L> {
    pub fn with_level_source(levels: L) -> Self {
        let header = Node {
            element: Element::default(),
            backward: None,
            levels: vec![Level::default(); MAX_LEVEL],
        };
        OrderedList {
            nodes: vec![header],
            free: Vec::new(),
            tail: None,
            level: 1,
            length: 0,
            levels,
        }
    }

    /// Number of levels currently in use.
    pub fn level(&self) -> usize {
        self.level
    }

    pub fn len(&self) -> u64 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    pub fn first(&self) -> Option<&Element> {
        self.forward(HEADER, 0).map(|id| &self.nodes[id].element)
    }

    pub fn last(&self) -> Option<&Element> {
        self.tail.map(|id| &self.nodes[id].element)
    }

    /// Inserts a new node. The caller guarantees `member` is not already in
    /// the list; inserting a duplicate breaks the ordering.
    pub fn insert(&mut self, member: Vec<u8>, score: f64) -> &Element {
        let mut update = [HEADER; MAX_LEVEL];
        let mut rank = [0u64; MAX_LEVEL];

        let mut x = HEADER;
        for i in (0..self.level).rev() {
            rank[i] = if i == self.level - 1 { 0 } else { rank[i + 1] };
            while let Some(next) = self.forward(x, i) {
                if !self.nodes[next].element.sorts_before(score, &member) {
                    break;
                }
                rank[i] += self.nodes[x].levels[i].span;
                x = next;
            }
            update[i] = x;
        }

        let level = self.levels.next_level().clamp(1, MAX_LEVEL);
        if level > self.level {
            for i in self.level..level {
                rank[i] = 0;
                update[i] = HEADER;
                self.nodes[HEADER].levels[i].span = self.length;
            }
            self.level = level;
        }

        let id = self.alloc(Element { member, score }, level);
        for i in 0..level {
            let prev = self.nodes[update[i]].levels[i];
            let jumped = rank[0] - rank[i];
            self.nodes[id].levels[i] = Level {
                forward: prev.forward,
                span: prev.span - jumped,
            };
            self.nodes[update[i]].levels[i] = Level {
                forward: Some(id),
                span: jumped + 1,
            };
        }
        for i in level..self.level {
            self.nodes[update[i]].levels[i].span += 1;
        }

        self.nodes[id].backward = (update[0] != HEADER).then_some(update[0]);
        match self.forward(id, 0) {
            Some(next) => self.nodes[next].backward = Some(id),
            None => self.tail = Some(id),
        }
        self.length += 1;
        &self.nodes[id].element
    }

    /// Removes the node holding exactly `(member, score)`.
    pub fn remove(&mut self, member: &[u8], score: f64) -> bool {
        let mut update = [HEADER; MAX_LEVEL];
        let mut x = HEADER;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if !self.nodes[next].element.sorts_before(score, member) {
                    break;
                }
                x = next;
            }
            update[i] = x;
        }

        match self.forward(x, 0) {
            Some(id)
                if self.nodes[id].element.score == score
                    && self.nodes[id].element.member == member =>
            {
                self.unlink(id, &update);
                true
            }
            _ => false,
        }
    }

    /// 1-based rank of `(member, score)`, or 0 when absent.
    pub fn get_rank(&self, member: &[u8], score: f64) -> u64 {
        let mut rank = 0;
        let mut x = HEADER;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if !self.nodes[next].element.sorts_at_or_before(score, member) {
                    break;
                }
                rank += self.nodes[x].levels[i].span;
                x = next;
            }
            if x != HEADER && self.nodes[x].element.member == member {
                return rank;
            }
        }
        0
    }

    /// Element at 1-based `rank`.
    pub fn get_by_rank(&self, rank: u64) -> Option<&Element> {
        self.node_by_rank(rank).map(|id| &self.nodes[id].element)
    }

    /// First element admitted by `[min, max]`, with its 1-based rank.
    pub fn first_in_range(&self, min: &RangeBorder, max: &RangeBorder) -> Option<(&Element, u64)> {
        if !self.has_in_range(min, max) {
            return None;
        }
        let mut rank = 0;
        let mut x = HEADER;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if min.admits_below(self.nodes[next].element.score) {
                    break;
                }
                rank += self.nodes[x].levels[i].span;
                x = next;
            }
        }

        let candidate = self.forward(x, 0)?;
        let element = &self.nodes[candidate].element;
        if !max.admits_above(element.score) {
            return None;
        }
        Some((element, rank + 1))
    }

    /// Last element admitted by `[min, max]`, with its 1-based rank.
    pub fn last_in_range(&self, min: &RangeBorder, max: &RangeBorder) -> Option<(&Element, u64)> {
        if !self.has_in_range(min, max) {
            return None;
        }
        let mut rank = 0;
        let mut x = HEADER;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if !max.admits_above(self.nodes[next].element.score) {
                    break;
                }
                rank += self.nodes[x].levels[i].span;
                x = next;
            }
        }

        if x == HEADER {
            return None;
        }
        let element = &self.nodes[x].element;
        if !min.admits_below(element.score) {
            return None;
        }
        Some((element, rank))
    }

    /// Removes every element admitted by `[min, max]`, returned in
    /// ascending order.
    pub fn remove_range_by_score(&mut self, min: &RangeBorder, max: &RangeBorder) -> Vec<Element> {
        let mut update = [HEADER; MAX_LEVEL];
        let mut x = HEADER;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if min.admits_below(self.nodes[next].element.score) {
                    break;
                }
                x = next;
            }
            update[i] = x;
        }

        let mut removed = Vec::new();
        let mut cursor = self.forward(x, 0);
        while let Some(id) = cursor {
            if !max.admits_above(self.nodes[id].element.score) {
                break;
            }
            cursor = self.forward(id, 0);
            removed.push(self.unlink(id, &update));
        }
        removed
    }

    /// Removes elements with 1-based rank in `[start, stop)`, returned in
    /// ascending order.
    pub fn remove_range_by_rank(&mut self, start: u64, stop: u64) -> Vec<Element> {
        let mut update = [HEADER; MAX_LEVEL];
        let mut traversed = 0;
        let mut x = HEADER;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if traversed + self.nodes[x].levels[i].span >= start {
                    break;
                }
                traversed += self.nodes[x].levels[i].span;
                x = next;
            }
            update[i] = x;
        }

        traversed += 1;
        let mut removed = Vec::new();
        let mut cursor = self.forward(x, 0);
        while let Some(id) = cursor {
            if traversed >= stop {
                break;
            }
            cursor = self.forward(id, 0);
            removed.push(self.unlink(id, &update));
            traversed += 1;
        }
        removed
    }

    pub fn iter(&self) -> Iter<'_, L> {
        Iter {
            list: self,
            cursor: self.forward(HEADER, 0),
            reverse: false,
        }
    }

    /// Walks level-0 links starting at the element with 1-based `rank`,
    /// forward or backward. Yields nothing if the rank does not exist.
    pub fn iter_from_rank(&self, rank: u64, reverse: bool) -> Iter<'_, L> {
        Iter {
            list: self,
            cursor: self.node_by_rank(rank),
            reverse,
        }
    }

    fn forward(&self, id: NodeId, level: usize) -> Option<NodeId> {
        self.nodes[id].levels[level].forward
    }

    fn node_by_rank(&self, rank: u64) -> Option<NodeId> {
        if rank == 0 {
            return None;
        }
        let mut traversed = 0;
        let mut x = HEADER;
        for i in (0..self.level).rev() {
            while let Some(next) = self.forward(x, i) {
                if traversed + self.nodes[x].levels[i].span > rank {
                    break;
                }
                traversed += self.nodes[x].levels[i].span;
                x = next;
            }
            if traversed == rank {
                return (x != HEADER).then_some(x);
            }
        }
        None
    }

    fn has_in_range(&self, min: &RangeBorder, max: &RangeBorder) -> bool {
        if min.excludes_everything_up_to(max) {
            return false;
        }
        let (Some(tail), Some(head)) = (self.tail, self.forward(HEADER, 0)) else {
            return false;
        };
        min.admits_below(self.nodes[tail].element.score)
            && max.admits_above(self.nodes[head].element.score)
    }

    fn alloc(&mut self, element: Element, level: usize) -> NodeId {
        let node = Node {
            element,
            backward: None,
            levels: vec![Level::default(); level],
        };
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = node;
                id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    /// Detaches `id`, given its predecessor at every active level, and
    /// returns its element. The slot goes back on the free list.
    fn unlink(&mut self, id: NodeId, update: &[NodeId; MAX_LEVEL]) -> Element {
        for i in 0..self.level {
            let prev = update[i];
            if self.forward(prev, i) == Some(id) {
                let removed = self.nodes[id].levels[i];
                let link = &mut self.nodes[prev].levels[i];
                link.forward = removed.forward;
                link.span = link.span + removed.span - 1;
            } else {
                self.nodes[prev].levels[i].span -= 1;
            }
        }

        let backward = self.nodes[id].backward;
        match self.forward(id, 0) {
            Some(next) => self.nodes[next].backward = backward,
            None => self.tail = backward,
        }

        while self.level > 1 && self.forward(HEADER, self.level - 1).is_none() {
            self.level -= 1;
        }
        self.length -= 1;

        let node = &mut self.nodes[id];
        node.levels.clear();
        node.backward = None;
        let element = std::mem::take(&mut node.element);
        self.free.push(id);
        element
    }
}

/// Iterator over elements along level-0 links.
pub struct Iter<'a, L> {
    list: &'a OrderedList<L>,
    cursor: Option<NodeId>,
    reverse: bool,
}

impl<'a, L> Iterator for Iter<'a, L> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = &self.list.nodes[id];
        self.cursor = if self.reverse {
            node.backward
        } else {
            node.levels[0].forward
        };
        Some(&node.element)
    }
}
