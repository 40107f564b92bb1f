use crate::error::{ZedisError, ZedisResult};
use crate::types::border::RangeBorder;
use crate::types::skiplist::{Element, LevelSource, OrderedList, RandomLevels};
use std::collections::HashMap;

/// Redis sorted set: a member index paired with a rank-indexed skip list.
/// The HashMap answers score lookups in O(1); the skip list provides
/// ordered iteration and rank queries. Both always hold the same
/// `(member, score)` pairs.
#[derive(Debug, Clone)]
pub struct RedisSortedSet<L = RandomLevels> {
    /// member -> score
    scores: HashMap<Vec<u8>, f64>,
    list: OrderedList<L>,
}

impl RedisSortedSet<RandomLevels> {
    pub fn new() -> Self {
        Self::with_level_source(RandomLevels::new())
    }
}

impl Default for RedisSortedSet<RandomLevels> {
    fn default() -> Self {
        Self::new()
    }
}

impl<L: LevelSource> RedisSortedSet<L> {
    pub fn with_level_source(levels: L) -> Self {
        RedisSortedSet {
            scores: HashMap::new(),
            list: OrderedList::with_level_source(levels),
        }
    }

    pub fn len(&self) -> u64 {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Add or update a member. Returns true if the member was new.
    pub fn add(&mut self, member: Vec<u8>, score: f64) -> bool {
        match self.scores.get_mut(&member) {
            Some(current) => {
                if *current != score {
                    let old = std::mem::replace(current, score);
                    self.list.remove(&member, old);
                    self.list.insert(member, score);
                }
                false
            }
            None => {
                self.scores.insert(member.clone(), score);
                self.list.insert(member, score);
                true
            }
        }
    }

    pub fn get(&self, member: &[u8]) -> Option<Element> {
        self.scores
            .get_key_value(member)
            .map(|(m, &score)| Element::new(m.clone(), score))
    }

    pub fn score(&self, member: &[u8]) -> Option<f64> {
        self.scores.get(member).copied()
    }

    pub fn contains(&self, member: &[u8]) -> bool {
        self.scores.contains_key(member)
    }

    pub fn remove(&mut self, member: &[u8]) -> bool {
        match self.scores.remove(member) {
            Some(score) => {
                self.list.remove(member, score);
                true
            }
            None => false,
        }
    }

    /// Rank (0-based) of a member in ascending order.
    pub fn rank(&self, member: &[u8]) -> Option<u64> {
        let score = self.score(member)?;
        match self.list.get_rank(member, score) {
            0 => None,
            rank => Some(rank - 1),
        }
    }

    /// Rank (0-based) of a member in descending order.
    pub fn rev_rank(&self, member: &[u8]) -> Option<u64> {
        let rank = self.rank(member)?;
        Some(self.len() - 1 - rank)
    }

    /// Visits elements whose 0-based rank lies in `[start, stop)`. When
    /// `descending`, ranks count down from the highest element. Visiting
    /// stops early once `visitor` returns false.
    pub fn for_each<'a, F>(&'a self, start: i64, stop: i64, descending: bool, visitor: F) -> ZedisResult<()>
    where
        F: FnMut(&'a Element) -> bool,
    {
        let len = self.len();
        let out_of_range = ZedisError::RangeError { start, stop, len };
        if start < 0 || start as u64 >= len {
            return Err(out_of_range);
        }
        if stop < start || stop as u64 > len {
            return Err(out_of_range);
        }

        self.visit_window(start, stop, descending, visitor);
        Ok(())
    }

    /// Elements with 0-based rank in `[start, stop)`.
    pub fn range(&self, start: i64, stop: i64, descending: bool) -> ZedisResult<Vec<&Element>> {
        let mut items = Vec::new();
        self.for_each(start, stop, descending, |element| {
            items.push(element);
            true
        })?;
        Ok(items)
    }

    /// Number of members whose score lies within `[min, max]`.
    pub fn count(&self, min: &RangeBorder, max: &RangeBorder) -> u64 {
        let Some((_, first)) = self.list.first_in_range(min, max) else {
            return 0;
        };
        let Some((_, last)) = self.list.last_in_range(min, max) else {
            return 0;
        };
        last - first + 1
    }

    /// Visits members whose score lies within `[min, max]`, skipping
    /// `offset` from the start of the scan direction and visiting at most
    /// `limit` of them (`limit < 0` means no limit).
    pub fn for_each_by_score<'a, F>(
        &'a self,
        min: &RangeBorder,
        max: &RangeBorder,
        offset: i64,
        limit: i64,
        descending: bool,
        visitor: F,
    ) where
        F: FnMut(&'a Element) -> bool,
    {
        if let Some((start, stop)) = self.score_window(min, max, offset, limit, descending) {
            self.visit_window(start, stop, descending, visitor);
        }
    }

    /// Members whose score lies within `[min, max]`.
    pub fn range_by_score(
        &self,
        min: &RangeBorder,
        max: &RangeBorder,
        offset: i64,
        limit: i64,
        descending: bool,
    ) -> Vec<&Element> {
        let mut items = Vec::new();
        self.for_each_by_score(min, max, offset, limit, descending, |element| {
            items.push(element);
            true
        });
        items
    }

    /// Removes members whose score lies within `[min, max]`.
    pub fn remove_by_score(&mut self, min: &RangeBorder, max: &RangeBorder) -> u64 {
        let removed = self.list.remove_range_by_score(min, max);
        for element in &removed {
            self.scores.remove(&element.member);
        }
        removed.len() as u64
    }

    /// Removes members with 0-based rank in `[start, stop)`.
    pub fn remove_by_rank(&mut self, start: u64, stop: u64) -> u64 {
        let removed = self.list.remove_range_by_rank(start.saturating_add(1), stop.saturating_add(1));
        for element in &removed {
            self.scores.remove(&element.member);
        }
        removed.len() as u64
    }

    /// Increment a member's score. Returns the new score.
    pub fn incr_by(&mut self, member: Vec<u8>, delta: f64) -> f64 {
        let new_score = self.score(&member).unwrap_or(0.0) + delta;
        self.add(member, new_score);
        new_score
    }

    /// Pop the member with the minimum score.
    pub fn pop_min(&mut self) -> Option<Element> {
        let first = self.list.first()?.clone();
        self.remove(&first.member);
        Some(first)
    }

    /// Pop the member with the maximum score.
    pub fn pop_max(&mut self) -> Option<Element> {
        let last = self.list.last()?.clone();
        self.remove(&last.member);
        Some(last)
    }

    /// All elements in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.list.iter()
    }

    /// Walks an already validated 0-based window `[start, stop)`.
    fn visit_window<'a, F>(&'a self, start: i64, stop: i64, descending: bool, mut visitor: F)
    where
        F: FnMut(&'a Element) -> bool,
    {
        let len = self.len();
        debug_assert!(0 <= start && start <= stop && stop as u64 <= len);
        let first = if descending {
            len - start as u64
        } else {
            start as u64 + 1
        };
        let take = (stop - start) as usize;
        for element in self.list.iter_from_rank(first, descending).take(take) {
            if !visitor(element) {
                break;
            }
        }
    }

    /// Turns a score range plus offset/limit into a `for_each` rank window
    /// in the scan direction. None when nothing would be visited.
    fn score_window(
        &self,
        min: &RangeBorder,
        max: &RangeBorder,
        offset: i64,
        limit: i64,
        descending: bool,
    ) -> Option<(i64, i64)> {
        if offset < 0 {
            return None;
        }
        let (_, first) = self.list.first_in_range(min, max)?;
        let (_, last) = self.list.last_in_range(min, max)?;
        let len = self.len() as i64;
        let (first, last) = (first as i64, last as i64);

        // 0-based half-open window, counted from whichever end the scan starts
        let (lo, hi) = if descending {
            (len - last, len - first + 1)
        } else {
            (first - 1, last)
        };
        let start = lo.checked_add(offset)?;
        if start >= hi {
            return None;
        }
        let stop = if limit < 0 {
            hi
        } else {
            hi.min(start.saturating_add(limit))
        };
        Some((start, stop))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::skiplist::tests::FixedLevel;

    fn scenario() -> RedisSortedSet {
        let mut zs = RedisSortedSet::with_level_source(RandomLevels::seeded(2000));
        for i in 1..=2000 {
            zs.add(format!("m{i}").into_bytes(), i as f64);
        }
        zs
    }

    impl<L: LevelSource> RedisSortedSet<L> {
        fn assert_consistent(&self) {
            self.list.assert_invariants();
            assert_eq!(self.scores.len() as u64, self.list.len());
            for element in self.list.iter() {
                assert_eq!(self.scores.get(&element.member), Some(&element.score));
            }
        }
    }

    #[test]
    fn test_for_each_visits_in_order() {
        let zs = scenario();
        assert_eq!(zs.len(), 2000);
        let mut expected = 1.0;
        zs.for_each(0, zs.len() as i64, false, |e| {
            assert_eq!(e.score, expected);
            expected += 1.0;
            true
        })
        .unwrap();
        assert_eq!(expected, 2001.0);

        let all = zs.range(0, zs.len() as i64, false).unwrap();
        assert_eq!(all.len(), 2000);
        assert_eq!(all[1999].score, 2000.0);
    }

    #[test]
    fn test_for_each_descending_and_early_stop() {
        let zs = scenario();
        let top = zs.range(0, 3, true).unwrap();
        let scores: Vec<f64> = top.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![2000.0, 1999.0, 1998.0]);

        let skipped = zs.range(5, 7, true).unwrap();
        assert_eq!(skipped[0].score, 1995.0);
        assert_eq!(skipped[1].score, 1994.0);

        let mut seen = 0;
        zs.for_each(0, 100, false, |_| {
            seen += 1;
            seen < 5
        })
        .unwrap();
        assert_eq!(seen, 5);
    }

    #[test]
    fn test_for_each_rejects_bad_windows() {
        let zs = scenario();
        assert!(matches!(zs.range(-1, 3, false), Err(ZedisError::RangeError { .. })));
        assert!(matches!(zs.range(2000, 2000, false), Err(ZedisError::RangeError { .. })));
        assert!(matches!(zs.range(5, 4, false), Err(ZedisError::RangeError { .. })));
        assert!(matches!(zs.range(0, 2001, false), Err(ZedisError::RangeError { .. })));

        let empty = RedisSortedSet::new();
        assert!(empty.range(0, 0, false).is_err());
    }

    #[test]
    fn test_count() {
        let zs = scenario();
        let neg = RangeBorder::NEGATIVE_INFINITY;
        let pos = RangeBorder::POSITIVE_INFINITY;
        assert_eq!(zs.count(&neg, &pos), zs.len());
        assert_eq!(zs.count(&RangeBorder::inclusive(10.0), &pos), 1991);
        assert_eq!(zs.count(&RangeBorder::exclusive(10.0), &RangeBorder::exclusive(20.0)), 9);
        assert_eq!(zs.count(&RangeBorder::inclusive(30.0), &RangeBorder::inclusive(20.0)), 0);
        assert_eq!(zs.count(&RangeBorder::inclusive(2000.5), &pos), 0);
    }

    #[test]
    fn test_range_by_score_with_limit() {
        let zs = scenario();
        let pos = RangeBorder::POSITIVE_INFINITY;
        let items = zs.range_by_score(&RangeBorder::inclusive(10.0), &pos, 0, 10, false);
        let scores: Vec<f64> = items.iter().map(|e| e.score).collect();
        assert_eq!(scores, (10..20).map(|s| s as f64).collect::<Vec<_>>());

        let mut expected = 10.0;
        zs.for_each_by_score(&RangeBorder::inclusive(10.0), &pos, 0, 10, false, |e| {
            assert_eq!(e.score, expected);
            expected += 1.0;
            true
        });
        assert_eq!(expected, 20.0);
    }

    #[test]
    fn test_range_by_score_offsets() {
        let zs = scenario();
        let min = RangeBorder::inclusive(100.0);
        let max = RangeBorder::inclusive(110.0);

        let items = zs.range_by_score(&min, &max, 3, -1, false);
        assert_eq!(items.len(), 8);
        assert_eq!(items[0].score, 103.0);

        let items = zs.range_by_score(&min, &max, 3, 2, true);
        let scores: Vec<f64> = items.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![107.0, 106.0]);

        assert!(zs.range_by_score(&min, &max, 11, -1, false).is_empty());
        assert!(zs.range_by_score(&min, &max, 0, 0, false).is_empty());
        assert!(zs.range_by_score(&min, &max, -1, 5, false).is_empty());

        let all_desc = zs.range_by_score(&min, &max, 0, -1, true);
        assert_eq!(all_desc.len(), 11);
        assert_eq!(all_desc[0].score, 110.0);
        assert_eq!(all_desc[10].score, 100.0);
    }

    #[test]
    fn test_range_by_score_collects_through_visitor() {
        let zs = scenario();
        let min = RangeBorder::exclusive(50.0);
        let max = RangeBorder::inclusive(60.0);

        for (offset, limit, descending) in [(0, -1, false), (2, 3, true), (9, -1, true), (0, 0, false), (20, 1, false)] {
            let mut visited = Vec::new();
            zs.for_each_by_score(&min, &max, offset, limit, descending, |e| {
                visited.push(e);
                true
            });
            assert_eq!(zs.range_by_score(&min, &max, offset, limit, descending), visited);
        }

        let last_two = zs.range_by_score(&min, &max, 8, -1, false);
        let scores: Vec<f64> = last_two.iter().map(|e| e.score).collect();
        assert_eq!(scores, vec![59.0, 60.0]);
        assert!(zs.range_by_score(&min, &max, 0, 0, false).is_empty());

        let mut seen = Vec::new();
        zs.for_each_by_score(&min, &max, 0, -1, true, |e| {
            seen.push(e.score);
            seen.len() < 3
        });
        assert_eq!(seen, vec![60.0, 59.0, 58.0]);
    }

    #[test]
    fn test_add_updates_score() {
        let mut zs = RedisSortedSet::with_level_source(FixedLevel(2));
        assert!(zs.add(b"a".to_vec(), 1.0));
        assert!(zs.add(b"b".to_vec(), 2.0));
        assert!(zs.add(b"c".to_vec(), 3.0));
        assert!(!zs.add(b"a".to_vec(), 1.0));
        assert!(!zs.add(b"a".to_vec(), 5.0));
        assert_eq!(zs.len(), 3);
        assert_eq!(zs.score(b"a"), Some(5.0));
        assert_eq!(zs.rank(b"a"), Some(2));
        assert_eq!(zs.rev_rank(b"a"), Some(0));
        assert_eq!(zs.get(b"b"), Some(Element::new("b", 2.0)));
        assert!(zs.get(b"zz").is_none());
        zs.assert_consistent();
    }

    #[test]
    fn test_remove_and_idempotence() {
        let mut zs = scenario();
        for i in 1..=10 {
            assert!(zs.remove(format!("m{i}").as_bytes()));
        }
        assert_eq!(zs.len(), 1990);
        assert_eq!(zs.range(0, 1, false).unwrap()[0].score, 11.0);
        assert!(!zs.remove(b"m1"));
        assert_eq!(zs.len(), 1990);
        assert_eq!(zs.rank(b"m1"), None);
        zs.assert_consistent();
    }

    #[test]
    fn test_remove_by_score_and_rank() {
        let mut zs = scenario();
        let removed = zs.remove_by_score(&RangeBorder::NEGATIVE_INFINITY, &RangeBorder::inclusive(100.0));
        assert_eq!(removed, 100);
        assert!(!zs.contains(b"m100"));
        assert_eq!(zs.len(), 1900);
        zs.assert_consistent();

        let removed = zs.remove_by_rank(0, 10);
        assert_eq!(removed, 10);
        assert!(!zs.contains(b"m110"));
        assert!(zs.contains(b"m111"));
        assert_eq!(zs.rank(b"m111"), Some(0));
        zs.assert_consistent();
    }

    #[test]
    fn test_incr_and_pop() {
        let mut zs = RedisSortedSet::new();
        assert_eq!(zs.incr_by(b"x".to_vec(), 2.5), 2.5);
        assert_eq!(zs.incr_by(b"x".to_vec(), -5.0), -2.5);
        zs.add(b"y".to_vec(), 0.0);
        zs.add(b"z".to_vec(), 9.0);
        assert_eq!(zs.pop_min(), Some(Element::new("x", -2.5)));
        assert_eq!(zs.pop_max(), Some(Element::new("z", 9.0)));
        assert_eq!(zs.len(), 1);
        zs.assert_consistent();
        assert!(zs.pop_max().is_some());
        assert!(zs.pop_min().is_none());
        assert!(zs.is_empty());
    }

    mod random_ops {
        use super::super::RedisSortedSet;
        use crate::types::border::RangeBorder;
        use crate::types::skiplist::RandomLevels;
        use proptest::prelude::*;

        #[derive(Debug, Clone)]
        enum Op {
            Add(Vec<u8>, f64),
            Incr(Vec<u8>, f64),
            Remove(Vec<u8>),
            RemoveByRank(u64, u64),
            RemoveByScore(RangeBorder, RangeBorder),
            PopMin,
            PopMax,
        }

        fn member() -> impl Strategy<Value = Vec<u8>> {
            "[a-f]{0,2}".prop_map(String::into_bytes)
        }

        fn score() -> impl Strategy<Value = f64> {
            prop_oneof![
                12 => (-20i32..20).prop_map(f64::from),
                1 => Just(f64::INFINITY),
                1 => Just(f64::NEG_INFINITY),
            ]
        }

        fn border() -> impl Strategy<Value = RangeBorder> {
            prop_oneof![
                1 => Just(RangeBorder::NEGATIVE_INFINITY),
                1 => Just(RangeBorder::POSITIVE_INFINITY),
                6 => ((-20i32..20).prop_map(f64::from), any::<bool>()).prop_map(|(v, exclusive)| {
                    if exclusive {
                        RangeBorder::exclusive(v)
                    } else {
                        RangeBorder::inclusive(v)
                    }
                }),
            ]
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                8 => (member(), score()).prop_map(|(m, s)| Op::Add(m, s)),
                2 => (member(), (-3i32..3).prop_map(f64::from)).prop_map(|(m, d)| Op::Incr(m, d)),
                4 => member().prop_map(Op::Remove),
                1 => (0u64..12, 0u64..12).prop_map(|(a, b)| Op::RemoveByRank(a, b)),
                1 => (border(), border()).prop_map(|(min, max)| Op::RemoveByScore(min, max)),
                1 => Just(Op::PopMin),
                1 => Just(Op::PopMax),
            ]
        }

        proptest! {
            #[test]
            fn mixed_ops_keep_list_and_index_consistent(
                ops in prop::collection::vec(op(), 1..250),
                seed in any::<u64>(),
            ) {
                let mut zs = RedisSortedSet::with_level_source(RandomLevels::seeded(seed));
                for op in ops {
                    let before = zs.len();
                    match op {
                        Op::Add(m, s) => {
                            let is_new = !zs.contains(&m);
                            prop_assert_eq!(zs.add(m.clone(), s), is_new);
                            prop_assert_eq!(zs.score(&m), Some(s));
                        }
                        Op::Incr(m, d) => {
                            let score = zs.incr_by(m.clone(), d);
                            prop_assert_eq!(zs.score(&m), Some(score));
                        }
                        Op::Remove(m) => {
                            let existed = zs.contains(&m);
                            prop_assert_eq!(zs.remove(&m), existed);
                            prop_assert!(!zs.contains(&m));
                        }
                        Op::RemoveByRank(start, stop) => {
                            let expected = stop.min(before).saturating_sub(start);
                            prop_assert_eq!(zs.remove_by_rank(start, stop), expected);
                        }
                        Op::RemoveByScore(min, max) => {
                            let expected = zs.count(&min, &max);
                            prop_assert_eq!(zs.remove_by_score(&min, &max), expected);
                            prop_assert_eq!(zs.count(&min, &max), 0);
                        }
                        Op::PopMin => {
                            let first = zs.iter().next().cloned();
                            prop_assert_eq!(zs.pop_min(), first);
                        }
                        Op::PopMax => {
                            let last = zs.range(0, 1, true).ok().and_then(|v| v.first().map(|e| (*e).clone()));
                            prop_assert_eq!(zs.pop_max(), last);
                        }
                    }
                    zs.assert_consistent();
                    prop_assert!(zs.len() <= before + 1);
                }
            }
        }
    }
}
