//! A fully retroactive ordered map.
//!
//! Insertions (and erasures) can be performed at the present or just before
//! any earlier operation, and the map can be read *as of* any of those
//! moments: lookups, iteration and size queries all take an optional time
//! point.
//!
//! Three pieces cooperate. A value store keeps every `(key, value)` pair
//! ever inserted - entries are never removed, because a past version of the
//! map may still reach them. An [`OrderList`] holds one event per operation
//! in *time* order; its tokens are the map's time points, and its
//! constant-time order queries are what make "which event came last before
//! `t`?" cheap. A key index, sorted by the user comparator, maps each key to
//! its events sorted in time order.

use std::cmp::Ordering;
use std::ops::Range;

use smallvec::SmallVec;

use crate::order_list::{OrderList, Token};

/// The operation a map time point records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapOp {
    Insert,
    Erase,
}

/// A moment in a map's history: the handle returned by the operation that
/// created that moment.
#[derive(Debug, Clone, Copy)]
pub struct TimePoint {
    op: MapOp,
    event: Token,
}

impl TimePoint {
    /// The operation that was performed at this moment.
    pub fn operation(&self) -> MapOp {
        self.op
    }
}

/// Key ordering for a [`FullMap`].
pub trait Compare<K> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// The default comparator: the key type's own ordering.
#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalOrder;

impl<K: Ord> Compare<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K, F: Fn(&K, &K) -> Ordering> Compare<K> for F {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}

#[derive(Debug, Clone, Copy)]
struct Event {
    op: MapOp,
    /// Value-store index. For an erase, the entry that introduced the key;
    /// never read back out, since queries only surface insert events.
    data: usize,
}

#[derive(Debug, Clone)]
struct KeyEntry {
    /// Value-store index of the pair that introduced this key.
    key: usize,
    /// Every event touching this key, sorted by event-list order. Grows
    /// only; an erase cancels earlier inserts by coming after them.
    events: SmallVec<[Token; 2]>,
}

/// An ordered associative map whose history can be edited and queried.
///
/// ```rust
/// use retro::FullMap;
///
/// let mut m = FullMap::new();
/// let t2 = m.insert(2, "two");
/// m.insert_before(&t2, 1, "one");
/// assert_eq!(m.iter().collect::<Vec<_>>(), [(&1, &"one"), (&2, &"two")]);
/// assert!(m.iter_at(&t2).eq([(&1, &"one")]));
/// ```
#[derive(Debug, Clone)]
pub struct FullMap<K, V, C = NaturalOrder> {
    data: Vec<(K, V)>,
    events: OrderList<Event>,
    keys: Vec<KeyEntry>,
    cmp: C,
}

impl<K, V> FullMap<K, V> {
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, V> Default for FullMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> FullMap<K, V, C> {
    pub fn with_comparator(cmp: C) -> Self {
        FullMap {
            data: Vec::new(),
            events: OrderList::new(),
            keys: Vec::new(),
            cmp,
        }
    }

    /// Number of keys present in the map right now.
    pub fn len(&self) -> usize {
        self.keys.iter().filter(|e| self.exists_now(e)).count()
    }

    pub fn is_empty(&self) -> bool {
        !self.keys.iter().any(|e| self.exists_now(e))
    }

    /// Number of keys present just before the operation `t`.
    pub fn len_at(&self, t: &TimePoint) -> usize {
        self.keys.iter().filter(|e| self.exists_at(e, t.event)).count()
    }

    pub fn is_empty_at(&self, t: &TimePoint) -> bool {
        !self.keys.iter().any(|e| self.exists_at(e, t.event))
    }

    pub fn max_size(&self) -> usize {
        self.events.max_size()
    }

    /// Iterate over the present map in key order.
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter { map: self, range: 0..self.keys.len() }
    }

    /// Iterate, in key order, over the map as it was just before `t`.
    pub fn iter_at(&self, t: &TimePoint) -> IterAt<'_, K, V, C> {
        IterAt { map: self, at: t.event, range: 0..self.keys.len() }
    }

    /// A key is present now when its latest event is an insert.
    fn exists_now(&self, entry: &KeyEntry) -> bool {
        entry.events.last().map_or(false, |&e| self.events.get(e).op == MapOp::Insert)
    }

    /// A key was present just before `at` when its latest event strictly
    /// before `at` is an insert.
    fn exists_at(&self, entry: &KeyEntry, at: Token) -> bool {
        self.last_event_before(entry, at)
            .map_or(false, |e| self.events.get(e).op == MapOp::Insert)
    }

    fn last_event_before(&self, entry: &KeyEntry, at: Token) -> Option<Token> {
        let events = &self.events;
        let i = entry.events.partition_point(|&e| events.order(e, at) == Ordering::Less);
        if i == 0 {
            None
        } else {
            Some(entry.events[i - 1])
        }
    }

    /// File a new event under a key, keeping the set sorted in time order.
    /// Present-time operations append, so try the back first.
    fn add_event(&mut self, pos: usize, event: Token) {
        let order = &self.events;
        let set = &mut self.keys[pos].events;
        match set.last() {
            Some(&last) if order.order(last, event) == Ordering::Greater => {
                let i = set.partition_point(|&e| order.order(e, event) == Ordering::Less);
                set.insert(i, event);
            }
            _ => set.push(event),
        }
    }
}

impl<K, V, C: Compare<K>> FullMap<K, V, C> {
    /// Insert a pair now. The event is recorded even if the key is already
    /// present: the present value becomes the new one, and the key's full
    /// history stays available to past queries.
    pub fn insert(&mut self, key: K, value: V) -> TimePoint {
        let end = self.events.end();
        self.insert_impl(end, key, value)
    }

    /// Insert a pair retroactively, just before the operation `t`.
    pub fn insert_before(&mut self, t: &TimePoint, key: K, value: V) -> TimePoint {
        self.insert_impl(t.event, key, value)
    }

    fn insert_impl(&mut self, before: Token, key: K, value: V) -> TimePoint {
        let data = self.data.len();
        self.data.push((key, value));

        let event = self.events.insert_before(before, Event { op: MapOp::Insert, data });

        let pos = match self.key_pos(&self.data[data].0) {
            Ok(pos) => pos,
            Err(pos) => {
                self.keys.insert(pos, KeyEntry { key: data, events: SmallVec::new() });
                pos
            }
        };
        self.add_event(pos, event);

        TimePoint { op: MapOp::Insert, event }
    }

    /// Erase a key now. Returns the time point of the erase, or `None` when
    /// the key has never been inserted (there is no history to extend).
    pub fn erase(&mut self, key: &K) -> Option<TimePoint> {
        let end = self.events.end();
        self.erase_impl(end, key)
    }

    /// Erase a key retroactively, just before the operation `t`.
    pub fn erase_before(&mut self, t: &TimePoint, key: &K) -> Option<TimePoint> {
        self.erase_impl(t.event, key)
    }

    fn erase_impl(&mut self, before: Token, key: &K) -> Option<TimePoint> {
        let pos = self.key_pos(key).ok()?;
        let data = self.keys[pos].key;
        let event = self.events.insert_before(before, Event { op: MapOp::Erase, data });
        self.add_event(pos, event);
        Some(TimePoint { op: MapOp::Erase, event })
    }

    /// Look up a key in the present map.
    pub fn find(&self, key: &K) -> Option<(&K, &V)> {
        let pos = self.key_pos(key).ok()?;
        let entry = &self.keys[pos];
        if !self.exists_now(entry) {
            return None;
        }
        let e = *entry.events.last().unwrap();
        let (k, v) = &self.data[self.events.get(e).data];
        Some((k, v))
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.find(key).map(|(_, v)| v)
    }

    /// Look up a key in the map as it was just before `t`.
    pub fn find_at(&self, t: &TimePoint, key: &K) -> Option<(&K, &V)> {
        let pos = self.key_pos(key).ok()?;
        let entry = &self.keys[pos];
        let e = self.last_event_before(entry, t.event)?;
        let event = self.events.get(e);
        if event.op != MapOp::Insert {
            return None;
        }
        let (k, v) = &self.data[event.data];
        Some((k, v))
    }

    pub fn get_at(&self, t: &TimePoint, key: &K) -> Option<&V> {
        self.find_at(t, key).map(|(_, v)| v)
    }

    fn key_pos(&self, key: &K) -> Result<usize, usize> {
        self.keys.binary_search_by(|e| self.cmp.compare(&self.data[e.key].0, key))
    }

    /// Check every structural invariant. Only called from tests and fuzzers.
    #[allow(unused)]
    pub fn dbg_check(&self) {
        self.events.dbg_check();
        for window in self.keys.windows(2) {
            assert_eq!(
                self.cmp.compare(&self.data[window[0].key].0, &self.data[window[1].key].0),
                Ordering::Less,
                "key index out of order"
            );
        }
        for entry in &self.keys {
            assert!(!entry.events.is_empty(), "key entry with no events");
            for pair in entry.events.windows(2) {
                assert_eq!(
                    self.events.order(pair[0], pair[1]),
                    Ordering::Less,
                    "event set out of time order"
                );
            }
        }
    }
}

/// Double-ended iterator over the present map in key order.
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V, C> {
    map: &'a FullMap<K, V, C>,
    range: Range<usize>,
}

impl<'a, K, V, C> Iter<'a, K, V, C> {
    fn emit(&self, pos: usize) -> Option<(&'a K, &'a V)> {
        let map = self.map;
        let entry = &map.keys[pos];
        if !map.exists_now(entry) {
            return None;
        }
        let e = *entry.events.last().unwrap();
        let (k, v) = &map.data[map.events.get(e).data];
        Some((k, v))
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(pos) = self.range.next() {
            if let Some(item) = self.emit(pos) {
                return Some(item);
            }
        }
        None
    }
}

impl<'a, K, V, C> DoubleEndedIterator for Iter<'a, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(pos) = self.range.next_back() {
            if let Some(item) = self.emit(pos) {
                return Some(item);
            }
        }
        None
    }
}

/// Double-ended iterator over the map as it was just before a time point.
#[derive(Debug, Clone)]
pub struct IterAt<'a, K, V, C> {
    map: &'a FullMap<K, V, C>,
    at: Token,
    range: Range<usize>,
}

impl<'a, K, V, C> IterAt<'a, K, V, C> {
    fn emit(&self, pos: usize) -> Option<(&'a K, &'a V)> {
        let map = self.map;
        let entry = &map.keys[pos];
        let e = map.last_event_before(entry, self.at)?;
        let event = map.events.get(e);
        if event.op != MapOp::Insert {
            return None;
        }
        let (k, v) = &map.data[event.data];
        Some((k, v))
    }
}

impl<'a, K, V, C> Iterator for IterAt<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(pos) = self.range.next() {
            if let Some(item) = self.emit(pos) {
                return Some(item);
            }
        }
        None
    }
}

impl<'a, K, V, C> DoubleEndedIterator for IterAt<'a, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        while let Some(pos) = self.range.next_back() {
            if let Some(item) = self.emit(pos) {
                return Some(item);
            }
        }
        None
    }
}
