//! Contact bookkeeping between steps
//!
//! Touching pairs are recomputed from geometry every step. Diffing the new
//! set against the previous one yields Begin and End events; pairs present
//! in both sets are persisting and produce no event.

use std::collections::BTreeSet;

use super::body::BodyId;

/// Unordered body pair, stored with the smaller id first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContactPair {
    pub a: BodyId,
    pub b: BodyId,
}

impl ContactPair {
    pub fn new(x: BodyId, y: BodyId) -> Self {
        if x <= y {
            Self { a: x, b: y }
        } else {
            Self { a: y, b: x }
        }
    }

    #[inline]
    pub fn involves(&self, id: BodyId) -> bool {
        self.a == id || self.b == id
    }

    /// The other body of the pair, if `id` is part of it
    pub fn other(&self, id: BodyId) -> Option<BodyId> {
        if self.a == id {
            Some(self.b)
        } else if self.b == id {
            Some(self.a)
        } else {
            None
        }
    }
}

/// How a pair's touching status changed this step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactKind {
    Begin,
    Persisting,
    End,
}

/// A Begin or End transition emitted by the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactEvent {
    pub pair: ContactPair,
    pub kind: ContactKind,
}

/// Remembers which pairs were touching after the last step
#[derive(Debug, Clone, Default)]
pub struct ContactTracker {
    touching: BTreeSet<ContactPair>,
}

impl ContactTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the touching set and return the Begin/End events, ordered
    /// by pair so identical inputs always yield identical event lists
    pub fn update(&mut self, current: BTreeSet<ContactPair>) -> Vec<ContactEvent> {
        let ended = self.touching.difference(&current).map(|&pair| ContactEvent {
            pair,
            kind: ContactKind::End,
        });
        let began = current.difference(&self.touching).map(|&pair| ContactEvent {
            pair,
            kind: ContactKind::Begin,
        });
        let mut events: Vec<ContactEvent> = ended.chain(began).collect();
        events.sort_by_key(|e| e.pair);

        self.touching = current;
        events
    }

    /// Classify a pair against the last recorded set
    pub fn classify(&self, pair: ContactPair, touching_now: bool) -> Option<ContactKind> {
        match (self.touching.contains(&pair), touching_now) {
            (false, true) => Some(ContactKind::Begin),
            (true, true) => Some(ContactKind::Persisting),
            (true, false) => Some(ContactKind::End),
            (false, false) => None,
        }
    }

    pub fn is_touching(&self, pair: ContactPair) -> bool {
        self.touching.contains(&pair)
    }

    /// Drop every remembered pair involving `id` (after a teleport)
    pub fn forget_body(&mut self, id: BodyId) {
        self.touching.retain(|pair| !pair.involves(id));
    }

    pub fn clear(&mut self) {
        self.touching.clear();
    }
}
