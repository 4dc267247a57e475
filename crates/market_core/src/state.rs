use std::collections::{BTreeSet, HashSet};

use crate::view_model::FeedViewModel;
use crate::{Generation, Item, ItemId, PageNumber, PrefetchGate, FIRST_PAGE_NUMBER};

/// Single-owner mutable state of the feed.
///
/// Only [`crate::update`] mutates it; everything else reads through
/// accessors or [`FeedState::view`].
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    gate: PrefetchGate,
    items: Vec<Item>,
    known_ids: HashSet<ItemId>,
    next_page_number: PageNumber,
    in_flight: BTreeSet<PageNumber>,
    last_error: Option<String>,
    generation: Generation,
    duplicates_dropped: usize,
    dirty: bool,
}

impl FeedState {
    pub fn new(gate: PrefetchGate) -> Self {
        Self {
            gate,
            items: Vec::new(),
            known_ids: HashSet::new(),
            next_page_number: FIRST_PAGE_NUMBER,
            in_flight: BTreeSet::new(),
            last_error: None,
            generation: 0,
            duplicates_dropped: 0,
            dirty: false,
        }
    }

    pub fn view(&self) -> FeedViewModel {
        FeedViewModel {
            item_count: self.items.len(),
            is_loading: self.is_loading(),
            in_flight: self.in_flight.iter().copied().collect(),
            next_page_number: self.next_page_number,
            last_error: self.last_error.clone(),
            generation: self.generation,
            duplicates_dropped: self.duplicates_dropped,
            dirty: self.dirty,
        }
    }

    pub fn gate(&self) -> PrefetchGate {
        self.gate
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn next_page_number(&self) -> PageNumber {
        self.next_page_number
    }

    pub fn is_loading(&self) -> bool {
        !self.in_flight.is_empty()
    }

    pub fn is_in_flight(&self, page: PageNumber) -> bool {
        self.in_flight.contains(&page)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn duplicates_dropped(&self) -> usize {
        self.duplicates_dropped
    }

    /// Returns whether anything visible changed since the last call.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn advance_page_counter(&mut self) {
        self.next_page_number = self.next_page_number.saturating_add(1);
        self.dirty = true;
    }

    /// Marks `page` in flight. False if it already was.
    pub(crate) fn begin_request(&mut self, page: PageNumber) -> bool {
        let inserted = self.in_flight.insert(page);
        if inserted {
            self.dirty = true;
        }
        inserted
    }

    /// Clears the in-flight mark for `page`. False if it was not in flight.
    pub(crate) fn finish_request(&mut self, page: PageNumber) -> bool {
        let removed = self.in_flight.remove(&page);
        if removed {
            self.dirty = true;
        }
        removed
    }

    /// Appends items whose id is not yet present; returns the appended delta.
    pub(crate) fn merge_items(&mut self, incoming: Vec<Item>) -> Vec<Item> {
        let mut appended = Vec::with_capacity(incoming.len());
        for item in incoming {
            if self.known_ids.insert(item.id) {
                appended.push(item);
            } else {
                self.duplicates_dropped += 1;
            }
        }
        if !appended.is_empty() {
            self.items.extend(appended.iter().cloned());
            self.dirty = true;
        }
        appended
    }

    pub(crate) fn record_error(&mut self, message: String) {
        self.last_error = Some(message);
        self.dirty = true;
    }

    /// Clears everything and opens a new generation. The gate survives.
    pub(crate) fn reset(&mut self) {
        let generation = self.generation.wrapping_add(1);
        *self = Self::new(self.gate);
        self.generation = generation;
        self.dirty = true;
    }
}

impl Default for FeedState {
    fn default() -> Self {
        Self::new(PrefetchGate::default())
    }
}
