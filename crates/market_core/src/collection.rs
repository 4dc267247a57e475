use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::{Item, ItemId};

/// How the presentation lays out the same ordered items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    List,
    Grid,
}

impl LayoutMode {
    pub fn name(self) -> &'static str {
        match self {
            LayoutMode::List => "list",
            LayoutMode::Grid => "grid",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LayoutMode::List => LayoutMode::Grid,
            LayoutMode::Grid => LayoutMode::List,
        }
    }
}

impl fmt::Display for LayoutMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list" => Ok(LayoutMode::List),
            "grid" => Ok(LayoutMode::Grid),
            other => Err(format!("unknown layout '{other}', expected 'list' or 'grid'")),
        }
    }
}

/// Immutable point-in-time view of the accumulated items.
///
/// Cloning is cheap; the items are shared.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    version: u64,
    layout: LayoutMode,
    items: Arc<[Item]>,
}

impl Snapshot {
    fn empty(layout: LayoutMode) -> Self {
        Self {
            version: 0,
            layout,
            items: Arc::from(Vec::new()),
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn layout(&self) -> LayoutMode {
        self.layout
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(|item| item.id).collect()
    }

    /// Items appended since `previous`, when `previous` is a prefix of this snapshot.
    ///
    /// Returns `None` when the two snapshots diverge (e.g. across a clear), in
    /// which case a renderer must redraw everything.
    pub fn appended_since(&self, previous: &Snapshot) -> Option<&[Item]> {
        let prefix_len = previous.len();
        if prefix_len > self.len() {
            return None;
        }
        let same_prefix = self.items[..prefix_len]
            .iter()
            .zip(previous.items.iter())
            .all(|(a, b)| a.id == b.id);
        same_prefix.then(|| &self.items[prefix_len..])
    }
}

/// Accumulates appended items into an ordered, duplicate-free sequence and
/// hands out snapshots for either layout.
#[derive(Debug, Clone)]
pub struct IncrementalCollectionModel {
    items: Vec<Item>,
    ids: HashSet<ItemId>,
    snapshot: Snapshot,
}

impl IncrementalCollectionModel {
    pub fn new(layout: LayoutMode) -> Self {
        Self {
            items: Vec::new(),
            ids: HashSet::new(),
            snapshot: Snapshot::empty(layout),
        }
    }

    pub fn apply_append(&mut self, new_items: impl IntoIterator<Item = Item>) -> Snapshot {
        let before = self.items.len();
        for item in new_items {
            if self.ids.insert(item.id) {
                self.items.push(item);
            }
        }
        if self.items.len() != before {
            self.publish(self.snapshot.layout);
        }
        self.current_snapshot()
    }

    pub fn current_snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    pub fn clear(&mut self) -> Snapshot {
        self.items.clear();
        self.ids.clear();
        self.publish(self.snapshot.layout);
        self.current_snapshot()
    }

    /// Switches presentation; the item order is untouched.
    pub fn set_layout(&mut self, layout: LayoutMode) -> Snapshot {
        if layout != self.snapshot.layout {
            self.publish(layout);
        }
        self.current_snapshot()
    }

    pub fn layout(&self) -> LayoutMode {
        self.snapshot.layout
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn publish(&mut self, layout: LayoutMode) {
        self.snapshot = Snapshot {
            version: self.snapshot.version + 1,
            layout,
            items: Arc::from(self.items.as_slice()),
        };
    }
}

impl Default for IncrementalCollectionModel {
    fn default() -> Self {
        Self::new(LayoutMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(ids: &[ItemId]) -> Vec<Item> {
        ids.iter().map(|id| Item::new(*id, format!("item {id}"))).collect()
    }

    #[test]
    fn append_dedupes_and_versions() {
        let mut model = IncrementalCollectionModel::default();
        let first = model.apply_append(items(&[1, 2]));
        let second = model.apply_append(items(&[2, 3]));

        assert_eq!(first.ids(), vec![1, 2]);
        assert_eq!(second.ids(), vec![1, 2, 3]);
        assert!(second.version() > first.version());
    }

    #[test]
    fn append_of_only_duplicates_keeps_version() {
        let mut model = IncrementalCollectionModel::default();
        let first = model.apply_append(items(&[1]));
        let again = model.apply_append(items(&[1]));
        assert_eq!(first, again);
    }

    #[test]
    fn layout_switch_keeps_order() {
        let mut model = IncrementalCollectionModel::default();
        let list = model.apply_append(items(&[5, 3, 9]));
        let grid = model.set_layout(LayoutMode::Grid);
        let back = model.set_layout(LayoutMode::List);

        assert_eq!(grid.layout(), LayoutMode::Grid);
        assert_eq!(list.ids(), grid.ids());
        assert_eq!(grid.ids(), back.ids());
        assert_eq!(model.current_snapshot(), back);
    }

    #[test]
    fn old_snapshots_are_immutable() {
        let mut model = IncrementalCollectionModel::default();
        let first = model.apply_append(items(&[1]));
        model.apply_append(items(&[2]));
        model.clear();
        assert_eq!(first.ids(), vec![1]);
    }

    #[test]
    fn appended_since_returns_tail_or_none() {
        let mut model = IncrementalCollectionModel::default();
        let first = model.apply_append(items(&[1, 2]));
        let second = model.apply_append(items(&[3]));
        let tail = second.appended_since(&first).unwrap();
        assert_eq!(tail.iter().map(|i| i.id).collect::<Vec<_>>(), vec![3]);

        let cleared = model.clear();
        let fresh = model.apply_append(items(&[7]));
        assert!(fresh.appended_since(&second).is_none());
        assert_eq!(fresh.appended_since(&cleared).unwrap().len(), 1);
    }

    #[test]
    fn layout_parses_case_insensitively() {
        assert_eq!("Grid".parse::<LayoutMode>(), Ok(LayoutMode::Grid));
        assert_eq!(" list ".parse::<LayoutMode>(), Ok(LayoutMode::List));
        assert!("table".parse::<LayoutMode>().is_err());
        assert_eq!(LayoutMode::List.toggled(), LayoutMode::Grid);
    }
}
