//! Membership and ordinal bookkeeping for the action list.
//!
//! Items are kept in display order: ordinal ascending, ties broken by
//! insertion order. The collection is the only place ordinals are assigned.
//! Every membership or payload change is recorded as a [`CollectionEvent`]
//! that the owning controller drains to keep its views in step.

use std::mem;

use shared::domain::{ActionId, ActionRecord};

use crate::{
    error::EditorError,
    item::{ActionPayload, Item, ItemKey},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionEvent {
    Added { key: ItemKey, index: usize },
    Removed { key: ItemKey, index: usize },
    Moved { key: ItemKey, from: usize, to: usize },
    Changed { key: ItemKey },
}

#[derive(Debug, Default)]
pub struct OrderedCollection {
    items: Vec<Item>,
    next_key: u64,
    events: Vec<CollectionEvent>,
}

impl OrderedCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the collection from the server-provided list. Records without a
    /// stored index go after the indexed ones, in seed order. No events are
    /// recorded for seeded items.
    pub fn seed(records: impl IntoIterator<Item = ActionRecord>) -> Self {
        let mut collection = Self::new();
        let mut seeded: Vec<(Option<i64>, Item)> = records
            .into_iter()
            .map(|record| {
                let index = record.index;
                (index, collection.new_item(record, 0))
            })
            .collect();
        seeded.sort_by_key(|(index, _)| index.unwrap_or(i64::MAX));
        collection.items = seeded.into_iter().map(|(_, item)| item).collect();
        collection.compact();
        collection
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    pub fn get(&self, key: ItemKey) -> Option<&Item> {
        self.items.iter().find(|item| item.key == key)
    }

    pub fn position_of(&self, key: ItemKey) -> Option<usize> {
        self.items.iter().position(|item| item.key == key)
    }

    pub fn key_at(&self, position: usize) -> Option<ItemKey> {
        self.items.get(position).map(|item| item.key)
    }

    pub fn ordinals(&self) -> Vec<i64> {
        self.items.iter().map(|item| item.ordinal).collect()
    }

    /// Ids of persisted items in display order. Unsaved items are skipped.
    pub fn persisted_order(&self) -> Vec<ActionId> {
        self.items.iter().filter_map(|item| item.id).collect()
    }

    /// Appends an item. Without a stored index it takes `count - 1`, the
    /// count including itself. Ordinals are contiguous again afterwards.
    pub fn add(&mut self, record: ActionRecord) -> ItemKey {
        let index = record.index;
        let ordinal = index.unwrap_or(self.items.len() as i64);
        let item = self.new_item(record, ordinal);
        let key = item.key;
        self.items.push(item);
        self.sort_by_ordinal();
        self.compact();

        let index = self.position_of(key).unwrap_or(self.items.len() - 1);
        self.events.push(CollectionEvent::Added { key, index });
        key
    }

    /// Removes an item from membership. Remaining ordinals are left as they
    /// are; the next reorder or insertion closes the gap.
    pub fn remove(&mut self, key: ItemKey) -> Option<Item> {
        let index = self.position_of(key)?;
        let item = self.items.remove(index);
        self.events.push(CollectionEvent::Removed { key, index });
        Some(item)
    }

    /// Moves an item to `target` among its siblings. Every other item at
    /// rank `r` ends up at `r + 1` when `r >= target`, else at `r`.
    pub fn move_to(&mut self, key: ItemKey, target: usize) -> Result<(), EditorError> {
        let from = self.position_of(key).ok_or(EditorError::UnknownItem(key))?;
        if target >= self.items.len() {
            return Err(EditorError::PositionOutOfRange {
                position: target,
                len: self.items.len(),
            });
        }

        let mut moved = self.items.remove(from);
        for (rank, item) in self.items.iter_mut().enumerate() {
            let rank = if rank >= target { rank + 1 } else { rank };
            item.ordinal = rank as i64;
        }
        moved.ordinal = target as i64;
        self.items.insert(target, moved);
        self.sort_by_ordinal();

        self.events.push(CollectionEvent::Moved {
            key,
            from,
            to: target,
        });
        Ok(())
    }

    /// Replaces the stored payload with the server's copy. An unsaved item
    /// adopts the record's id; a persisted item keeps its own.
    pub fn replace_payload(&mut self, key: ItemKey, record: ActionRecord) -> Result<(), EditorError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.key == key)
            .ok_or(EditorError::UnknownItem(key))?;
        if item.id.is_none() {
            item.id = record.id;
        }
        item.payload = ActionPayload::from(record);
        self.events.push(CollectionEvent::Changed { key });
        Ok(())
    }

    pub fn drain_events(&mut self) -> Vec<CollectionEvent> {
        mem::take(&mut self.events)
    }

    fn new_item(&mut self, record: ActionRecord, ordinal: i64) -> Item {
        let key = ItemKey(self.next_key);
        self.next_key += 1;
        Item {
            key,
            id: record.id,
            ordinal,
            payload: ActionPayload::from(record),
        }
    }

    fn sort_by_ordinal(&mut self) {
        // stable: equal ordinals keep insertion order
        self.items.sort_by_key(|item| item.ordinal);
    }

    fn compact(&mut self) {
        for (rank, item) in self.items.iter_mut().enumerate() {
            item.ordinal = rank as i64;
        }
    }
}

#[cfg(test)]
#[path = "tests/collection_tests.rs"]
mod tests;
