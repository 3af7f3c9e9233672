use super::*;
use shared::domain::ActionFields;

fn record(id: i64, index: i64, name: &str) -> ActionRecord {
    ActionRecord {
        id: Some(ActionId(id)),
        index: Some(index),
        fields: ActionFields {
            name: name.to_string(),
            ..ActionFields::default()
        },
        ..ActionRecord::default()
    }
}

fn names(collection: &OrderedCollection) -> Vec<String> {
    collection
        .iter()
        .map(|item| item.fields().name.clone())
        .collect()
}

fn assert_contiguous(collection: &OrderedCollection) {
    let expected: Vec<i64> = (0..collection.len() as i64).collect();
    assert_eq!(collection.ordinals(), expected);
}

fn four() -> OrderedCollection {
    OrderedCollection::seed(vec![
        record(10, 0, "a"),
        record(11, 1, "b"),
        record(12, 2, "c"),
        record(13, 3, "d"),
    ])
}

#[test]
fn seed_sorts_by_stored_index_and_compacts() {
    let collection = OrderedCollection::seed(vec![
        record(1, 7, "last"),
        record(2, 0, "first"),
        record(3, 3, "middle"),
    ]);

    assert_eq!(names(&collection), vec!["first", "middle", "last"]);
    assert_contiguous(&collection);
}

#[test]
fn seed_keeps_seed_order_on_ties_and_puts_unindexed_last() {
    let mut unindexed = record(4, 0, "unindexed");
    unindexed.index = None;
    let collection = OrderedCollection::seed(vec![
        unindexed,
        record(1, 2, "tie-1"),
        record(2, 2, "tie-2"),
        record(3, 1, "one"),
    ]);

    assert_eq!(names(&collection), vec!["one", "tie-1", "tie-2", "unindexed"]);
    assert_contiguous(&collection);
}

#[test]
fn seed_records_no_events() {
    let mut collection = four();
    assert!(collection.drain_events().is_empty());
}

#[test]
fn add_without_index_appends_at_count_minus_one() {
    let mut collection = four();
    let key = collection.add(ActionRecord::default());

    let item = collection.get(key).expect("item");
    assert_eq!(item.ordinal(), 4);
    assert_eq!(item.id(), None);
    assert_eq!(
        collection.drain_events(),
        vec![CollectionEvent::Added { key, index: 4 }]
    );
}

#[test]
fn add_with_duplicate_index_goes_after_existing_item() {
    let mut collection = four();
    let key = collection.add(record(20, 1, "dup"));

    assert_eq!(names(&collection), vec!["a", "b", "dup", "c", "d"]);
    assert_eq!(collection.position_of(key), Some(2));
    assert_contiguous(&collection);
}

#[test]
fn remove_does_not_renumber() {
    let mut collection = four();
    let key = collection.key_at(1).expect("key");

    let removed = collection.remove(key).expect("removed");
    assert_eq!(removed.fields().name, "b");
    assert_eq!(collection.ordinals(), vec![0, 2, 3]);
    assert_eq!(
        collection.drain_events(),
        vec![CollectionEvent::Removed { key, index: 1 }]
    );
}

#[test]
fn add_after_remove_closes_the_gap() {
    let mut collection = four();
    let key = collection.key_at(1).expect("key");
    collection.remove(key);

    let added = collection.add(ActionRecord::default());
    assert_contiguous(&collection);
    assert_eq!(collection.position_of(added), Some(3));
}

#[test]
fn move_from_three_to_one_shifts_the_middle_up() {
    let mut collection = four();
    let moved = collection.key_at(3).expect("key");

    collection.move_to(moved, 1).expect("move");

    assert_eq!(names(&collection), vec!["a", "d", "b", "c"]);
    assert_contiguous(&collection);
    assert_eq!(collection.get(moved).expect("moved").ordinal(), 1);
    assert_eq!(
        collection.drain_events(),
        vec![CollectionEvent::Moved {
            key: moved,
            from: 3,
            to: 1
        }]
    );
}

#[test]
fn move_forward_and_to_same_position() {
    let mut collection = four();
    let first = collection.key_at(0).expect("key");

    collection.move_to(first, 2).expect("move");
    assert_eq!(names(&collection), vec!["b", "c", "a", "d"]);

    collection.move_to(first, 2).expect("move");
    assert_eq!(names(&collection), vec!["b", "c", "a", "d"]);
    assert_contiguous(&collection);
}

#[test]
fn move_normalizes_gaps_left_by_remove() {
    let mut collection = four();
    let b = collection.key_at(1).expect("key");
    collection.remove(b);
    let a = collection.key_at(0).expect("key");

    collection.move_to(a, 2).expect("move");

    assert_eq!(names(&collection), vec!["c", "d", "a"]);
    assert_contiguous(&collection);
}

#[test]
fn move_rejects_out_of_range_target_and_unknown_key() {
    let mut collection = four();
    let key = collection.key_at(0).expect("key");

    assert_eq!(
        collection.move_to(key, 4),
        Err(EditorError::PositionOutOfRange {
            position: 4,
            len: 4
        })
    );
    assert_eq!(
        collection.move_to(ItemKey(99), 0),
        Err(EditorError::UnknownItem(ItemKey(99)))
    );
    assert_eq!(names(&collection), vec!["a", "b", "c", "d"]);
}

#[test]
fn persisted_order_skips_unsaved_items() {
    let mut collection = four();
    let unsaved = collection.add(ActionRecord::default());
    collection.move_to(unsaved, 0).expect("move");

    assert_eq!(
        collection.persisted_order(),
        vec![ActionId(10), ActionId(11), ActionId(12), ActionId(13)]
    );
}

#[test]
fn replace_payload_adopts_id_only_for_unsaved_items() {
    let mut collection = four();
    let unsaved = collection.add(ActionRecord::default());
    let saved = collection.key_at(0).expect("key");
    collection.drain_events();

    collection
        .replace_payload(unsaved, record(30, 9, "created"))
        .expect("replace");
    collection
        .replace_payload(saved, record(99, 0, "renamed"))
        .expect("replace");

    assert_eq!(collection.get(unsaved).expect("item").id(), Some(ActionId(30)));
    assert_eq!(collection.get(saved).expect("item").id(), Some(ActionId(10)));
    assert_eq!(collection.get(saved).expect("item").fields().name, "renamed");
    // the server's index does not touch the client-managed ordinal
    assert_eq!(collection.get(unsaved).expect("item").ordinal(), 4);
    assert_eq!(
        collection.drain_events(),
        vec![
            CollectionEvent::Changed { key: unsaved },
            CollectionEvent::Changed { key: saved },
        ]
    );
}

#[test]
fn ordinals_stay_contiguous_across_mixed_operations() {
    let mut collection = four();
    let steps: [(u8, usize, usize); 8] = [
        (0, 0, 0),
        (1, 2, 0),
        (2, 3, 1),
        (1, 0, 0),
        (0, 0, 0),
        (2, 0, 3),
        (1, 1, 0),
        (2, 2, 0),
    ];

    for (op, position, target) in steps {
        match op {
            0 => {
                collection.add(ActionRecord::default());
            }
            1 => {
                let key = collection.key_at(position).expect("key");
                collection.remove(key);
                // removal leaves gaps; the next completed insertion or move
                // restores contiguity
                continue;
            }
            _ => {
                let key = collection.key_at(position).expect("key");
                collection.move_to(key, target).expect("move");
            }
        }
        assert_contiguous(&collection);
    }
}
