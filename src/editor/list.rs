//! Ordered-list operations shared by questions and options
//!
//! Every function takes the current list by reference and returns a new
//! `Vec`, leaving the input untouched. Unknown ids are never an error:
//! the result simply equals the input.

use super::ids::RecordId;

/// Items addressable by a stable id
pub trait Keyed {
    fn key(&self) -> &RecordId;
}

/// End of a drag gesture: the dragged item and the item it was dropped on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragEnd {
    pub active: RecordId,
    pub over: Option<RecordId>,
}

impl DragEnd {
    pub fn new(active: RecordId, over: Option<RecordId>) -> Self {
        Self { active, over }
    }
}

pub fn position<T: Keyed>(items: &[T], id: &RecordId) -> Option<usize> {
    items.iter().position(|item| item.key() == id)
}

pub fn find<'a, T: Keyed>(items: &'a [T], id: &RecordId) -> Option<&'a T> {
    items.iter().find(|item| item.key() == id)
}

/// Remove the item at `from` and insert it at `to`.
///
/// After the move the item sits exactly at index `to`; everything in
/// between shifts by one. Out-of-range indices are clamped.
pub fn move_item<T: Clone>(items: &[T], from: usize, to: usize) -> Vec<T> {
    let mut result = items.to_vec();
    if from >= result.len() {
        return result;
    }
    let item = result.remove(from);
    let to = to.min(result.len());
    result.insert(to, item);
    result
}

/// Apply a completed drag gesture.
///
/// Returns `None` when the gesture changes nothing: no drop target,
/// dropped on itself, or either id unknown.
pub fn reorder<T: Keyed + Clone>(items: &[T], drag: &DragEnd) -> Option<Vec<T>> {
    let over = drag.over.as_ref()?;
    if *over == drag.active {
        return None;
    }
    let from = position(items, &drag.active)?;
    let to = position(items, over)?;
    Some(move_item(items, from, to))
}

/// Replace the item with `id` by `update(item)`.
pub fn replace_with<T, F>(items: &[T], id: &RecordId, update: F) -> Vec<T>
where
    T: Keyed + Clone,
    F: FnOnce(&T) -> T,
{
    let mut update = Some(update);
    items
        .iter()
        .map(|item| {
            if item.key() == id {
                if let Some(f) = update.take() {
                    return f(item);
                }
            }
            item.clone()
        })
        .collect()
}

pub fn without<T: Keyed + Clone>(items: &[T], id: &RecordId) -> Vec<T> {
    items.iter().filter(|item| item.key() != id).cloned().collect()
}

pub fn appended<T: Clone>(items: &[T], item: T) -> Vec<T> {
    let mut result = Vec::with_capacity(items.len() + 1);
    result.extend_from_slice(items);
    result.push(item);
    result
}

/// Ids in list order
pub fn keys<T: Keyed>(items: &[T]) -> Vec<RecordId> {
    items.iter().map(|item| item.key().clone()).collect()
}
