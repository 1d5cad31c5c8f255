//! Checklist mutations and progress for an open case.
//!
//! Mutations edit the case in memory; durability is the store's whole-list
//! write with the revision guard. Item ids are never reused: manual items get
//! a fresh uuid-backed id each time, even for identical text.

use chrono::Utc;
use uuid::Uuid;

use crate::schema::{ChecklistItem, ConsultationCase, ItemOrigin, Track};

/// Flip an item's checked state. Absent ids are a no-op; toggling twice
/// restores the original value. Returns whether anything changed.
pub fn toggle(case: &mut ConsultationCase, track: Track, item_id: &str) -> bool {
    let changed = {
        let list = case.checklist_mut(track);
        match list.iter_mut().find(|i| i.id == item_id) {
            Some(item) => {
                item.checked = !item.checked;
                true
            }
            None => false,
        }
    };
    if changed {
        case.updated_at = Utc::now();
    }
    changed
}

/// Append a manual item and return its id.
pub fn add(case: &mut ConsultationCase, track: Track, text: &str) -> String {
    let id = fresh_manual_id();
    case.checklist_mut(track).push(ChecklistItem {
        id: id.clone(),
        text: text.to_string(),
        checked: false,
        origin: ItemOrigin::Manual,
    });
    case.updated_at = Utc::now();
    id
}

/// Remove an item permanently. No soft delete, no undo. Returns whether the
/// item existed.
pub fn delete(case: &mut ConsultationCase, track: Track, item_id: &str) -> bool {
    let list = case.checklist_mut(track);
    let before = list.len();
    list.retain(|i| i.id != item_id);
    let removed = list.len() != before;
    if removed {
        case.updated_at = Utc::now();
    }
    removed
}

/// Completion percentage for one track, rounded. An empty checklist is 0,
/// never a division by zero.
pub fn progress(case: &ConsultationCase, track: Track) -> u8 {
    let list = case.checklist(track);
    if list.is_empty() {
        return 0;
    }
    let checked = list.iter().filter(|i| i.checked).count();
    ((checked as f64 / list.len() as f64) * 100.0).round() as u8
}

fn fresh_manual_id() -> String {
    format!("manual_{}", Uuid::new_v4().simple())
}
