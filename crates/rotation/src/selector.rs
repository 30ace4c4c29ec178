//! Which account to hand out next.
//!
//! Everything here is a pure function of the record slice; callers load the
//! store fresh before selecting.

use mailrotor_core::AccountRecord;

/// First record in store order that has never been used.
pub fn next_unused(records: &[AccountRecord]) -> Option<&AccountRecord> {
    records.iter().find(|acc| !acc.is_used())
}

/// First unused record strictly after `current` in store order.
///
/// Returns `None` when `current` is not in the store or nothing unused follows
/// it. The scan does not wrap around to the front; once the tail is exhausted,
/// callers go back to [`next_unused`] for a full cycle.
pub fn next_after<'a>(records: &'a [AccountRecord], current: &str) -> Option<&'a AccountRecord> {
    let position = records.iter().position(|acc| acc.email == current)?;
    records[position + 1..].iter().find(|acc| !acc.is_used())
}

/// Record with the latest `last_used_time`. Ties go to the earlier record.
pub fn last_used(records: &[AccountRecord]) -> Option<&AccountRecord> {
    records
        .iter()
        .filter_map(|acc| acc.status.last_used_time.map(|t| (t, acc)))
        .fold(None, |best: Option<(_, &AccountRecord)>, (t, acc)| match best {
            Some((best_t, _)) if best_t >= t => best,
            _ => Some((t, acc)),
        })
        .map(|(_, acc)| acc)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// A never-used record, first in store order
    Unused(AccountRecord),
    /// The record following the most recently used one
    Next {
        current: AccountRecord,
        next: AccountRecord,
    },
    /// Nothing unused and no usage history: start over from the first record
    ColdStart(AccountRecord),
    /// Every record after the reference has been used
    Exhausted { current: AccountRecord },
    /// The reference identifier is not in the store
    UnknownCurrent(String),
    Empty,
}

impl Selection {
    pub fn account(&self) -> Option<&AccountRecord> {
        match self {
            Selection::Unused(acc) | Selection::ColdStart(acc) => Some(acc),
            Selection::Next { next, .. } => Some(next),
            Selection::Exhausted { .. } | Selection::UnknownCurrent(_) | Selection::Empty => None,
        }
    }
}

/// Selection policy used by quick rotation.
///
/// Prefer any unused record; otherwise continue after the most recently used
/// record; with no usage history at all, fall back to the first record.
pub fn select(records: &[AccountRecord]) -> Selection {
    if let Some(acc) = next_unused(records) {
        return Selection::Unused(acc.clone());
    }

    let Some(first) = records.first() else {
        return Selection::Empty;
    };

    let Some(current) = last_used(records) else {
        return Selection::ColdStart(first.clone());
    };

    continue_after(records, current)
}

/// Like [`select`], but with an explicit "current" account to continue from.
///
/// With `None` this is exactly [`select`].
pub fn select_from(records: &[AccountRecord], current: Option<&str>) -> Selection {
    let Some(reference) = current else {
        return select(records);
    };

    match records.iter().find(|acc| acc.email == reference) {
        Some(current) => continue_after(records, current),
        None => Selection::UnknownCurrent(reference.to_string()),
    }
}

fn continue_after(records: &[AccountRecord], current: &AccountRecord) -> Selection {
    match next_after(records, &current.email) {
        Some(next) => Selection::Next {
            current: current.clone(),
            next: next.clone(),
        },
        None => Selection::Exhausted {
            current: current.clone(),
        },
    }
}
