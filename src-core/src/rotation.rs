//! Deterministic daily message rotation
//!
//! A calendar date always maps to the same message for a given pool. The
//! date is formatted as "YYYY-MM-DD" and hashed over its UTF-16 code units
//! with a 31-multiplier rolling hash wrapped to a signed 32-bit integer.

use crate::dates::format_date;
use crate::database::Message;
use crate::error::{AppError, Result};
use chrono::NaiveDate;

/// Rolling hash of `value`, seed 0, `hash * 31 + unit` with i32 wrapping
pub fn hash_date_string(value: &str) -> i32 {
    value
        .encode_utf16()
        .fold(0i32, |hash, unit| hash.wrapping_mul(31).wrapping_add(i32::from(unit)))
}

/// Index into a pool of `len` messages for `date`
pub fn index_for_date(date: NaiveDate, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let hash = hash_date_string(&format_date(date));
    Some(hash.unsigned_abs() as usize % len)
}

/// Message shown on `date`
pub fn pick_for_date(pool: &[Message], date: NaiveDate) -> Result<&Message> {
    index_for_date(date, pool.len())
        .map(|index| &pool[index])
        .ok_or(AppError::EmptyRotationPool)
}

/// Messages eligible for rotation: every seed message plus active custom ones.
///
/// Input order is preserved; callers pass messages in store order.
pub fn rotation_pool(messages: &[Message]) -> Vec<Message> {
    messages
        .iter()
        .filter(|m| m.is_in_rotation())
        .cloned()
        .collect()
}
