use std::sync::{Mutex, MutexGuard, PoisonError};

use serde_json::Value;

/// A JSON payload together with the URL it was fetched from.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedDocument {
    pub url: String,
    pub body: Value,
}

impl FetchedDocument {
    pub fn new(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            body,
        }
    }
}

/// Append-only collection shared by concurrent fetch workers.
///
/// Documents are stored whole, so the entries of one payload always stay together and in
/// their original order; the order between documents is completion order.
#[derive(Debug)]
pub struct Accumulator<T = FetchedDocument> {
    items: Mutex<Vec<T>>,
}

impl<T> Default for Accumulator<T> {
    fn default() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }
}

impl<T> Accumulator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&self, item: T) {
        self.lock().push(item);
    }

    /// Take everything collected so far, leaving the accumulator empty.
    pub fn drain(&self) -> Vec<T> {
        std::mem::take(&mut *self.lock())
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A push never leaves the vector half-written, so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Vec<T>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
