use std::sync::Mutex;

/// Round-robin chooser over a fixed, non-empty list.
///
/// The cursor read-and-advance happens under one lock so concurrent callers
/// never observe the same position.
pub struct GatewaySelector<T> {
    items: Vec<T>,
    cursor: Mutex<usize>,
}

// Never empty, so `len` has no `is_empty` companion.
#[allow(clippy::len_without_is_empty)]
impl<T> GatewaySelector<T> {
    /// Returns `None` for an empty list.
    pub fn new(items: Vec<T>) -> Option<Self> {
        if items.is_empty() {
            return None;
        }
        Some(Self {
            items,
            cursor: Mutex::new(0),
        })
    }

    /// Item at the cursor, then advance modulo the list length.
    pub fn next(&self) -> &T {
        self.next_with_index().1
    }

    /// Like [`next`](Self::next) but also returns the zero-based position.
    pub fn next_with_index(&self) -> (usize, &T) {
        let mut cursor = self
            .cursor
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let index = *cursor;
        *cursor = (index + 1) % self.items.len();
        (index, &self.items[index])
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}
