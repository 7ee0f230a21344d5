use crate::geometry::Marker;

/// Ordered marker sequence; the single source of truth for count and order.
///
/// A marker's identity is its position: removing one shifts every later
/// marker down by one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerStore {
    markers: Vec<Marker>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discards the current sequence and installs `markers` in order.
    pub fn replace_all<I>(&mut self, markers: I)
    where
        I: IntoIterator<Item = Marker>,
    {
        self.markers = markers.into_iter().collect();
    }

    /// Appends a marker and returns the index it was stored at.
    pub fn append(&mut self, marker: Marker) -> usize {
        self.markers.push(marker);
        self.markers.len() - 1
    }

    /// Removes the marker at `index`, or returns `None` if out of range.
    pub fn remove_at(&mut self, index: usize) -> Option<Marker> {
        (index < self.markers.len()).then(|| self.markers.remove(index))
    }

    pub fn pop_last(&mut self) -> Option<Marker> {
        self.markers.pop()
    }

    pub fn clear(&mut self) {
        self.markers.clear();
    }

    pub fn count(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Marker> {
        self.markers.get(index)
    }

    pub fn as_slice(&self) -> &[Marker] {
        &self.markers
    }

    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_of(points: &[(f64, f64)]) -> MarkerStore {
        let mut store = MarkerStore::new();
        store.replace_all(points.iter().map(|&(x, y)| Marker::new(x, y)));
        store
    }

    #[test]
    fn replace_all_discards_previous_markers() {
        let mut store = store_of(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        store.replace_all(vec![Marker::new(9.0, 9.0)]);
        assert_eq!(store.as_slice(), &[Marker::new(9.0, 9.0)]);
    }

    #[test]
    fn append_returns_next_position() {
        let mut store = store_of(&[(1.0, 1.0)]);
        assert_eq!(store.append(Marker::new(5.0, 5.0)), 1);
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn remove_at_shifts_later_markers() {
        let mut store = store_of(&[(1.0, 1.0), (2.0, 2.0), (3.0, 3.0)]);
        assert_eq!(store.remove_at(0), Some(Marker::new(1.0, 1.0)));
        assert_eq!(store.get(0), Some(&Marker::new(2.0, 2.0)));
        assert_eq!(store.get(1), Some(&Marker::new(3.0, 3.0)));
    }

    #[test]
    fn remove_out_of_range_leaves_store_untouched() {
        let mut store = store_of(&[(1.0, 1.0)]);
        assert_eq!(store.remove_at(4), None);
        assert_eq!(store.count(), 1);
    }

    #[test]
    fn pop_last_and_clear() {
        let mut store = store_of(&[(1.0, 1.0), (2.0, 2.0)]);
        assert_eq!(store.pop_last(), Some(Marker::new(2.0, 2.0)));
        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.pop_last(), None);
    }
}
