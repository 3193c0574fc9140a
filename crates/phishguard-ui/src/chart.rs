//! Single-instance chart ownership.

/// Holds at most one live chart instance.
///
/// Renderers keep one slot per chart canvas and call [`ChartSlot::redraw`]
/// for every new result. The terminal dashboard keeps a
/// `ChartSlot<Vec<FeatureBar>>` for its feature chart.
///
/// [`FeatureBar`]: crate::FeatureBar
#[derive(Debug)]
pub struct ChartSlot<T> {
    current: Option<T>,
    redraws: u64,
}

impl<T> Default for ChartSlot<T> {
    fn default() -> Self {
        Self {
            current: None,
            redraws: 0,
        }
    }
}

impl<T> ChartSlot<T> {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Disposes the current chart, then builds and stores a new one.
    pub fn redraw<F>(&mut self, build: F) -> &T
    where
        F: FnOnce() -> T,
    {
        drop(self.current.take());
        self.redraws += 1;
        self.current.insert(build())
    }

    /// Disposes the current chart, leaving the slot empty.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Live chart, if one has been drawn.
    pub fn current(&self) -> Option<&T> {
        self.current.as_ref()
    }

    /// Number of redraws so far.
    pub fn redraws(&self) -> u64 {
        self.redraws
    }
}
