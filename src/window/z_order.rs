use super::WindowId;

/// Back-to-front stacking order. The last id is the frontmost window.
///
/// The stack never emits notifications and never reorders on its own;
/// relative order only changes through explicit `raise`/`sink` calls.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ZOrder {
    order: Vec<WindowId>,
}

impl ZOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place `id` on top. An id already present is moved instead of
    /// duplicated.
    pub fn push(&mut self, id: WindowId) {
        self.order.retain(|existing| *existing != id);
        self.order.push(id);
    }

    /// Move `id` to the top. No-op if it is already there or not present.
    /// Returns whether the order changed.
    pub fn raise(&mut self, id: WindowId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        if pos + 1 == self.order.len() {
            return false;
        }
        let item = self.order.remove(pos);
        self.order.push(item);
        true
    }

    /// Move `id` to the bottom. No-op if absent or already at the bottom.
    pub fn sink(&mut self, id: WindowId) -> bool {
        let Some(pos) = self.position(id) else {
            return false;
        };
        if pos == 0 {
            return false;
        }
        let item = self.order.remove(pos);
        self.order.insert(0, item);
        true
    }

    pub fn remove(&mut self, id: WindowId) -> bool {
        let before = self.order.len();
        self.order.retain(|existing| *existing != id);
        before != self.order.len()
    }

    pub fn top(&self) -> Option<WindowId> {
        self.order.last().copied()
    }

    /// Highest id satisfying `predicate`.
    pub fn top_of<F>(&self, mut predicate: F) -> Option<WindowId>
    where
        F: FnMut(WindowId) -> bool,
    {
        self.order.iter().rev().copied().find(|id| predicate(*id))
    }

    pub fn position(&self, id: WindowId) -> Option<usize> {
        self.order.iter().position(|existing| *existing == id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.order.contains(&id)
    }

    /// Ids back to front.
    pub fn ids(&self) -> &[WindowId] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: u64) -> WindowId {
        WindowId::from_raw(raw)
    }

    fn stack(ids: &[u64]) -> ZOrder {
        let mut z = ZOrder::new();
        for raw in ids {
            z.push(id(*raw));
        }
        z
    }

    #[test]
    fn raise_moves_to_top_and_reports_change() {
        let mut z = stack(&[1, 2, 3]);
        assert!(z.raise(id(1)));
        assert_eq!(z.ids(), &[id(2), id(3), id(1)]);
        // already on top
        assert!(!z.raise(id(1)));
        // absent ids are ignored
        assert!(!z.raise(id(9)));
        assert_eq!(z.len(), 3);
    }

    #[test]
    fn sink_moves_to_bottom() {
        let mut z = stack(&[1, 2, 3]);
        assert!(z.sink(id(3)));
        assert_eq!(z.ids(), &[id(3), id(1), id(2)]);
        assert!(!z.sink(id(3)));
    }

    #[test]
    fn remove_exposes_new_top() {
        let mut z = stack(&[1, 2, 3]);
        assert!(z.remove(id(3)));
        assert_eq!(z.top(), Some(id(2)));
        assert!(!z.remove(id(3)));
        z.remove(id(1));
        z.remove(id(2));
        assert_eq!(z.top(), None);
    }

    #[test]
    fn top_of_skips_non_matching() {
        let z = stack(&[1, 2, 3, 4]);
        assert_eq!(z.top_of(|w| w.raw() % 2 == 1), Some(id(3)));
        assert_eq!(z.top_of(|w| w.raw() > 10), None);
    }

    #[test]
    fn raise_order_is_the_tie_break() {
        let mut z = stack(&[1, 2, 3]);
        z.raise(id(2));
        z.raise(id(1));
        assert_eq!(z.ids(), &[id(3), id(2), id(1)]);
    }

    #[test]
    fn push_does_not_duplicate() {
        let mut z = stack(&[1, 2]);
        z.push(id(1));
        assert_eq!(z.ids(), &[id(2), id(1)]);
    }
}
