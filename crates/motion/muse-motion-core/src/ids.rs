//! Identifiers and simple allocators for stage entities.

use serde::{Deserialize, Serialize};

/// Opaque handle to one visual element on the [`Stage`](crate::stage::Stage).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub struct ElementId(pub u32);

/// Handle for a viewport-intersection observation.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct ObservationId(pub u32);

/// Marker placed on a timeline; reported when the playhead crosses it.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct CueId(pub u32);

/// Monotonic allocator for element and observation handles.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_element: u32,
    next_observation: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_element(&mut self) -> ElementId {
        let id = ElementId(self.next_element);
        self.next_element = self.next_element.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_observation(&mut self) -> ObservationId {
        let id = ObservationId(self.next_observation);
        self.next_observation = self.next_observation.wrapping_add(1);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_element(), ElementId(0));
        assert_eq!(alloc.alloc_element(), ElementId(1));
        assert_eq!(alloc.alloc_observation(), ObservationId(0));
        assert_eq!(alloc.alloc_observation(), ObservationId(1));
    }
}
