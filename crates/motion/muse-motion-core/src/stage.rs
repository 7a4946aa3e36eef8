//! Host-facing property store.
//!
//! The stage owns the current visual property values of every element the
//! controllers animate. Each write is recorded as a [`Change`] so an adapter
//! (DOM, canvas, native view) can drain and apply them once per frame.

use hashbrown::{HashMap, HashSet};
use serde::{Deserialize, Serialize};

use crate::ids::{ElementId, IdAllocator, ObservationId};

/// Animatable visual properties.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Property {
    Opacity,
    X,
    Y,
    Scale,
    RotationX,
    RotationY,
    Brightness,
    Saturation,
    /// Drop-shadow elevation, 0 = flat.
    Shadow,
    /// Coloured halo intensity, 0 = none.
    Glow,
    Width,
}

impl Property {
    /// Value an element reports before anything has written the property.
    #[inline]
    pub fn baseline(self) -> f32 {
        match self {
            Self::Opacity | Self::Scale | Self::Brightness | Self::Saturation | Self::Width => 1.0,
            Self::X | Self::Y | Self::RotationX | Self::RotationY | Self::Shadow | Self::Glow => {
                0.0
            }
        }
    }
}

/// One property write, in application order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub element: ElementId,
    pub property: Property,
    pub value: f32,
}

#[derive(Debug, Default)]
pub struct Stage {
    ids: IdAllocator,
    elements: HashSet<ElementId>,
    values: HashMap<(ElementId, Property), f32>,
    writes: HashMap<ElementId, usize>,
    changes: Vec<Change>,
    observations: HashMap<ObservationId, ElementId>,
}

impl Stage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate an element and apply its initial property values.
    pub fn spawn(&mut self, initial: &[(Property, f32)]) -> ElementId {
        let id = self.ids.alloc_element();
        self.elements.insert(id);
        for &(property, value) in initial {
            self.values.insert((id, property), value);
        }
        id
    }

    #[inline]
    pub fn contains(&self, element: ElementId) -> bool {
        self.elements.contains(&element)
    }

    /// Current value, falling back to the property's baseline.
    #[inline]
    pub fn get(&self, element: ElementId, property: Property) -> f32 {
        self.values
            .get(&(element, property))
            .copied()
            .unwrap_or_else(|| property.baseline())
    }

    pub fn set(&mut self, element: ElementId, property: Property, value: f32) {
        self.values.insert((element, property), value);
        *self.writes.entry(element).or_insert(0) += 1;
        self.changes.push(Change {
            element,
            property,
            value,
        });
    }

    /// Number of writes an element has received since it was spawned.
    pub fn writes_to(&self, element: ElementId) -> usize {
        self.writes.get(&element).copied().unwrap_or(0)
    }

    /// Drain the changes recorded since the last call.
    pub fn take_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    pub fn observe(&mut self, element: ElementId) -> ObservationId {
        let id = self.ids.alloc_observation();
        self.observations.insert(id, element);
        id
    }

    /// Release an observation; returns false when the handle was not active.
    pub fn unobserve(&mut self, observation: ObservationId) -> bool {
        self.observations.remove(&observation).is_some()
    }

    pub fn active_observations(&self) -> usize {
        self.observations.len()
    }
}
