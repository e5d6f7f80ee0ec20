use std::fmt;

use indexmap::IndexMap;

use crate::domain::FieldKey;

use super::picker::{DateTimePicker, SimulatedPicker};

/// Lifecycle of one picker binding. Writes are only forwarded to the widget
/// in `Ready`/`Bound`; anything issued earlier is queued and applied when
/// initialization completes, so callers never see a not-ready error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingPhase {
    Uninitialized,
    Ready,
    Bound,
}

pub type PickerFactory = Box<dyn Fn() -> Box<dyn DateTimePicker>>;

struct PickerBinding {
    phase: BindingPhase,
    picker: Box<dyn DateTimePicker>,
    queued: Option<String>,
}

/// Owns every picker instance, keyed by the field's structural coordinates.
/// Renumbering rebinds keys in one atomic pass: the complete new map is built
/// before the old one is replaced.
pub struct PickerRegistry {
    factory: PickerFactory,
    bindings: IndexMap<FieldKey, PickerBinding>,
}

impl Default for PickerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PickerRegistry {
    pub fn new() -> Self {
        Self::with_factory(Box::new(|| Box::new(SimulatedPicker::new())))
    }

    pub fn with_factory(factory: PickerFactory) -> Self {
        Self {
            factory,
            bindings: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn phase(&self, key: &FieldKey) -> Option<BindingPhase> {
        self.bindings.get(key).map(|binding| binding.phase)
    }

    /// Creates the widget instance for a freshly built field. The binding
    /// starts uninitialized; `initialize_pending` completes setup once the
    /// owning group/item creation settles.
    pub fn register(&mut self, key: FieldKey) {
        if self.bindings.contains_key(&key) {
            return;
        }
        let picker = (self.factory)();
        self.bindings.insert(
            key,
            PickerBinding {
                phase: BindingPhase::Uninitialized,
                picker,
                queued: None,
            },
        );
    }

    pub fn remove(&mut self, key: &FieldKey) {
        self.bindings.shift_remove(key);
    }

    pub fn reset(&mut self) {
        self.bindings.clear();
    }

    /// Finishes initialization for every pending binding, applying any write
    /// that was queued while the widget was still setting up.
    pub fn initialize_pending(&mut self) {
        for binding in self.bindings.values_mut() {
            if binding.phase != BindingPhase::Uninitialized {
                continue;
            }
            binding.phase = BindingPhase::Ready;
            if let Some(queued) = binding.queued.take() {
                binding.picker.set_value(&queued);
                binding.phase = BindingPhase::Bound;
            }
        }
    }

    /// Writes through the widget's own API. Before initialization the value
    /// is queued instead; direct attribute assignment does not exist here.
    pub fn write(&mut self, key: &FieldKey, value: &str) {
        let Some(binding) = self.bindings.get_mut(key) else {
            log::warn!("picker write to unbound field {key}");
            return;
        };
        match binding.phase {
            BindingPhase::Uninitialized => binding.queued = Some(value.to_string()),
            BindingPhase::Ready | BindingPhase::Bound => {
                binding.picker.set_value(value);
                binding.phase = BindingPhase::Bound;
            }
        }
    }

    pub fn clear(&mut self, key: &FieldKey) {
        if let Some(binding) = self.bindings.get_mut(key) {
            match binding.phase {
                BindingPhase::Uninitialized => binding.queued = None,
                BindingPhase::Ready | BindingPhase::Bound => {
                    binding.picker.clear();
                    binding.phase = BindingPhase::Ready;
                }
            }
        }
    }

    /// Commits every staged widget write. Engine read paths call this before
    /// looking at any picker value.
    pub fn settle(&mut self) {
        for binding in self.bindings.values_mut() {
            if binding.phase != BindingPhase::Uninitialized {
                binding.picker.flush();
            }
        }
    }

    /// The value as the engine is allowed to observe it: flushed first, so a
    /// read issued right after a change event cannot see the stale
    /// pre-change value.
    pub fn settled_value(&mut self, key: &FieldKey) -> Option<String> {
        let binding = self.bindings.get_mut(key)?;
        match binding.phase {
            BindingPhase::Uninitialized => binding.queued.clone(),
            BindingPhase::Ready | BindingPhase::Bound => {
                binding.picker.flush();
                Some(binding.picker.value())
            }
        }
    }

    /// The widget's committed value without settling; can be stale relative
    /// to a write still in flight.
    pub fn raw_value(&self, key: &FieldKey) -> Option<String> {
        self.bindings.get(key).map(|binding| binding.picker.value())
    }

    /// Rebinds keys after a renumbering pass. The whole map is drained into
    /// its replacement in a single sweep, so at no point do two bindings
    /// share a key.
    pub fn rekey(&mut self, mapping: &[(FieldKey, FieldKey)]) {
        if mapping.is_empty() {
            return;
        }
        let mut next = IndexMap::with_capacity(self.bindings.len());
        let previous = std::mem::take(&mut self.bindings);
        for (key, binding) in previous {
            let moved = mapping
                .iter()
                .find(|(old, _)| *old == key)
                .map(|(_, new)| new.clone())
                .unwrap_or(key);
            next.insert(moved, binding);
        }
        self.bindings = next;
    }
}

impl fmt::Debug for PickerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.bindings
                    .iter()
                    .map(|(key, binding)| (key.address(), binding.phase)),
            )
            .finish()
    }
}

impl fmt::Debug for PickerBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PickerBinding")
            .field("phase", &self.phase)
            .field("queued", &self.queued)
            .finish()
    }
}
