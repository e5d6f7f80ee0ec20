use indexmap::IndexMap;

use crate::domain::{FieldKey, FormSpec, Scope, Visibility};
use crate::widget::PickerRegistry;

use super::{
    error::StructuralError,
    field::FieldState,
    group::{GroupState, ItemState},
};

/// The live form tree: top-level fields plus the ordered recorder groups.
///
/// All lifecycle operations keep the picker registry in step with the tree;
/// renumbering computes the complete old-to-new key mapping before any
/// binding moves, so no transient duplicate key is ever observable.
#[derive(Debug, Clone)]
pub struct FormState {
    spec: FormSpec,
    pub top: Vec<FieldState>,
    pub groups: Vec<GroupState>,
}

impl FormState {
    pub fn new(spec: FormSpec, registry: &mut PickerRegistry) -> Self {
        let top = spec
            .fields
            .iter()
            .cloned()
            .map(|field| {
                let key = FieldKey::form(field.base.clone());
                FieldState::from_spec(field, key)
            })
            .collect();
        let groups = vec![GroupState::build(&spec.group, 0)];
        let state = FormState { spec, top, groups };
        state.register_pickers(registry);
        registry.initialize_pending();
        state
    }

    pub fn spec(&self) -> &FormSpec {
        &self.spec
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn item_count(&self, group: usize) -> Option<usize> {
        self.groups.get(group).map(|group| group.items.len())
    }

    pub fn items_per_group(&self) -> Vec<usize> {
        self.groups.iter().map(|group| group.items.len()).collect()
    }

    /// Appends a new recorder group with one default time-frame and returns
    /// its index.
    pub fn add_group(&mut self, registry: &mut PickerRegistry) -> usize {
        let index = self.groups.len();
        let group = GroupState::build(&self.spec.group, index);
        register_group_pickers(&group, registry);
        self.groups.push(group);
        registry.initialize_pending();
        log::debug!("added recorder group {index}");
        index
    }

    /// Removes a recorder group and renumbers every following group, its
    /// items, and their picker bindings in one atomic pass.
    pub fn remove_group(
        &mut self,
        index: usize,
        registry: &mut PickerRegistry,
    ) -> Result<(), StructuralError> {
        if index == 0 {
            return Err(StructuralError::RemoveFirstGroup);
        }
        if index >= self.groups.len() {
            return Err(StructuralError::NoSuchGroup(index));
        }

        for key in self.groups[index].field_keys() {
            registry.remove(key);
        }

        let mut mapping = Vec::new();
        for group in &self.groups[index + 1..] {
            for key in group.field_keys() {
                let moved = key.at_group(key.group_index().unwrap_or(0) - 1);
                mapping.push((key.clone(), moved));
            }
        }

        self.groups.remove(index);
        for (offset, group) in self.groups[index..].iter_mut().enumerate() {
            group.renumber(index + offset);
        }
        registry.rekey(&mapping);
        log::debug!("removed recorder group {index}, {} rebound", mapping.len());
        Ok(())
    }

    /// Appends a new time-frame to the given group and returns its index.
    pub fn add_item(
        &mut self,
        group: usize,
        registry: &mut PickerRegistry,
    ) -> Result<usize, StructuralError> {
        let group_state = self
            .groups
            .get_mut(group)
            .ok_or(StructuralError::NoSuchGroup(group))?;
        let index = group_state.items.len();
        let item = ItemState::build(&self.spec.group.item, group, index);
        for field in &item.fields {
            if field.spec.kind.is_picker_backed() {
                registry.register(field.key.clone());
            }
        }
        group_state.items.push(item);
        registry.initialize_pending();
        log::debug!("added time-frame {index} to group {group}");
        Ok(index)
    }

    /// Removes a time-frame and renumbers the following ones within the same
    /// group only.
    pub fn remove_item(
        &mut self,
        group: usize,
        item: usize,
        registry: &mut PickerRegistry,
    ) -> Result<(), StructuralError> {
        let group_state = self
            .groups
            .get_mut(group)
            .ok_or(StructuralError::NoSuchGroup(group))?;
        if item == 0 {
            return Err(StructuralError::RemoveFirstItem { group });
        }
        if item >= group_state.items.len() {
            return Err(StructuralError::NoSuchItem { group, item });
        }

        for field in &group_state.items[item].fields {
            registry.remove(&field.key);
        }

        let mut mapping = Vec::new();
        for following in &group_state.items[item + 1..] {
            for field in &following.fields {
                mapping.push((field.key.clone(), field.key.at_item(field.key.item_index().unwrap_or(0) - 1)));
            }
        }

        group_state.items.remove(item);
        for (offset, following) in group_state.items[item..].iter_mut().enumerate() {
            following.renumber(group, item + offset);
        }
        registry.rekey(&mapping);
        log::debug!("removed time-frame {item} from group {group}");
        Ok(())
    }

    pub fn field(&self, key: &FieldKey) -> Option<&FieldState> {
        match key {
            FieldKey::Form { base } => self.top.iter().find(|field| field.spec.base == *base),
            FieldKey::Group { base, group } => self
                .groups
                .get(*group)?
                .fields
                .iter()
                .find(|field| field.spec.base == *base),
            FieldKey::Item { base, group, item } => self
                .groups
                .get(*group)?
                .items
                .get(*item)?
                .fields
                .iter()
                .find(|field| field.spec.base == *base),
        }
    }

    pub fn field_mut(&mut self, key: &FieldKey) -> Option<&mut FieldState> {
        match key {
            FieldKey::Form { base } => self.top.iter_mut().find(|field| field.spec.base == *base),
            FieldKey::Group { base, group } => self
                .groups
                .get_mut(*group)?
                .fields
                .iter_mut()
                .find(|field| field.spec.base == *base),
            FieldKey::Item { base, group, item } => self
                .groups
                .get_mut(*group)?
                .items
                .get_mut(*item)?
                .fields
                .iter_mut()
                .find(|field| field.spec.base == *base),
        }
    }

    /// All fields in stable document order: top, then per group its own
    /// fields followed by its items.
    pub fn fields(&self) -> impl Iterator<Item = &FieldState> {
        self.top.iter().chain(self.groups.iter().flat_map(|group| {
            group.fields.iter().chain(
                group
                    .items
                    .iter()
                    .flat_map(|item| item.fields.iter()),
            )
        }))
    }

    pub fn fields_mut(&mut self) -> impl Iterator<Item = &mut FieldState> {
        self.top
            .iter_mut()
            .chain(self.groups.iter_mut().flat_map(|group| {
                group.fields.iter_mut().chain(
                    group
                        .items
                        .iter_mut()
                        .flat_map(|item| item.fields.iter_mut()),
                )
            }))
    }

    pub fn visible_keys(&self) -> Vec<FieldKey> {
        self.fields()
            .filter(|field| field.visible)
            .map(|field| field.key.clone())
            .collect()
    }

    /// Resolves the controlling sibling of a field: same item first, then the
    /// owning group, then the top level, depending on where the base lives.
    pub fn sibling<'a>(&'a self, key: &FieldKey, base: &str) -> Option<&'a FieldState> {
        match self.spec.scope_of(base)? {
            Scope::Form => self.field(&FieldKey::form(base)),
            Scope::Group => {
                let group = key.group_index()?;
                self.field(&FieldKey::group(base, group))
            }
            Scope::Item => {
                let group = key.group_index()?;
                let item = key.item_index()?;
                self.field(&FieldKey::item(base, group, item))
            }
        }
    }

    pub fn sibling_value(&self, key: &FieldKey, base: &str) -> Option<String> {
        self.sibling(key, base).map(FieldState::raw_value)
    }

    /// Recomputes every field's visibility from its predicate. Newly hidden
    /// fields lose their value, their error, and their picker value.
    pub fn refresh_visibility(&mut self, registry: &mut PickerRegistry) -> bool {
        let mut updates = Vec::new();
        for field in self.fields() {
            let visible = match &field.spec.visibility {
                Visibility::Always => true,
                Visibility::WhenSiblingIs { base, value } => self
                    .sibling_value(&field.key, base)
                    .map(|current| current == *value)
                    .unwrap_or(false),
            };
            if visible != field.visible {
                updates.push((field.key.clone(), visible));
            }
        }
        let changed = !updates.is_empty();
        for (key, visible) in updates {
            let picker_backed = if let Some(field) = self.field_mut(&key) {
                field.visible = visible;
                if !visible {
                    field.clear_value();
                }
                !visible && field.spec.kind.is_picker_backed()
            } else {
                false
            };
            if picker_backed {
                registry.clear(&key);
            }
        }
        changed
    }

    /// The flat address-to-value map the PDF/JSON exporters and the
    /// submission client consume. Picker-backed fields are read from the
    /// settled widget, never from the mirror alone.
    pub fn collect(&mut self, registry: &mut PickerRegistry) -> IndexMap<String, String> {
        registry.settle();
        self.sync_picker_mirrors(registry);
        let mut values = IndexMap::new();
        for field in self.fields() {
            if !field.visible {
                continue;
            }
            values.insert(field.key.address(), field.raw_value());
        }
        values
    }

    /// Pulls every settled picker value back into its field mirror.
    pub fn sync_picker_mirrors(&mut self, registry: &mut PickerRegistry) {
        let picker_keys: Vec<FieldKey> = self
            .fields()
            .filter(|field| field.spec.kind.is_picker_backed())
            .map(|field| field.key.clone())
            .collect();
        for key in picker_keys {
            if let Some(value) = registry.settled_value(&key) {
                if let Some(field) = self.field_mut(&key) {
                    field.sync_picker_mirror(&value);
                }
            }
        }
    }

    /// Collapses the form back to its minimum shape (one group, one item)
    /// with every value, error, and picker binding cleared.
    pub fn reset(&mut self, registry: &mut PickerRegistry) {
        registry.reset();
        self.top = self
            .spec
            .fields
            .iter()
            .cloned()
            .map(|field| {
                let key = FieldKey::form(field.base.clone());
                FieldState::from_spec(field, key)
            })
            .collect();
        self.groups = vec![GroupState::build(&self.spec.group, 0)];
        self.register_pickers(registry);
        registry.initialize_pending();
        log::debug!("form reset to minimum structure");
    }

    fn register_pickers(&self, registry: &mut PickerRegistry) {
        for field in self.fields() {
            if field.spec.kind.is_picker_backed() {
                registry.register(field.key.clone());
            }
        }
    }
}

fn register_group_pickers(group: &GroupState, registry: &mut PickerRegistry) {
    for field in group
        .fields
        .iter()
        .chain(group.items.iter().flat_map(|item| item.fields.iter()))
    {
        if field.spec.kind.is_picker_backed() {
            registry.register(field.key.clone());
        }
    }
}
