use crate::domain::{FieldKey, GroupSpec, ItemSpec};

use super::field::FieldState;

/// One extraction time-frame: a fixed set of item-scoped fields.
#[derive(Debug, Clone)]
pub struct ItemState {
    pub fields: Vec<FieldState>,
}

impl ItemState {
    pub fn build(spec: &ItemSpec, group: usize, item: usize) -> Self {
        let fields = spec
            .fields
            .iter()
            .cloned()
            .map(|field| {
                let key = FieldKey::item(field.base.clone(), group, item);
                FieldState::from_spec(field, key)
            })
            .collect();
        ItemState { fields }
    }

    /// Rewrites every field key for the item's new coordinates. Values,
    /// errors, and dirty flags stay untouched.
    pub fn renumber(&mut self, group: usize, item: usize) {
        for field in &mut self.fields {
            field.key = FieldKey::item(field.spec.base.clone(), group, item);
        }
    }
}

/// One recorder block: group-scoped fields plus its ordered time-frames.
/// The first time-frame always exists and cannot be removed.
#[derive(Debug, Clone)]
pub struct GroupState {
    pub fields: Vec<FieldState>,
    pub items: Vec<ItemState>,
}

impl GroupState {
    pub fn build(spec: &GroupSpec, group: usize) -> Self {
        let fields = spec
            .fields
            .iter()
            .cloned()
            .map(|field| {
                let key = FieldKey::group(field.base.clone(), group);
                FieldState::from_spec(field, key)
            })
            .collect();
        GroupState {
            fields,
            items: vec![ItemState::build(&spec.item, group, 0)],
        }
    }

    pub fn renumber(&mut self, group: usize) {
        for field in &mut self.fields {
            field.key = FieldKey::group(field.spec.base.clone(), group);
        }
        for (index, item) in self.items.iter_mut().enumerate() {
            item.renumber(group, index);
        }
    }

    pub fn field_keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields
            .iter()
            .map(|field| &field.key)
            .chain(
                self.items
                    .iter()
                    .flat_map(|item| item.fields.iter().map(|field| &field.key)),
            )
    }
}
