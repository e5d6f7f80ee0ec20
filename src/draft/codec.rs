use chrono::{DateTime, Duration, Utc};

use crate::domain::FieldKey;
use crate::form::{DraftError, FormState, Validator};
use crate::widget::PickerRegistry;

use super::snapshot::{DraftSnapshot, SNAPSHOT_VERSION};

/// What a successful restore did, for status reporting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreReport {
    pub groups: usize,
    pub items_per_group: Vec<usize>,
    pub values_applied: usize,
    pub issues: usize,
}

/// Walks the live tree into a snapshot. Structure first, then the flat value
/// map; picker-backed fields are read through the settled widget.
pub fn serialize(
    form: &mut FormState,
    registry: &mut PickerRegistry,
    now: DateTime<Utc>,
    ttl: Duration,
) -> DraftSnapshot {
    let values = form.collect(registry);
    let open_sections = open_conditional_sections(form);
    DraftSnapshot {
        version: SNAPSHOT_VERSION,
        saved_at: now,
        expires_at: now + ttl,
        items_per_group: form.items_per_group(),
        values,
        open_sections,
    }
}

/// Rebuilds a form from a snapshot in three mandatory phases: structure,
/// values, then a full validation pass. Values are never written to an
/// address that does not exist yet.
pub fn restore(
    snapshot: &DraftSnapshot,
    form: &mut FormState,
    registry: &mut PickerRegistry,
    validator: &Validator,
) -> Result<RestoreReport, DraftError> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(DraftError::Corrupt(format!(
            "snapshot version {} is not {SNAPSHOT_VERSION}",
            snapshot.version
        )));
    }
    if snapshot.items_per_group.is_empty() {
        return Err(DraftError::Corrupt("no recorder groups recorded".into()));
    }
    if snapshot.items_per_group.iter().any(|count| *count == 0) {
        return Err(DraftError::Corrupt(
            "a recorder group recorded zero time-frames".into(),
        ));
    }

    // Phase 1: grow the tree to the recorded shape. The form never shrinks
    // below one group with one time-frame, and restore starts from that
    // minimum.
    while form.group_count() < snapshot.items_per_group.len() {
        form.add_group(registry);
    }
    for (group, wanted) in snapshot.items_per_group.iter().enumerate() {
        while form
            .item_count(group)
            .ok_or_else(|| DraftError::Corrupt(format!("group {group} missing after rebuild")))?
            < *wanted
        {
            form.add_item(group, registry)
                .map_err(|err| DraftError::Corrupt(err.to_string()))?;
        }
    }

    // Phase 2: decode every address and write the value through the right
    // channel. Addresses pointing outside the recorded structure mean the
    // snapshot is internally inconsistent.
    let mut applied = 0usize;
    for (address, value) in &snapshot.values {
        let key = FieldKey::parse(address, form.spec())
            .map_err(|err| DraftError::Corrupt(err.to_string()))?;
        check_bounds(&key, &snapshot.items_per_group)?;
        let picker_backed = form
            .field(&key)
            .map(|field| field.spec.kind.is_picker_backed())
            .ok_or_else(|| DraftError::Corrupt(format!("no field at address {address}")))?;
        if picker_backed {
            registry.write(&key, value);
        } else if let Some(field) = form.field_mut(&key) {
            if !field.seed_raw(value) {
                return Err(DraftError::Corrupt(format!(
                    "'{value}' is not an option of {address}"
                )));
            }
        }
        applied += 1;
    }
    registry.initialize_pending();
    registry.settle();
    form.sync_picker_mirrors(registry);

    // Phase 3: visibility, validity, and progress all re-derive from the
    // restored values.
    form.refresh_visibility(registry);
    let report = validator.validate_all(form, registry);

    log::debug!(
        "draft restored: {} groups, {applied} values, {} issues",
        snapshot.items_per_group.len(),
        report.issues.len()
    );
    Ok(RestoreReport {
        groups: snapshot.items_per_group.len(),
        items_per_group: snapshot.items_per_group.clone(),
        values_applied: applied,
        issues: report.issues.len(),
    })
}

fn check_bounds(key: &FieldKey, items_per_group: &[usize]) -> Result<(), DraftError> {
    if let Some(group) = key.group_index() {
        let items = items_per_group.get(group).ok_or_else(|| {
            DraftError::Corrupt(format!(
                "address {key} points at group {group}, but only {} recorded",
                items_per_group.len()
            ))
        })?;
        if let Some(item) = key.item_index() {
            if item >= *items {
                return Err(DraftError::Corrupt(format!(
                    "address {key} points at time-frame {item}, but group {group} recorded {items}"
                )));
            }
        }
    }
    Ok(())
}

fn open_conditional_sections(form: &FormState) -> Vec<String> {
    use crate::domain::Visibility;
    form.fields()
        .filter(|field| {
            field.visible && !matches!(field.spec.visibility, Visibility::Always)
        })
        .map(|field| field.key.address())
        .collect()
}
