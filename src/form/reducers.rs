use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;

use crate::domain::{FieldKey, FormSpec};
use crate::draft::{self, Autosaver, DraftSnapshot, RestoreReport};
use crate::widget::PickerRegistry;

use super::{
    actions::FormCommand,
    error::{DraftError, StructuralError},
    progress,
    state::FormState,
    validation::{Debouncer, TEXT_DEBOUNCE, Validator},
};

/// Idle interval before an edited form is autosaved.
pub const AUTOSAVE_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub enum EngineOutcome {
    Updated,
    /// A structural operation the UI should never have offered.
    Rejected(StructuralError),
    /// Submit attempt with invalid fields: all flagged at once, first one
    /// reported for focus.
    Blocked {
        issues: usize,
        first_invalid: Option<FieldKey>,
    },
    /// The validated submission map; the form has been cleared.
    Submitted(IndexMap<String, String>),
}

#[derive(Debug, Clone)]
pub struct TickOutcome {
    /// Field whose debounced validation just ran.
    pub validated: Option<FieldKey>,
    /// The autosave deadline passed; the owner should persist a draft.
    pub autosave_due: bool,
}

/// The single mutation point of the whole form. Every command leaves
/// visibility, validity, and progress consistent before control returns to
/// the event loop.
pub struct FormEngine {
    form: FormState,
    registry: PickerRegistry,
    validator: Validator,
    debounce: Debouncer,
    autosave: Autosaver,
    progress: u8,
}

impl FormEngine {
    pub fn new(spec: FormSpec, now: NaiveDateTime) -> Self {
        Self::with_registry(spec, now, PickerRegistry::new())
    }

    /// Builds the engine around a caller-supplied registry, e.g. one with a
    /// custom picker factory.
    pub fn with_registry(spec: FormSpec, now: NaiveDateTime, mut registry: PickerRegistry) -> Self {
        let form = FormState::new(spec, &mut registry);
        let mut engine = Self {
            form,
            registry,
            validator: Validator::new(now),
            debounce: Debouncer::new(TEXT_DEBOUNCE),
            autosave: Autosaver::new(AUTOSAVE_INTERVAL),
            progress: 0,
        };
        engine.form.refresh_visibility(&mut engine.registry);
        engine.refresh_progress();
        engine
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn registry_mut(&mut self) -> &mut PickerRegistry {
        &mut self.registry
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn is_dirty(&self) -> bool {
        self.autosave.is_dirty()
    }

    /// The validation clock; the runtime refreshes it once per loop pass.
    pub fn set_wall_clock(&mut self, now: NaiveDateTime) {
        self.validator.set_now(now);
    }

    pub fn dispatch(&mut self, command: FormCommand, now: Instant) -> EngineOutcome {
        match command {
            FormCommand::AddGroup => {
                self.form.add_group(&mut self.registry);
                self.after_structural(now);
                EngineOutcome::Updated
            }
            FormCommand::RemoveGroup { group } => {
                match self.form.remove_group(group, &mut self.registry) {
                    Ok(()) => {
                        self.after_structural(now);
                        EngineOutcome::Updated
                    }
                    Err(err) => self.reject(err),
                }
            }
            FormCommand::AddItem { group } => {
                match self.form.add_item(group, &mut self.registry) {
                    Ok(_) => {
                        self.after_structural(now);
                        EngineOutcome::Updated
                    }
                    Err(err) => self.reject(err),
                }
            }
            FormCommand::RemoveItem { group, item } => {
                match self.form.remove_item(group, item, &mut self.registry) {
                    Ok(()) => {
                        self.after_structural(now);
                        EngineOutcome::Updated
                    }
                    Err(err) => self.reject(err),
                }
            }
            FormCommand::EditText { key, text } => {
                let free_text = if let Some(field) = self.form.field_mut(&key) {
                    field.set_text(text);
                    field.spec.kind.is_free_text()
                } else {
                    return EngineOutcome::Updated;
                };
                self.form.refresh_visibility(&mut self.registry);
                if free_text {
                    self.debounce.note(key, now);
                } else {
                    self.validator
                        .validate_field(&mut self.form, &key, &mut self.registry);
                }
                self.after_edit(now);
                EngineOutcome::Updated
            }
            FormCommand::SelectOption { key, index } => {
                if let Some(field) = self.form.field_mut(&key) {
                    field.select(index);
                }
                // A select or radio can control sibling visibility and
                // required-ness; both re-derive before the edit settles.
                self.form.refresh_visibility(&mut self.registry);
                self.validator
                    .validate_field(&mut self.form, &key, &mut self.registry);
                self.validator
                    .revalidate_flagged(&mut self.form, &mut self.registry);
                self.after_edit(now);
                EngineOutcome::Updated
            }
            FormCommand::SetDateTime { key, value } => {
                self.registry.write(&key, &value);
                self.form.sync_picker_mirrors(&mut self.registry);
                if let Some(field) = self.form.field_mut(&key) {
                    field.dirty = true;
                }
                self.validator
                    .validate_field(&mut self.form, &key, &mut self.registry);
                self.validator
                    .revalidate_flagged(&mut self.form, &mut self.registry);
                self.after_edit(now);
                EngineOutcome::Updated
            }
            FormCommand::Blur { key } => {
                if let Some(pending) = self.debounce.flush() {
                    if pending != key {
                        self.validator
                            .validate_field(&mut self.form, &pending, &mut self.registry);
                    }
                }
                self.validator
                    .validate_field(&mut self.form, &key, &mut self.registry);
                self.refresh_progress();
                EngineOutcome::Updated
            }
            FormCommand::Submit => {
                if let Some(pending) = self.debounce.flush() {
                    self.validator
                        .validate_field(&mut self.form, &pending, &mut self.registry);
                }
                let report = self.validator.validate_all(&mut self.form, &mut self.registry);
                self.refresh_progress();
                if report.is_valid() {
                    let values = self.form.collect(&mut self.registry);
                    self.form.reset(&mut self.registry);
                    self.after_structural(now);
                    self.autosave.mark_saved();
                    EngineOutcome::Submitted(values)
                } else {
                    EngineOutcome::Blocked {
                        issues: report.issues.len(),
                        first_invalid: report.first_invalid,
                    }
                }
            }
            FormCommand::Reset => {
                self.debounce.flush();
                self.form.reset(&mut self.registry);
                self.after_structural(now);
                EngineOutcome::Updated
            }
        }
    }

    /// Timer pass: runs any due debounced validation and reports whether the
    /// autosave deadline fired.
    pub fn tick(&mut self, now: Instant) -> TickOutcome {
        let validated = self.debounce.take_due(now).map(|key| {
            self.validator
                .validate_field(&mut self.form, &key, &mut self.registry);
            self.refresh_progress();
            key
        });
        TickOutcome {
            validated,
            autosave_due: self.autosave.due(now),
        }
    }

    /// The flat address-to-value map for the exporters and the submission
    /// client, read through settled widgets.
    pub fn collect(&mut self) -> IndexMap<String, String> {
        self.form.collect(&mut self.registry)
    }

    pub fn serialize_draft(&mut self, now: DateTime<Utc>, ttl: chrono::Duration) -> DraftSnapshot {
        draft::serialize(&mut self.form, &mut self.registry, now, ttl)
    }

    /// Collapses to the minimum structure, then rebuilds from the snapshot.
    /// A corrupt snapshot leaves the form fresh, exactly as if no draft
    /// existed.
    pub fn restore_draft(&mut self, snapshot: &DraftSnapshot) -> Result<RestoreReport, DraftError> {
        self.debounce.flush();
        self.form.reset(&mut self.registry);
        let report = draft::restore(
            snapshot,
            &mut self.form,
            &mut self.registry,
            &self.validator,
        );
        if report.is_err() {
            self.form.reset(&mut self.registry);
            self.form.refresh_visibility(&mut self.registry);
        }
        self.refresh_progress();
        report
    }

    /// Acknowledges a completed autosave.
    pub fn mark_saved(&mut self) {
        self.autosave.mark_saved();
    }

    fn reject(&mut self, err: StructuralError) -> EngineOutcome {
        // Unreachable through the UI, which disables these affordances.
        log::warn!("structural operation rejected: {err}");
        debug_assert!(
            matches!(
                err,
                StructuralError::NoSuchGroup(_) | StructuralError::NoSuchItem { .. }
            ),
            "removal of a non-removable entity requested: {err}"
        );
        EngineOutcome::Rejected(err)
    }

    fn after_structural(&mut self, now: Instant) {
        self.form.refresh_visibility(&mut self.registry);
        self.validator
            .revalidate_flagged(&mut self.form, &mut self.registry);
        self.refresh_progress();
        self.autosave.note_edit(now);
    }

    fn after_edit(&mut self, now: Instant) {
        self.refresh_progress();
        self.autosave.note_edit(now);
    }

    fn refresh_progress(&mut self) {
        self.progress = progress::percent(&self.validator, &self.form, &mut self.registry);
    }
}
