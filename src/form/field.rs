use crate::domain::{FieldKey, FieldKind, FieldSpec, Visibility};

use super::error::FieldIssue;

/// The raw value a field holds on screen. Everything is a string at the wire
/// boundary; choices keep their option list so the selected label can be
/// resolved both ways.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Choice {
        options: Vec<String>,
        selected: Option<usize>,
    },
    /// Mirror of the last settled picker value. The picker registry holds the
    /// authoritative value; this copy exists so rendering and predicates can
    /// read without touching the widget.
    Picker(String),
}

#[derive(Debug, Clone)]
pub struct FieldState {
    pub spec: FieldSpec,
    pub key: FieldKey,
    pub value: FieldValue,
    pub visible: bool,
    pub dirty: bool,
    pub error: Option<FieldIssue>,
}

impl FieldState {
    pub fn from_spec(spec: FieldSpec, key: FieldKey) -> Self {
        let value = match &spec.kind {
            FieldKind::Select(options) | FieldKind::Radio(options) => FieldValue::Choice {
                options: options.clone(),
                selected: None,
            },
            FieldKind::Date | FieldKind::DateTime => FieldValue::Picker(String::new()),
            _ => FieldValue::Text(String::new()),
        };
        let visible = matches!(spec.visibility, Visibility::Always);
        FieldState {
            spec,
            key,
            value,
            visible,
            dirty: false,
            error: None,
        }
    }

    /// The value as the wire sees it: text verbatim, the selected option
    /// label for choices, the settled mirror for pickers.
    pub fn raw_value(&self) -> String {
        match &self.value {
            FieldValue::Text(text) | FieldValue::Picker(text) => text.clone(),
            FieldValue::Choice { options, selected } => selected
                .and_then(|index| options.get(index))
                .cloned()
                .unwrap_or_default(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.value {
            FieldValue::Text(text) | FieldValue::Picker(text) => text.trim().is_empty(),
            FieldValue::Choice { selected, .. } => selected.is_none(),
        }
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        if let FieldValue::Text(buffer) = &mut self.value {
            *buffer = text.into();
            self.after_edit();
        }
    }

    pub fn select(&mut self, index: usize) -> bool {
        if let FieldValue::Choice { options, selected } = &mut self.value {
            if options.is_empty() {
                return false;
            }
            let bounded = index.min(options.len() - 1);
            if *selected != Some(bounded) {
                *selected = Some(bounded);
                self.after_edit();
                return true;
            }
        }
        false
    }

    /// Updates the picker mirror without marking the field dirty; the dirty
    /// transition belongs to the write that staged the picker value.
    pub fn sync_picker_mirror(&mut self, value: &str) {
        if let FieldValue::Picker(mirror) = &mut self.value {
            if mirror != value {
                *mirror = value.to_string();
            }
        }
    }

    /// Writes a restored raw value without touching the dirty flag. Returns
    /// false when a choice label is not part of the option list.
    pub fn seed_raw(&mut self, raw: &str) -> bool {
        match &mut self.value {
            FieldValue::Text(buffer) => {
                *buffer = raw.to_string();
                true
            }
            FieldValue::Picker(mirror) => {
                *mirror = raw.to_string();
                true
            }
            FieldValue::Choice { options, selected } => {
                if raw.is_empty() {
                    *selected = None;
                    return true;
                }
                match options.iter().position(|option| option == raw) {
                    Some(index) => {
                        *selected = Some(index);
                        true
                    }
                    None => false,
                }
            }
        }
    }

    pub fn clear_value(&mut self) {
        match &mut self.value {
            FieldValue::Text(buffer) | FieldValue::Picker(buffer) => buffer.clear(),
            FieldValue::Choice { selected, .. } => *selected = None,
        }
        self.error = None;
    }

    /// Option index one step forward or back from the current selection,
    /// wrapping at either end. Used by the UI to cycle choices.
    pub fn cycled_option(&self, delta: i32) -> Option<usize> {
        if let FieldValue::Choice { options, selected } = &self.value {
            if options.is_empty() {
                return None;
            }
            let len = options.len() as i32;
            let next = match selected {
                None if delta >= 0 => 0,
                None => len - 1,
                Some(index) => (*index as i32 + delta).rem_euclid(len),
            };
            return Some(next as usize);
        }
        None
    }

    pub fn set_error(&mut self, issue: FieldIssue) {
        self.error = Some(issue);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn after_edit(&mut self) {
        self.dirty = true;
        self.error = None;
    }
}
