use std::time::{Duration, Instant};

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

use crate::domain::{FieldKey, FieldKind, Requirement, Rule};
use crate::widget::PickerRegistry;

use super::{
    error::{FieldIssue, ValidationKind},
    field::FieldState,
    state::FormState,
};

/// Idle interval before free-text fields are validated.
pub const TEXT_DEBOUNCE: Duration = Duration::from_millis(500);

pub const DATE_FORMAT: &str = "%Y-%m-%d";
pub const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Evaluates the rule catalog against the live form. The current time is
/// fixed at construction so a whole validation pass sees one clock.
#[derive(Debug)]
pub struct Validator {
    now: NaiveDateTime,
    email_shape: Regex,
}

#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub issues: Vec<(FieldKey, FieldIssue)>,
    pub first_invalid: Option<FieldKey>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Validator {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            email_shape: Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap(),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn set_now(&mut self, now: NaiveDateTime) {
        self.now = now;
    }

    /// Whether the field must hold a value right now. Hidden fields are never
    /// required; conditional requirement reads the controlling sibling's
    /// current value.
    pub fn required_now(&self, form: &FormState, key: &FieldKey) -> bool {
        let Some(field) = form.field(key) else {
            return false;
        };
        if !field.visible {
            return false;
        }
        match &field.spec.requirement {
            Requirement::Always => true,
            Requirement::Optional => false,
            Requirement::WhenSiblingIs { base, value } => form
                .sibling_value(key, base)
                .map(|current| current == *value)
                .unwrap_or(false),
        }
    }

    /// Evaluates one field without mutating it. Hidden fields are always
    /// valid.
    pub fn check_field(
        &self,
        form: &FormState,
        key: &FieldKey,
        registry: &mut PickerRegistry,
    ) -> Option<FieldIssue> {
        let field = form.field(key)?;
        if !field.visible {
            return None;
        }
        let raw = settled_text(field, registry);
        let value = raw.trim();
        if value.is_empty() {
            if self.required_now(form, key) {
                return Some(FieldIssue::new(
                    ValidationKind::RequiredMissing,
                    format!("{} is required", field.spec.label),
                ));
            }
            return None;
        }

        if let Some(issue) = self.check_kind(field, value) {
            return Some(issue);
        }
        for rule in &field.spec.rules {
            if let Some(issue) = self.check_rule(form, registry, field, rule, value) {
                return Some(issue);
            }
        }
        None
    }

    /// Evaluates one field and records the outcome on it.
    pub fn validate_field(
        &self,
        form: &mut FormState,
        key: &FieldKey,
        registry: &mut PickerRegistry,
    ) -> Option<FieldIssue> {
        let issue = self.check_field(form, key, registry);
        if let Some(field) = form.field_mut(key) {
            match &issue {
                Some(found) => field.set_error(found.clone()),
                None => field.clear_error(),
            }
        }
        issue
    }

    /// The exhaustive submit-time pass: every field is evaluated and flagged
    /// in the same sweep, and the first invalid key is reported for focus.
    pub fn validate_all(
        &self,
        form: &mut FormState,
        registry: &mut PickerRegistry,
    ) -> ValidationReport {
        registry.settle();
        form.sync_picker_mirrors(registry);
        let keys: Vec<FieldKey> = form.fields().map(|field| field.key.clone()).collect();
        let mut issues = Vec::new();
        for key in keys {
            if let Some(issue) = self.validate_field(form, &key, registry) {
                issues.push((key, issue));
            }
        }
        let first_invalid = issues.first().map(|(key, _)| key.clone());
        ValidationReport {
            issues,
            first_invalid,
        }
    }

    /// Re-checks only fields currently flagged, clearing errors that no
    /// longer apply (a controlling sibling changed, a field became
    /// optional).
    pub fn revalidate_flagged(&self, form: &mut FormState, registry: &mut PickerRegistry) {
        let keys: Vec<FieldKey> = form
            .fields()
            .filter(|field| field.error.is_some())
            .map(|field| field.key.clone())
            .collect();
        for key in keys {
            self.validate_field(form, &key, registry);
        }
    }

    /// Days left before the retention window closes on a past date. Negative
    /// means the footage is likely gone.
    pub fn retention_days_remaining(&self, date: NaiveDate, window: i64) -> i64 {
        window - (self.now.date() - date).num_days()
    }

    fn check_kind(&self, field: &FieldState, value: &str) -> Option<FieldIssue> {
        match &field.spec.kind {
            FieldKind::Email => {
                if !self.email_shape.is_match(value) {
                    return Some(FieldIssue::new(
                        ValidationKind::Format,
                        "enter a valid email address",
                    ));
                }
                None
            }
            FieldKind::Phone => {
                if !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Some(FieldIssue::new(
                        ValidationKind::Format,
                        "digits only, no separators",
                    ));
                }
                None
            }
            FieldKind::Date => {
                if NaiveDate::parse_from_str(value, DATE_FORMAT).is_err() {
                    return Some(FieldIssue::new(
                        ValidationKind::Format,
                        "expected a date as YYYY-MM-DD",
                    ));
                }
                None
            }
            FieldKind::DateTime => {
                if NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).is_err() {
                    return Some(FieldIssue::new(
                        ValidationKind::Format,
                        "expected a date and time as YYYY-MM-DDTHH:MM",
                    ));
                }
                None
            }
            _ => None,
        }
    }

    fn check_rule(
        &self,
        form: &FormState,
        registry: &mut PickerRegistry,
        field: &FieldState,
        rule: &Rule,
        value: &str,
    ) -> Option<FieldIssue> {
        match rule {
            Rule::EmailDomain(domain) => {
                let suffix = format!("@{domain}");
                if !value.to_ascii_lowercase().ends_with(&suffix) {
                    return Some(FieldIssue::new(
                        ValidationKind::Format,
                        format!("must be a {domain} address"),
                    ));
                }
                None
            }
            Rule::DigitCount(count) => {
                if value.len() != *count || !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Some(FieldIssue::new(
                        ValidationKind::Format,
                        format!("must be exactly {count} digits"),
                    ));
                }
                None
            }
            Rule::Prefix(prefix) => {
                if !value.starts_with(prefix.as_str()) {
                    return Some(FieldIssue::new(
                        ValidationKind::Format,
                        format!("must start with {prefix}"),
                    ));
                }
                None
            }
            Rule::IntRange { min, max } => match value.parse::<i64>() {
                Err(_) => Some(FieldIssue::new(
                    ValidationKind::Range,
                    "must be a whole number",
                )),
                Ok(parsed) if parsed < *min || parsed > *max => Some(FieldIssue::new(
                    ValidationKind::Range,
                    format!("must be between {min} and {max}"),
                )),
                Ok(_) => None,
            },
            Rule::ContainsDigit => {
                if !value.bytes().any(|b| b.is_ascii_digit()) {
                    return Some(FieldIssue::new(
                        ValidationKind::Format,
                        "must include a number",
                    ));
                }
                None
            }
            Rule::NotFuture => {
                let future = match &field.spec.kind {
                    FieldKind::Date => NaiveDate::parse_from_str(value, DATE_FORMAT)
                        .map(|date| date > self.now.date())
                        .unwrap_or(false),
                    _ => NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT)
                        .map(|stamp| stamp > self.now)
                        .unwrap_or(false),
                };
                if future {
                    return Some(FieldIssue::new(
                        ValidationKind::FutureDate,
                        "cannot be in the future",
                    ));
                }
                None
            }
            Rule::WithinPastDays(window) => {
                let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) else {
                    return None;
                };
                let elapsed = (self.now.date() - date).num_days();
                if elapsed > *window {
                    return Some(FieldIssue::new(
                        ValidationKind::Range,
                        format!("outside the {window}-day retention window"),
                    ));
                }
                None
            }
            Rule::AfterSibling { base } => {
                let sibling = form.sibling(&field.key, base)?;
                let start_raw = settled_text(sibling, registry);
                let start = NaiveDateTime::parse_from_str(start_raw.trim(), DATE_TIME_FORMAT).ok()?;
                let end = NaiveDateTime::parse_from_str(value, DATE_TIME_FORMAT).ok()?;
                if end <= start {
                    return Some(FieldIssue::new(
                        ValidationKind::Ordering,
                        format!("must be after {}", sibling.spec.label.to_lowercase()),
                    ));
                }
                None
            }
        }
    }
}

/// Reads a field's value the way the engine is allowed to see it: through the
/// settled widget for picker-backed fields, from the state otherwise.
fn settled_text(field: &FieldState, registry: &mut PickerRegistry) -> String {
    if field.spec.kind.is_picker_backed() {
        registry
            .settled_value(&field.key)
            .unwrap_or_else(|| field.raw_value())
    } else {
        field.raw_value()
    }
}

/// Holds back validation of the field being typed in until the keyboard goes
/// quiet. Last write wins; a new edit replaces the pending one and restarts
/// the clock.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<(FieldKey, Instant)>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn note(&mut self, key: FieldKey, now: Instant) {
        self.pending = Some((key, now + self.delay));
    }

    pub fn take_due(&mut self, now: Instant) -> Option<FieldKey> {
        let due = matches!(&self.pending, Some((_, deadline)) if *deadline <= now);
        if due {
            self.pending.take().map(|(key, _)| key)
        } else {
            None
        }
    }

    /// Forces the pending validation out, deadline or not. Used on blur and
    /// submit so no edit escapes the exhaustive pass.
    pub fn flush(&mut self) -> Option<FieldKey> {
        self.pending.take().map(|(key, _)| key)
    }
}
