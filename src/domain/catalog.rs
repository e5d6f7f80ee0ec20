/// Which level of the form tree owns a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Form,
    Group,
    Item,
}

/// The fixed catalog of input widgets the form is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Select(Vec<String>),
    Radio(Vec<String>),
    TextArea,
    Date,
    DateTime,
}

impl FieldKind {
    /// Date and date-time inputs are backed by the external picker widget and
    /// must be read and written through the picker registry.
    pub fn is_picker_backed(&self) -> bool {
        matches!(self, FieldKind::Date | FieldKind::DateTime)
    }

    pub fn options(&self) -> Option<&[String]> {
        match self {
            FieldKind::Select(options) | FieldKind::Radio(options) => Some(options),
            _ => None,
        }
    }

    /// Free text gets its validation debounced; everything else validates on
    /// the spot.
    pub fn is_free_text(&self) -> bool {
        matches!(
            self,
            FieldKind::Text | FieldKind::Email | FieldKind::Phone | FieldKind::TextArea
        )
    }
}

/// When a field must hold a value. Conditional requirement is resolved against
/// the sibling's current value at validation time, never cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    Always,
    Optional,
    WhenSiblingIs { base: String, value: String },
}

/// Whether a field is currently part of the form at all. Hidden fields are
/// exempt from requirement and their stored value is cleared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visibility {
    Always,
    WhenSiblingIs { base: String, value: String },
}

/// Per-field validation rules beyond required-ness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Email must end in `@domain`.
    EmailDomain(String),
    /// Value must be exactly this many ASCII digits.
    DigitCount(usize),
    /// Value must start with the given prefix.
    Prefix(String),
    /// Value must parse as an integer inside the closed range.
    IntRange { min: i64, max: i64 },
    /// Free text must contain at least one digit (street numbers).
    ContainsDigit,
    /// Date/date-time must not lie in the future.
    NotFuture,
    /// Date must fall within the past `days` days (footage retention).
    WithinPastDays(i64),
    /// Date-time must be strictly after the sibling field's value.
    AfterSibling { base: String },
}

/// Static description of one leaf field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    pub base: String,
    pub label: String,
    pub kind: FieldKind,
    pub requirement: Requirement,
    pub visibility: Visibility,
    pub rules: Vec<Rule>,
    pub hint: Option<String>,
}

impl FieldSpec {
    pub fn new(base: impl Into<String>, label: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            base: base.into(),
            label: label.into(),
            kind,
            requirement: Requirement::Optional,
            visibility: Visibility::Always,
            rules: Vec::new(),
            hint: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.requirement = Requirement::Always;
        self
    }

    /// Required and visible only while the sibling holds the given value.
    pub fn conditional_on(mut self, base: impl Into<String>, value: impl Into<String>) -> Self {
        let base = base.into();
        let value = value.into();
        self.requirement = Requirement::WhenSiblingIs {
            base: base.clone(),
            value: value.clone(),
        };
        self.visibility = Visibility::WhenSiblingIs { base, value };
        self
    }

    pub fn rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// One repeatable time-frame block nested inside a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSpec {
    pub title: String,
    pub fields: Vec<FieldSpec>,
}

/// One repeatable recorder block: its own fields plus a sequence of items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    pub title: String,
    pub fields: Vec<FieldSpec>,
    pub item: ItemSpec,
}

/// The whole form: top-level fields plus the repeatable group template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSpec {
    pub id: String,
    pub title: String,
    pub fields: Vec<FieldSpec>,
    pub group: GroupSpec,
}

impl FormSpec {
    /// Resolves which level of the tree a base name belongs to. Base names
    /// are unique across all three scopes; the addressing scheme depends on
    /// that.
    pub fn scope_of(&self, base: &str) -> Option<Scope> {
        if self.fields.iter().any(|field| field.base == base) {
            return Some(Scope::Form);
        }
        if self.group.fields.iter().any(|field| field.base == base) {
            return Some(Scope::Group);
        }
        if self.group.item.fields.iter().any(|field| field.base == base) {
            return Some(Scope::Item);
        }
        None
    }

    pub fn field_spec(&self, base: &str) -> Option<&FieldSpec> {
        self.fields
            .iter()
            .chain(self.group.fields.iter())
            .chain(self.group.item.fields.iter())
            .find(|field| field.base == base)
    }
}
