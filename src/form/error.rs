use std::fmt;

/// Classification of a field-level validation failure. These never propagate
/// as errors; they render inline and gate submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    RequiredMissing,
    Format,
    Range,
    Ordering,
    FutureDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldIssue {
    pub kind: ValidationKind,
    pub message: String,
}

impl FieldIssue {
    pub fn new(kind: ValidationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for FieldIssue {}

/// Violation of the structural contract: the first group and the first item
/// of each group always exist and cannot be removed. The UI disables these
/// affordances, so hitting one of these is a caller bug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    RemoveFirstGroup,
    RemoveFirstItem { group: usize },
    NoSuchGroup(usize),
    NoSuchItem { group: usize, item: usize },
}

impl fmt::Display for StructuralError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructuralError::RemoveFirstGroup => {
                write!(f, "the first recorder group cannot be removed")
            }
            StructuralError::RemoveFirstItem { group } => {
                write!(
                    f,
                    "the first time-frame of recorder group {group} cannot be removed"
                )
            }
            StructuralError::NoSuchGroup(group) => {
                write!(f, "no recorder group at index {group}")
            }
            StructuralError::NoSuchItem { group, item } => {
                write!(f, "no time-frame {item} in recorder group {group}")
            }
        }
    }
}

impl std::error::Error for StructuralError {}

/// A persisted draft that cannot be restored. Callers degrade this to
/// "no draft available" rather than failing the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    Expired,
    Corrupt(String),
}

impl fmt::Display for DraftError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftError::Expired => write!(f, "draft has expired"),
            DraftError::Corrupt(reason) => write!(f, "draft is corrupt: {reason}"),
        }
    }
}

impl std::error::Error for DraftError {}
