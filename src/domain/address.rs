use std::fmt;

use super::catalog::{FormSpec, Scope};

/// Coordinates of a leaf field inside the form tree.
///
/// The key is the primary identity of a field everywhere inside the engine;
/// the wire address (the suffixed string the submission endpoint and the
/// PDF/JSON exporters key on) is derived from it at the boundary and parsed
/// back only when a draft is restored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldKey {
    /// Top-level field, not owned by any group.
    Form { base: String },
    /// Field owned by one recorder group.
    Group { base: String, group: usize },
    /// Field owned by one time-frame item inside a group.
    Item {
        base: String,
        group: usize,
        item: usize,
    },
}

impl FieldKey {
    pub fn form(base: impl Into<String>) -> Self {
        FieldKey::Form { base: base.into() }
    }

    pub fn group(base: impl Into<String>, group: usize) -> Self {
        FieldKey::Group {
            base: base.into(),
            group,
        }
    }

    pub fn item(base: impl Into<String>, group: usize, item: usize) -> Self {
        FieldKey::Item {
            base: base.into(),
            group,
            item,
        }
    }

    pub fn base(&self) -> &str {
        match self {
            FieldKey::Form { base }
            | FieldKey::Group { base, .. }
            | FieldKey::Item { base, .. } => base,
        }
    }

    pub fn group_index(&self) -> Option<usize> {
        match self {
            FieldKey::Form { .. } => None,
            FieldKey::Group { group, .. } | FieldKey::Item { group, .. } => Some(*group),
        }
    }

    pub fn item_index(&self) -> Option<usize> {
        match self {
            FieldKey::Item { item, .. } => Some(*item),
            _ => None,
        }
    }

    /// Rewrites the owning group index, keeping everything else.
    pub fn at_group(&self, group: usize) -> Self {
        match self {
            FieldKey::Form { base } => FieldKey::Form { base: base.clone() },
            FieldKey::Group { base, .. } => FieldKey::Group {
                base: base.clone(),
                group,
            },
            FieldKey::Item { base, item, .. } => FieldKey::Item {
                base: base.clone(),
                group,
                item: *item,
            },
        }
    }

    /// Rewrites the owning item index; only meaningful for item-scoped keys.
    pub fn at_item(&self, item: usize) -> Self {
        match self {
            FieldKey::Item { base, group, .. } => FieldKey::Item {
                base: base.clone(),
                group: *group,
                item,
            },
            other => other.clone(),
        }
    }

    /// Derives the wire address.
    ///
    /// The first group and the first item of each group carry no suffix; the
    /// external consumers expect the bare base name for the common
    /// single-recorder, single-time-frame submission.
    pub fn address(&self) -> String {
        match self {
            FieldKey::Form { base } => base.clone(),
            FieldKey::Group { base, group } => {
                if *group == 0 {
                    base.clone()
                } else {
                    format!("{base}_g{group}")
                }
            }
            FieldKey::Item { base, group, item } => {
                let mut address = base.clone();
                if *group > 0 {
                    address.push_str(&format!("_g{group}"));
                }
                if *item > 0 {
                    address.push_str(&format!("_{item}"));
                }
                address
            }
        }
    }

    /// Parses a wire address back into a key, resolving the base name's scope
    /// against the catalog.
    ///
    /// Item-scoped bases normalize a missing item suffix to item 0, so the
    /// round trip through [`FieldKey::address`] is total over valid keys.
    pub fn parse(address: &str, spec: &FormSpec) -> Result<FieldKey, AddressError> {
        let (stem, item) = split_item_suffix(address);
        let (base, group) = split_group_suffix(stem);
        let scope = spec.scope_of(base).ok_or_else(|| AddressError {
            address: address.to_string(),
            message: format!("unknown field '{base}'"),
        })?;
        match scope {
            Scope::Form => {
                if group.is_some() || item.is_some() {
                    return Err(AddressError {
                        address: address.to_string(),
                        message: format!("'{base}' does not belong to a group"),
                    });
                }
                Ok(FieldKey::form(base))
            }
            Scope::Group => {
                if item.is_some() {
                    return Err(AddressError {
                        address: address.to_string(),
                        message: format!("'{base}' does not belong to a time-frame"),
                    });
                }
                Ok(FieldKey::group(base, group.unwrap_or(0)))
            }
            Scope::Item => Ok(FieldKey::item(
                base,
                group.unwrap_or(0),
                item.unwrap_or(0),
            )),
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.address())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressError {
    pub address: String,
    pub message: String,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.address, self.message)
    }
}

impl std::error::Error for AddressError {}

/// Splits a trailing `_<digits>` item suffix. Suffix 0 is never emitted, so a
/// literal `_0` stays part of the stem and fails the catalog lookup instead.
fn split_item_suffix(address: &str) -> (&str, Option<usize>) {
    let Some((stem, tail)) = address.rsplit_once('_') else {
        return (address, None);
    };
    match parse_positive_index(tail) {
        Some(index) => (stem, Some(index)),
        None => (address, None),
    }
}

/// Splits a trailing `_g<digits>` group suffix.
fn split_group_suffix(stem: &str) -> (&str, Option<usize>) {
    let Some((base, tail)) = stem.rsplit_once("_g") else {
        return (stem, None);
    };
    match parse_positive_index(tail) {
        Some(index) => (base, Some(index)),
        None => (stem, None),
    }
}

fn parse_positive_index(digits: &str) -> Option<usize> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match digits.parse::<usize>() {
        Ok(0) => None,
        Ok(index) => Some(index),
        Err(_) => None,
    }
}
