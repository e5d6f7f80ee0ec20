mod address;
mod catalog;
mod recovery;

pub use address::{AddressError, FieldKey};
pub use catalog::{
    FieldKind, FieldSpec, FormSpec, GroupSpec, ItemSpec, Requirement, Rule, Scope, Visibility,
};
pub use recovery::{FOOTAGE_RETENTION_DAYS, RECOVERY_FORM_ID, recovery_request};
