use crate::domain::FieldKey;

/// Everything the UI (or an embedder) may ask the engine to do. Dispatch is
/// the only mutation path; rendering code never touches the tree directly.
#[derive(Debug, Clone)]
pub enum FormCommand {
    AddGroup,
    RemoveGroup { group: usize },
    AddItem { group: usize },
    RemoveItem { group: usize, item: usize },
    EditText { key: FieldKey, text: String },
    SelectOption { key: FieldKey, index: usize },
    SetDateTime { key: FieldKey, value: String },
    Blur { key: FieldKey },
    Submit,
    Reset,
}
