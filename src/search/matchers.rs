//! Case-insensitive matching of the query against catalog metadata.

use crate::catalog::FieldDescriptor;

/// True when the query is a substring of the application's display name.
pub fn match_app(query: &str, app_name: &str) -> bool {
    contains_ci(app_name, query)
}

/// True when the query matches the model's display name, its class name,
/// or any field's internal name, label or help text. Short-circuits on the
/// first hit; missing labels and help texts are treated as empty.
pub fn match_model(
    query: &str,
    model_name: &str,
    class_name: &str,
    fields: &[FieldDescriptor],
) -> bool {
    if contains_ci(model_name, query) || contains_ci(class_name, query) {
        return true;
    }
    fields.iter().any(|field| {
        contains_ci(&field.name, query)
            || field
                .label
                .as_deref()
                .map_or(false, |label| contains_ci(label, query))
            || field
                .help_text
                .as_deref()
                .map_or(false, |help| contains_ci(help, query))
    })
}

/// Substring containment, not whole-word: "man" matches "Manchester".
fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}
