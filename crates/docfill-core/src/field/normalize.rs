//! Field identifier normalization and humanization.

/// Characters stripped from both ends of a raw placeholder name.
const PLACEHOLDER_MARKERS: &[char] = &['[', ']', '{', '}', '(', ')', '$'];

/// Converts a raw placeholder name into a stable field identifier.
///
/// Surrounding bracket, brace and dollar markers are removed, the name is
/// lowercased, whitespace becomes `_`, and anything outside `[a-z0-9_]` is
/// dropped. Applying it twice yields the same result as applying it once.
///
/// # Examples
///
/// ```
/// use docfill_core::field::normalize_field_name;
///
/// assert_eq!(normalize_field_name("[Company Name]"), "company_name");
/// assert_eq!(normalize_field_name("{{client_name}}"), "client_name");
/// assert_eq!(normalize_field_name("Date of Safe"), "date_of_safe");
/// ```
pub fn normalize_field_name(raw: &str) -> String {
    let stripped = raw
        .trim()
        .trim_matches(PLACEHOLDER_MARKERS)
        .trim()
        .to_lowercase();

    stripped
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect()
}

/// Turns `company_name` into `Company Name`.
///
/// Splits on `_`, capitalizes the first letter of every word and joins the
/// words with single spaces.
pub fn humanize_field_name(field: &str) -> String {
    field
        .split('_')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The question asked for a field when no phrased question is stored.
pub fn default_question(field: &str) -> String {
    format!("What is the {}?", humanize_field_name(field))
}
