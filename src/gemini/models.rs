//! The Gemini model registry and fallback ordering.

/// Short keys and their model identifiers, in fallback declaration order.
const MODEL_TABLE: &[(&str, &str)] = &[
    ("flash-lite", "gemini-2.5-flash-lite"),
    ("flash", "gemini-2.5-flash"),
    ("flash-3", "gemini-3-flash"),
];

/// The model tried first when no `--model` override is given.
pub const DEFAULT_MODEL_KEY: &str = "flash-lite";

/// Resolve a short key to a model identifier.
///
/// Unknown or absent keys resolve to the default model.
pub fn resolve_model(key: Option<&str>) -> &'static str {
    let key = key.unwrap_or(DEFAULT_MODEL_KEY);
    MODEL_TABLE
        .iter()
        .find(|(k, _)| *k == key)
        .or_else(|| MODEL_TABLE.iter().find(|(k, _)| *k == DEFAULT_MODEL_KEY))
        .map(|(_, model)| *model)
        .expect("default model key is in the table")
}

/// Short keys for CLI help.
pub fn available_keys() -> Vec<&'static str> {
    MODEL_TABLE.iter().map(|(key, _)| *key).collect()
}

/// The deterministic model order for one generation attempt.
///
/// The given model comes first, then every other table entry in declared
/// order. No model appears twice.
pub fn fallback_order(first: &str) -> Vec<String> {
    let mut order = vec![first.to_string()];
    order.extend(
        MODEL_TABLE
            .iter()
            .map(|(_, model)| *model)
            .filter(|model| *model != first)
            .map(ToString::to_string),
    );
    order
}
