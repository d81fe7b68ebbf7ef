use std::collections::HashSet;

use crate::license::expression::{parse, LicenseTerm};
use crate::license::registry::LicenseRegistry;
use crate::models::{ValidationBody, ValidationResult};

/// Validate a license expression against `registry`.
///
/// Grammar problems make the result invalid. Identifiers missing from the
/// registry are collected into `unknown_tokens` (first occurrence order, no
/// duplicates) but leave the expression valid.
pub fn validate(registry: &LicenseRegistry, expression: &str) -> ValidationResult {
    let tree = match parse(expression) {
        Ok(tree) => tree,
        Err(e) => {
            tracing::debug!(expression, error = %e, "rejected license expression");
            return ValidationResult {
                valid: false,
                unknown_tokens: Vec::new(),
                error: Some(e.to_string()),
                normalized: None,
            };
        }
    };

    let mut unknown_tokens: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut note_unknown = |token: String| {
        if seen.insert(token.clone()) {
            unknown_tokens.push(token);
        }
    };

    for term in tree.terms() {
        if !is_known_license(registry, term) {
            let mut token = term.id.clone();
            if term.or_later {
                token.push('+');
            }
            note_unknown(token);
        }
        if let Some(exception) = &term.exception {
            if !registry.contains(exception) {
                note_unknown(exception.clone());
            }
        }
    }

    ValidationResult {
        valid: true,
        unknown_tokens,
        error: None,
        normalized: Some(tree.to_string()),
    }
}

/// HTTP-shaped validation: `(200, {"unknown_tokens": [...]})` or `(400, {"error": "..."})`.
pub fn validate_expression(registry: &LicenseRegistry, expression: &str) -> (u16, ValidationBody) {
    let result = validate(registry, expression);
    (result.status_code(), result.into())
}

/// `GPL-2.0+` is known if either the literal `GPL-2.0+` or the base `GPL-2.0` is registered.
fn is_known_license(registry: &LicenseRegistry, term: &LicenseTerm) -> bool {
    if registry.contains(&term.id) {
        return true;
    }
    term.or_later && registry.contains(&format!("{}+", term.id))
}
