//! Identifier derivation and collision-free name registration.
//!
//! Every generated identifier starts from a plan name, goes through
//! [`format_class_name`] (or a snake-case equivalent in the emitter) and is
//! then claimed in a [`NameRegistry`] scope so two plan names that format
//! to the same identifier still get distinct ones.

use std::collections::HashMap;

use crate::error::{SchemaError, SchemaResult};

/// Rust keywords, strict and reserved, in lower case.
pub const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl",
    "in", "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "static", "struct", "super", "trait", "true", "try", "type", "typeof",
    "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Whether `word` (compared in lower case) is a Rust keyword.
pub fn is_rust_keyword(word: &str) -> bool {
    let lower = word.to_lowercase();
    RUST_KEYWORDS.contains(&lower.as_str())
}

/// Split a name into words.
///
/// Non-alphanumeric characters separate words, as do camel humps
/// (`userId`), digit-to-upper transitions (`123Id`) and the end of an
/// acronym (`XMLHttp` splits into `XML`, `Http`).
pub fn split_words(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let next = chars.get(i + 1).copied();
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_numeric() && c.is_uppercase())
                || (prev.is_uppercase()
                    && c.is_uppercase()
                    && next.is_some_and(|n| n.is_lowercase()));
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// Convert a name to PascalCase: each word capitalized, the rest lowered.
pub fn to_pascal_case(input: &str) -> String {
    split_words(input)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Format a type or case identifier.
///
/// The name is PascalCased and prefixed with `_` when it starts with a digit
/// or is a Rust keyword, then `prefix` is prepended. This is how
/// `Case` + `true` becomes `Case_True` and `Case` + `beta` becomes `CaseBeta`.
/// Returns an empty string for a blank name.
pub fn format_class_name(prefix: &str, name: &str) -> String {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let mut formatted = to_pascal_case(trimmed);
    if formatted.chars().next().is_some_and(|c| c.is_numeric()) {
        formatted.insert(0, '_');
    }
    if is_rust_keyword(trimmed) {
        formatted.insert(0, '_');
    }

    format!("{prefix}{formatted}")
}

/// Picks a replacement when a name is already taken in a scope.
pub type CollisionHandler = fn(&str, &[String]) -> String;

/// Append the smallest positive number that makes `name` unique.
pub fn default_collision_handler(name: &str, existing: &[String]) -> String {
    (1..)
        .map(|n| format!("{name}{n}"))
        .find(|candidate| !existing.contains(candidate))
        .unwrap_or_else(|| name.to_string())
}

/// Hands out unique names per scope.
///
/// Registering the same id twice in a scope returns the first name, so
/// callers can register lazily wherever a name is needed.
#[derive(Debug, Clone)]
pub struct NameRegistry {
    handler: CollisionHandler,
    by_id: HashMap<(String, String), String>,
    taken: HashMap<String, Vec<String>>,
}

impl Default for NameRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl NameRegistry {
    /// Create a registry using numeric suffixes for collisions.
    pub fn new() -> Self {
        Self::with_handler(default_collision_handler)
    }

    /// Create a registry with a custom collision handler.
    pub fn with_handler(handler: CollisionHandler) -> Self {
        Self {
            handler,
            by_id: HashMap::new(),
            taken: HashMap::new(),
        }
    }

    /// Register `name` for `id` in `scope` and return the name actually assigned.
    pub fn register(&mut self, id: &str, scope: &str, name: &str) -> SchemaResult<String> {
        if id.is_empty() {
            return Err(SchemaError::invalid_name(name, "id cannot be empty"));
        }
        if scope.is_empty() {
            return Err(SchemaError::invalid_name(name, "scope cannot be empty"));
        }
        if name.is_empty() {
            return Err(SchemaError::invalid_name(id, "name cannot be empty"));
        }

        let key = (scope.to_string(), id.to_string());
        if let Some(existing) = self.by_id.get(&key) {
            return Ok(existing.clone());
        }

        let taken = self.taken.entry(scope.to_string()).or_default();
        let assigned = if taken.iter().any(|t| t == name) {
            (self.handler)(name, taken)
        } else {
            name.to_string()
        };

        taken.push(assigned.clone());
        self.by_id.insert(key, assigned.clone());
        Ok(assigned)
    }

    /// Look up the name registered for `id` in `scope`.
    pub fn get(&self, id: &str, scope: &str) -> Option<&str> {
        self.by_id
            .get(&(scope.to_string(), id.to_string()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_words() {
        assert_eq!(split_words("user_id"), vec!["user", "id"]);
        assert_eq!(split_words("email-address"), vec!["email", "address"]);
        assert_eq!(split_words("userId"), vec!["user", "Id"]);
        assert_eq!(split_words("XMLHttpRequest"), vec!["XML", "Http", "Request"]);
        assert_eq!(split_words("123Id"), vec!["123", "Id"]);
        assert_eq!(split_words("User Signed Up"), vec!["User", "Signed", "Up"]);
        assert!(split_words("___").is_empty());
    }

    #[test]
    fn test_to_pascal_case() {
        assert_eq!(to_pascal_case("user_profile"), "UserProfile");
        assert_eq!(to_pascal_case("Product \"Premium\" Clicked"), "ProductPremiumClicked");
        assert_eq!(to_pascal_case("XMLHttp"), "XmlHttp");
        assert_eq!(to_pascal_case("Track User Signed Up properties"), "TrackUserSignedUpProperties");
    }

    #[test]
    fn test_format_class_name_case_names() {
        assert_eq!(format_class_name("Case", "true"), "Case_True");
        assert_eq!(format_class_name("Case", "false"), "Case_False");
        assert_eq!(format_class_name("Case", "beta"), "CaseBeta");
        assert_eq!(format_class_name("Case", "3"), "Case_3");
    }

    #[test]
    fn test_format_class_name_prefixes() {
        assert_eq!(format_class_name("CustomType", "user_profile"), "CustomTypeUserProfile");
        assert_eq!(format_class_name("Property", "type"), "Property_Type");
        assert_eq!(format_class_name("", "2fa enabled"), "_2faEnabled");
        assert_eq!(format_class_name("Property", "   "), "");
    }

    #[test]
    fn test_register_same_id_returns_existing_name() {
        let mut registry = NameRegistry::new();
        let first = registry.register("user_id", "types", "UserId").unwrap();
        let second = registry.register("user_id", "types", "DifferentName").unwrap();
        assert_eq!(first, "UserId");
        assert_eq!(second, "UserId");
        assert_eq!(registry.get("user_id", "types"), Some("UserId"));
    }

    #[test]
    fn test_register_collisions() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.register("id1", "types", "UserId").unwrap(), "UserId");
        assert_eq!(registry.register("id2", "types", "UserId").unwrap(), "UserId1");
        assert_eq!(registry.register("id3", "types", "UserId").unwrap(), "UserId2");
    }

    #[test]
    fn test_register_different_scopes() {
        let mut registry = NameRegistry::new();
        assert_eq!(registry.register("id1", "types", "UserId").unwrap(), "UserId");
        assert_eq!(registry.register("id2", "methods", "UserId").unwrap(), "UserId");
    }

    #[test]
    fn test_register_custom_handler() {
        let mut registry = NameRegistry::with_handler(|name, _| format!("Custom_{name}"));
        registry.register("id1", "types", "UserId").unwrap();
        assert_eq!(registry.register("id2", "types", "UserId").unwrap(), "Custom_UserId");
    }

    #[test]
    fn test_register_rejects_empty_inputs() {
        let mut registry = NameRegistry::new();
        assert!(registry.register("", "types", "UserId").is_err());
        assert!(registry.register("id1", "", "UserId").is_err());
        assert!(registry.register("id1", "types", "").is_err());
    }

    #[test]
    fn test_default_collision_handler() {
        let existing = vec!["UserId".to_string(), "UserId1".to_string(), "UserId3".to_string()];
        assert_eq!(default_collision_handler("UserId", &existing), "UserId2");
        assert_eq!(default_collision_handler("UserId", &[]), "UserId1");
    }
}
