use serde::Deserialize;

use crate::error::OptionsError;

/// Knobs controlling one resolution session.
///
/// Loaded from the `[bindings]` table of `nova.toml`, or from a bare table with the same keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolveOptions {
    /// Give unresolved type references a fabricated "missing" type instead of no binding.
    pub binding_recovery: bool,
    /// Resolve statements the parser had to repair. When off, malformed statements carry no
    /// bindings.
    pub statements_recovery: bool,
    /// Resolve method, constructor and initializer bodies, not just signatures.
    pub resolve_method_bodies: bool,
    /// Maximum nesting accepted when decoding binding keys.
    pub max_key_depth: usize,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            binding_recovery: false,
            statements_recovery: true,
            resolve_method_bodies: true,
            max_key_depth: 64,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OptionsFile {
    bindings: ResolveOptions,
}

impl ResolveOptions {
    pub fn from_toml_str(text: &str) -> Result<Self, OptionsError> {
        let value: toml::Value = toml::from_str(text)?;
        let has_table = value
            .as_table()
            .is_some_and(|table| table.contains_key("bindings"));
        if has_table {
            let file: OptionsFile = toml::from_str(text)?;
            Ok(file.bindings)
        } else {
            Ok(toml::from_str(text)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_defaults() {
        let options = ResolveOptions::from_toml_str("").unwrap();
        assert_eq!(options, ResolveOptions::default());
    }

    #[test]
    fn bindings_table_and_bare_table_are_equivalent() {
        let table = ResolveOptions::from_toml_str(
            r#"
            [bindings]
            binding_recovery = true
            max_key_depth = 8
            "#,
        )
        .unwrap();
        let bare = ResolveOptions::from_toml_str("binding_recovery = true\nmax_key_depth = 8").unwrap();
        assert_eq!(table, bare);
        assert!(table.binding_recovery);
        assert!(table.statements_recovery);
        assert_eq!(table.max_key_depth, 8);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = ResolveOptions::from_toml_str("bindings_recovery = true").unwrap_err();
        assert!(matches!(err, OptionsError::Toml(_)));
    }
}
