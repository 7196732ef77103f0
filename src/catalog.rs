//! The message template catalog: an immutable name → body mapping loaded once
//! at startup.
//!
//! Bodies come from an `extracted_templates.json`-style file when one exists;
//! otherwise a small built-in set is used. A missing or unreadable file is a
//! recoverable condition, never an error surfaced to callers.

use std::path::Path;

use serde_json::Value;

use crate::error::CaflowError;

/// Immutable template catalog. Entry order is the order of the source file
/// (or of the built-in set) and is the tie-break order for equally scored
/// recommendations, so it is kept as an ordered list rather than a hash map.
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    entries: Vec<(String, String)>,
}

impl TemplateCatalog {
    /// The built-in default template set.
    pub fn builtin() -> Self {
        let entries = [
            (
                "登録お礼",
                "この度はリクルートエージェントにご登録いただき、ありがとうございます。",
            ),
            ("求人紹介", "ご条件に合致する求人をご紹介させていただきます。"),
            ("面接感想依頼", "面接お疲れ様でした。感想をお聞かせください。"),
            (
                "内定連絡(CA→CS)",
                "内定のご連絡をいたします。おめでとうございます。",
            ),
        ];
        Self {
            entries: entries
                .iter()
                .map(|(name, body)| (name.to_string(), body.to_string()))
                .collect(),
        }
    }

    /// Build a catalog from explicit entries, preserving their order.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, S)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, body)| (name.into(), body.into()))
                .collect(),
        }
    }

    /// Load a catalog from a JSON object of `name: body` pairs.
    pub fn load(path: &Path) -> Result<Self, CaflowError> {
        let contents = std::fs::read_to_string(path)?;
        let map: serde_json::Map<String, Value> = serde_json::from_str(&contents)?;
        let entries = map
            .into_iter()
            .filter_map(|(name, body)| body.as_str().map(|b| (name, b.to_string())))
            .collect();
        Ok(Self { entries })
    }

    /// Load from `path`, falling back to the built-in set when the file is
    /// absent or unreadable.
    pub fn load_or_builtin(path: &Path) -> Self {
        if !path.exists() {
            return Self::builtin();
        }
        match Self::load(path) {
            Ok(catalog) => catalog,
            Err(e) => {
                eprintln!("テンプレート読み込みエラー: {e}");
                Self::builtin()
            }
        }
    }

    /// Body text for a template name, if the catalog holds it.
    pub fn body(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, body)| body.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.body(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in definition order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }
}

/// Load a status → eligible-template-names mapping from a
/// `status_classification.json`-style export, where each status maps to an
/// object carrying an `available_templates` array.
///
/// Returns `None` when the file is absent or malformed; the caller then keeps
/// the graph's built-in eligibility lists.
pub fn load_status_mapping(path: &Path) -> Option<Vec<(String, Vec<String>)>> {
    if !path.exists() {
        return None;
    }
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("ステータスマッピング読み込みエラー: {e}");
            return None;
        }
    };
    let map: serde_json::Map<String, Value> = match serde_json::from_str(&contents) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("ステータスマッピング読み込みエラー: {e}");
            return None;
        }
    };

    let mapping = map
        .into_iter()
        .map(|(status, info)| {
            let templates = info
                .get("available_templates")
                .and_then(Value::as_array)
                .map(|arr| {
                    arr.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            (status, templates)
        })
        .collect();
    Some(mapping)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn builtin_catalog_has_default_templates() {
        let catalog = TemplateCatalog::builtin();
        assert_eq!(catalog.len(), 4);
        assert!(catalog.contains("登録お礼"));
        assert!(catalog.contains("内定連絡(CA→CS)"));
        assert_eq!(
            catalog.body("面接感想依頼"),
            Some("面接お疲れ様でした。感想をお聞かせください。")
        );
        assert_eq!(catalog.body("存在しない"), None);
    }

    #[test]
    fn load_preserves_file_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"Z最後ではない": "a", "あいさつ": "b", "1番": "c"}}"#
        )
        .unwrap();

        let catalog = TemplateCatalog::load(file.path()).unwrap();
        let names: Vec<&str> = catalog.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Z最後ではない", "あいさつ", "1番"]);
    }

    #[test]
    fn load_or_builtin_falls_back_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = TemplateCatalog::load_or_builtin(&dir.path().join("missing.json"));
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn load_or_builtin_falls_back_on_malformed_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let catalog = TemplateCatalog::load_or_builtin(file.path());
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn status_mapping_extracts_available_templates() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "登録完了": {{
                    "description": "サービス登録完了",
                    "available_templates": ["登録お礼"]
                }},
                "内定通知": {{
                    "available_templates": ["内定連絡(CA→CS)", "内定連絡(RA→CA)"]
                }},
                "退職完了": {{}}
            }}"#
        )
        .unwrap();

        let mapping = load_status_mapping(file.path()).unwrap();
        assert_eq!(mapping.len(), 3);
        assert_eq!(mapping[0].0, "登録完了");
        assert_eq!(mapping[0].1, vec!["登録お礼"]);
        assert_eq!(mapping[1].1.len(), 2);
        assert!(mapping[2].1.is_empty());
    }

    #[test]
    fn status_mapping_none_when_file_absent() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_status_mapping(&dir.path().join("missing.json")).is_none());
    }

    #[test]
    fn from_entries_keeps_order() {
        let catalog = TemplateCatalog::from_entries([("b", "2"), ("a", "1")]);
        let names: Vec<&str> = catalog.entries().iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["b", "a"]);
    }
}
