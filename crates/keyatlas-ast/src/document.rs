//! Document root, sections and entries
//!
//! A document is one cheat sheet: a title, an optional subtitle, the
//! per-document settings block and an ordered list of sections.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_yaml::Value;

use crate::keys::KeyCombo;

/// A complete cheat sheet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    /// Application name, used as the sheet title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,
    /// Optional subtitle under the title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    /// Keybinding sections in display order
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Remaining top-level fields (paper, color, columns, ...), kept raw
    #[serde(flatten)]
    pub settings: BTreeMap<String, Value>,
}

/// A titled group of entries
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Section {
    /// Section heading
    #[serde(default, alias = "label")]
    pub name: String,
    /// Rows in display order
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// One action-to-keybinding row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// What the binding does
    pub action: String,
    /// Primary key combination (Mac labels)
    pub keys: KeyCombo,
    /// Alternate key combination (Mac labels)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt_keys: Option<KeyCombo>,
    /// Windows replacement for `keys`, used verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_keys: Option<KeyCombo>,
    /// Windows replacement for `alt_keys`, used verbatim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub win_alt_keys: Option<KeyCombo>,
    /// Key range shown after the combination (e.g. `1`..`9`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<KeyCombo>,
}

impl Document {
    /// Create an empty document for the given application
    pub fn new(app: impl Into<String>) -> Self {
        Self {
            app: Some(app.into()),
            ..Default::default()
        }
    }

    /// Set the subtitle
    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    /// Set a raw document-level setting
    pub fn with_setting(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(field.into(), value.into());
        self
    }

    /// Add a section
    pub fn push(&mut self, section: Section) {
        self.sections.push(section);
    }

    /// Look up a document-level setting by its YAML field name
    pub fn setting(&self, field: &str) -> Option<&Value> {
        self.settings.get(field)
    }

    /// Iterate over every entry of every section
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.sections.iter().flat_map(|s| s.entries.iter())
    }

    /// Iterate mutably over every entry of every section
    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut Entry> {
        self.sections.iter_mut().flat_map(|s| s.entries.iter_mut())
    }
}

impl Section {
    /// Create an empty section
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Add an entry
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Builder-style variant of [`Section::push`]
    pub fn with_entry(mut self, entry: Entry) -> Self {
        self.entries.push(entry);
        self
    }
}

impl Entry {
    /// Create an entry with only a primary combination
    pub fn new(action: impl Into<String>, keys: impl Into<KeyCombo>) -> Self {
        Self {
            action: action.into(),
            keys: keys.into(),
            alt_keys: None,
            win_keys: None,
            win_alt_keys: None,
            range: None,
        }
    }

    /// Set the alternate combination
    pub fn with_alt_keys(mut self, keys: impl Into<KeyCombo>) -> Self {
        self.alt_keys = Some(keys.into());
        self
    }

    /// Set the Windows primary override
    pub fn with_win_keys(mut self, keys: impl Into<KeyCombo>) -> Self {
        self.win_keys = Some(keys.into());
        self
    }

    /// Set the Windows alternate override
    pub fn with_win_alt_keys(mut self, keys: impl Into<KeyCombo>) -> Self {
        self.win_alt_keys = Some(keys.into());
        self
    }

    /// Check if any platform override field is present
    pub fn has_overrides(&self) -> bool {
        self.win_keys.is_some() || self.win_alt_keys.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
app: VS Code
subtitle: Essentials
color: "#007acc"
font_scale: 0.9
columns: 4
sections:
  - name: General
    entries:
      - action: Command palette
        keys: [⌘, ⇧, P]
      - action: Save all
        keys: [⌘, ⌥, S]
        win_keys: [Ctrl, K, S]
  - label: Navigation
    entries:
      - action: Go to tab
        keys: [⌃]
        range: ["1", "9"]
"##;

    #[test]
    fn test_parse_document() {
        let doc: Document = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(doc.app.as_deref(), Some("VS Code"));
        assert_eq!(doc.subtitle.as_deref(), Some("Essentials"));
        assert_eq!(doc.sections.len(), 2);
        assert_eq!(doc.sections[1].name, "Navigation");
        assert_eq!(doc.entries().count(), 3);
    }

    #[test]
    fn test_settings_are_collected_raw() {
        let doc: Document = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(doc.setting("color").and_then(Value::as_str), Some("#007acc"));
        assert_eq!(doc.setting("columns").and_then(Value::as_u64), Some(4));
        assert_eq!(doc.setting("font_scale").and_then(Value::as_f64), Some(0.9));
        assert!(doc.setting("sections").is_none());
        assert!(doc.setting("app").is_none());
    }

    #[test]
    fn test_optional_entry_fields() {
        let doc: Document = serde_yaml::from_str(SAMPLE).unwrap();
        let save_all = &doc.sections[0].entries[1];
        assert!(save_all.has_overrides());
        assert_eq!(save_all.win_keys, Some(KeyCombo::chord(["Ctrl", "K", "S"])));
        assert!(save_all.alt_keys.is_none());

        let go_to_tab = &doc.sections[1].entries[0];
        assert_eq!(go_to_tab.range, Some(KeyCombo::chord(["1", "9"])));
        assert!(!go_to_tab.has_overrides());
    }

    #[test]
    fn test_minimal_document() {
        let doc: Document = serde_yaml::from_str("app: Empty").unwrap();
        assert!(doc.sections.is_empty());
        assert!(doc.settings.is_empty());
    }

    #[test]
    fn test_serialize_omits_absent_fields() {
        let mut doc = Document::new("Demo");
        doc.push(Section::new("Edit").with_entry(Entry::new("Copy", KeyCombo::chord(["⌘", "C"]))));
        let yaml = serde_yaml::to_string(&doc).unwrap();
        assert!(yaml.contains("app: Demo"));
        assert!(!yaml.contains("subtitle"));
        assert!(!yaml.contains("alt_keys"));
        assert!(!yaml.contains("win_keys"));
    }

    #[test]
    fn test_unknown_fields_survive_reserialization() {
        let doc: Document = serde_yaml::from_str("app: X\nfooter: hello\nsections: []").unwrap();
        let yaml = serde_yaml::to_string(&doc).unwrap();
        let back: Document = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.setting("footer").and_then(Value::as_str), Some("hello"));
    }
}
