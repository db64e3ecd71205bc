//! Platform key label mapping
//!
//! Cheat sheets are written with Mac key labels. Producing the Windows
//! variant means substituting every leaf token of every key combination
//! through a fixed table, unless the entry carries an explicit Windows
//! override for that slot, in which case the override is used verbatim.
//!
//! Tokens missing from the table pass through unchanged, so new key names
//! never make a rewrite fail.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use keyatlas_ast::{Document, Entry, KeyCombo};
use tracing::debug;

/// Mac glyph to Windows label
const MAC_TO_WINDOWS: &[(&str, &str)] = &[
    ("\u{2318}", "Ctrl"),      // ⌘ Command
    ("\u{2325}", "Alt"),       // ⌥ Option
    ("\u{21e7}", "Shift"),     // ⇧ Shift
    ("\u{2303}", "Ctrl"),      // ⌃ Control
    ("\u{21b5}", "Enter"),     // ↵ Return
    ("\u{232b}", "Backspace"), // ⌫ Delete
    ("\u{238b}", "Esc"),       // ⎋ Escape
];

/// Keyboard label convention a sheet is produced for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Platform {
    /// Mac glyphs, the convention documents are written in
    Mac,
    /// Windows key names
    Windows,
}

impl Platform {
    /// Every supported platform, in build order
    pub const ALL: [Platform; 2] = [Platform::Mac, Platform::Windows];

    /// Lowercase name used in file names and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Platform::Mac => "mac",
            Platform::Windows => "windows",
        }
    }

    /// Token substitution table from the source convention to this one
    pub fn key_map(self) -> KeyMap {
        match self {
            Platform::Mac => KeyMap::identity(),
            Platform::Windows => KeyMap::mac_to_windows(),
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mac" | "macos" => Ok(Platform::Mac),
            "windows" | "win" => Ok(Platform::Windows),
            other => Err(format!("unknown platform: {}", other)),
        }
    }
}

/// Token substitution table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyMap {
    table: HashMap<String, String>,
}

impl KeyMap {
    /// A table that substitutes nothing
    pub fn identity() -> Self {
        Self::default()
    }

    /// The built-in Mac to Windows table
    pub fn mac_to_windows() -> Self {
        Self::from_pairs(MAC_TO_WINDOWS.iter().copied())
    }

    /// Build a table from `(source, target)` pairs
    ///
    /// A later pair for the same source token replaces an earlier one.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            table: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Number of source tokens in the table
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Check if the table substitutes nothing
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Substitute a single token
    pub fn translate<'a>(&'a self, token: &'a str) -> &'a str {
        self.table.get(token).map(String::as_str).unwrap_or(token)
    }

    /// Substitute every leaf of a key combination, keeping its shape
    pub fn map_combo(&self, combo: &KeyCombo) -> KeyCombo {
        combo.map_tokens(&mut |token: &str| self.translate(token).to_string())
    }
}

/// Rewrites entries and documents into one platform's labels
#[derive(Debug, Clone)]
pub struct Rewriter {
    platform: Platform,
    map: KeyMap,
}

impl Rewriter {
    /// Rewriter using the platform's built-in table
    pub fn new(platform: Platform) -> Self {
        Self::with_map(platform, platform.key_map())
    }

    /// Rewriter using a custom table
    pub fn with_map(platform: Platform, map: KeyMap) -> Self {
        Self { platform, map }
    }

    /// Target platform
    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Rewrite one entry
    ///
    /// An explicit override for the target platform wins over the table.
    /// The result never carries override fields.
    pub fn rewrite_entry(&self, entry: &Entry) -> Entry {
        let keys = match self.primary_override(entry) {
            Some(keys) => keys.clone(),
            None => self.map.map_combo(&entry.keys),
        };

        let alt_keys = entry
            .alt_keys
            .as_ref()
            .map(|alt| match self.alternate_override(entry) {
                Some(keys) => keys.clone(),
                None => self.map.map_combo(alt),
            });

        if entry.alt_keys.is_none() && self.alternate_override(entry).is_some() {
            debug!(action = %entry.action, "ignoring alternate override without alt_keys");
        }

        Entry {
            action: entry.action.clone(),
            keys,
            alt_keys,
            win_keys: None,
            win_alt_keys: None,
            range: entry.range.clone(),
        }
    }

    /// Rewrite a whole document into an independent copy
    pub fn rewrite_document(&self, doc: &Document) -> Document {
        let mut out = doc.clone();
        for entry in out.entries_mut() {
            *entry = self.rewrite_entry(entry);
        }
        debug!(
            platform = %self.platform,
            entries = out.entries().count(),
            "rewrote key labels"
        );
        out
    }

    fn primary_override<'a>(&self, entry: &'a Entry) -> Option<&'a KeyCombo> {
        match self.platform {
            Platform::Mac => None,
            Platform::Windows => entry.win_keys.as_ref(),
        }
    }

    fn alternate_override<'a>(&self, entry: &'a Entry) -> Option<&'a KeyCombo> {
        match self.platform {
            Platform::Mac => None,
            Platform::Windows => entry.win_alt_keys.as_ref(),
        }
    }
}

/// Clone `doc` with key labels rewritten for `platform`
pub fn rewrite_for_platform(doc: &Document, platform: Platform) -> Document {
    Rewriter::new(platform).rewrite_document(doc)
}
