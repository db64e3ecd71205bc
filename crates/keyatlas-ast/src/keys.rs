//! Key combinations
//!
//! A key combination is either a single key token or an ordered sequence of
//! key combinations (a chord). Chords nest to any depth, so `[["⌘", "K"],
//! ["⌘", "S"]]` is a chord of two chords.

use std::fmt;

use serde::de::{self, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

/// A key token or a (possibly nested) chord of key combinations
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum KeyCombo {
    /// A single key label such as `⌘` or `C`
    Key(String),
    /// Keys pressed together, in order
    Chord(Vec<KeyCombo>),
}

impl KeyCombo {
    /// Create a single-token combination
    pub fn key(token: impl Into<String>) -> Self {
        KeyCombo::Key(token.into())
    }

    /// Create a chord from the given parts
    pub fn chord<I>(parts: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<KeyCombo>,
    {
        KeyCombo::Chord(parts.into_iter().map(Into::into).collect())
    }

    /// Check if this is a chord rather than a single key
    pub fn is_chord(&self) -> bool {
        matches!(self, KeyCombo::Chord(_))
    }

    /// Build a new tree of the same shape with every leaf token rewritten
    pub fn map_tokens<F>(&self, f: &mut F) -> KeyCombo
    where
        F: FnMut(&str) -> String,
    {
        match self {
            KeyCombo::Key(token) => KeyCombo::Key(f(token.as_str())),
            KeyCombo::Chord(parts) => {
                KeyCombo::Chord(parts.iter().map(|part| part.map_tokens(&mut *f)).collect())
            }
        }
    }

    /// Leaf tokens in depth-first order
    pub fn tokens(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_tokens(&mut out);
        out
    }

    fn collect_tokens<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            KeyCombo::Key(token) => out.push(token),
            KeyCombo::Chord(parts) => {
                for part in parts {
                    part.collect_tokens(out);
                }
            }
        }
    }
}

impl From<&str> for KeyCombo {
    fn from(token: &str) -> Self {
        KeyCombo::Key(token.to_string())
    }
}

impl From<String> for KeyCombo {
    fn from(token: String) -> Self {
        KeyCombo::Key(token)
    }
}

impl From<Vec<KeyCombo>> for KeyCombo {
    fn from(parts: Vec<KeyCombo>) -> Self {
        KeyCombo::Chord(parts)
    }
}

// YAML authors write bare digits and function keys (`1`, `F5`) as scalars,
// so every scalar kind is accepted as a key token.
impl<'de> Deserialize<'de> for KeyCombo {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(KeyComboVisitor)
    }
}

struct KeyComboVisitor;

impl<'de> Visitor<'de> for KeyComboVisitor {
    type Value = KeyCombo;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a key token or a sequence of key combinations")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<KeyCombo, E> {
        Ok(KeyCombo::Key(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<KeyCombo, E> {
        Ok(KeyCombo::Key(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<KeyCombo, E> {
        Ok(KeyCombo::Key(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<KeyCombo, E> {
        Ok(KeyCombo::Key(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<KeyCombo, E> {
        Ok(KeyCombo::Key(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<KeyCombo, E> {
        Ok(KeyCombo::Key(v.to_string()))
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<KeyCombo, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut parts = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(part) = seq.next_element::<KeyCombo>()? {
            parts.push(part);
        }
        Ok(KeyCombo::Chord(parts))
    }
}
