//! Layered settings resolution
//!
//! Every sheet setting is resolved from three tiers, lowest first:
//!
//! 1. the built-in default from [`SETTINGS`]
//! 2. the document's own top-level field (which may be spelled differently
//!    from the canonical name, e.g. `font_scale` for `font-scale`)
//! 3. the caller's [`CallerOptions`], where `None` means "not given"
//!
//! Tiers are evaluated independently per setting. Nothing here validates
//! values: a paper name or color the engine does not understand is passed
//! along and rejected there.

use std::fmt;

use keyatlas_ast::Document;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use tracing::debug;

/// A sheet setting, by canonical name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Setting {
    /// Paper size (`paper`)
    Paper,
    /// Accent color (`accent-color`)
    AccentColor,
    /// Font scale multiplier (`font-scale`)
    FontScale,
    /// Page orientation (`orientation`)
    Orientation,
    /// Column count (`columns`)
    Columns,
}

/// Built-in default, in a form usable in a const table
#[derive(Debug, Clone, Copy)]
enum Builtin {
    Str(&'static str),
    Color(&'static str),
    Float(f64),
    Int(i64),
}

/// One row of the settings table
#[derive(Debug, Clone, Copy)]
pub struct SettingSpec {
    /// Canonical setting
    pub setting: Setting,
    /// Field name in the document YAML
    pub document_field: &'static str,
    default: Builtin,
}

/// The settings table, in resolution and output order
pub const SETTINGS: [SettingSpec; 5] = [
    SettingSpec {
        setting: Setting::Paper,
        document_field: "paper",
        default: Builtin::Str("us-letter"),
    },
    SettingSpec {
        setting: Setting::AccentColor,
        document_field: "color",
        default: Builtin::Color("#4a90d9"),
    },
    SettingSpec {
        setting: Setting::FontScale,
        document_field: "font_scale",
        default: Builtin::Float(1.0),
    },
    SettingSpec {
        setting: Setting::Orientation,
        document_field: "orientation",
        default: Builtin::Str("landscape"),
    },
    SettingSpec {
        setting: Setting::Columns,
        document_field: "columns",
        default: Builtin::Int(3),
    },
];

impl Setting {
    /// Every setting, in table order
    pub const ALL: [Setting; 5] = [
        Setting::Paper,
        Setting::AccentColor,
        Setting::FontScale,
        Setting::Orientation,
        Setting::Columns,
    ];

    /// Canonical name, as used by the template
    pub fn name(self) -> &'static str {
        match self {
            Setting::Paper => "paper",
            Setting::AccentColor => "accent-color",
            Setting::FontScale => "font-scale",
            Setting::Orientation => "orientation",
            Setting::Columns => "columns",
        }
    }

    /// Row of [`SETTINGS`] describing this setting
    pub fn spec(self) -> &'static SettingSpec {
        &SETTINGS[self.index()]
    }

    /// Field name used for this setting in document YAML
    pub fn document_field(self) -> &'static str {
        self.spec().document_field
    }

    /// Built-in default value
    pub fn default_value(self) -> SettingValue {
        match self.spec().default {
            Builtin::Str(s) => SettingValue::Str(s.to_string()),
            Builtin::Color(s) => SettingValue::Color(s.to_string()),
            Builtin::Float(f) => SettingValue::Float(f),
            Builtin::Int(i) => SettingValue::Int(i),
        }
    }

    fn index(self) -> usize {
        match self {
            Setting::Paper => 0,
            Setting::AccentColor => 1,
            Setting::FontScale => 2,
            Setting::Orientation => 3,
            Setting::Columns => 4,
        }
    }

    fn is_color(self) -> bool {
        matches!(self, Setting::AccentColor)
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved setting value, tagged with its semantic type
#[derive(Debug, Clone, PartialEq)]
pub enum SettingValue {
    /// No value
    None,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Free-form string
    Str(String),
    /// Color given as a hex string such as `#4a90d9`
    Color(String),
}

impl SettingValue {
    /// Reinterpret a scalar as a color string
    fn into_color(self) -> SettingValue {
        match self {
            SettingValue::Str(s) | SettingValue::Color(s) => SettingValue::Color(s),
            SettingValue::Int(i) => SettingValue::Color(i.to_string()),
            SettingValue::Float(f) => SettingValue::Color(f.to_string()),
            SettingValue::Bool(b) => SettingValue::Color(b.to_string()),
            SettingValue::None => SettingValue::None,
        }
    }

    /// Convert a raw document scalar; absent-like values yield `None`
    fn from_yaml(value: &Value) -> Option<SettingValue> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(SettingValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(SettingValue::Int)
                .or_else(|| n.as_f64().map(SettingValue::Float)),
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(SettingValue::Str(s.clone())),
            Value::Tagged(tagged) => SettingValue::from_yaml(&tagged.value),
            Value::Sequence(_) | Value::Mapping(_) => None,
        }
    }
}

/// Page orientation accepted from callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Wide pages (the default)
    Landscape,
    /// Tall pages
    Portrait,
}

impl Orientation {
    /// Name passed to the template
    pub fn name(self) -> &'static str {
        match self {
            Orientation::Landscape => "landscape",
            Orientation::Portrait => "portrait",
        }
    }
}

/// Settings explicitly supplied by the caller
///
/// Each field is `None` unless the caller gave it. The same record is
/// deserialized from a `keyatlas.toml` caller config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CallerOptions {
    /// Paper size
    pub paper: Option<String>,
    /// Accent color as a hex string
    #[serde(alias = "accent-color")]
    pub color: Option<String>,
    /// Font scale multiplier
    #[serde(alias = "font-scale")]
    pub font_scale: Option<f64>,
    /// Page orientation
    pub orientation: Option<Orientation>,
    /// Number of columns
    pub columns: Option<u32>,
}

impl CallerOptions {
    /// Combine with `top`, whose given fields win
    pub fn overlay(self, top: CallerOptions) -> CallerOptions {
        CallerOptions {
            paper: top.paper.or(self.paper),
            color: top.color.or(self.color),
            font_scale: top.font_scale.or(self.font_scale),
            orientation: top.orientation.or(self.orientation),
            columns: top.columns.or(self.columns),
        }
    }

    /// The caller's value for a setting, if given
    pub fn get(&self, setting: Setting) -> Option<SettingValue> {
        match setting {
            Setting::Paper => given(&self.paper).map(SettingValue::Str),
            Setting::AccentColor => given(&self.color).map(SettingValue::Color),
            Setting::FontScale => self.font_scale.map(SettingValue::Float),
            Setting::Orientation => self
                .orientation
                .map(|o| SettingValue::Str(o.name().to_string())),
            Setting::Columns => self.columns.map(|c| SettingValue::Int(i64::from(c))),
        }
    }

    /// Check if no field is given
    pub fn is_empty(&self) -> bool {
        *self == CallerOptions::default()
    }
}

fn given(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.trim().is_empty()).cloned()
}

/// Which tier a resolved value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Built-in default
    Default,
    /// The document's settings block
    Document,
    /// Caller options
    Caller,
}

/// Fully merged settings for one document
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    values: [(SettingValue, Source); 5],
    version: String,
}

impl ResolvedConfig {
    /// Merge defaults, `doc` and `caller`, stamping the tool version
    pub fn resolve(doc: &Document, caller: &CallerOptions) -> Self {
        Self::resolve_with_version(doc, caller, crate::VERSION)
    }

    /// Like [`ResolvedConfig::resolve`] with an explicit version string
    pub fn resolve_with_version(
        doc: &Document,
        caller: &CallerOptions,
        version: impl Into<String>,
    ) -> Self {
        let values = Setting::ALL.map(|setting| {
            let resolved = resolve_one(setting, doc, caller);
            debug!(
                setting = setting.name(),
                source = ?resolved.1,
                value = ?resolved.0,
                "resolved setting"
            );
            resolved
        });

        Self {
            values,
            version: version.into(),
        }
    }

    /// Resolved value of a setting
    pub fn get(&self, setting: Setting) -> &SettingValue {
        &self.values[setting.index()].0
    }

    /// Tier that supplied a setting
    pub fn source(&self, setting: Setting) -> Source {
        self.values[setting.index()].1
    }

    /// Tool version stamped into the sheet footer
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Settings and their values in table order
    pub fn iter(&self) -> impl Iterator<Item = (Setting, &SettingValue)> {
        Setting::ALL
            .into_iter()
            .zip(self.values.iter().map(|(value, _)| value))
    }
}

fn resolve_one(setting: Setting, doc: &Document, caller: &CallerOptions) -> (SettingValue, Source) {
    if let Some(value) = caller.get(setting) {
        return (value, Source::Caller);
    }

    let from_document = doc
        .setting(setting.document_field())
        .and_then(SettingValue::from_yaml)
        .map(|v| if setting.is_color() { v.into_color() } else { v });

    match from_document {
        Some(value) => (value, Source::Document),
        None => (setting.default_value(), Source::Default),
    }
}
