//! Typst entrypoint generation
//!
//! The entrypoint is a small Typst file that imports the shared template,
//! loads the platform-specific sheet data with `yaml(...)` and passes every
//! resolved setting to the template as a typed literal.

use std::fs;
use std::path::Path;

use keyatlas_ast::Document;
use keyatlas_core::{ResolvedConfig, Setting, SettingValue};

use crate::error::Result;

/// File name of the generated entrypoint
pub const ENTRYPOINT_PATH: &str = "main.typ";

/// Logical path the entrypoint loads the sheet data from
pub const DATA_PATH: &str = "keyatlas-data.yaml";

/// Path the entrypoint imports the template from
pub const TEMPLATE_PATH: &str = "template/cheatsheet.typ";

/// The shared cheat sheet template
pub const TEMPLATE: &str = include_str!("../template/cheatsheet.typ");

/// Everything the engine needs to compile one sheet
#[derive(Debug, Clone, PartialEq)]
pub struct SourceBundle {
    /// Generated Typst entrypoint
    pub entrypoint: String,
    /// Platform-rewritten document as YAML, served at [`DATA_PATH`]
    pub data: String,
    /// Template source, served at [`TEMPLATE_PATH`]
    pub template: &'static str,
}

impl SourceBundle {
    /// Lay the bundle out under `dir` the way the entrypoint expects
    pub fn write_to(&self, dir: &Path) -> Result<()> {
        fs::write(dir.join(ENTRYPOINT_PATH), &self.entrypoint)?;
        fs::write(dir.join(DATA_PATH), &self.data)?;
        let template = dir.join(TEMPLATE_PATH);
        if let Some(parent) = template.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(template, self.template)?;
        Ok(())
    }
}

/// Builder for engine payloads
pub struct Payload;

impl Payload {
    /// Generate the entrypoint for `config`, loading data from `data_path`
    pub fn entrypoint(data_path: &str, config: &ResolvedConfig) -> String {
        let accent = literal(config.get(Setting::AccentColor));
        let mut output = String::new();

        output.push_str(&format!(
            "#import {}: cheatsheet, keybinding-sections\n\n",
            string_literal(TEMPLATE_PATH)
        ));
        output.push_str(&format!("#let data = yaml({})\n\n", string_literal(data_path)));

        output.push_str("#show: cheatsheet.with(\n");
        output.push_str("  title: data.at(\"app\", default: \"Cheat Sheet\"),\n");
        output.push_str("  subtitle: data.at(\"subtitle\", default: none),\n");
        for (setting, value) in config.iter() {
            let value = match setting {
                Setting::AccentColor => accent.clone(),
                _ => literal(value),
            };
            output.push_str(&format!("  {}: {},\n", setting.name(), value));
        }
        output.push_str(&format!("  version: {},\n", string_literal(config.version())));
        output.push_str(")\n\n");

        output.push_str(&format!(
            "#keybinding-sections(data, accent-color: {})\n",
            accent
        ));

        output
    }

    /// Build the full bundle for an already platform-rewritten document
    pub fn bundle(doc: &Document, config: &ResolvedConfig) -> Result<SourceBundle> {
        Ok(SourceBundle {
            entrypoint: Self::entrypoint(DATA_PATH, config),
            data: keyatlas_core::to_yaml(doc)?,
            template: TEMPLATE,
        })
    }
}

/// Format a setting value as a Typst literal
pub fn literal(value: &SettingValue) -> String {
    match value {
        SettingValue::None => "none".to_string(),
        SettingValue::Bool(b) => b.to_string(),
        SettingValue::Int(i) => i.to_string(),
        SettingValue::Float(f) => float_literal(*f),
        SettingValue::Color(hex) => format!("rgb({})", string_literal(hex)),
        SettingValue::Str(s) => string_literal(s),
    }
}

/// Quote and escape a string for Typst
pub fn string_literal(s: &str) -> String {
    format!("\"{}\"", escape_string(s))
}

/// Escape backslashes and double quotes; nothing else
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "float.nan".to_string()
    } else if f == f64::INFINITY {
        "float.inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-float.inf".to_string()
    } else {
        // Debug keeps a fractional part (`1.0`) and switches to exponent
        // notation (`1e20`) for extreme magnitudes; Typst reads both as floats.
        format!("{:?}", f)
    }
}
