//! keyatlas-core - Key labels and settings for cheat sheets
//!
//! This crate holds the platform-independent half of the keyatlas pipeline:
//!
//! - [`keymap`] rewrites a document's key labels for a target [`Platform`]
//! - [`config`] merges built-in defaults, document settings and caller
//!   options into a [`ResolvedConfig`]
//! - [`document`] loads and re-serializes the YAML documents
//!
//! # Example
//!
//! ```
//! use keyatlas_ast::{Document, Entry, KeyCombo, Section};
//! use keyatlas_core::{rewrite_for_platform, CallerOptions, Platform, ResolvedConfig, Setting};
//!
//! let mut doc = Document::new("Demo");
//! doc.push(Section::new("Edit").with_entry(Entry::new("Copy", KeyCombo::chord(["⌘", "C"]))));
//!
//! let windows = rewrite_for_platform(&doc, Platform::Windows);
//! assert_eq!(windows.sections[0].entries[0].keys, KeyCombo::chord(["Ctrl", "C"]));
//!
//! let config = ResolvedConfig::resolve(&doc, &CallerOptions::default());
//! assert_eq!(config.get(Setting::Columns), &keyatlas_core::SettingValue::Int(3));
//! ```

pub mod config;
pub mod document;
mod error;
pub mod keymap;

// Re-export main types and functions
pub use config::{
    CallerOptions, Orientation, ResolvedConfig, Setting, SettingSpec, SettingValue, Source,
    SETTINGS,
};
pub use document::{load_document, parse_document, to_yaml};
pub use error::{CoreError, Result};
pub use keymap::{rewrite_for_platform, KeyMap, Platform, Rewriter};

/// Tool version from the build metadata, or `"dev"` outside a cargo build
pub const VERSION: &str = match option_env!("CARGO_PKG_VERSION") {
    Some(version) => version,
    None => "dev",
};
