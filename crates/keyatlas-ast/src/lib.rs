//! keyatlas-ast - Cheat sheet data model
//!
//! This crate provides the types keyatlas uses to represent a parsed
//! keybinding document: [`Document`], [`Section`], [`Entry`] and the
//! recursive [`KeyCombo`].

mod document;
mod keys;

pub use document::{Document, Entry, Section};
pub use keys::KeyCombo;

