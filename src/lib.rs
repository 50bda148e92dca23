//! rpy-translate - Machine translation for Ren'Py scripts
//!
//! Rewrites untranslated dialogue in `.rpy` files, keeping every original
//! line as a comment right above its translation.

pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod prompt;
pub mod script;
pub mod translate;
pub mod workflow;
