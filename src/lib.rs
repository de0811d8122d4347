//! Yunji: a small plain-text editor built on egui, plus the registry-file
//! generator used for "Open with Yunji".

pub mod app;
pub mod commands;
pub mod config;
pub mod dialogs;
pub mod editor;
pub mod error;
pub mod format;
pub mod gutter;
pub mod registry;
pub mod search;
pub mod surface;
pub mod ui;
pub mod view;
pub mod window;

pub use app::{AppContext, YunjiApp};
pub use error::EditorError;
