//! UI layer for desktop GUI: app shell, document panel, transcript and composer.

pub mod app;

pub use app::{DocChatApp, StartupConfig};
