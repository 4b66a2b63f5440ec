//! Terminal output for the update flow.
//!
//! - [`theme`] - icons and size formatting
//! - [`output`] - the [`Output`] reporter commands print through
//! - [`prompt`] - the interactive y/N update prompt

pub mod output;
pub mod prompt;
pub mod theme;

pub use output::Output;
pub use prompt::StdinPrompt;
pub use theme::Icons;
