//! Terminal surfaces: the question prompt, the banner and the live answer.

pub mod banner;
pub mod prompt;
pub mod terminal;
pub mod viewport;

pub use prompt::{prompt_line, PromptResult};
pub use terminal::RawModeGuard;
pub use viewport::InlineViewport;
