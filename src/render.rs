//! Markdown to terminal text.

use crate::theme::{Rgb, Theme, ThemeKind};
use std::fmt::Write as _;
use termimad::MadSkin;
use thiserror::Error;

/// Narrower than this and termimad cannot lay out tables or code blocks.
const MIN_WIDTH: usize = 20;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to format markdown")]
    Format(#[from] std::fmt::Error),
}

/// Converts a complete Markdown document into printable terminal text.
///
/// Renderers are not incremental: callers pass the whole document every time.
pub trait MarkdownRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError>;
}

/// Renders Markdown to ANSI-styled text with termimad.
pub struct TermimadRenderer {
    skin: MadSkin,
    width: usize,
}

impl TermimadRenderer {
    pub fn new(theme: &Theme, width: usize) -> Self {
        Self {
            skin: skin_for(theme),
            width: width.max(MIN_WIDTH),
        }
    }
}

impl MarkdownRenderer for TermimadRenderer {
    fn render(&self, markdown: &str) -> Result<String, RenderError> {
        if markdown.is_empty() {
            return Ok(String::new());
        }
        let mut out = String::new();
        write!(out, "{}", self.skin.text(markdown, Some(self.width)))?;
        // Trailing blank lines would push the footer away from the text.
        out.truncate(out.trim_end_matches('\n').len());
        Ok(out)
    }
}

fn skin_for(theme: &Theme) -> MadSkin {
    let mut skin = match theme.kind {
        ThemeKind::Dark => MadSkin::default_dark(),
        ThemeKind::Light => MadSkin::default_light(),
    };
    let color = |Rgb(r, g, b): Rgb| termimad::rgb(r, g, b);
    skin.headers[0].set_fg(color(theme.accent));
    skin.headers[1].set_fg(color(theme.heading));
    skin.headers[2].set_fg(color(theme.heading));
    skin.code_block.set_fg(color(theme.code));
    skin.inline_code.set_fg(color(theme.code));
    skin.bold.set_fg(color(theme.foreground));
    skin.italic.set_fg(color(theme.emphasis));
    skin
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> TermimadRenderer {
        TermimadRenderer::new(&Theme::dark(), 80)
    }

    #[test]
    fn test_empty_renders_empty() {
        assert_eq!(renderer().render("").unwrap(), "");
    }

    #[test]
    fn test_plain_text_survives() {
        let out = renderer().render("Hello, world!").unwrap();
        assert!(out.contains("Hello, world!"));
        assert!(!out.ends_with('\n'));
    }

    #[test]
    fn test_markup_is_consumed() {
        let out = renderer().render("some **bold** text").unwrap();
        assert!(out.contains("bold"));
        assert!(!out.contains("**"));
    }

    #[test]
    fn test_width_is_clamped() {
        let narrow = TermimadRenderer::new(&Theme::light(), 1);
        assert_eq!(narrow.width, MIN_WIDTH);
        assert!(narrow.render("# Title\n\nbody").is_ok());
    }
}
