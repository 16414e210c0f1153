//! Startup banner and the echoed question.

use crate::theme::Theme;
use crossterm::{queue, style::Print, style::PrintStyledContent};
use std::io::{self, Write};

// Slant figlet font.
const BANNER: &str = r"
    ____                      __       ______
   / __ \ ___   _____ ____   / /_  __ / ____/____
  / /_/ // _ \ / ___// __ \ / /| |/_// / __ / __ \
 / ____//  __// /   / /_/ // /_>  < / /_/ // /_/ /
/_/     \___//_/   / .___//_//_/|_| \____/ \____/
                  /_/
";

const QUOTE: &str = "Curiosity changes everything.";

pub fn print_banner<W: Write>(out: &mut W, theme: &Theme) -> io::Result<()> {
    queue!(out, PrintStyledContent(theme.accent_style().apply(BANNER)))?;
    queue!(out, Print("\n"))?;

    let width = BANNER.lines().map(|l| l.chars().count()).max().unwrap_or(0);
    let quote = center(QUOTE, width);
    queue!(out, PrintStyledContent(theme.quote_style().apply(quote)))?;
    queue!(out, Print("\n\n"))?;
    out.flush()
}

/// Show the submitted question as a badge above the answer.
pub fn echo_question<W: Write>(out: &mut W, theme: &Theme, question: &str) -> io::Result<()> {
    queue!(out, Print("⚡"))?;
    queue!(
        out,
        PrintStyledContent(theme.badge_style().apply(format!(" {} ", question)))
    )?;
    queue!(out, Print("\n"))?;
    out.flush()
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    let pad = width.saturating_sub(len) / 2;
    format!("{}{}", " ".repeat(pad), text)
}
