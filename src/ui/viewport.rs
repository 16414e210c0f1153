//! Inline redraw of the live answer.
//!
//! The answer is drawn on the primary screen below the question, so it stays
//! in the scrollback once the program exits. Each frame replaces the previous
//! one in place: move back to the first line of the last frame, clear to the
//! end of the screen, print the new frame.

use crossterm::{
    cursor::{MoveToColumn, MoveUp},
    queue,
    style::{ContentStyle, Print, PrintStyledContent},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};

/// Rows a view occupies: one per line break, plus the last line.
pub fn view_height(view: &str) -> usize {
    view.split('\n').count()
}

#[derive(Debug)]
pub struct InlineViewport {
    /// Rows available for a live frame. Taller frames show their tail.
    max_rows: usize,
    /// Rows drawn by the previous frame, zero before the first.
    drawn: usize,
    /// Applied to the last line of a live frame, the indicator footer.
    footer_style: Option<ContentStyle>,
}

impl InlineViewport {
    pub fn new(max_rows: usize) -> Self {
        Self {
            max_rows: max_rows.max(1),
            drawn: 0,
            footer_style: None,
        }
    }

    pub fn with_footer_style(mut self, style: ContentStyle) -> Self {
        self.footer_style = Some(style);
        self
    }

    /// Replace the previous live frame with `view`.
    pub fn draw<W: Write>(&mut self, out: &mut W, view: &str) -> io::Result<()> {
        let hidden = view_height(view).saturating_sub(self.max_rows);
        let visible: Vec<&str> = view.split('\n').skip(hidden).collect();
        self.paint(out, &visible, self.footer_style)?;
        self.drawn = visible.len();
        Ok(())
    }

    /// Draw the final frame in full and leave the cursor on a fresh line.
    pub fn finish<W: Write>(&mut self, out: &mut W, view: &str) -> io::Result<()> {
        let lines: Vec<&str> = view.split('\n').collect();
        self.paint(out, &lines, None)?;
        queue!(out, Print("\r\n"))?;
        out.flush()?;
        self.drawn = 0;
        Ok(())
    }

    /// Erase the live frame, leaving the cursor where it started.
    pub fn clear<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        self.paint(out, &[], None)?;
        self.drawn = 0;
        Ok(())
    }

    pub fn drawn_rows(&self) -> usize {
        self.drawn
    }

    fn paint<W: Write>(
        &self,
        out: &mut W,
        lines: &[&str],
        footer_style: Option<ContentStyle>,
    ) -> io::Result<()> {
        queue!(out, MoveToColumn(0))?;
        if self.drawn > 1 {
            let up = u16::try_from(self.drawn - 1).unwrap_or(u16::MAX);
            queue!(out, MoveUp(up))?;
        }
        queue!(out, Clear(ClearType::FromCursorDown))?;
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                // Raw mode: a bare \n would not return to column zero.
                queue!(out, Print("\r\n"))?;
            }
            match footer_style {
                Some(style) if i + 1 == lines.len() => {
                    queue!(out, PrintStyledContent(style.apply(*line)))?
                }
                _ => queue!(out, Print(line))?,
            }
        }
        out.flush()
    }
}
