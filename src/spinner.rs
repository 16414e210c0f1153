//! Waiting indicator shown under a streaming answer.

use serde::{Deserialize, Serialize};

const DOTS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

const BEAR: &[&str] = &[
    " ʕ ´•ᴥ•ʔ ",
    " ʕ´•ᴥ•`ʔ ",
    " ʕ•ᴥ•` ʔ ",
    " ʕ´•ᴥ•`ʔ ",
    " ʕ´•ᴥ•`ʔก",
    "กʕ´•ᴥ•`ʔ ",
    " ʕ´•ᴥ•`ʔก",
    "กʕ´•ᴥ•`ʔ ",
    "୧ʕ´•ᴥ•`ʔ୨",
];

/// Glyph set used by the waiting indicator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpinnerStyle {
    #[default]
    Dots,
    Bear,
}

impl SpinnerStyle {
    fn frames(self) -> &'static [&'static str] {
        match self {
            SpinnerStyle::Dots => DOTS,
            SpinnerStyle::Bear => BEAR,
        }
    }
}

/// Cyclic frame counter over a fixed glyph set.
#[derive(Debug, Clone)]
pub struct Spinner {
    frames: &'static [&'static str],
    frame: usize,
}

impl Spinner {
    pub fn new(style: SpinnerStyle) -> Self {
        Self {
            frames: style.frames(),
            frame: 0,
        }
    }

    /// Advance to the next frame, wrapping around.
    pub fn tick(&mut self) {
        self.frame = (self.frame + 1) % self.frame_count();
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// The glyph for the current frame.
    pub fn glyph(&self) -> &'static str {
        self.frames[self.frame()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dots_has_ten_frames() {
        assert_eq!(Spinner::new(SpinnerStyle::Dots).frame_count(), 10);
    }

    #[test]
    fn test_tick_wraps_around() {
        let mut spinner = Spinner::new(SpinnerStyle::Bear);
        let count = spinner.frame_count();
        let first = spinner.glyph();
        for _ in 0..count {
            spinner.tick();
        }
        assert_eq!(spinner.frame(), 0);
        assert_eq!(spinner.glyph(), first);
    }

    #[test]
    fn test_tick_advances_glyph() {
        let mut spinner = Spinner::new(SpinnerStyle::Dots);
        spinner.tick();
        assert_eq!(spinner.frame(), 1);
        assert_eq!(spinner.glyph(), "⠙");
    }
}
