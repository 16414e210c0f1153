//! One question, one streamed answer.
//!
//! A [`StreamingSession`] turns the events of a single exchange (text deltas,
//! the end of the stream, errors, indicator ticks, a user cancel) into the
//! text that should currently be on screen. It owns no I/O: the driver in
//! [`crate::runner`] feeds it events one at a time and redraws whatever
//! [`StreamingSession::current_view`] returns.

use crate::render::MarkdownRenderer;
use crate::spinner::Spinner;
use tracing::{debug, error, info};

const FOOTER_LABEL: &str = "Generating...";

/// Where a session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing received yet.
    Waiting,
    /// At least one delta applied, more expected.
    Streaming,
    /// The stream ended or failed. Terminal.
    Done,
    /// The user gave up on the answer. Terminal.
    Cancelled,
}

impl SessionState {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionState::Done | SessionState::Cancelled)
    }
}

/// Why a session reached `Done`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinishCause {
    EndOfStream,
    StreamError(String),
}

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    TextDelta(String),
    EndOfStream,
    StreamError(String),
    UserCancel,
    IndicatorTick,
}

pub struct StreamingSession<R> {
    prompt: String,
    accumulated: String,
    display: String,
    state: SessionState,
    is_complete: bool,
    cause: Option<FinishCause>,
    spinner: Spinner,
    renderer: R,
}

impl<R: MarkdownRenderer> StreamingSession<R> {
    pub fn new(prompt: impl Into<String>, renderer: R, spinner: Spinner) -> Self {
        Self {
            prompt: prompt.into(),
            accumulated: String::new(),
            display: String::new(),
            state: SessionState::Waiting,
            is_complete: false,
            cause: None,
            spinner,
            renderer,
        }
    }

    /// Apply one event. Returns `true` when the view changed.
    pub fn apply(&mut self, event: SessionEvent) -> bool {
        if self.state.is_terminal() {
            debug!(?event, state = ?self.state, "ignoring event on finished session");
            return false;
        }
        match event {
            SessionEvent::TextDelta(chunk) => return self.apply_delta(&chunk),
            SessionEvent::EndOfStream => self.finish(FinishCause::EndOfStream),
            SessionEvent::StreamError(message) => self.finish(FinishCause::StreamError(message)),
            SessionEvent::UserCancel => self.cancel(),
            SessionEvent::IndicatorTick => self.tick(),
        }
        true
    }

    /// Append a chunk of answer text and re-render the whole answer.
    ///
    /// A failed render shows the raw text instead; it never ends the session.
    /// Returns `false` when the chunk was ignored.
    pub fn apply_delta(&mut self, chunk: &str) -> bool {
        if self.state.is_terminal() || chunk.is_empty() {
            return false;
        }
        self.accumulated.push_str(chunk);
        self.state = SessionState::Streaming;
        self.display = match self.renderer.render(&self.accumulated) {
            Ok(rendered) => rendered,
            Err(e) => {
                debug!("render failed, showing raw text: {}", e);
                self.accumulated.clone()
            }
        };
        true
    }

    pub fn finish(&mut self, cause: FinishCause) {
        if self.state.is_terminal() {
            return;
        }
        match &cause {
            FinishCause::EndOfStream => {
                info!(chars = self.accumulated.len(), "answer complete");
            }
            FinishCause::StreamError(message) => {
                error!(chars = self.accumulated.len(), "stream failed: {}", message);
            }
        }
        self.is_complete = true;
        self.cause = Some(cause);
        self.state = SessionState::Done;
    }

    /// Stop the session where it is. A finished answer stays finished.
    pub fn cancel(&mut self) {
        if self.state.is_terminal() {
            return;
        }
        info!(chars = self.accumulated.len(), "cancelled by user");
        self.state = SessionState::Cancelled;
    }

    pub fn tick(&mut self) {
        if !self.state.is_terminal() {
            self.spinner.tick();
        }
    }

    /// What should be on screen right now.
    ///
    /// Live sessions get a footer line with the spinner; terminal sessions
    /// show the answer alone.
    pub fn current_view(&self) -> String {
        if self.state.is_terminal() {
            return self.display.clone();
        }
        let mut view = self.display_text().to_string();
        if !view.is_empty() {
            view.push('\n');
        }
        view.push_str(self.spinner.glyph());
        view.push(' ');
        view.push_str(FOOTER_LABEL);
        view
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn accumulated_text(&self) -> &str {
        &self.accumulated
    }

    pub fn display_text(&self) -> &str {
        &self.display
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.is_complete
    }

    pub fn is_terminal(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn cause(&self) -> Option<&FinishCause> {
        self.cause.as_ref()
    }

    pub fn spinner(&self) -> &Spinner {
        &self.spinner
    }
}
