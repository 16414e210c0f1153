//! The event loop that drives one [`StreamingSession`].
//!
//! Three sources feed the session, polled in priority order: key presses
//! (so a cancel always wins), answer fragments, and the indicator timer.
//! Every event is applied on this one task, one at a time.
//!
//! The loop starts before the answer stream is open. While the request is
//! in flight the session sits in `Waiting` with the indicator spinning, and
//! a cancel drops the pending request.

use crate::llm::LlmError;
use crate::render::MarkdownRenderer;
use crate::session::{SessionEvent, StreamingSession};
use crate::ui::InlineViewport;
use anyhow::{Context, Result};
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::{Stream, StreamExt};
use std::future::Future;
use std::io::{self, Write};
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, warn};

/// Whether a key press asks to abandon the answer.
pub fn is_cancel_key(event: &Event) -> bool {
    let Event::Key(KeyEvent {
        code,
        modifiers,
        kind,
        ..
    }) = event
    else {
        return false;
    };
    if *kind != KeyEventKind::Press {
        return false;
    }
    match code {
        KeyCode::Esc => true,
        KeyCode::Char('q') => !modifiers.contains(KeyModifiers::CONTROL),
        KeyCode::Char('c') => modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Turn one item of the key stream into a session event, if it is one.
///
/// A failed or closed key stream sets `open` to false so it is not polled
/// again.
fn key_event(key: Option<io::Result<Event>>, open: &mut bool) -> Option<SessionEvent> {
    match key {
        Some(Ok(key)) if is_cancel_key(&key) => Some(SessionEvent::UserCancel),
        Some(Ok(_)) => None,
        Some(Err(e)) => {
            warn!("Terminal input failed, cancel keys disabled: {}", e);
            *open = false;
            None
        }
        None => {
            *open = false;
            None
        }
    }
}

/// Drive `session` until it reaches a terminal state.
///
/// `opening` resolves to the answer stream once the backend has accepted the
/// request. It is raced against the keys and the timer like any other
/// source, so the waiting frame is on screen and cancellable meanwhile. A
/// failure to open is returned as an error, after the live frame is erased.
///
/// The stream is dropped before returning, which closes the underlying
/// connection whether the answer finished, failed or was cancelled. Stream
/// errors after opening end up in the session.
pub async fn run<R, O, D, K, W>(
    session: &mut StreamingSession<R>,
    opening: O,
    keys: K,
    tick: Duration,
    viewport: &mut InlineViewport,
    out: &mut W,
) -> Result<()>
where
    R: MarkdownRenderer,
    O: Future<Output = Result<D, LlmError>>,
    D: Stream<Item = Result<String, LlmError>> + Unpin,
    K: Stream<Item = io::Result<Event>> + Unpin,
    W: Write,
{
    let mut keys = keys.fuse();
    let mut keys_open = true;
    let mut ticks = interval_at(Instant::now() + tick, tick);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

    viewport
        .draw(out, &session.current_view())
        .context("Failed to draw the answer")?;

    tokio::pin!(opening);
    let mut deltas = loop {
        let event = tokio::select! {
            biased;

            key = keys.next(), if keys_open => match key_event(key, &mut keys_open) {
                Some(event) => event,
                None => continue,
            },
            opened = &mut opening => match opened {
                Ok(deltas) => break deltas,
                Err(e) => {
                    viewport.clear(out).context("Failed to draw the answer")?;
                    return Err(e).context("Failed to start the answer stream");
                }
            },
            _ = ticks.tick() => SessionEvent::IndicatorTick,
        };

        if session.apply(event) && !session.is_terminal() {
            viewport
                .draw(out, &session.current_view())
                .context("Failed to draw the answer")?;
        }
        if session.is_terminal() {
            debug!(state = ?session.state(), "request abandoned before the stream opened");
            return viewport
                .finish(out, &session.current_view())
                .context("Failed to draw the answer");
        }
    };

    while !session.is_terminal() {
        let event = tokio::select! {
            biased;

            key = keys.next(), if keys_open => match key_event(key, &mut keys_open) {
                Some(event) => event,
                None => continue,
            },
            delta = deltas.next() => match delta {
                Some(Ok(text)) => SessionEvent::TextDelta(text),
                Some(Err(e)) => SessionEvent::StreamError(e.to_string()),
                None => SessionEvent::EndOfStream,
            },
            _ = ticks.tick() => SessionEvent::IndicatorTick,
        };

        if session.apply(event) && !session.is_terminal() {
            viewport
                .draw(out, &session.current_view())
                .context("Failed to draw the answer")?;
        }
    }

    drop(deltas);
    debug!(
        state = ?session.state(),
        complete = session.is_complete(),
        rows = viewport.drawn_rows(),
        "stream released"
    );

    viewport
        .finish(out, &session.current_view())
        .context("Failed to draw the answer")?;
    Ok(())
}
