// Copyright (c) 2026 rezky_nightky

use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::control::{CancelToken, ResizeListener};

const POLL: Duration = Duration::from_millis(50);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Ignore,
    Quit,
    Resize(u16, u16),
}

/// Decides what a terminal event means for the animation.
///
/// In screensaver mode any key press quits.
pub fn classify(ev: &Event, screensaver: bool) -> Action {
    match ev {
        Event::Resize(w, h) => Action::Resize(*w, *h),
        Event::Key(k) if k.kind == KeyEventKind::Press => {
            if screensaver || is_quit_key(k) {
                Action::Quit
            } else {
                Action::Ignore
            }
        }
        _ => Action::Ignore,
    }
}

fn is_quit_key(k: &KeyEvent) -> bool {
    match k.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => true,
        KeyCode::Char('c') => k.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Reads terminal events on a background thread until `token` is cancelled.
pub fn spawn(token: CancelToken, resize: ResizeListener, screensaver: bool) -> JoinHandle<()> {
    thread::spawn(move || {
        while !token.is_cancelled() {
            let ev = match event::poll(POLL) {
                Ok(true) => event::read(),
                Ok(false) => continue,
                Err(e) => Err(e),
            };
            let ev = match ev {
                Ok(ev) => ev,
                Err(e) => {
                    tracing::warn!(error = %e, "reading terminal events failed, stopping");
                    token.cancel();
                    break;
                }
            };
            match classify(&ev, screensaver) {
                Action::Quit => {
                    tracing::debug!("quit requested");
                    token.cancel();
                }
                Action::Resize(w, h) => {
                    tracing::debug!(width = w, height = h, "resize event");
                    resize.notify(w, h);
                    token.interrupt();
                }
                Action::Ignore => {}
            }
        }
    })
}
