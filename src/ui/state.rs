//! Surface state and key handling

use crate::runtime::{ChatUpdate, ChatView};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};

/// How long a notice stays on screen
pub const TOAST_DURATION: Duration = Duration::from_secs(4);

/// Lines moved per page up or page down
const SCROLL_STEP: usize = 5;

pub const PLACEHOLDER_READY: &str = "Ask me anything...";
pub const PLACEHOLDER_LIMITED: &str = "Rate limit reached";

/// A transient notice
#[derive(Debug, Clone)]
pub struct Toast {
    pub text: String,
    pub shown_at: Instant,
}

/// What a key press asks the app to do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    None,
    Submit(String),
    Quit,
}

/// Everything the renderer needs
#[derive(Debug, Clone, Default)]
pub struct SurfaceState {
    /// Latest runtime snapshot
    pub view: ChatView,
    /// Text being typed
    pub input: String,
    /// Lines scrolled up from the bottom; 0 follows the newest message
    pub scroll_back: usize,
    pub toast: Option<Toast>,
}

impl SurfaceState {
    pub fn apply(&mut self, update: ChatUpdate) {
        match update {
            ChatUpdate::State(view) => {
                if view.messages.len() != self.view.messages.len()
                    || view.is_loading != self.view.is_loading
                {
                    self.scroll_back = 0;
                }
                self.view = view;
            }
            ChatUpdate::Notice(notice) => {
                self.toast = Some(Toast {
                    text: notice.to_string(),
                    shown_at: Instant::now(),
                });
            }
        }
    }

    /// Toast text if it has not expired at `now`
    pub fn active_toast(&self, now: Instant) -> Option<&str> {
        self.toast
            .as_ref()
            .filter(|t| now.saturating_duration_since(t.shown_at) < TOAST_DURATION)
            .map(|t| t.text.as_str())
    }

    pub fn placeholder(&self) -> &'static str {
        if self.view.can_send {
            PLACEHOLDER_READY
        } else {
            PLACEHOLDER_LIMITED
        }
    }

    /// The submitted text was queued; start a fresh line
    pub fn submit_accepted(&mut self) {
        self.input.clear();
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> KeyAction {
        if key.kind != KeyEventKind::Press {
            return KeyAction::None;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
            KeyCode::Esc => KeyAction::Quit,
            KeyCode::PageUp => {
                self.scroll_back = self.scroll_back.saturating_add(SCROLL_STEP);
                KeyAction::None
            }
            KeyCode::PageDown => {
                self.scroll_back = self.scroll_back.saturating_sub(SCROLL_STEP);
                KeyAction::None
            }
            // Input is disabled while sending is not allowed
            _ if !self.view.can_send => KeyAction::None,
            // The input is kept until the runtime accepts the message
            KeyCode::Enter => {
                let text = self.input.trim().to_string();
                if text.is_empty() {
                    return KeyAction::None;
                }
                KeyAction::Submit(text)
            }
            KeyCode::Backspace => {
                self.input.pop();
                KeyAction::None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                KeyAction::None
            }
            _ => KeyAction::None,
        }
    }
}
