//! Event loop tying the terminal to a running chat runtime

use super::render::render;
use super::state::{KeyAction, SurfaceState};
use crate::runtime::ChatHandle;
use crossterm::event::{self, Event, KeyEvent};
use ratatui::DefaultTerminal;
use std::io;
use std::time::{Duration, Instant};

/// Input poll interval; also bounds how stale a frame can be
const TICK: Duration = Duration::from_millis(50);

pub struct App {
    surface: SurfaceState,
    handle: ChatHandle,
}

impl App {
    pub fn new(handle: ChatHandle) -> Self {
        Self {
            surface: SurfaceState::default(),
            handle,
        }
    }

    /// Run until the user quits. Blocking; call from a blocking thread.
    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> io::Result<()> {
        loop {
            while let Some(update) = self.handle.try_update() {
                self.surface.apply(update);
            }

            terminal.draw(|frame| render(frame, &self.surface, Instant::now()))?;

            if !event::poll(TICK)? {
                continue;
            }
            if let Event::Key(key) = event::read()? {
                if self.on_key(key) {
                    return Ok(());
                }
            }
        }
    }

    /// Apply one key press. Returns true when the user asked to quit.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        match self.surface.handle_key(key) {
            KeyAction::Quit => return true,
            KeyAction::Submit(text) => {
                if self.handle.send(text) {
                    self.surface.submit_accepted();
                } else {
                    tracing::warn!("Chat runtime not accepting messages; keeping input");
                }
            }
            KeyAction::None => {}
        }
        false
    }

    pub fn into_handle(self) -> ChatHandle {
        self.handle
    }
}
