use std::time::Duration;
use tracing::trace;

use crate::catalog::Category;
use crate::domain::{Config, Message, SightingsError};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &Config) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, SightingsError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            let message = match event::read()? {
                Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                    self.map_key(key, model.raw_keyevents())
                }
                Event::Resize(width, height) => {
                    Some(Message::Resize(width as usize, height as usize))
                }
                _ => None,
            };
            return Ok(message);
        }
        Ok(None)
    }

    // Ctrl-C quits even while the filter form takes raw keys.
    fn map_key(&self, key: event::KeyEvent, raw: bool) -> Option<Message> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Message::Quit);
        }
        if raw {
            return Some(Message::RawKey(key));
        }
        self.handle_key(key)
    }

    fn handle_key(&self, key: event::KeyEvent) -> Option<Message> {
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Char(c @ '1'..='5'), _) => {
                let idx = c as usize - '1' as usize;
                Some(Message::SelectCategory(Category::ALL[idx]))
            }
            (KeyCode::Tab, _) => Some(Message::NextCategory),
            (KeyCode::BackTab, _) => Some(Message::PreviousCategory),
            (KeyCode::Char('/'), _) | (KeyCode::Char('f'), _) | (KeyCode::Char('i'), _) => {
                Some(Message::FocusFilter)
            }
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::PageUp, _) => Some(Message::MovePageUp),
            (KeyCode::PageDown, _) => Some(Message::MovePageDown),
            (KeyCode::Home, _) | (KeyCode::Char('g'), _) => Some(Message::MoveBeginning),
            (KeyCode::End, _) | (KeyCode::Char('G'), _) => Some(Message::MoveEnd),
            (KeyCode::Char('y'), _) => Some(Message::CopyRow),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            (KeyCode::Esc, _) => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
