use crate::app::messages::HostCommand;
use log::error;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;

/// Spawn a blocking thread that collects terminal input and forwards commands onto a channel.
pub fn spawn_input_thread(
    tx: UnboundedSender<HostCommand>,
    shutdown: Arc<AtomicBool>,
    poll_interval: Duration,
) -> std::thread::JoinHandle<()> {
    std::thread::spawn(move || {
        while !shutdown.load(Ordering::SeqCst) {
            match event::poll(poll_interval) {
                Ok(false) => continue,
                Ok(true) => {}
                Err(err) => {
                    error!("Input thread error: {}", err);
                    break;
                }
            }
            let command = match event::read() {
                Ok(Event::Key(key)) => key_to_command(key),
                Ok(_) => None,
                Err(err) => {
                    error!("Input thread error: {}", err);
                    break;
                }
            };
            if let Some(command) = command {
                if tx.send(command).is_err() {
                    break;
                }
            }
        }
    })
}

/// Map a key press to a host command
pub fn key_to_command(key: KeyEvent) -> Option<HostCommand> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE)
        | (KeyCode::Esc, _)
        | (KeyCode::Char('c'), KeyModifiers::CONTROL) => Some(HostCommand::Quit),
        (KeyCode::Char('r'), KeyModifiers::NONE) => Some(HostCommand::Refresh),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quit_and_refresh_keys() {
        let press = |code, modifiers| KeyEvent::new(code, modifiers);
        assert_eq!(
            key_to_command(press(KeyCode::Char('q'), KeyModifiers::NONE)),
            Some(HostCommand::Quit)
        );
        assert_eq!(
            key_to_command(press(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(HostCommand::Quit)
        );
        assert_eq!(
            key_to_command(press(KeyCode::Char('r'), KeyModifiers::NONE)),
            Some(HostCommand::Refresh)
        );
        assert_eq!(
            key_to_command(press(KeyCode::Char('x'), KeyModifiers::NONE)),
            None
        );
    }

    #[test]
    fn key_release_is_ignored() {
        let mut key = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE);
        key.kind = KeyEventKind::Release;
        assert_eq!(key_to_command(key), None);
    }
}
