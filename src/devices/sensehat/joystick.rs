//! Sense HAT joystick via evdev
//!
//! A reader thread blocks on the event device and forwards key events
//! through a channel; the loop consumes them with [`ChannelJoystick`].

use crate::core::types::{Action, Direction, InputEvent};
use crate::error::{Error, Result};
use crate::input::ChannelJoystick;
use crossbeam_channel::Sender;
use evdev::{Device, EventSummary, KeyCode};
use std::path::PathBuf;
use std::thread;

/// evdev name of the joystick
pub const JOYSTICK_NAME: &str = "Raspberry Pi Sense HAT Joystick";

/// Map one key event. `None` for keys the joystick does not have and for
/// values outside release/press/autorepeat.
pub fn key_event(key: KeyCode, value: i32) -> Option<InputEvent> {
    let direction = match key {
        KeyCode::KEY_UP => Direction::Up,
        KeyCode::KEY_DOWN => Direction::Down,
        KeyCode::KEY_LEFT => Direction::Left,
        KeyCode::KEY_RIGHT => Direction::Right,
        KeyCode::KEY_ENTER => Direction::Middle,
        _ => return None,
    };
    let action = match value {
        0 => Action::Released,
        1 => Action::Pressed,
        2 => Action::Held,
        _ => return None,
    };
    Some(InputEvent::new(direction, action))
}

/// First evdev device named `name`
fn find(name: &str) -> Result<(PathBuf, Device)> {
    evdev::enumerate()
        .find(|(_, device)| device.name() == Some(name))
        .ok_or_else(|| Error::DeviceMissing(name.to_string()))
}

/// Find the joystick and start the reader thread
pub fn open() -> Result<ChannelJoystick> {
    let (path, device) = find(JOYSTICK_NAME)?;
    log::info!("Sense HAT joystick {}", path.display());

    let (tx, joystick) = ChannelJoystick::channel();
    thread::Builder::new()
        .name("joystick".to_string())
        .spawn(move || reader_loop(device, path, tx))?;
    Ok(joystick)
}

/// Runs until the device goes away or the loop drops its receiver.
fn reader_loop(mut device: Device, path: PathBuf, tx: Sender<InputEvent>) {
    loop {
        let events: Vec<_> = match device.fetch_events() {
            Ok(events) => events.collect(),
            Err(e) => {
                log::error!("Joystick read from {} failed: {}", path.display(), e);
                break;
            }
        };

        for ev in events {
            let EventSummary::Key(_, key, value) = ev.destructure() else {
                continue;
            };
            let Some(event) = key_event(key, value) else {
                continue;
            };
            log::trace!("Joystick: {}", event);
            if tx.send(event).is_err() {
                log::info!("Joystick reader exiting");
                return;
            }
        }
    }
    log::info!("Joystick reader exiting");
}
