//! Joystick polling
//!
//! [`InputDispatcher`] turns the blocking joystick queue into poll windows:
//! wait up to a timeout for the first event, then take everything already
//! queued behind it. [`ChannelJoystick`] is the queue itself, fed by the
//! evdev reader thread or by the mock backend.

use crate::core::driver::Joystick;
use crate::core::types::InputEvent;
use crate::error::{Error, Result};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Joystick backed by a channel of parsed events
pub struct ChannelJoystick {
    rx: Receiver<InputEvent>,
}

impl ChannelJoystick {
    pub fn new(rx: Receiver<InputEvent>) -> Self {
        Self { rx }
    }

    /// Unbounded channel pair; the sender goes to whatever produces events
    pub fn channel() -> (Sender<InputEvent>, Self) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (tx, Self::new(rx))
    }
}

impl Joystick for ChannelJoystick {
    fn next_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>> {
        match self.rx.recv_timeout(timeout) {
            Ok(event) => Ok(Some(event)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(Error::InputDisconnected),
        }
    }

    fn try_next_event(&mut self) -> Result<Option<InputEvent>> {
        match self.rx.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::InputDisconnected),
        }
    }
}

pub struct InputDispatcher {
    joystick: Box<dyn Joystick>,
}

impl InputDispatcher {
    pub fn new(joystick: Box<dyn Joystick>) -> Self {
        Self { joystick }
    }

    /// One poll window: block up to `timeout` for the first event, then
    /// drain what is queued. Empty on timeout. Arrival order is preserved.
    pub fn poll(&mut self, timeout: Duration) -> Result<Vec<InputEvent>> {
        let Some(first) = self.joystick.next_event(timeout)? else {
            return Ok(Vec::new());
        };

        let mut events = vec![first];
        loop {
            match self.joystick.try_next_event() {
                Ok(Some(event)) => events.push(event),
                Ok(None) => break,
                // Deliver what we have; the next poll reports the disconnect
                Err(Error::InputDisconnected) => break,
                Err(e) => return Err(e),
            }
        }
        log::trace!("Poll window: {} event(s)", events.len());
        Ok(events)
    }

    /// Block up to `timeout` for a single event.
    pub fn wait_for_event(&mut self, timeout: Duration) -> Result<Option<InputEvent>> {
        self.joystick.next_event(timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Direction;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn test_poll_timeout_is_empty() {
        let (_tx, joystick) = ChannelJoystick::channel();
        let mut input = InputDispatcher::new(Box::new(joystick));

        let start = Instant::now();
        let events = input.poll(Duration::from_millis(30)).unwrap();
        assert!(events.is_empty());
        assert!(start.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_poll_drains_in_order() {
        let (tx, joystick) = ChannelJoystick::channel();
        let mut input = InputDispatcher::new(Box::new(joystick));

        let script = [
            InputEvent::pressed(Direction::Left),
            InputEvent::released(Direction::Left),
            InputEvent::pressed(Direction::Right),
        ];
        for event in script {
            tx.send(event).unwrap();
        }

        assert_eq!(input.poll(Duration::from_millis(10)).unwrap(), script);
        assert!(input.poll(Duration::ZERO).unwrap().is_empty());
    }

    #[test]
    fn test_poll_wakes_on_late_event() {
        let (tx, joystick) = ChannelJoystick::channel();
        let mut input = InputDispatcher::new(Box::new(joystick));

        let sender = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.send(InputEvent::pressed(Direction::Middle)).unwrap();
            tx
        });

        let events = input.poll(Duration::from_secs(5)).unwrap();
        assert_eq!(events, vec![InputEvent::pressed(Direction::Middle)]);
        drop(sender.join().unwrap());
    }

    #[test]
    fn test_disconnect_is_error() {
        let (tx, joystick) = ChannelJoystick::channel();
        let mut input = InputDispatcher::new(Box::new(joystick));
        tx.send(InputEvent::pressed(Direction::Up)).unwrap();
        drop(tx);

        // Queued event still delivered first
        assert_eq!(
            input.wait_for_event(Duration::from_millis(10)).unwrap(),
            Some(InputEvent::pressed(Direction::Up))
        );
        assert!(matches!(
            input.poll(Duration::from_millis(10)),
            Err(Error::InputDisconnected)
        ));
    }
}
