//! Held-key repeat and per-frame input application.
//!
//! A press moves the piece once right away. Holding the key for `MOVE_DELAY`
//! starts repeating every `MOVE_INTERVAL` until the key is released.

use std::time::Duration;

use crate::game::{Game, GameState, MOVE_DELAY, MOVE_INTERVAL};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Key {
    Left,
    Right,
    Down,
    Rotate,
    HardDrop,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InputEvent {
    Pressed(Key),
    Released(Key),
}

/// Repeat timer for one held direction.
#[derive(Clone, Copy, Debug)]
pub struct KeyRepeat {
    held: bool,
    elapsed: Duration,
    delay: Duration,
    interval: Duration,
}

impl KeyRepeat {
    pub fn new() -> Self {
        Self::with_timing(MOVE_DELAY, MOVE_INTERVAL)
    }

    /// `interval` must not exceed `delay`.
    pub fn with_timing(delay: Duration, interval: Duration) -> Self {
        Self {
            held: false,
            elapsed: Duration::ZERO,
            delay,
            interval: interval.min(delay),
        }
    }

    pub fn press(&mut self) {
        self.held = true;
    }

    pub fn release(&mut self) {
        self.held = false;
        self.elapsed = Duration::ZERO;
    }

    pub fn advance(&mut self, dt: Duration) {
        if self.held {
            self.elapsed += dt;
        }
    }

    /// Whether a repeat is due. Firing re-arms the timer to `delay - interval`
    /// so the next repeat comes exactly one interval later.
    pub fn take_repeat(&mut self) -> bool {
        if self.held && self.elapsed >= self.delay {
            self.elapsed = self.delay - self.interval;
            true
        } else {
            false
        }
    }

    pub fn is_held(&self) -> bool {
        self.held
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Default for KeyRepeat {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies a frame's worth of input to a game, then advances its fall clock.
#[derive(Clone, Debug, Default)]
pub struct Controller {
    left: KeyRepeat,
    right: KeyRepeat,
    down: KeyRepeat,
}

impl Controller {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one frame: held timers advance, this frame's events apply, due
    /// repeats fire, and only then does the game tick. A move made this frame
    /// can therefore save a piece from locking on the same frame.
    pub fn frame<I>(&mut self, game: &mut Game, dt: Duration, events: I)
    where
        I: IntoIterator<Item = InputEvent>,
    {
        self.left.advance(dt);
        self.right.advance(dt);
        self.down.advance(dt);

        for event in events {
            self.handle(game, event);
        }

        if game.current_piece.is_some() {
            if self.left.take_repeat() {
                game.move_left();
            }
            if self.right.take_repeat() {
                game.move_right();
            }
            if self.down.take_repeat() {
                game.soft_drop_step();
            }
        }

        game.tick(dt);
    }

    pub fn handle(&mut self, game: &mut Game, event: InputEvent) {
        match event {
            InputEvent::Pressed(key) => {
                if game.state != GameState::Playing || game.current_piece.is_none() {
                    return;
                }
                match key {
                    Key::Left => {
                        self.left.press();
                        game.move_left();
                    }
                    Key::Right => {
                        self.right.press();
                        game.move_right();
                    }
                    Key::Down => {
                        self.down.press();
                        game.soft_drop_step();
                    }
                    Key::Rotate => {
                        game.rotate();
                    }
                    Key::HardDrop => game.hard_drop(),
                }
            }
            InputEvent::Released(key) => match key {
                Key::Left => self.left.release(),
                Key::Right => self.right.release(),
                Key::Down => self.down.release(),
                Key::Rotate | Key::HardDrop => {}
            },
        }
    }

    pub fn repeat(&self, key: Key) -> Option<&KeyRepeat> {
        match key {
            Key::Left => Some(&self.left),
            Key::Right => Some(&self.right),
            Key::Down => Some(&self.down),
            Key::Rotate | Key::HardDrop => None,
        }
    }

    pub fn reset(&mut self) {
        self.left.release();
        self.right.release();
        self.down.release();
    }
}
