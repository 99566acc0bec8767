//! Input Translation
//!
//! Turns captured key and touch events into logical button state on the
//! core [`InputSystem`]. Several keys or touch areas may drive the same
//! button; the button stays down until the last of them lets go.

use std::collections::HashMap;

use glam::Vec2;
use ledge_core::input::{Button, InputSystem};

/// Raw input captured by the host
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// Keyboard key pressed
    KeyDown(KeyCode),
    /// Keyboard key released
    KeyUp(KeyCode),
    /// Touch started, in screen coordinates
    TouchStart { id: u64, x: f32, y: f32 },
    /// Touch moved
    TouchMove { id: u64, x: f32, y: f32 },
    /// Touch lifted or cancelled
    TouchEnd { id: u64 },
}

/// Keyboard key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum KeyCode {
    A, D, S, W,
    J, K, X, Z,

    Space, Enter, Escape,

    // Arrow keys
    Left, Right, Up, Down,

    Unknown,
}

/// Key code to logical button bindings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyMap {
    bindings: HashMap<KeyCode, Button>,
}

impl KeyMap {
    /// Create a map with no bindings
    pub fn empty() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `key` to `button`, replacing any earlier binding of `key`
    pub fn bind(&mut self, key: KeyCode, button: Button) -> &mut Self {
        self.bindings.insert(key, button);
        self
    }

    /// Remove the binding of `key`
    pub fn unbind(&mut self, key: KeyCode) -> Option<Button> {
        self.bindings.remove(&key)
    }

    /// Button driven by `key`
    pub fn button(&self, key: KeyCode) -> Option<Button> {
        self.bindings.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for KeyMap {
    /// Arrows and WASD move, space and Z jump, X and J attack
    fn default() -> Self {
        let mut map = Self::empty();
        map.bind(KeyCode::Left, Button::Left)
            .bind(KeyCode::A, Button::Left)
            .bind(KeyCode::Right, Button::Right)
            .bind(KeyCode::D, Button::Right)
            .bind(KeyCode::Up, Button::Up)
            .bind(KeyCode::W, Button::Up)
            .bind(KeyCode::Down, Button::Down)
            .bind(KeyCode::S, Button::Down)
            .bind(KeyCode::Space, Button::Jump)
            .bind(KeyCode::Z, Button::Jump)
            .bind(KeyCode::X, Button::Attack)
            .bind(KeyCode::J, Button::Attack);
        map
    }
}

/// Screen rectangle acting as an on-screen button
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchArea {
    pub min: Vec2,
    pub max: Vec2,
    pub button: Button,
}

impl TouchArea {
    pub fn new(min: Vec2, max: Vec2, button: Button) -> Self {
        Self { min, max, button }
    }

    /// Whether `point` lies inside the area, edges included
    pub fn contains(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }
}

/// Applies raw events to an [`InputSystem`]
#[derive(Debug, Clone, Default)]
pub struct InputTranslator {
    keys: KeyMap,
    areas: Vec<TouchArea>,
    /// Keys currently down that map to a button
    held_keys: HashMap<KeyCode, Button>,
    /// Button each live touch is pressing, if any
    touches: HashMap<u64, Option<Button>>,
    /// Sources (keys and touches) holding each button down
    holders: HashMap<Button, u32>,
}

impl InputTranslator {
    /// Create a translator with the given bindings and no touch areas
    pub fn new(keys: KeyMap) -> Self {
        Self {
            keys,
            ..Self::default()
        }
    }

    /// Add an on-screen button; earlier areas win where areas overlap
    pub fn add_touch_area(&mut self, area: TouchArea) {
        self.areas.push(area);
    }

    pub fn key_map(&self) -> &KeyMap {
        &self.keys
    }

    pub fn key_map_mut(&mut self) -> &mut KeyMap {
        &mut self.keys
    }

    fn area_at(&self, x: f32, y: f32) -> Option<Button> {
        let point = Vec2::new(x, y);
        self.areas
            .iter()
            .find(|area| area.contains(point))
            .map(|area| area.button)
    }

    fn hold(&mut self, button: Button, time: f32, input: &mut InputSystem) {
        *self.holders.entry(button).or_insert(0) += 1;
        input.press(button, time, 1.0);
    }

    fn let_go(&mut self, button: Button, input: &mut InputSystem) {
        let remaining = match self.holders.get_mut(&button) {
            Some(count) => {
                *count = count.saturating_sub(1);
                *count
            }
            None => 0,
        };
        if remaining == 0 {
            self.holders.remove(&button);
            input.release(button);
        }
    }

    /// Apply one event captured at game time `time`
    pub fn apply(&mut self, event: InputEvent, time: f32, input: &mut InputSystem) {
        match event {
            InputEvent::KeyDown(key) => {
                // Auto-repeat arrives as extra key downs
                if self.held_keys.contains_key(&key) {
                    return;
                }
                if let Some(button) = self.keys.button(key) {
                    self.held_keys.insert(key, button);
                    self.hold(button, time, input);
                }
            }
            InputEvent::KeyUp(key) => {
                if let Some(button) = self.held_keys.remove(&key) {
                    self.let_go(button, input);
                }
            }
            InputEvent::TouchStart { id, x, y } => {
                if let Some(Some(previous)) = self.touches.remove(&id) {
                    self.let_go(previous, input);
                }
                let button = self.area_at(x, y);
                if let Some(button) = button {
                    self.hold(button, time, input);
                }
                self.touches.insert(id, button);
            }
            InputEvent::TouchMove { id, x, y } => {
                let Some(&previous) = self.touches.get(&id) else {
                    log::trace!("Move for unknown touch {id}");
                    return;
                };
                let current = self.area_at(x, y);
                if current == previous {
                    return;
                }
                if let Some(previous) = previous {
                    self.let_go(previous, input);
                }
                if let Some(current) = current {
                    self.hold(current, time, input);
                }
                self.touches.insert(id, current);
            }
            InputEvent::TouchEnd { id } => {
                if let Some(Some(button)) = self.touches.remove(&id) {
                    self.let_go(button, input);
                }
            }
        }
    }

    /// Release everything this translator is holding
    ///
    /// Call when the host loses focus so no button stays stuck down.
    pub fn release_all(&mut self, input: &mut InputSystem) {
        for button in self.holders.drain().map(|(button, _)| button) {
            input.release(button);
        }
        self.held_keys.clear();
        self.touches.clear();
    }
}
