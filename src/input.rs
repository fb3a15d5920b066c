use glam::Vec2;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{Key, NamedKey};

use crate::interaction::CLICK_DRAG_TOLERANCE;

/// Pixel wheel deltas (touchpads) are folded into line steps at this rate.
const PIXELS_PER_WHEEL_STEP: f32 = 40.0;

/// Pointer and keyboard state accumulated between frames.
#[derive(Debug, Default)]
pub struct Input {
    cursor_pos: Option<Vec2>,
    left_held: bool,
    right_held: bool,
    press_origin: Option<Vec2>,
    rotate_drag: Vec2,
    pan_drag: Vec2,
    wheel: f32,
    click: Option<Vec2>,
    escape_pressed: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::CursorPos { x, y } => {
                let pos = Vec2::new(x, y);
                if let Some(prev) = self.cursor_pos {
                    let delta = pos - prev;
                    if self.left_held {
                        self.rotate_drag += delta;
                    }
                    if self.right_held {
                        self.pan_drag += delta;
                    }
                }
                self.cursor_pos = Some(pos);
            }
            InputEvent::MouseButton { button: MouseButton::Left, pressed } => {
                self.left_held = pressed;
                if pressed {
                    self.press_origin = self.cursor_pos;
                } else if let (Some(origin), Some(pos)) = (self.press_origin.take(), self.cursor_pos) {
                    if origin.distance(pos) <= CLICK_DRAG_TOLERANCE {
                        self.click = Some(pos);
                    }
                }
            }
            InputEvent::MouseButton { button: MouseButton::Right, pressed } => {
                self.right_held = pressed;
            }
            InputEvent::MouseButton { .. } => {}
            InputEvent::Wheel { delta } => {
                self.wheel += delta;
            }
            InputEvent::Key { key, pressed } => {
                if pressed && key == Key::Named(NamedKey::Escape) {
                    self.escape_pressed = true;
                }
            }
            InputEvent::CursorLeft => {
                self.cursor_pos = None;
                self.press_origin = None;
                self.left_held = false;
                self.right_held = false;
            }
            InputEvent::Other => {}
        }
    }

    /// Screen position of a completed left click, at most once per click.
    pub fn take_click(&mut self) -> Option<Vec2> {
        self.click.take()
    }

    pub fn take_rotate_drag(&mut self) -> Vec2 {
        std::mem::take(&mut self.rotate_drag)
    }

    pub fn take_pan_drag(&mut self) -> Vec2 {
        std::mem::take(&mut self.pan_drag)
    }

    pub fn consume_wheel_delta(&mut self) -> Option<f32> {
        if self.wheel.abs() > 0.0 {
            let d = self.wheel;
            self.wheel = 0.0;
            Some(d)
        } else {
            None
        }
    }

    pub fn take_escape(&mut self) -> bool {
        std::mem::take(&mut self.escape_pressed)
    }

    /// Forgets a press that the overlay claimed so its release is not treated as a click.
    pub fn cancel_press(&mut self) {
        self.press_origin = None;
    }

    pub fn clear_frame(&mut self) {
        self.rotate_drag = Vec2::ZERO;
        self.pan_drag = Vec2::ZERO;
        self.wheel = 0.0;
        self.click = None;
        self.escape_pressed = false;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key { key: Key, pressed: bool },
    Wheel { delta: f32 },
    MouseButton { button: MouseButton, pressed: bool },
    CursorPos { x: f32, y: f32 },
    CursorLeft,
    Other,
}

impl InputEvent {
    pub fn from_window_event(ev: &WindowEvent) -> Self {
        match ev {
            WindowEvent::MouseWheel { delta, .. } => {
                let d = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32 / PIXELS_PER_WHEEL_STEP,
                };
                InputEvent::Wheel { delta: d }
            }
            WindowEvent::CursorMoved { position, .. } => {
                InputEvent::CursorPos { x: position.x as f32, y: position.y as f32 }
            }
            WindowEvent::CursorLeft { .. } => InputEvent::CursorLeft,
            WindowEvent::MouseInput { state, button, .. } => {
                InputEvent::MouseButton { button: *button, pressed: *state == ElementState::Pressed }
            }
            WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
                key: event.logical_key.clone(),
                pressed: event.state == ElementState::Pressed,
            },
            _ => InputEvent::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(input: &mut Input, x: f32, y: f32) {
        input.push(InputEvent::CursorPos { x, y });
        input.push(InputEvent::MouseButton { button: MouseButton::Left, pressed: true });
    }

    fn release(input: &mut Input, x: f32, y: f32) {
        input.push(InputEvent::CursorPos { x, y });
        input.push(InputEvent::MouseButton { button: MouseButton::Left, pressed: false });
    }

    #[test]
    fn press_and_release_in_place_is_a_click() {
        let mut input = Input::new();
        press(&mut input, 100.0, 80.0);
        release(&mut input, 101.0, 80.0);
        assert_eq!(input.take_click(), Some(Vec2::new(101.0, 80.0)));
        assert_eq!(input.take_click(), None);
    }

    #[test]
    fn drag_rotates_instead_of_clicking() {
        let mut input = Input::new();
        press(&mut input, 100.0, 80.0);
        input.push(InputEvent::CursorPos { x: 160.0, y: 90.0 });
        release(&mut input, 200.0, 90.0);
        assert_eq!(input.take_click(), None);
        assert_eq!(input.take_rotate_drag(), Vec2::new(100.0, 10.0));
        assert_eq!(input.take_rotate_drag(), Vec2::ZERO);
    }

    #[test]
    fn right_drag_pans_and_wheel_accumulates() {
        let mut input = Input::new();
        input.push(InputEvent::CursorPos { x: 0.0, y: 0.0 });
        input.push(InputEvent::MouseButton { button: MouseButton::Right, pressed: true });
        input.push(InputEvent::CursorPos { x: 10.0, y: -5.0 });
        input.push(InputEvent::Wheel { delta: 1.0 });
        input.push(InputEvent::Wheel { delta: 2.0 });
        assert_eq!(input.take_pan_drag(), Vec2::new(10.0, -5.0));
        assert_eq!(input.take_rotate_drag(), Vec2::ZERO);
        assert_eq!(input.consume_wheel_delta(), Some(3.0));
        assert_eq!(input.consume_wheel_delta(), None);
    }

    #[test]
    fn cancelled_press_never_clicks() {
        let mut input = Input::new();
        press(&mut input, 10.0, 10.0);
        input.cancel_press();
        release(&mut input, 10.0, 10.0);
        assert_eq!(input.take_click(), None);
    }

    #[test]
    fn escape_is_reported_once() {
        let mut input = Input::new();
        input.push(InputEvent::Key { key: Key::Named(NamedKey::Escape), pressed: true });
        assert!(input.take_escape());
        assert!(!input.take_escape());
    }
}
