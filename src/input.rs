//! Poll-based mouse state.

use cgmath::{Vector2, Zero};

/// Raw cursor state as reported by the window at poll time.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorState {
    pub position: Vector2<f64>,
    pub in_window: bool,
    pub left_pressed: bool,
    pub right_pressed: bool,
}

impl Default for CursorState {
    fn default() -> Self {
        Self {
            position: Vector2::zero(),
            in_window: false,
            left_pressed: false,
            right_pressed: false,
        }
    }
}

/// Mouse snapshot handed to game logic once per frame.
///
/// The displacement is swizzled for camera use: `x` holds the vertical cursor
/// movement (pitch) and `y` the horizontal movement (yaw).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MouseInput {
    previous: Vector2<f64>,
    current: Vector2<f64>,
    displacement: Vector2<f32>,
    in_window: bool,
    left_pressed: bool,
    right_pressed: bool,
}

impl Default for MouseInput {
    fn default() -> Self {
        Self::new()
    }
}

impl MouseInput {
    pub fn new() -> Self {
        Self {
            previous: Vector2::new(-1.0, -1.0),
            current: Vector2::zero(),
            displacement: Vector2::zero(),
            in_window: false,
            left_pressed: false,
            right_pressed: false,
        }
    }

    /// Take a new snapshot from the window's cursor.
    ///
    /// No displacement is produced until a previous position inside the
    /// window is known.
    pub fn input(&mut self, cursor: &CursorState) {
        self.current = cursor.position;
        self.in_window = cursor.in_window;
        self.left_pressed = cursor.left_pressed;
        self.right_pressed = cursor.right_pressed;

        self.displacement = Vector2::zero();
        if self.previous.x > 0.0 && self.previous.y > 0.0 && self.in_window {
            let delta = self.current - self.previous;
            self.displacement = Vector2::new(delta.y as f32, delta.x as f32);
        }
        self.previous = self.current;
    }

    pub fn displacement(&self) -> Vector2<f32> {
        self.displacement
    }

    pub fn is_in_window(&self) -> bool {
        self.in_window
    }

    pub fn is_left_button_pressed(&self) -> bool {
        self.left_pressed
    }

    pub fn is_right_button_pressed(&self) -> bool {
        self.right_pressed
    }
}
