use serde::{Deserialize, Serialize};

/// Raw held-state input for a single frame.
///
/// Every button is reported as "held this frame"; edge detection happens in
/// the simulation via [`Edge`], so hosts never need to track previous frames.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputFrame {
    /// Horizontal axis in `[-1, 1]`.
    pub move_axis: f32,
    pub jump: bool,
    /// Dequeue the next ability and start its session.
    pub use_ability: bool,
    /// Trigger the active ability's effect (dash burst, flight thrust).
    pub effect: bool,
    pub pause: bool,
    pub map: bool,
    pub reset: bool,
    pub exit: bool,
}

impl InputFrame {
    /// Move axis clamped to `[-1, 1]` with NaN/Inf treated as zero.
    pub fn sanitized_axis(&self) -> f32 {
        if self.move_axis.is_finite() {
            self.move_axis.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Rising/falling edge detector for a boolean signal, updated once per frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    current: bool,
    previous: bool,
}

impl Edge {
    /// Record this frame's value; the old current becomes the previous value.
    pub fn update(&mut self, value: bool) {
        self.previous = self.current;
        self.current = value;
    }

    /// Signal went low → high this frame.
    pub fn pressed(&self) -> bool {
        self.current && !self.previous
    }

    /// Signal went high → low this frame.
    pub fn released(&self) -> bool {
        !self.current && self.previous
    }

    pub fn held(&self) -> bool {
        self.current
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edge_detects_press_once() {
        let mut edge = Edge::default();
        edge.update(true);
        assert!(edge.pressed());
        edge.update(true);
        assert!(!edge.pressed(), "Holding must not re-trigger");
        assert!(edge.held());
    }

    #[test]
    fn edge_detects_release() {
        let mut edge = Edge::default();
        edge.update(true);
        edge.update(false);
        assert!(edge.released());
        assert!(!edge.pressed());
        edge.update(false);
        assert!(!edge.released());
    }

    #[test]
    fn clear_forgets_history() {
        let mut edge = Edge::default();
        edge.update(true);
        edge.clear();
        edge.update(true);
        assert!(edge.pressed());
    }

    #[test]
    fn nan_axis_is_zero() {
        let frame = InputFrame {
            move_axis: f32::NAN,
            ..Default::default()
        };
        assert_eq!(frame.sanitized_axis(), 0.0);
    }

    #[test]
    fn axis_is_clamped() {
        let frame = InputFrame {
            move_axis: 3.0,
            ..Default::default()
        };
        assert_eq!(frame.sanitized_axis(), 1.0);
    }
}
