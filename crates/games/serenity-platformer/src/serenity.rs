use serde::{Deserialize, Serialize};

/// Bounded resource that drains over time and under hazards. Reaching zero
/// fails the level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Serenity {
    value: f32,
    max: f32,
}

impl Serenity {
    pub fn new(max: f32) -> Self {
        let max = if max.is_finite() { max.max(0.0) } else { 0.0 };
        Self { value: max, max }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn fraction(&self) -> f32 {
        if self.max > 0.0 {
            self.value / self.max
        } else {
            0.0
        }
    }

    /// Remove up to `amount`. Returns how much was actually removed.
    pub fn drain(&mut self, amount: f32) -> f32 {
        if !amount.is_finite() || amount <= 0.0 {
            return 0.0;
        }
        let taken = amount.min(self.value);
        self.value -= taken;
        taken
    }

    pub fn restore(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.value = (self.value + amount).min(self.max);
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.value <= 0.0
    }

    pub fn refill(&mut self) {
        self.value = self.max;
    }
}
