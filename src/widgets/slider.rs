/// Slider state (rendering-agnostic)
///
/// Holds the current position and range of a setpoint slider.
/// The frontend renders it as a gauge and mutates it on operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliderState {
    /// Current value, always inside `min..=max`
    pub value: i32,

    /// Lower bound
    pub min: i32,

    /// Upper bound
    pub max: i32,

    /// Keyboard increment
    pub step: i32,
}

impl SliderState {
    /// Create a slider; the default is clamped into range.
    pub fn new(min: i32, max: i32, default: i32, step: i32) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            value: default.clamp(min, max),
            min,
            max,
            step: step.max(1),
        }
    }

    /// Set the value (clamped). Returns true if the value changed.
    pub fn set_value(&mut self, value: i32) -> bool {
        let value = value.clamp(self.min, self.max);
        let changed = value != self.value;
        self.value = value;
        changed
    }

    /// Move by a number of steps (negative moves down).
    pub fn nudge(&mut self, steps: i32) -> bool {
        let target = (self.value as i64 + steps as i64 * self.step as i64)
            .clamp(self.min as i64, self.max as i64) as i32;
        self.set_value(target)
    }

    /// Set the value from a position along the gauge (0.0 to 1.0)
    pub fn set_fraction(&mut self, fraction: f64) -> bool {
        let span = (self.max as i64 - self.min as i64) as f64;
        let target = self.min as i64 + (span * fraction.clamp(0.0, 1.0)).round() as i64;
        self.set_value(target as i32)
    }

    /// Get position percentage (0.0 to 1.0)
    pub fn fraction(&self) -> f64 {
        if self.max == self.min {
            0.0
        } else {
            ((self.value as i64 - self.min as i64) as f64 / (self.max as i64 - self.min as i64) as f64)
                .clamp(0.0, 1.0)
        }
    }

    pub fn display_text(&self) -> String {
        self.value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slider() {
        let mut slider = SliderState::new(30000, 90000, 60000, 500);
        assert_eq!(slider.fraction(), 0.5);
        assert_eq!(slider.display_text(), "60000");

        assert!(slider.nudge(2));
        assert_eq!(slider.value, 61000);

        assert!(slider.nudge(-1000));
        assert_eq!(slider.value, 30000);
        assert!(!slider.nudge(-1));
    }

    #[test]
    fn test_default_is_clamped() {
        let slider = SliderState::new(60000, 90000, 100, 1);
        assert_eq!(slider.value, 60000);
    }

    #[test]
    fn test_set_fraction() {
        let mut slider = SliderState::new(0, 200, 0, 1);
        assert!(slider.set_fraction(0.25));
        assert_eq!(slider.value, 50);
        assert!(slider.set_fraction(7.0));
        assert_eq!(slider.value, 200);
        assert!(!slider.set_value(500));
    }
}
