use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Tolerance – mass window around a theoretical m/z
// ---------------------------------------------------------------------------

/// A (possibly asymmetric) mass window, either in parts-per-million or in
/// absolute Daltons.
///
/// Bounds are expressed as positive values: a tolerance of `(1, 1)` around
/// `10` accepts everything in `[9, 11]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerance {
    minus: f64,
    plus: f64,
    is_absolute: bool,
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::ppm(20.0, 20.0)
    }
}

impl Tolerance {
    /// Relative window in parts-per-million of the theoretical m/z.
    pub fn ppm(minus: f64, plus: f64) -> Self {
        debug_assert!(minus >= 0.0 && plus >= 0.0, "tolerance bounds must be >= 0");
        Tolerance {
            minus,
            plus,
            is_absolute: false,
        }
    }

    /// Absolute window in Daltons.
    pub fn absolute(minus: f64, plus: f64) -> Self {
        debug_assert!(minus >= 0.0 && plus >= 0.0, "tolerance bounds must be >= 0");
        Tolerance {
            minus,
            plus,
            is_absolute: true,
        }
    }

    pub fn minus(&self) -> f64 {
        self.minus
    }

    pub fn plus(&self) -> f64 {
        self.plus
    }

    pub fn is_absolute(&self) -> bool {
        self.is_absolute
    }

    /// Inclusive `(low, high)` window around `theoretical`.
    pub fn bounds(&self, theoretical: f64) -> (f64, f64) {
        if self.is_absolute {
            (theoretical - self.minus, theoretical + self.plus)
        } else {
            let scale = theoretical / 1e6;
            (
                theoretical - self.minus * scale,
                theoretical + self.plus * scale,
            )
        }
    }

    /// Whether `observed` falls inside the window around `theoretical`.
    pub fn contains(&self, observed: f64, theoretical: f64) -> bool {
        let (low, high) = self.bounds(theoretical);
        low <= observed && observed <= high
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_boundaries_are_inclusive() {
        let (a, b) = (0.02, 0.05);
        let tol = Tolerance::absolute(a, b);
        let t = 500.0;
        assert!(tol.contains(t - a, t));
        assert!(tol.contains(t + b, t));
        assert!(tol.contains(t, t));
    }

    #[test]
    fn test_absolute_rejects_outside() {
        let (a, b) = (0.02, 0.05);
        let tol = Tolerance::absolute(a, b);
        let t = 500.0;
        assert!(!tol.contains(t - a - 1e-6, t));
        assert!(!tol.contains(t + b + 1e-6, t));
    }

    #[test]
    fn test_ppm_scales_with_mass() {
        let tol = Tolerance::ppm(10.0, 10.0);
        // 10 ppm of 1000 is 0.01
        assert!(tol.contains(1000.009, 1000.0));
        assert!(!tol.contains(1000.011, 1000.0));
        // 10 ppm of 100 is 0.001
        assert!(!tol.contains(100.002, 100.0));
    }

    #[test]
    fn test_asymmetric_ppm() {
        let tol = Tolerance::ppm(0.0, 20.0);
        assert!(!tol.contains(499.9999, 500.0));
        assert!(tol.contains(500.009, 500.0));
        let (low, high) = tol.bounds(500.0);
        assert_eq!(low, 500.0);
        assert!((high - 500.01).abs() < 1e-12);
    }

    #[test]
    fn test_serde_shape() {
        let tol: Tolerance =
            serde_json::from_str(r#"{"minus": 0.01, "plus": 0.02, "is_absolute": true}"#)
                .unwrap();
        assert_eq!(tol, Tolerance::absolute(0.01, 0.02));
    }
}
