//! Generation-rate profiling over fixed one-second windows.

use serde::{Deserialize, Serialize};

/// Length of one profiling window
pub const WINDOW_SECONDS: f64 = 1.0;

/// Rolling one-second accumulation of generated energy.
///
/// The rate only changes when a window completes; until the first window
/// closes it reports zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilingWindow {
    accumulated_energy: f64,
    accumulated_time: f64,
    last_rate: f64,
}

impl ProfilingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one tick's generated energy and elapsed time
    pub fn record(&mut self, energy: f64, dt: f64) {
        self.accumulated_energy += energy;
        self.accumulated_time += dt;
        if self.accumulated_time >= WINDOW_SECONDS {
            self.close_window();
        }
    }

    fn close_window(&mut self) {
        // A window only closes once time reached a full second, but guard
        // the division anyway: keep the previous rate on a degenerate window.
        if self.accumulated_time > f64::EPSILON {
            self.last_rate = self.accumulated_energy / self.accumulated_time;
        }
        self.accumulated_energy = 0.0;
        self.accumulated_time = 0.0;
    }

    /// Energy per second over the last completed window
    pub fn generation_rate(&self) -> f64 {
        self.last_rate
    }

    pub fn accumulated_energy(&self) -> f64 {
        self.accumulated_energy
    }

    pub fn accumulated_time(&self) -> f64 {
        self.accumulated_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_is_stale_mid_window() {
        let mut window = ProfilingWindow::new();
        window.record(2.0, 0.25);
        window.record(2.0, 0.25);
        assert_eq!(window.generation_rate(), 0.0);
        assert_eq!(window.accumulated_energy(), 4.0);
        assert_eq!(window.accumulated_time(), 0.5);
    }

    #[test]
    fn test_exact_second_closes_window() {
        let mut window = ProfilingWindow::new();
        window.record(7.5, 1.0);
        assert_eq!(window.generation_rate(), 7.5);
        assert_eq!(window.accumulated_energy(), 0.0);
        assert_eq!(window.accumulated_time(), 0.0);
    }

    #[test]
    fn test_rate_holds_until_next_window() {
        let mut window = ProfilingWindow::new();
        window.record(3.0, 0.6);
        window.record(3.0, 0.6);
        assert!((window.generation_rate() - 5.0).abs() < 1e-9);

        window.record(100.0, 0.5);
        assert!((window.generation_rate() - 5.0).abs() < 1e-9);

        window.record(0.0, 0.5);
        assert!((window.generation_rate() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_time_never_divides() {
        let mut window = ProfilingWindow::new();
        window.record(5.0, 0.0);
        window.record(5.0, 0.0);
        assert_eq!(window.generation_rate(), 0.0);
        assert!(window.generation_rate().is_finite());
    }
}
