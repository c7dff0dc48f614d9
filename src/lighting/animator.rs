//! Orbiting point light and the simulation clock that drives it

use bevy::prelude::*;

/// Amplitude of the light orbit along each axis
pub const LIGHT_ORBIT_RADIUS: f64 = 10.0;

/// Accumulated simulation time in seconds
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SimulationClock {
    elapsed: f64,
}

impl SimulationClock {
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    /// Advance by one frame's real-time delta.
    ///
    /// Negative or non-finite deltas are ignored so the clock never runs backwards.
    pub fn advance(&mut self, delta_secs: f64) {
        if delta_secs.is_finite() && delta_secs > 0.0 {
            self.elapsed += delta_secs;
        }
    }
}

/// Light position at elapsed time `t`, as a homogeneous point (w = 1).
///
/// Each axis is a product of two sinusoids with different frequencies, which keeps the light
/// wandering around the model without ever repeating a simple circle.
pub fn orbit_light_position(t: f64) -> Vec4 {
    let r = LIGHT_ORBIT_RADIUS;
    Vec4::new(
        ((t * 0.6).cos() * (t * 0.5).sin() * r) as f32,
        ((t * 0.3).cos() * (t * 0.2).sin() * r) as f32,
        ((t * 0.1).cos() * (t * 0.4).sin() * r) as f32,
        1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-3;

    #[test]
    fn test_light_starts_at_origin() {
        let p = orbit_light_position(0.0);
        assert_eq!(p, Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_light_position_after_one_second() {
        let p = orbit_light_position(1.0);
        assert!((p.x - 3.957).abs() < EPSILON);
        assert!((p.y - 1.898).abs() < EPSILON);
        assert!((p.z - 3.875).abs() < EPSILON);
        assert_eq!(p.w, 1.0);
    }

    #[test]
    fn test_light_stays_inside_orbit_box() {
        let bound = LIGHT_ORBIT_RADIUS as f32;
        let mut t = 0.0;
        while t < 600.0 {
            let p = orbit_light_position(t);
            assert!(p.x.abs() <= bound && p.y.abs() <= bound && p.z.abs() <= bound);
            t += 0.137;
        }
    }

    #[test]
    fn test_clock_accumulates_deltas() {
        let mut clock = SimulationClock::default();
        clock.advance(0.25);
        clock.advance(0.75);
        assert!((clock.elapsed() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_clock_never_runs_backwards() {
        let mut clock = SimulationClock::default();
        clock.advance(0.5);
        clock.advance(-1.0);
        clock.advance(f64::NAN);
        assert_eq!(clock.elapsed(), 0.5);
    }
}
