//! Scripted viewer motion for the headless driver.

use glam::Vec2;

/// A viewer moving at constant speed along a slowly turning heading.
#[derive(Debug, Clone, PartialEq)]
pub struct Walker {
    position: Vec2,
    heading: f32,
    /// World units per second.
    pub speed: f32,
    /// Radians per second.
    pub turn_rate: f32,
}

impl Walker {
    pub fn new(position: Vec2, speed: f32, turn_rate: f32) -> Self {
        Self {
            position,
            heading: 0.0,
            speed,
            turn_rate,
        }
    }

    /// Start in the middle of the initial view window, heading east at three
    /// quarters of a tile per second.
    pub fn centred(tile_size: f32, view_window: u32) -> Self {
        let half = (view_window.max(1) / 2) as f32 + 0.5;
        Self::new(Vec2::splat(half * tile_size), tile_size * 0.75, 0.2)
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn step(&mut self, dt: f32) -> Vec2 {
        self.heading += self.turn_rate * dt;
        self.position += Vec2::from_angle(self.heading) * self.speed * dt;
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centred_start() {
        let walker = Walker::centred(100.0, 3);
        assert_eq!(walker.position(), Vec2::new(150.0, 150.0));
    }

    #[test]
    fn test_straight_walk() {
        let mut walker = Walker::new(Vec2::ZERO, 10.0, 0.0);
        for _ in 0..10 {
            walker.step(0.1);
        }
        assert!((walker.position() - Vec2::new(10.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_turning_walk_stays_on_circle() {
        // speed / turn_rate is the radius of the circle traced.
        let mut walker = Walker::new(Vec2::ZERO, 1.0, 1.0);
        let mut far = 0.0f32;
        for _ in 0..1000 {
            far = far.max(walker.step(0.01).length());
        }
        assert!(far <= 2.0 + 1e-2);
    }
}
