// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Spring-damped follower used to smooth scroll progress.

/// Largest integration step; longer frames are split into substeps.
const MAX_STEP: f32 = 1.0 / 240.0;

/// A damped spring chasing a moving target.
#[derive(Debug, Clone, PartialEq)]
pub struct Spring {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
    /// Settle once both distance and speed fall under these.
    pub rest_delta: f32,
    pub rest_speed: f32,
    value: f32,
    velocity: f32,
    target: f32,
}

impl Spring {
    /// Spring with the landing page constants (stiffness 200, damping 30).
    pub fn scrub(initial: f32) -> Self {
        Self::new(200.0, 30.0, 1.0, initial)
    }

    pub fn new(stiffness: f32, damping: f32, mass: f32, initial: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
            rest_delta: 1e-4,
            rest_speed: 1e-4,
            value: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn is_settled(&self) -> bool {
        self.value == self.target && self.velocity == 0.0
    }

    /// Advance by `dt` seconds and return the new value.
    pub fn step(&mut self, dt: f32) -> f32 {
        if self.is_settled() || dt <= 0.0 {
            return self.value;
        }

        let mut remaining = dt;
        while remaining > 0.0 {
            let h = remaining.min(MAX_STEP);
            let displacement = self.value - self.target;
            let accel = (-self.stiffness * displacement - self.damping * self.velocity) / self.mass;
            self.velocity += accel * h;
            self.value += self.velocity * h;
            remaining -= h;
        }

        if (self.value - self.target).abs() < self.rest_delta && self.velocity.abs() < self.rest_speed {
            self.value = self.target;
            self.velocity = 0.0;
        }
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spring_settles_on_target() {
        let mut spring = Spring::scrub(0.0);
        spring.set_target(1.0);
        for _ in 0..240 {
            spring.step(1.0 / 60.0);
        }
        assert!(spring.is_settled());
        assert_eq!(spring.value(), 1.0);
    }

    #[test]
    fn test_scrub_spring_does_not_overshoot() {
        let mut spring = Spring::scrub(0.0);
        spring.set_target(1.0);
        let mut previous = 0.0;
        for _ in 0..120 {
            let v = spring.step(1.0 / 60.0);
            assert!(v <= 1.0 + 1e-6);
            assert!(v >= previous);
            previous = v;
        }
    }

    #[test]
    fn test_long_frames_are_stable() {
        let mut spring = Spring::scrub(0.0);
        spring.set_target(1.0);
        let v = spring.step(0.5);
        assert!(v.is_finite());
        assert!(v > 0.5 && v <= 1.0);
    }

    #[test]
    fn test_settled_and_zero_dt() {
        let mut spring = Spring::scrub(0.8);
        assert!(spring.is_settled());
        spring.set_target(0.2);
        assert_eq!(spring.step(0.0), 0.8);
        assert!(!spring.is_settled());
    }
}
