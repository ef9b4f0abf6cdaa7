// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scroll-driven overlay scenes.
//!
//! Every overlay on the landing page reads its visual properties from the
//! one table built by [`SceneTable::landing`]. Each scene declares the
//! progress range it lives in and a set of piecewise-linear curves from
//! progress to a property value. Outside its range a scene is invisible.

use crate::util::geometry::remap_clamped;

/// Monotonic piecewise-linear map from progress to a value.
///
/// Inputs before the first stop take the first value; inputs after the
/// last stop take the last value.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    stops: Vec<(f32, f32)>,
}

impl Curve {
    /// `inputs` must be non-decreasing and the same length as `outputs`.
    pub fn new(inputs: &[f32], outputs: &[f32]) -> Self {
        debug_assert_eq!(inputs.len(), outputs.len());
        debug_assert!(inputs.windows(2).all(|w| w[0] <= w[1]));
        Self {
            stops: inputs.iter().copied().zip(outputs.iter().copied()).collect(),
        }
    }

    pub fn sample(&self, progress: f32) -> f32 {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return 0.0,
        };
        if progress <= first.0 {
            return first.1;
        }
        if progress >= last.0 {
            return last.1;
        }
        self.stops
            .windows(2)
            .find(|w| progress <= w[1].0)
            .map(|w| remap_clamped(progress, w[0].0, w[1].0, w[0].1, w[1].1))
            .unwrap_or(last.1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneId {
    /// "Distracted?" headline and the chaos cards.
    Hero,
    /// "The Journey to Clarity" timeline.
    Timeline,
    /// One node of the timeline.
    TimelineStep(u8),
    /// Collaborative whiteboard and the log-in call to action.
    Workspace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Property {
    Opacity,
    Scale,
    /// Vertical shift in points.
    ShiftY,
    /// Vertical shift as a fraction of the element's own height.
    ShiftFraction,
    /// 0..1 fraction of the timeline connector drawn.
    PathDraw,
    /// 0..1 progress of the chaos cards flying apart.
    Dispersion,
}

impl Property {
    /// Value used when a scene declares no curve for the property.
    fn neutral(self) -> f32 {
        match self {
            Property::Opacity | Property::Scale => 1.0,
            Property::ShiftY
            | Property::ShiftFraction
            | Property::PathDraw
            | Property::Dispersion => 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub id: SceneId,
    pub start: f32,
    pub end: f32,
    curves: Vec<(Property, Curve)>,
}

impl Scene {
    pub fn new(id: SceneId, start: f32, end: f32) -> Self {
        Self {
            id,
            start,
            end,
            curves: Vec::new(),
        }
    }

    pub fn with(mut self, property: Property, inputs: &[f32], outputs: &[f32]) -> Self {
        self.curves.push((property, Curve::new(inputs, outputs)));
        self
    }

    pub fn contains(&self, progress: f32) -> bool {
        progress >= self.start && progress <= self.end
    }

    pub fn sample(&self, property: Property, progress: f32) -> f32 {
        if property == Property::Opacity && !self.contains(progress) {
            return 0.0;
        }
        self.curves
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, curve)| curve.sample(progress))
            .unwrap_or_else(|| property.neutral())
    }

    pub fn frame(&self, progress: f32) -> SceneFrame {
        SceneFrame {
            opacity: self.sample(Property::Opacity, progress),
            scale: self.sample(Property::Scale, progress),
            shift_y: self.sample(Property::ShiftY, progress),
            shift_fraction: self.sample(Property::ShiftFraction, progress),
            path_draw: self.sample(Property::PathDraw, progress),
            dispersion: self.sample(Property::Dispersion, progress),
        }
    }
}

/// All properties of one scene at one progress value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneFrame {
    pub opacity: f32,
    pub scale: f32,
    pub shift_y: f32,
    pub shift_fraction: f32,
    pub path_draw: f32,
    pub dispersion: f32,
}

impl SceneFrame {
    pub fn is_visible(&self) -> bool {
        self.opacity > 0.001
    }
}

/// Ordered table of every scene on the landing page.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTable {
    scenes: Vec<Scene>,
}

pub const TIMELINE_STEPS: u8 = 3;

impl SceneTable {
    pub fn new(scenes: Vec<Scene>) -> Self {
        Self { scenes }
    }

    pub fn landing() -> Self {
        let mut scenes = vec![
            Scene::new(SceneId::Hero, 0.0, 0.25)
                .with(Property::Opacity, &[0.0, 0.25], &[1.0, 0.0])
                .with(Property::Scale, &[0.0, 0.25], &[1.0, 2.0])
                .with(Property::ShiftY, &[0.0, 0.25], &[0.0, -100.0])
                .with(Property::Dispersion, &[0.0, 0.2], &[0.0, 1.0]),
            Scene::new(SceneId::Timeline, 0.25, 0.65)
                .with(Property::Opacity, &[0.25, 0.35, 0.55, 0.65], &[0.0, 1.0, 1.0, 0.0])
                .with(Property::Scale, &[0.25, 0.45], &[0.8, 1.0])
                .with(Property::PathDraw, &[0.35, 0.55], &[0.0, 1.0]),
        ];

        for i in 0..TIMELINE_STEPS {
            let start = 0.35 + f32::from(i) * 0.08;
            let end = start + 0.05;
            scenes.push(
                Scene::new(SceneId::TimelineStep(i), start, 0.65)
                    .with(Property::Opacity, &[start, end], &[0.0, 1.0])
                    .with(Property::Scale, &[start, end], &[0.5, 1.0])
                    .with(Property::ShiftY, &[start, end], &[50.0, 0.0]),
            );
        }

        scenes.push(
            Scene::new(SceneId::Workspace, 0.65, 1.0)
                .with(Property::Opacity, &[0.65, 0.75], &[0.0, 1.0])
                .with(Property::ShiftFraction, &[0.65, 0.85], &[0.5, 0.0])
                .with(Property::Scale, &[0.65, 0.85], &[0.9, 1.0]),
        );

        Self::new(scenes)
    }

    pub fn get(&self, id: SceneId) -> Option<&Scene> {
        self.scenes.iter().find(|s| s.id == id)
    }

    /// Properties of scene `id` at `progress`; an unknown scene is invisible.
    pub fn frame(&self, id: SceneId, progress: f32) -> SceneFrame {
        match self.get(id) {
            Some(scene) => scene.frame(progress),
            None => SceneFrame {
                opacity: 0.0,
                scale: 1.0,
                shift_y: 0.0,
                shift_fraction: 0.0,
                path_draw: 0.0,
                dispersion: 0.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn test_curve_interpolates_and_clamps() {
        let curve = Curve::new(&[0.25, 0.35, 0.55, 0.65], &[0.0, 1.0, 1.0, 0.0]);
        assert!(approx(curve.sample(0.0), 0.0));
        assert!(approx(curve.sample(0.30), 0.5));
        assert!(approx(curve.sample(0.45), 1.0));
        assert!(approx(curve.sample(0.60), 0.5));
        assert!(approx(curve.sample(0.9), 0.0));
    }

    #[test]
    fn test_hero_fades_out() {
        let table = SceneTable::landing();
        let start = table.frame(SceneId::Hero, 0.0);
        assert!(approx(start.opacity, 1.0));
        assert!(approx(start.scale, 1.0));
        let mid = table.frame(SceneId::Hero, 0.125);
        assert!(approx(mid.opacity, 0.5));
        assert!(approx(mid.scale, 1.5));
        assert!(approx(mid.shift_y, -50.0));
        assert!(approx(table.frame(SceneId::Hero, 0.25).shift_y, -100.0));
        assert!(approx(table.frame(SceneId::Hero, 0.1).dispersion, 0.5));
        assert!(!table.frame(SceneId::Hero, 0.5).is_visible());
    }

    #[test]
    fn test_opacity_is_zero_outside_scene_range() {
        let table = SceneTable::landing();
        for scene in &table.scenes {
            for p in [scene.start - 0.01, scene.end + 0.01] {
                if (0.0..=1.0).contains(&p) {
                    assert_eq!(scene.sample(Property::Opacity, p), 0.0, "{:?} at {}", scene.id, p);
                }
            }
        }
    }

    #[test]
    fn test_timeline_steps_pop_in_order() {
        let table = SceneTable::landing();
        let p = 0.44;
        let first = table.frame(SceneId::TimelineStep(0), p);
        let second = table.frame(SceneId::TimelineStep(1), p);
        let third = table.frame(SceneId::TimelineStep(2), p);
        assert!(approx(first.opacity, 1.0));
        assert!(second.opacity > 0.0 && second.opacity < 1.0);
        assert_eq!(third.opacity, 0.0);
        assert!(approx(table.frame(SceneId::Timeline, 0.45).path_draw, 0.5));
        assert!(approx(second.shift_y, 40.0));
        assert_eq!(first.shift_y, 0.0);
    }

    #[test]
    fn test_workspace_stays_visible_until_the_end() {
        let table = SceneTable::landing();
        let end = table.frame(SceneId::Workspace, 1.0);
        assert!(approx(end.opacity, 1.0));
        assert!(approx(end.shift_fraction, 0.0));
        let entering = table.frame(SceneId::Workspace, 0.75);
        assert!(approx(entering.shift_fraction, 0.25));
        assert_eq!(entering.shift_y, 0.0);
    }

    #[test]
    fn test_unknown_scene_is_invisible() {
        let table = SceneTable::new(Vec::new());
        assert!(!table.frame(SceneId::Hero, 0.0).is_visible());
    }
}
