// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Geometric utility functions.
//!
//! This module provides the "contain" fit used to draw sequence frames
//! into the landing canvas, and the clamped linear remap used by scene
//! curves.

/// Where an image lands inside a canvas after a contain fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub scale: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub width: f32,
    pub height: f32,
}

impl Placement {
    /// Placement translated by the canvas origin, as an egui rect.
    pub fn to_rect(self, origin: egui::Pos2) -> egui::Rect {
        egui::Rect::from_min_size(
            origin + egui::vec2(self.offset_x, self.offset_y),
            egui::vec2(self.width, self.height),
        )
    }
}

/// Scale an image to fit entirely inside the canvas, preserving aspect
/// ratio and centering it (letterboxing the remainder).
///
/// Returns `None` for degenerate sizes.
pub fn contain_fit(canvas_w: f32, canvas_h: f32, image_w: f32, image_h: f32) -> Option<Placement> {
    if canvas_w <= 0.0 || canvas_h <= 0.0 || image_w <= 0.0 || image_h <= 0.0 {
        return None;
    }

    let scale = (canvas_w / image_w).min(canvas_h / image_h);
    let width = image_w * scale;
    let height = image_h * scale;

    Some(Placement {
        scale,
        offset_x: (canvas_w - width) / 2.0,
        offset_y: (canvas_h - height) / 2.0,
        width,
        height,
    })
}

/// Linear interpolation between `a` and `b`.
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Map `value` from `[in_start, in_end]` onto `[out_start, out_end]`,
/// clamping to the output range.
pub fn remap_clamped(value: f32, in_start: f32, in_end: f32, out_start: f32, out_end: f32) -> f32 {
    if in_end <= in_start {
        return if value < in_start { out_start } else { out_end };
    }
    let t = ((value - in_start) / (in_end - in_start)).clamp(0.0, 1.0);
    lerp(out_start, out_end, t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.0001
    }

    #[test]
    fn test_contain_wide_image_letterboxes_vertically() {
        let p = contain_fit(1000.0, 1000.0, 1920.0, 1080.0).unwrap();
        assert!(approx(p.width, 1000.0));
        assert!(approx(p.height, 562.5));
        assert!(approx(p.offset_x, 0.0));
        assert!(approx(p.offset_y, (1000.0 - 562.5) / 2.0));
    }

    #[test]
    fn test_contain_tall_image_letterboxes_horizontally() {
        let p = contain_fit(1920.0, 1080.0, 500.0, 1000.0).unwrap();
        assert!(approx(p.scale, 1.08));
        assert!(approx(p.height, 1080.0));
        assert!(approx(p.offset_y, 0.0));
        assert!(approx(p.offset_x, (1920.0 - 540.0) / 2.0));
    }

    #[test]
    fn test_contain_is_idempotent_for_identical_sizes() {
        let first = contain_fit(1280.0, 720.0, 1920.0, 1080.0);
        for _ in 0..3 {
            assert_eq!(contain_fit(1280.0, 720.0, 1920.0, 1080.0), first);
        }
    }

    #[test]
    fn test_contain_rejects_degenerate_sizes() {
        assert!(contain_fit(0.0, 720.0, 10.0, 10.0).is_none());
        assert!(contain_fit(100.0, 100.0, 10.0, 0.0).is_none());
    }

    #[test]
    fn test_remap_clamps_outside_input_range() {
        assert!(approx(remap_clamped(-1.0, 0.0, 0.25, 1.0, 0.0), 1.0));
        assert!(approx(remap_clamped(0.125, 0.0, 0.25, 1.0, 0.0), 0.5));
        assert!(approx(remap_clamped(0.9, 0.0, 0.25, 1.0, 0.0), 0.0));
    }
}
