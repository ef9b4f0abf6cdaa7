// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Landing page: a tall scroll region whose progress scrubs the frame
//! sequence and drives the overlay scenes.

use crate::routes::Route;
use crate::sequence::frames::{scroll_progress, FrameSequence};
use crate::sequence::loader::{FrameSource, PathFrameSource};
use crate::sequence::scenes::{SceneFrame, SceneId, SceneTable, TIMELINE_STEPS};
use crate::sequence::FrameRenderer;
use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};
use rand::Rng;
use std::sync::Arc;

const CHAOS_CARDS: usize = 12;

const STEPS: [(&str, &str); TIMELINE_STEPS as usize] = [
    ("Lecture Watched", "Sync with friends in real-time"),
    ("Notes Compiled", "Collaborative markdown editor"),
    ("Doubts Resolved", "Instant peer support"),
];

const CHAOS_ICONS: [&str; 4] = ["💬", "🔔", "🖼", "⋯"];

/// A notification-style card scattered around the hero headline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChaosCard {
    /// Resting offset from the center, in percent of the viewport width.
    pub x: f32,
    /// Resting offset from the center, in percent of the viewport height.
    pub y: f32,
}

impl ChaosCard {
    /// Offset from the viewport center once the cards have dispersed by
    /// `dispersion` (0 at rest, 1 at five times the resting offset).
    pub fn offset(&self, dispersion: f32, viewport: Vec2) -> Vec2 {
        let spread = 1.0 + 4.0 * dispersion.clamp(0.0, 1.0);
        egui::vec2(
            self.x / 100.0 * viewport.x * spread,
            self.y / 100.0 * viewport.y * spread,
        )
    }
}

pub fn scatter<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<ChaosCard> {
    (0..count)
        .map(|_| ChaosCard {
            x: rng.random_range(-40.0..40.0),
            y: rng.random_range(-30.0..30.0),
        })
        .collect()
}

/// Overlay scene properties for one painted frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlays {
    pub hero: SceneFrame,
    pub timeline: SceneFrame,
    pub steps: [SceneFrame; TIMELINE_STEPS as usize],
    pub workspace: SceneFrame,
}

impl Overlays {
    fn sample(scenes: &SceneTable, progress: f32) -> Self {
        Self {
            hero: scenes.frame(SceneId::Hero, progress),
            timeline: scenes.frame(SceneId::Timeline, progress),
            steps: std::array::from_fn(|i| scenes.frame(SceneId::TimelineStep(i as u8), progress)),
            workspace: scenes.frame(SceneId::Workspace, progress),
        }
    }
}

pub enum LandingAction {
    None,
    Navigate(Route),
}

pub struct LandingPage {
    renderer: FrameRenderer<egui::TextureHandle>,
    source: Arc<dyn FrameSource>,
    scenes: SceneTable,
    chaos: Vec<ChaosCard>,
    scroll_pages: f32,
}

impl LandingPage {
    pub fn new(sequence: FrameSequence, max_in_flight: usize, scroll_pages: f32) -> Self {
        let source: Arc<dyn FrameSource> = Arc::new(PathFrameSource::new(sequence.clone()));
        Self::with_source(sequence, source, max_in_flight, scroll_pages)
    }

    pub fn with_source(
        sequence: FrameSequence,
        source: Arc<dyn FrameSource>,
        max_in_flight: usize,
        scroll_pages: f32,
    ) -> Self {
        Self {
            renderer: FrameRenderer::new(sequence, max_in_flight),
            source,
            scenes: SceneTable::landing(),
            chaos: scatter(&mut rand::rng(), CHAOS_CARDS),
            scroll_pages: scroll_pages.max(1.0),
        }
    }

    /// Release the sequence when the page is left.
    pub fn leave(&mut self) {
        if self.renderer.is_mounted() {
            self.renderer.unmount();
        }
    }

    /// Steps the sprung frame index toward `progress`. Overlays follow the
    /// raw scroll position; only the frame sequence is smoothed.
    pub fn advance(&mut self, progress: f32, dt: f32) -> Overlays {
        self.renderer.advance(progress, dt);
        Overlays::sample(&self.scenes, progress)
    }

    pub fn show(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) -> LandingAction {
        if !self.renderer.is_mounted() {
            log::info!(
                "Mounting sequence {} ({} frames)",
                self.renderer.sequence().path_template(),
                self.renderer.sequence().count()
            );
            self.renderer.mount(Arc::clone(&self.source));
        }
        self.renderer.ingest(|index, image| {
            let size = [image.width as usize, image.height as usize];
            let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &image.pixels);
            ctx.load_texture(format!("sequence_frame_{index}"), color_image, egui::TextureOptions::LINEAR)
        });

        let viewport = ui.available_rect_before_wrap();
        let pages = self.scroll_pages;
        let output = egui::ScrollArea::vertical()
            .id_source("landing_scroll")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.allocate_space(egui::vec2(viewport.width(), viewport.height() * pages));
            });
        let progress = scroll_progress(
            output.state.offset.y,
            output.content_size.y,
            output.inner_rect.height(),
        );

        let dt = ctx.input(|i| i.stable_dt).min(0.1);
        let overlays = self.advance(progress, dt);

        let painter = ui.painter_at(viewport);
        self.paint_frame(&painter, viewport);
        self.paint_hero(&painter, viewport, overlays.hero);
        self.paint_timeline(&painter, viewport, &overlays);
        let action = self.paint_workspace(ctx, &painter, viewport, overlays.workspace);

        // Logo header stays above every scene.
        painter.text(
            viewport.min + egui::vec2(24.0, 24.0),
            Align2::LEFT_TOP,
            "Baithak",
            FontId::proportional(28.0),
            ui.visuals().strong_text_color(),
        );
        let settled = self.renderer.loaded_count() + self.renderer.failed_count();
        if self.renderer.is_animating() || settled < self.renderer.sequence().count() {
            ctx.request_repaint();
        }
        action
    }

    fn paint_frame(&mut self, painter: &egui::Painter, viewport: Rect) {
        painter.rect_filled(viewport, 0.0, Color32::from_black_alpha(13));
        let waiting = self.renderer.is_waiting_for_first_frame();
        match self.renderer.draw(viewport.width(), viewport.height()) {
            Some((texture, placement)) => {
                painter.image(
                    texture.id(),
                    placement.to_rect(viewport.min),
                    Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                    Color32::WHITE,
                );
            }
            None if waiting => {
                painter.text(
                    viewport.center(),
                    Align2::CENTER_CENTER,
                    "Loading Sequence...",
                    FontId::proportional(16.0),
                    Color32::from_gray(140),
                );
            }
            None => {}
        }
    }

    fn paint_hero(&self, painter: &egui::Painter, viewport: Rect, frame: SceneFrame) {
        if !frame.is_visible() {
            return;
        }
        let text = Color32::from_gray(235).gamma_multiply(frame.opacity);
        let muted = Color32::from_gray(170).gamma_multiply(frame.opacity);
        let center = viewport.center() + egui::vec2(0.0, frame.shift_y);

        for (idx, card) in self.chaos.iter().enumerate() {
            let pos = viewport.center() + card.offset(frame.dispersion, viewport.size());
            let rect = Rect::from_center_size(pos, egui::vec2(128.0, 76.0));
            painter.rect(
                rect,
                12.0,
                Color32::from_white_alpha(26).gamma_multiply(frame.opacity),
                Stroke::new(1.0, Color32::from_white_alpha(50).gamma_multiply(frame.opacity)),
            );
            painter.text(
                rect.left_top() + egui::vec2(14.0, 12.0),
                Align2::LEFT_TOP,
                CHAOS_ICONS[idx % CHAOS_ICONS.len()],
                FontId::proportional(22.0),
                text,
            );
            let bar = Rect::from_min_size(rect.left_top() + egui::vec2(14.0, 46.0), egui::vec2(96.0, 8.0));
            painter.rect_filled(bar, 4.0, Color32::from_white_alpha(50).gamma_multiply(frame.opacity));
        }

        painter.text(
            center,
            Align2::CENTER_BOTTOM,
            "Distracted?",
            FontId::proportional(84.0 * frame.scale),
            text,
        );
        painter.text(
            center + egui::vec2(0.0, 16.0 * frame.scale),
            Align2::CENTER_TOP,
            "Study Together, Not Alone.",
            FontId::proportional(28.0 * frame.scale),
            muted,
        );
    }

    fn paint_timeline(&self, painter: &egui::Painter, viewport: Rect, overlays: &Overlays) {
        let frame = overlays.timeline;
        if !frame.is_visible() {
            return;
        }
        let accent = Color32::from_rgb(79, 70, 229);
        let width = (viewport.width() * 0.8).min(900.0) * frame.scale;
        let top = viewport.min.y + viewport.height() * 0.35;
        let left = viewport.center().x - width / 2.0;

        painter.text(
            egui::pos2(viewport.center().x, top),
            Align2::CENTER_BOTTOM,
            "The Journey to Clarity",
            FontId::proportional(36.0 * frame.scale),
            accent.gamma_multiply(frame.opacity),
        );

        let line_y = top + 84.0 * frame.scale;
        let start = Pos2::new(left, line_y);
        painter.line_segment(
            [start, Pos2::new(left + width, line_y)],
            Stroke::new(2.0, accent.gamma_multiply(0.3 * frame.opacity)),
        );
        painter.line_segment(
            [start, Pos2::new(left + width * frame.path_draw, line_y)],
            Stroke::new(2.0, accent.gamma_multiply(frame.opacity)),
        );

        let slot = width / f32::from(TIMELINE_STEPS);
        for (i, ((title, desc), step)) in STEPS.iter().zip(overlays.steps).enumerate() {
            let opacity = step.opacity.min(frame.opacity);
            if opacity <= 0.001 {
                continue;
            }
            let center = Pos2::new(
                left + slot * (i as f32 + 0.5),
                line_y + step.shift_y,
            );
            painter.circle(
                center,
                32.0 * step.scale,
                Color32::from_rgb(30, 27, 75).gamma_multiply(opacity),
                Stroke::new(4.0, accent.gamma_multiply(opacity)),
            );
            painter.text(
                center,
                Align2::CENTER_CENTER,
                format!("{}", i + 1),
                FontId::proportional(22.0 * step.scale),
                Color32::WHITE.gamma_multiply(opacity),
            );
            painter.text(
                center + egui::vec2(0.0, 48.0 * step.scale),
                Align2::CENTER_TOP,
                *title,
                FontId::proportional(20.0 * step.scale),
                Color32::from_gray(235).gamma_multiply(opacity),
            );
            painter.text(
                center + egui::vec2(0.0, 76.0 * step.scale),
                Align2::CENTER_TOP,
                *desc,
                FontId::proportional(14.0 * step.scale),
                Color32::from_gray(160).gamma_multiply(opacity),
            );
        }
    }

    fn paint_workspace(
        &self,
        ctx: &egui::Context,
        painter: &egui::Painter,
        viewport: Rect,
        frame: SceneFrame,
    ) -> LandingAction {
        if !frame.is_visible() {
            return LandingAction::None;
        }
        let size = egui::vec2(
            (viewport.width() * 0.8).min(1000.0),
            (viewport.height() * 0.55).min(560.0),
        ) * frame.scale;
        let center = viewport.center()
            + egui::vec2(0.0, frame.shift_fraction * size.y - viewport.height() * 0.08);
        let board = Rect::from_center_size(center, size);

        painter.rect(
            board,
            12.0,
            Color32::from_gray(18).gamma_multiply(frame.opacity),
            Stroke::new(1.0, Color32::from_gray(70).gamma_multiply(frame.opacity)),
        );
        // Dot grid.
        let dot = Color32::from_rgb(148, 163, 184).gamma_multiply(0.4 * frame.opacity);
        let mut y = board.min.y + 12.0;
        while y < board.max.y {
            let mut x = board.min.x + 12.0;
            while x < board.max.x {
                painter.circle_filled(Pos2::new(x, y), 1.0, dot);
                x += 24.0;
            }
            y += 24.0;
        }

        for (label, color, at) in [
            ("Alex", Color32::from_rgb(239, 68, 68), egui::vec2(0.25, 0.3)),
            ("Sarah", Color32::from_rgb(59, 130, 246), egui::vec2(0.65, 0.6)),
        ] {
            let pos = board.min + board.size() * at;
            painter.circle_filled(pos, 6.0, color.gamma_multiply(frame.opacity));
            painter.text(
                pos + egui::vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                label,
                FontId::proportional(12.0),
                color.gamma_multiply(frame.opacity),
            );
        }

        let text = Color32::from_gray(235).gamma_multiply(frame.opacity);
        painter.text(
            board.center(),
            Align2::CENTER_BOTTOM,
            "Enter Baithak.",
            FontId::proportional(44.0 * frame.scale),
            text,
        );
        painter.text(
            board.center() + egui::vec2(0.0, 8.0),
            Align2::CENTER_TOP,
            "Where ideas converge.",
            FontId::proportional(20.0 * frame.scale),
            Color32::from_gray(160).gamma_multiply(frame.opacity),
        );

        let cta = egui::pos2(board.center().x, board.max.y + 24.0);
        painter.text(
            cta,
            Align2::CENTER_TOP,
            "Ready to start?",
            FontId::proportional(24.0),
            text,
        );
        if frame.opacity < 0.5 {
            return LandingAction::None;
        }
        let clicked = egui::Area::new(egui::Id::new("landing_cta"))
            .order(egui::Order::Foreground)
            .pivot(Align2::CENTER_TOP)
            .fixed_pos(cta + egui::vec2(0.0, 40.0))
            .show(ctx, |ui| ui.button(egui::RichText::new("Log in  →").size(18.0)).clicked())
            .inner;
        if clicked {
            LandingAction::Navigate(Route::Auth)
        } else {
            LandingAction::None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::frames::frame_index;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_scatter_stays_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let cards = scatter(&mut rng, CHAOS_CARDS);
        assert_eq!(cards.len(), 12);
        for card in cards {
            assert!((-40.0..40.0).contains(&card.x));
            assert!((-30.0..30.0).contains(&card.y));
        }
    }

    #[test]
    fn test_cards_spread_to_five_times_offset() {
        let card = ChaosCard { x: 10.0, y: -20.0 };
        let viewport = egui::vec2(1000.0, 500.0);
        let rest = card.offset(0.0, viewport);
        assert!((rest - egui::vec2(100.0, -100.0)).length() < 1e-3);
        let dispersed = card.offset(1.0, viewport);
        assert!((dispersed - egui::vec2(500.0, -500.0)).length() < 1e-3);
        assert_eq!(card.offset(3.0, viewport), card.offset(1.0, viewport));
    }

    #[test]
    fn test_overlays_follow_raw_progress() {
        let sequence = FrameSequence::new("mem-", 241);
        let mut page = LandingPage::new(sequence, 4, 5.0);
        let overlays = page.advance(0.8, 1.0 / 60.0);

        // The frame index lags behind on the spring...
        assert!(page.renderer.current_index() < frame_index(0.8, 241));
        // ...while the scenes are already where the scroll position puts them.
        assert!((overlays.workspace.opacity - 1.0).abs() < 1e-4);
        assert!(!overlays.hero.is_visible());
        assert_eq!(overlays, Overlays::sample(&page.scenes, 0.8));
    }
}
