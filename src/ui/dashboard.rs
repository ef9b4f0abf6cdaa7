// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Dashboard: welcome card, time spent today and the activity heatmap.

use crate::models::profile::UserProfile;
use chrono::{DateTime, Duration, NaiveDate, Utc};

pub const HEATMAP_DAYS: usize = 365;
const SUBJECT: &str = "Operating Systems";

const CELL: f32 = 14.0;
const GAP: f32 = 3.0;

/// One square of the activity heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapDay {
    pub date: NaiveDate,
    /// 0 (no activity) to 4.
    pub intensity: u8,
}

/// The last year of days, oldest first. Only today is marked active.
pub fn heatmap(today: NaiveDate) -> Vec<HeatmapDay> {
    (0..HEATMAP_DAYS)
        .rev()
        .map(|days_ago| HeatmapDay {
            date: today - Duration::days(days_ago as i64),
            intensity: if days_ago == 0 { 3 } else { 0 },
        })
        .collect()
}

/// Whole minutes between sign-in and `now`, never negative.
pub fn minutes_since(signed_in_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - signed_in_at).num_minutes().max(0)
}

fn intensity_color(intensity: u8, dark: bool) -> egui::Color32 {
    use egui::Color32;
    match (intensity, dark) {
        (0, true) => Color32::from_rgb(23, 23, 23),
        (0, false) => Color32::from_rgb(229, 229, 229),
        (1, true) => Color32::from_rgb(6, 78, 59),
        (1, false) => Color32::from_rgb(167, 243, 208),
        (2, true) => Color32::from_rgb(4, 120, 87),
        (2, false) => Color32::from_rgb(52, 211, 153),
        (3, _) => Color32::from_rgb(16, 185, 129),
        (_, true) => Color32::from_rgb(110, 231, 183),
        (_, false) => Color32::from_rgb(4, 120, 87),
    }
}

fn card<R>(ui: &mut egui::Ui, add_contents: impl FnOnce(&mut egui::Ui) -> R) -> R {
    egui::Frame::group(ui.style())
        .rounding(24.0)
        .inner_margin(24.0)
        .show(ui, add_contents)
        .inner
}

pub fn show(ui: &mut egui::Ui, profile: &UserProfile, signed_in_at: DateTime<Utc>) {
    ui.heading(egui::RichText::new("Dashboard").size(30.0).strong());
    ui.add_space(24.0);

    let full = ui.available_width();
    ui.horizontal_top(|ui| {
        ui.allocate_ui(egui::vec2(full * 0.64, 220.0), |ui| {
            card(ui, |ui| {
                ui.set_min_size(egui::vec2(ui.available_width(), 170.0));
                welcome(ui, profile);
            });
        });
        ui.allocate_ui(egui::vec2(ui.available_width(), 220.0), |ui| {
            card(ui, |ui| {
                ui.set_min_size(egui::vec2(ui.available_width(), 170.0));
                time_spent(ui, minutes_since(signed_in_at, Utc::now()), SUBJECT);
            });
        });
    });
    ui.add_space(12.0);
    card(ui, |ui| {
        ui.set_min_width(ui.available_width());
        activity(ui, &heatmap(Utc::now().date_naive()));
    });
}

fn welcome(ui: &mut egui::Ui, profile: &UserProfile) {
    ui.horizontal(|ui| {
        let (rect, _) = ui.allocate_exact_size(egui::vec2(96.0, 96.0), egui::Sense::hover());
        ui.painter().circle_filled(rect.center(), 48.0, egui::Color32::from_rgb(236, 72, 153));
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            profile.initial(),
            egui::FontId::proportional(36.0),
            egui::Color32::WHITE,
        );
        ui.add_space(16.0);
        ui.vertical(|ui| {
            ui.label(egui::RichText::new(&profile.name).size(28.0).strong());
            let gender = profile.gender.as_deref().unwrap_or("Not Set");
            ui.label(egui::RichText::new(format!("👤 {gender}")).weak());
            let age = match profile.age {
                Some(age) => format!("🗓 {age} years old"),
                None => "🗓 Age not set".to_string(),
            };
            ui.label(egui::RichText::new(age).weak());
        });
    });
}

fn time_spent(ui: &mut egui::Ui, minutes: i64, subject: &str) {
    ui.label(egui::RichText::new("TIME SPENT TODAY").small().weak());
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new(minutes.to_string()).size(44.0).strong());
        ui.label(egui::RichText::new("mins").size(18.0).weak());
    });
    ui.horizontal(|ui| {
        ui.label(egui::RichText::new("studying").weak());
        ui.label(egui::RichText::new(subject).strong());
    });
    ui.add_space(8.0);

    // Four day bars; only today is filled.
    let width = ui.available_width();
    let (rect, _) = ui.allocate_exact_size(egui::vec2(width, 48.0), egui::Sense::hover());
    let bar_w = (rect.width() - 3.0 * 4.0) / 4.0;
    for i in 0..4 {
        let bar = egui::Rect::from_min_size(
            rect.min + egui::vec2(i as f32 * (bar_w + 4.0), 0.0),
            egui::vec2(bar_w, rect.height()),
        );
        ui.painter().rect_filled(bar, 2.0, ui.visuals().faint_bg_color);
        if i == 3 {
            let fill = egui::Rect::from_min_max(
                egui::pos2(bar.min.x, bar.max.y - bar.height() * 0.95),
                bar.max,
            );
            ui.painter().rect_filled(fill, 2.0, egui::Color32::from_rgb(249, 115, 22));
        }
    }
}

fn activity(ui: &mut egui::Ui, days: &[HeatmapDay]) {
    ui.label(egui::RichText::new("🗓 Activity").size(18.0).strong());
    ui.add_space(8.0);

    let dark = ui.visuals().dark_mode;
    let columns = days.len().div_ceil(7);
    egui::ScrollArea::horizontal().show(ui, |ui| {
        let size = egui::vec2(columns as f32 * (CELL + GAP), 7.0 * (CELL + GAP));
        let (rect, response) = ui.allocate_exact_size(size, egui::Sense::hover());
        for (i, day) in days.iter().enumerate() {
            let cell = egui::Rect::from_min_size(
                rect.min + egui::vec2((i / 7) as f32 * (CELL + GAP), (i % 7) as f32 * (CELL + GAP)),
                egui::vec2(CELL, CELL),
            );
            ui.painter().rect_filled(cell, 2.0, intensity_color(day.intensity, dark));
        }

        if let Some(pos) = response.hover_pos() {
            let rel = pos - rect.min;
            let col = (rel.x / (CELL + GAP)) as usize;
            let row = (rel.y / (CELL + GAP)) as usize;
            if let Some(day) = days.get(col * 7 + row.min(6)) {
                let status = if day.intensity > 0 { "Active" } else { "No activity" };
                response.on_hover_text(format!("{}: {}", day.date.format("%Y-%m-%d"), status));
            }
        }
    });

    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
        ui.label(egui::RichText::new("More").small().weak());
        for intensity in [4, 2, 0] {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter().rect_filled(rect, 2.0, intensity_color(intensity, dark));
        }
        ui.label(egui::RichText::new("Less").small().weak());
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_heatmap_spans_a_year_ending_today() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let days = heatmap(today);
        assert_eq!(days.len(), 365);
        assert_eq!(days.last().map(|d| d.date), Some(today));
        assert_eq!(days[0].date, NaiveDate::from_ymd_opt(2023, 3, 3).unwrap());
        assert!(days.windows(2).all(|w| w[0].date < w[1].date));
    }

    #[test]
    fn test_only_today_is_active() {
        let days = heatmap(NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());
        let active: Vec<_> = days.iter().filter(|d| d.intensity > 0).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].intensity, 3);
        assert_eq!(active[0].date, days[364].date);
    }

    #[test]
    fn test_minutes_since_sign_in() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 27, 59).unwrap();
        assert_eq!(minutes_since(start, now), 27);
        assert_eq!(minutes_since(now, start), 0);
    }
}
