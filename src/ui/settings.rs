// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Settings page.

use crate::backend::BackendKind;
use crate::config::Theme;

pub enum SettingsAction {
    None,
    SetTheme(Theme),
    SignOut,
}

pub fn show(ui: &mut egui::Ui, theme: Theme, backend: BackendKind, vault_file: Option<&std::path::Path>) -> SettingsAction {
    let mut action = SettingsAction::None;

    ui.heading(egui::RichText::new("Settings").size(30.0).strong());
    ui.add_space(24.0);

    egui::Frame::group(ui.style())
        .rounding(24.0)
        .inner_margin(28.0)
        .show(ui, |ui| {
            ui.set_min_width(ui.available_width());
            egui::Grid::new("settings_grid")
                .num_columns(2)
                .spacing([40.0, 14.0])
                .show(ui, |ui| {
                    ui.label("Appearance");
                    let mut selected = theme;
                    ui.horizontal(|ui| {
                        ui.selectable_value(&mut selected, Theme::Dark, "🌙 Dark");
                        ui.selectable_value(&mut selected, Theme::Light, "☀ Light");
                    });
                    if selected != theme {
                        action = SettingsAction::SetTheme(selected);
                    }
                    ui.end_row();

                    ui.label("Backend");
                    ui.label(egui::RichText::new(backend.label()).strong());
                    ui.end_row();

                    ui.label("Vault file");
                    match vault_file {
                        Some(path) => ui.label(egui::RichText::new(path.display().to_string()).monospace()),
                        None => ui.label(egui::RichText::new("Not saved to disk").weak()),
                    };
                    ui.end_row();

                    ui.label("Account");
                    if ui.button("Sign out").clicked() {
                        action = SettingsAction::SignOut;
                    }
                    ui.end_row();
                });
        });

    action
}
