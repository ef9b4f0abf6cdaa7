// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Navigation sidebar shared by the signed-in pages.
//!
//! Lists the four sections plus Logout, with the user's initials and
//! name at the foot.

use crate::routes::Route;

pub enum SidebarAction {
    None,
    Navigate(Route),
    Logout,
}

const LINKS: [(&str, &str, Route); 4] = [
    ("▦", "Dashboard", Route::Dashboard),
    ("🗀", "The Vault", Route::Vault),
    ("👤", "Profile", Route::Profile),
    ("⚙", "Settings", Route::Settings),
];

/// Up to two uppercase initials, e.g. "AS" for "Arjun Sharma".
pub fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .filter_map(|word| word.chars().next())
        .take(2)
        .flat_map(char::to_uppercase)
        .collect();
    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

/// Display the sidebar, highlighting `current`.
pub fn show(ui: &mut egui::Ui, current: &Route, user_name: &str) -> SidebarAction {
    let mut action = SidebarAction::None;

    ui.add_space(12.0);
    ui.label(egui::RichText::new("Baithak").size(22.0).strong());
    ui.add_space(24.0);

    ui.spacing_mut().item_spacing.y = 6.0;
    for (icon, label, route) in LINKS {
        let selected = *current == route;
        if ui
            .selectable_label(selected, format!("{icon}  {label}"))
            .clicked()
            && !selected
        {
            action = SidebarAction::Navigate(route);
        }
    }
    if ui.selectable_label(false, "⎋  Logout").clicked() {
        action = SidebarAction::Logout;
    }

    ui.with_layout(egui::Layout::bottom_up(egui::Align::Min), |ui| {
        ui.add_space(12.0);
        ui.horizontal(|ui| {
            let (rect, response) = ui.allocate_exact_size(egui::vec2(28.0, 28.0), egui::Sense::click());
            ui.painter().circle_filled(rect.center(), 14.0, ui.visuals().widgets.inactive.bg_fill);
            ui.painter().text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                initials(user_name),
                egui::FontId::proportional(11.0),
                ui.visuals().strong_text_color(),
            );
            let name = ui.add(egui::Label::new(user_name).sense(egui::Sense::click()));
            if response.clicked() || name.clicked() {
                action = SidebarAction::Navigate(Route::Profile);
            }
        });
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initials() {
        assert_eq!(initials("Arjun Sharma"), "AS");
        assert_eq!(initials("meet"), "M");
        assert_eq!(initials("Ana de la Cruz"), "AD");
        assert_eq!(initials("   "), "?");
    }
}
