// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Route-level error page.

/// Why the fallback page is shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// No route matches the path.
    NotFound(String),
    /// A page-level operation failed.
    Failure(String),
}

impl PageError {
    /// Status line or error message shown under the apology.
    pub fn detail(&self) -> String {
        match self {
            PageError::NotFound(_) => "404 Not Found".to_string(),
            PageError::Failure(message) if message.trim().is_empty() => "Unknown Error".to_string(),
            PageError::Failure(message) => message.clone(),
        }
    }
}

/// Returns true when "Go Home" was clicked.
pub fn show(ui: &mut egui::Ui, error: &PageError) -> bool {
    let mut go_home = false;
    ui.vertical_centered(|ui| {
        ui.add_space(ui.available_height() * 0.3);
        ui.heading(egui::RichText::new("Oops!").size(36.0).strong());
        ui.add_space(12.0);
        ui.label(egui::RichText::new("Sorry, an unexpected error has occurred.").size(20.0).weak());
        ui.add_space(12.0);
        egui::Frame::none()
            .fill(ui.visuals().faint_bg_color)
            .inner_margin(8.0)
            .rounding(4.0)
            .show(ui, |ui| {
                ui.label(egui::RichText::new(error.detail()).monospace());
            });
        ui.add_space(16.0);
        go_home = ui.button("Go Home").clicked();
    });
    go_home
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detail_text() {
        assert_eq!(PageError::NotFound("/nope".into()).detail(), "404 Not Found");
        assert_eq!(PageError::Failure("Not signed in".into()).detail(), "Not signed in");
        assert_eq!(PageError::Failure(" ".into()).detail(), "Unknown Error");
    }
}
