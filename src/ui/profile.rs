// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Profile setup form.

use crate::models::profile::{ProfileField, ProfileUpdate, UserProfile, MAX_AGE, MIN_AGE, STREAMS};

const GENDERS: [&str; 4] = ["Male", "Female", "Other", "Prefer not to say"];

pub enum ProfileAction {
    None,
    Save(ProfileUpdate),
}

/// Editable copy of the profile. Age is kept as text while typing.
#[derive(Debug, Default)]
pub struct ProfileForm {
    pub update: ProfileUpdate,
    pub age_text: String,
    pub error: Option<ProfileField>,
}

pub fn field_message(field: ProfileField) -> String {
    match field {
        ProfileField::Name => "Please enter your full name".to_string(),
        ProfileField::University => "Please enter your university or college".to_string(),
        ProfileField::Stream => "Please pick a stream from the list".to_string(),
        ProfileField::Age => format!("Age must be a number between {MIN_AGE} and {MAX_AGE}"),
    }
}

/// Blank means "not given"; anything else must be a whole number.
pub fn parse_age(text: &str) -> Result<Option<u8>, ProfileField> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }
    text.parse::<u8>().map(Some).map_err(|_| ProfileField::Age)
}

impl ProfileForm {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let update = ProfileUpdate::from_profile(profile);
        Self {
            age_text: update.age.map(|a| a.to_string()).unwrap_or_default(),
            update,
            error: None,
        }
    }

    /// Validated update ready to save.
    pub fn submission(&self) -> Result<ProfileUpdate, ProfileField> {
        let mut update = self.update.clone();
        update.age = parse_age(&self.age_text)?;
        update.validate()?;
        Ok(update)
    }
}

fn field(ui: &mut egui::Ui, label: &str, value: &mut String, hint: &str) {
    ui.label(label);
    ui.add(
        egui::TextEdit::singleline(value)
            .hint_text(hint)
            .desired_width(f32::INFINITY),
    );
    ui.add_space(10.0);
}

fn choice(ui: &mut egui::Ui, id: &str, value: &mut Option<String>, placeholder: &str, options: &[&str]) {
    egui::ComboBox::from_id_source(id)
        .selected_text(value.as_deref().unwrap_or(placeholder))
        .width(ui.available_width().min(320.0))
        .show_ui(ui, |ui| {
            for option in options {
                ui.selectable_value(value, Some(option.to_string()), *option);
            }
        });
}

pub fn show(ui: &mut egui::Ui, form: &mut ProfileForm, busy: bool) -> ProfileAction {
    let mut action = ProfileAction::None;

    ui.vertical_centered(|ui| {
        ui.set_max_width(640.0);
        ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
            ui.heading(egui::RichText::new("Profile Setup").size(30.0).strong());
            ui.label(egui::RichText::new("Manage your personal information.").weak());
            ui.add_space(24.0);

            egui::Frame::group(ui.style())
                .rounding(24.0)
                .inner_margin(32.0)
                .show(ui, |ui| {
                    let initial = form.update.name.chars().next().map(|c| c.to_uppercase().to_string());
                    let (rect, _) = ui.allocate_exact_size(egui::vec2(96.0, 96.0), egui::Sense::hover());
                    ui.painter().circle(
                        rect.center(),
                        48.0,
                        ui.visuals().faint_bg_color,
                        egui::Stroke::new(2.0, ui.visuals().weak_text_color()),
                    );
                    ui.painter().text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        initial.unwrap_or_else(|| "👤".to_string()),
                        egui::FontId::proportional(36.0),
                        ui.visuals().text_color(),
                    );
                    ui.add_space(16.0);

                    field(ui, "Full Name", &mut form.update.name, "Arjun Sharma");
                    field(ui, "University / College", &mut form.update.university, "IIT Bombay");

                    ui.horizontal_top(|ui| {
                        ui.vertical(|ui| {
                            ui.label("Stream");
                            choice(ui, "profile_stream", &mut form.update.stream, "Select Stream", &STREAMS);
                        });
                        ui.add_space(16.0);
                        ui.vertical(|ui| {
                            ui.label("Age");
                            ui.add(
                                egui::TextEdit::singleline(&mut form.age_text)
                                    .hint_text("20")
                                    .desired_width(80.0),
                            );
                        });
                        ui.add_space(16.0);
                        ui.vertical(|ui| {
                            ui.label("Gender");
                            choice(ui, "profile_gender", &mut form.update.gender, "Select Gender", &GENDERS);
                        });
                    });

                    if let Some(field) = form.error {
                        ui.add_space(10.0);
                        ui.colored_label(ui.visuals().error_fg_color, field_message(field));
                    }

                    ui.add_space(16.0);
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if busy {
                            ui.spinner();
                        } else if ui
                            .add(egui::Button::new("Save Changes").min_size(egui::vec2(140.0, 36.0)))
                            .clicked()
                        {
                            match form.submission() {
                                Ok(update) => {
                                    form.error = None;
                                    action = ProfileAction::Save(update);
                                }
                                Err(field) => form.error = Some(field),
                            }
                        }
                    });
                });
        });
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::Identity;
    use crate::models::profile::NOT_SET;

    fn profile() -> UserProfile {
        let mut profile = UserProfile::from_identity(&Identity {
            user_id: "u1".into(),
            name: "Meet Jain".into(),
            email: "meet@uni.edu".into(),
            avatar_url: None,
        });
        profile.university = Some(NOT_SET.into());
        profile
    }

    #[test]
    fn test_parse_age() {
        assert_eq!(parse_age(""), Ok(None));
        assert_eq!(parse_age(" 20 "), Ok(Some(20)));
        assert_eq!(parse_age("twenty"), Err(ProfileField::Age));
        assert_eq!(parse_age("300"), Err(ProfileField::Age));
    }

    #[test]
    fn test_form_prefills_and_validates() {
        let mut form = ProfileForm::from_profile(&profile());
        assert_eq!(form.update.name, "Meet Jain");
        assert_eq!(form.submission(), Err(ProfileField::University));

        form.update.university = "IIT Bombay".into();
        form.age_text = "9".into();
        assert_eq!(form.submission(), Err(ProfileField::Age));

        form.age_text = "20".into();
        let update = form.submission().unwrap();
        assert_eq!(update.age, Some(20));
    }

    #[test]
    fn test_every_field_has_a_message() {
        for field in [ProfileField::Name, ProfileField::University, ProfileField::Stream, ProfileField::Age] {
            assert!(!field_message(field).is_empty());
        }
        assert!(field_message(ProfileField::Age).contains("10"));
    }
}
