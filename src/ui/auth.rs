// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Sign-in / sign-up page.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    SignIn,
    SignUp,
}

/// What the user asked for this frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthAction {
    None,
    Back,
    ToggleTheme,
    SignIn {
        email: String,
        password: String,
    },
    SignUp {
        email: String,
        password: String,
        name: Option<String>,
    },
}

#[derive(Debug, Default)]
pub struct AuthForm {
    pub mode: AuthMode,
    pub email: String,
    pub password: String,
    pub name: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl AuthForm {
    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            AuthMode::SignIn => AuthMode::SignUp,
            AuthMode::SignUp => AuthMode::SignIn,
        };
        self.error = None;
        self.notice = None;
    }

    /// Build the request for the current mode, or say what is missing.
    pub fn submission(&self) -> Result<AuthAction, String> {
        let email = self.email.trim();
        if email.is_empty() {
            return Err("Please enter your email address".to_string());
        }
        if self.password.is_empty() {
            return Err("Please enter your password".to_string());
        }
        Ok(match self.mode {
            AuthMode::SignIn => AuthAction::SignIn {
                email: email.to_string(),
                password: self.password.clone(),
            },
            AuthMode::SignUp => {
                let name = self.name.trim();
                AuthAction::SignUp {
                    email: email.to_string(),
                    password: self.password.clone(),
                    name: (!name.is_empty()).then(|| name.to_string()),
                }
            }
        })
    }

    /// Forget the password once a request has been answered.
    pub fn finish(&mut self, error: Option<String>) {
        self.password.clear();
        self.error = error;
    }

    pub fn confirmation_sent(&mut self) {
        self.password.clear();
        self.error = None;
        self.notice = Some("Check your email to confirm your account, then sign in.".to_string());
        self.mode = AuthMode::SignIn;
    }
}

pub fn show(ui: &mut egui::Ui, form: &mut AuthForm, busy: bool) -> AuthAction {
    let mut action = AuthAction::None;

    ui.horizontal(|ui| {
        if ui.button("← Back").clicked() {
            action = AuthAction::Back;
        }
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let icon = if ui.visuals().dark_mode { "☀" } else { "🌙" };
            if ui.button(icon).on_hover_text("Toggle theme").clicked() {
                action = AuthAction::ToggleTheme;
            }
        });
    });

    ui.vertical_centered(|ui| {
        ui.set_max_width(420.0);
        ui.add_space(40.0);
        ui.heading(egui::RichText::new("Baithak").size(36.0).strong());
        ui.add_space(16.0);

        let (title, subtitle) = match form.mode {
            AuthMode::SignIn => ("Sign in", "Welcome back! Please sign in to continue"),
            AuthMode::SignUp => ("Create an account", "Enter your details to get started"),
        };
        ui.label(egui::RichText::new(title).size(28.0).strong());
        ui.label(egui::RichText::new(subtitle).weak());
        ui.add_space(24.0);

        egui::Frame::group(ui.style())
            .rounding(16.0)
            .inner_margin(24.0)
            .show(ui, |ui| {
                ui.with_layout(egui::Layout::top_down(egui::Align::Min), |ui| {
                    ui.label("Email address");
                    ui.add(
                        egui::TextEdit::singleline(&mut form.email)
                            .hint_text("Enter your email address")
                            .desired_width(f32::INFINITY),
                    );
                    ui.add_space(8.0);

                    ui.label("Password");
                    let password = ui.add(
                        egui::TextEdit::singleline(&mut form.password)
                            .password(true)
                            .hint_text("Enter your password")
                            .desired_width(f32::INFINITY),
                    );
                    ui.add_space(8.0);

                    if form.mode == AuthMode::SignUp {
                        ui.label("Full Name");
                        ui.add(
                            egui::TextEdit::singleline(&mut form.name)
                                .hint_text("Enter your full name")
                                .desired_width(f32::INFINITY),
                        );
                        ui.add_space(8.0);
                    }

                    let submit_on_enter =
                        password.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        let clicked = ui
                            .add_enabled(!busy, egui::Button::new("Continue").min_size(egui::vec2(120.0, 32.0)))
                            .clicked();
                        if busy {
                            ui.spinner();
                        }
                        if (clicked || submit_on_enter) && !busy {
                            match form.submission() {
                                Ok(request) => {
                                    form.error = None;
                                    form.notice = None;
                                    action = request;
                                }
                                Err(message) => form.error = Some(message),
                            }
                        }
                    });

                    if let Some(error) = &form.error {
                        ui.add_space(8.0);
                        ui.colored_label(ui.visuals().error_fg_color, error);
                    }
                    if let Some(notice) = &form.notice {
                        ui.add_space(8.0);
                        ui.label(egui::RichText::new(notice).italics());
                    }
                });
            });

        ui.add_space(16.0);
        ui.horizontal(|ui| {
            let (prompt, link) = match form.mode {
                AuthMode::SignIn => ("Don't have an account?", "Sign up"),
                AuthMode::SignUp => ("Already have an account?", "Sign in"),
            };
            ui.label(egui::RichText::new(prompt).weak());
            if ui.link(link).clicked() {
                form.toggle_mode();
            }
        });
        ui.add_space(8.0);
        ui.label(egui::RichText::new("🔒 Secured connection").small().weak());
    });

    action
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_in_submission_trims_email() {
        let form = AuthForm {
            email: "  meet@uni.edu ".into(),
            password: "secret1".into(),
            ..Default::default()
        };
        assert_eq!(
            form.submission(),
            Ok(AuthAction::SignIn {
                email: "meet@uni.edu".into(),
                password: "secret1".into(),
            })
        );
    }

    #[test]
    fn test_sign_up_name_is_optional() {
        let mut form = AuthForm {
            email: "meet@uni.edu".into(),
            password: "secret1".into(),
            name: "  ".into(),
            ..Default::default()
        };
        form.toggle_mode();
        assert!(matches!(form.submission(), Ok(AuthAction::SignUp { name: None, .. })));
        form.name = "Meet Jain".into();
        assert!(matches!(form.submission(), Ok(AuthAction::SignUp { name: Some(_), .. })));
    }

    #[test]
    fn test_missing_fields_are_reported() {
        let mut form = AuthForm::default();
        assert!(form.submission().is_err());
        form.email = "meet@uni.edu".into();
        assert_eq!(form.submission(), Err("Please enter your password".to_string()));
    }

    #[test]
    fn test_confirmation_returns_to_sign_in() {
        let mut form = AuthForm {
            mode: AuthMode::SignUp,
            password: "secret1".into(),
            ..Default::default()
        };
        form.confirmation_sent();
        assert_eq!(form.mode, AuthMode::SignIn);
        assert!(form.password.is_empty());
        assert!(form.notice.is_some());
    }
}
