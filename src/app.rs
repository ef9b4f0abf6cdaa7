// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Main application state and egui App implementation.
//!
//! `BaithakApp` owns the session, the router and every page's state. Backend
//! calls run on background threads through [`TaskSlot`]s and are polled at
//! the top of each frame; pages report what the user did as action values
//! that are handled here.

use crate::backend::{Backend, BackendError, BackendResult, SignUp};
use crate::config::{AppConfig, Theme};
use crate::models::identity::{Identity, SessionState};
use crate::models::profile::{ProfileUpdate, UserProfile};
use crate::routes::{Resolution, Route, Router};
use crate::ui::{auth, dashboard, fallback, landing, profile, settings, sidebar, vault};
use crate::util::task::TaskSlot;
use crate::vault::VaultStore;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use std::time::Duration;

/// Name shown for the signed-in user: the stored profile name when there is
/// one, otherwise whatever the identity provider knows.
fn user_name(identity: &Identity, profile: Option<&UserProfile>) -> String {
    match profile {
        Some(profile) if !profile.name.trim().is_empty() => profile.name.clone(),
        _ => identity.display_name(),
    }
}

/// Main application state.
pub struct BaithakApp {
    backend: Backend,
    theme: Theme,
    /// Theme currently installed in the egui context.
    applied_theme: Option<Theme>,

    session: SessionState,
    /// Start of the current signed-in session, for the dashboard timer.
    signed_in_at: DateTime<Utc>,
    profile: Option<UserProfile>,
    router: Router,
    page_error: Option<fallback::PageError>,

    restore_task: TaskSlot<BackendResult<Option<Identity>>>,
    /// Sign-in results arrive as `SignUp::SignedIn`.
    auth_task: TaskSlot<BackendResult<SignUp>>,
    profile_task: TaskSlot<UserProfile>,
    save_task: TaskSlot<BackendResult<UserProfile>>,
    sign_out_task: TaskSlot<BackendResult<()>>,

    store: VaultStore,
    landing: landing::LandingPage,
    auth_form: auth::AuthForm,
    profile_form: profile::ProfileForm,
    vault_page: vault::VaultPage,
}

impl BaithakApp {
    /// Create the app and start restoring any existing session.
    pub fn new(config: &AppConfig, backend: Backend, store: VaultStore, start: Route) -> Self {
        let sequence = &config.sequence;
        let mut router = Router::default();
        router.navigate(start);

        let mut app = Self {
            backend,
            theme: config.theme,
            applied_theme: None,
            session: SessionState::Loading,
            signed_in_at: Utc::now(),
            profile: None,
            router,
            page_error: None,
            restore_task: TaskSlot::default(),
            auth_task: TaskSlot::default(),
            profile_task: TaskSlot::default(),
            save_task: TaskSlot::default(),
            sign_out_task: TaskSlot::default(),
            store,
            landing: landing::LandingPage::new(sequence.sequence(), sequence.max_in_flight, sequence.scroll_pages),
            auth_form: auth::AuthForm::default(),
            profile_form: profile::ProfileForm::default(),
            vault_page: vault::VaultPage::default(),
        };
        app.restore_session();
        app
    }

    fn restore_session(&mut self) {
        log::info!("Restoring session from {} backend", self.backend.kind.label());
        let identity = self.backend.identity.clone();
        self.restore_task.spawn(move || identity.restore_session());
    }

    fn sign_in_as(&mut self, identity: Identity) {
        log::info!("Signed in as {} <{}>", identity.display_name(), identity.email);
        self.signed_in_at = Utc::now();
        self.profile = Some(UserProfile::from_identity(&identity));
        self.profile_form = profile::ProfileForm::default();
        self.load_profile(identity.clone());
        self.session = SessionState::Authenticated(identity);
    }

    fn load_profile(&mut self, identity: Identity) {
        let backend = self.backend.clone();
        self.profile_task.spawn(move || backend.load_profile(&identity));
    }

    fn set_profile(&mut self, profile: UserProfile) {
        self.profile_form = profile::ProfileForm::from_profile(&profile);
        self.profile = Some(profile);
    }

    fn submit_auth(&mut self, action: auth::AuthAction) {
        let identity = self.backend.identity.clone();
        match action {
            auth::AuthAction::SignIn { email, password } => {
                self.auth_task
                    .spawn(move || identity.sign_in(&email, &password).map(SignUp::SignedIn));
            }
            auth::AuthAction::SignUp { email, password, name } => {
                self.auth_task
                    .spawn(move || identity.sign_up(&email, &password, name.as_deref()));
            }
            _ => {}
        }
    }

    fn save_profile(&mut self, update: ProfileUpdate) {
        let Some(identity) = self.session.identity().cloned() else {
            self.fail(BackendError::NotAuthenticated);
            return;
        };
        let profiles = self.backend.profiles.clone();
        self.save_task.spawn(move || profiles.save_profile(&identity, &update));
    }

    /// Drop the session at once; the provider is told in the background.
    fn sign_out(&mut self) {
        if let Some(identity) = self.session.identity() {
            log::info!("Signing out {}", identity.email);
        }
        self.profile_task.cancel();
        self.save_task.cancel();
        self.auth_task.cancel();
        self.session = SessionState::Anonymous;
        self.profile = None;
        self.profile_form = profile::ProfileForm::default();
        self.auth_form = auth::AuthForm::default();
        self.router.navigate(Route::Auth);

        let identity = self.backend.identity.clone();
        self.sign_out_task.spawn(move || identity.sign_out());
    }

    /// Show a backend failure on the fallback page.
    fn fail(&mut self, error: BackendError) {
        log::error!("Backend request failed: {}", error);
        self.page_error = Some(fallback::PageError::Failure(error.to_string()));
    }

    /// Apply results of finished background jobs.
    fn poll_tasks(&mut self) {
        if let Some(result) = self.restore_task.poll() {
            match result {
                Ok(Some(identity)) => self.sign_in_as(identity),
                Ok(None) => {
                    log::info!("No existing session");
                    self.session = SessionState::Anonymous;
                }
                Err(e) => {
                    log::error!("Failed to restore session: {}", e);
                    self.session = SessionState::Anonymous;
                }
            }
        }

        if let Some(result) = self.auth_task.poll() {
            match result {
                Ok(SignUp::SignedIn(identity)) => {
                    self.auth_form.finish(None);
                    self.sign_in_as(identity);
                    self.router.navigate(Route::Dashboard);
                }
                Ok(SignUp::ConfirmationRequired) => {
                    log::info!("Sign-up needs email confirmation");
                    self.auth_form.confirmation_sent();
                }
                Err(e) => {
                    log::error!("Authentication failed: {}", e);
                    self.auth_form.finish(Some(e.to_string()));
                }
            }
        }

        if let Some(profile) = self.profile_task.poll() {
            log::info!("Profile loaded for {}", profile.email);
            self.set_profile(profile);
        }

        if let Some(result) = self.save_task.poll() {
            match result {
                Ok(profile) => {
                    log::info!("Profile saved for {}", profile.email);
                    self.set_profile(profile);
                    self.router.navigate(Route::Dashboard);
                }
                Err(e) => self.fail(e),
            }
        }

        if let Some(Err(e)) = self.sign_out_task.poll() {
            log::error!("Sign-out failed: {}", e);
        }
    }

    fn is_busy(&self) -> bool {
        self.restore_task.is_pending()
            || self.auth_task.is_pending()
            || self.profile_task.is_pending()
            || self.save_task.is_pending()
            || self.sign_out_task.is_pending()
    }

    fn apply_theme(&mut self, ctx: &egui::Context) {
        if self.applied_theme != Some(self.theme) {
            ctx.set_visuals(self.theme.visuals());
            self.applied_theme = Some(self.theme);
        }
    }

    fn handle_vault(&mut self, action: vault::VaultAction) {
        let result = match action {
            vault::VaultAction::None => return,
            vault::VaultAction::Upload(draft) => {
                let author = self
                    .session
                    .identity()
                    .map(|identity| user_name(identity, self.profile.as_ref()))
                    .unwrap_or_else(|| "User".to_string());
                let record = draft.into_resource(String::new(), author, Utc::now().to_rfc3339());
                self.store.apply(move |v| {
                    v.upload(record);
                    true
                })
            }
            vault::VaultAction::Upvote(id) => self.store.apply(|v| v.upvote(&id)),
            vault::VaultAction::Delete(id) => self.store.apply(|v| v.delete(&id)),
            vault::VaultAction::Import(path) => self.import_vault(path),
            vault::VaultAction::Export(path) => self.export_vault(path),
        };

        match result {
            Ok(_) => self.vault_page.status = None,
            Err(e) => self.vault_page.status = Some(format!("{:#}", e)),
        }
    }

    fn import_vault(&mut self, path: PathBuf) -> anyhow::Result<bool> {
        let imported = crate::io::serialization::import_vault(&path)?;
        if imported.is_empty() {
            log::warn!("{} holds no resources, the vault will be emptied", path.display());
        } else {
            log::info!("Imported {} resources from {}", imported.len(), path.display());
        }
        self.store.replace(imported)?;
        Ok(true)
    }

    fn export_vault(&self, path: PathBuf) -> anyhow::Result<bool> {
        crate::io::serialization::export_vault(self.store.vault(), &path)?;
        log::info!("Exported {} resources to {}", self.store.vault().len(), path.display());
        Ok(false)
    }

    fn show_sidebar(&mut self, ctx: &egui::Context, route: &Route) {
        let Some(identity) = self.session.identity() else {
            return;
        };
        let name = user_name(identity, self.profile.as_ref());
        let action = egui::SidePanel::left("sidebar")
            .resizable(false)
            .exact_width(220.0)
            .show(ctx, |ui| sidebar::show(ui, route, &name))
            .inner;

        match action {
            sidebar::SidebarAction::Navigate(target) => self.router.navigate(target),
            sidebar::SidebarAction::Logout => self.sign_out(),
            sidebar::SidebarAction::None => {}
        }
    }

    fn show_page(&mut self, ctx: &egui::Context, ui: &mut egui::Ui, route: Route) {
        match route {
            Route::Landing => {
                if let landing::LandingAction::Navigate(target) = self.landing.show(ctx, ui) {
                    self.router.navigate(target);
                }
            }
            Route::Auth => {
                let busy = self.auth_task.is_pending();
                match auth::show(ui, &mut self.auth_form, busy) {
                    auth::AuthAction::None => {}
                    auth::AuthAction::Back => self.router.navigate(Route::Landing),
                    auth::AuthAction::ToggleTheme => self.theme = self.theme.toggled(),
                    action => self.submit_auth(action),
                }
            }
            Route::Dashboard => match &self.profile {
                Some(profile) => dashboard::show(ui, profile, self.signed_in_at),
                None => loading(ui),
            },
            Route::Profile => {
                let busy = self.save_task.is_pending() || self.profile_task.is_pending();
                if let profile::ProfileAction::Save(update) = profile::show(ui, &mut self.profile_form, busy) {
                    self.save_profile(update);
                }
            }
            Route::Vault => {
                let action = vault::show(ctx, ui, &mut self.vault_page, self.store.vault());
                self.handle_vault(action);
            }
            Route::Settings => {
                let file = self.store.file().map(PathBuf::as_path);
                match settings::show(ui, self.theme, self.backend.kind, file) {
                    settings::SettingsAction::SetTheme(theme) => self.theme = theme,
                    settings::SettingsAction::SignOut => self.sign_out(),
                    settings::SettingsAction::None => {}
                }
            }
            Route::NotFound(path) => {
                if fallback::show(ui, &fallback::PageError::NotFound(path)) {
                    self.router.navigate(Route::Landing);
                }
            }
        }
    }
}

fn loading(ui: &mut egui::Ui) {
    ui.centered_and_justified(|ui| {
        ui.spinner();
    });
}

impl eframe::App for BaithakApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_tasks();
        self.apply_theme(ctx);

        // Keep polling while anything runs in the background
        if self.is_busy() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        if let Some(error) = self.page_error.clone() {
            self.landing.leave();
            egui::CentralPanel::default().show(ctx, |ui| {
                if fallback::show(ui, &error) {
                    self.page_error = None;
                    self.router.navigate(Route::Landing);
                }
            });
            return;
        }

        let route = match self.router.resolve(&self.session) {
            Resolution::Render(route) => Some(route),
            Resolution::Loading | Resolution::Redirect(_) => None,
        };

        if route != Some(Route::Landing) {
            self.landing.leave();
        }

        if let Some(route) = route.as_ref().filter(|r| r.has_sidebar()) {
            self.show_sidebar(ctx, route);
        }

        let frame = match route {
            Some(Route::Landing) => egui::Frame::none(),
            _ => egui::Frame::central_panel(&ctx.style()).inner_margin(32.0),
        };
        egui::CentralPanel::default().frame(frame).show(ctx, |ui| match route {
            Some(route) => self.show_page(ctx, ui, route),
            None => loading(ui),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity(name: &str) -> Identity {
        Identity {
            user_id: "u1".into(),
            name: name.into(),
            email: "meet@uni.edu".into(),
            avatar_url: None,
        }
    }

    #[test]
    fn test_user_name_prefers_profile() {
        let id = identity("Meet");
        let mut profile = UserProfile::from_identity(&id);
        profile.name = "Meet Jain".into();
        assert_eq!(user_name(&id, Some(&profile)), "Meet Jain");
        assert_eq!(user_name(&id, None), "Meet");
    }

    #[test]
    fn test_user_name_falls_back_to_email() {
        let id = identity("");
        let mut profile = UserProfile::from_identity(&id);
        profile.name = "  ".into();
        assert_eq!(user_name(&id, Some(&profile)), "meet");
    }
}
