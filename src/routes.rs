// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Route table and guards.

use crate::models::identity::SessionState;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Landing,
    Auth,
    Dashboard,
    Profile,
    Vault,
    Settings,
    /// Any other path, kept for the fallback page.
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Self {
        let trimmed = path.trim();
        let normalized = match trimmed.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        match normalized {
            "/" => Route::Landing,
            "/auth" => Route::Auth,
            "/dashboard" => Route::Dashboard,
            "/profile" => Route::Profile,
            "/vault" => Route::Vault,
            "/settings" => Route::Settings,
            _ => Route::NotFound(trimmed.to_string()),
        }
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Landing => "/",
            Route::Auth => "/auth",
            Route::Dashboard => "/dashboard",
            Route::Profile => "/profile",
            Route::Vault => "/vault",
            Route::Settings => "/settings",
            Route::NotFound(path) => path,
        }
    }

    /// Pages that need a signed-in user.
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            Route::Dashboard | Route::Profile | Route::Vault | Route::Settings
        )
    }

    /// Pages drawn inside the sidebar layout.
    pub fn has_sidebar(&self) -> bool {
        self.is_protected()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// What to do with a requested route given the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Render(Route),
    Redirect(Route),
    /// The session is still being restored; show a spinner.
    Loading,
}

pub fn resolve(route: &Route, session: &SessionState) -> Resolution {
    match (route, session) {
        (Route::Landing | Route::NotFound(_), _) => Resolution::Render(route.clone()),
        (_, SessionState::Loading) => Resolution::Loading,
        (Route::Auth, SessionState::Authenticated(_)) => Resolution::Redirect(Route::Dashboard),
        (r, SessionState::Anonymous) if r.is_protected() => Resolution::Redirect(Route::Auth),
        (r, _) => Resolution::Render(r.clone()),
    }
}

/// The page being shown.
#[derive(Debug, Clone)]
pub struct Router {
    current: Route,
}

impl Default for Router {
    fn default() -> Self {
        Self {
            current: Route::Landing,
        }
    }
}

impl Router {
    pub fn navigate(&mut self, route: Route) {
        if route != self.current {
            log::debug!("Navigate {} -> {}", self.current, route);
            self.current = route;
        }
    }

    /// Apply guards, following redirects until a page can render.
    pub fn resolve(&mut self, session: &SessionState) -> Resolution {
        // Redirects form a chain of at most two hops.
        for _ in 0..3 {
            match resolve(&self.current, session) {
                Resolution::Redirect(target) => {
                    log::info!("Redirecting {} -> {}", self.current, target);
                    self.current = target;
                }
                other => return other,
            }
        }
        Resolution::Render(self.current.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::identity::Identity;

    fn signed_in() -> SessionState {
        SessionState::Authenticated(Identity {
            user_id: "u1".into(),
            name: "Sarah".into(),
            email: "sarah@example.com".into(),
            avatar_url: None,
        })
    }

    #[test]
    fn test_parse_and_path() {
        for path in ["/", "/auth", "/dashboard", "/profile", "/vault", "/settings"] {
            assert_eq!(Route::parse(path).path(), path);
        }
        assert_eq!(Route::parse("/vault/"), Route::Vault);
        assert_eq!(Route::parse(""), Route::Landing);
        assert_eq!(Route::parse("/nope"), Route::NotFound("/nope".into()));
    }

    #[test]
    fn test_protected_routes_redirect_when_anonymous() {
        for route in [Route::Dashboard, Route::Profile, Route::Vault, Route::Settings] {
            assert_eq!(resolve(&route, &SessionState::Anonymous), Resolution::Redirect(Route::Auth));
            assert_eq!(resolve(&route, &signed_in()), Resolution::Render(route.clone()));
        }
    }

    #[test]
    fn test_auth_redirects_when_signed_in() {
        assert_eq!(resolve(&Route::Auth, &signed_in()), Resolution::Redirect(Route::Dashboard));
        assert_eq!(resolve(&Route::Auth, &SessionState::Anonymous), Resolution::Render(Route::Auth));
    }

    #[test]
    fn test_loading_waits_but_public_pages_render() {
        assert_eq!(resolve(&Route::Vault, &SessionState::Loading), Resolution::Loading);
        assert_eq!(resolve(&Route::Landing, &SessionState::Loading), Resolution::Render(Route::Landing));
        let unknown = Route::parse("/x");
        assert_eq!(resolve(&unknown, &SessionState::Loading), Resolution::Render(unknown.clone()));
    }

    #[test]
    fn test_router_follows_redirects() {
        let mut router = Router::default();
        router.navigate(Route::Vault);
        assert_eq!(router.resolve(&SessionState::Anonymous), Resolution::Render(Route::Auth));
        assert_eq!(router.current, Route::Auth);
        assert_eq!(router.resolve(&signed_in()), Resolution::Render(Route::Dashboard));
    }
}
