use crate::session::SessionStore;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Login,
    Tracker,
    Gallery,
}

impl Route {
    /// Resolves a path against the routing table. Unknown paths land on the tracker.
    pub fn resolve(path: &str) -> Route {
        match path.trim_matches('/') {
            "login" => Route::Login,
            "gallery" => Route::Gallery,
            _ => Route::Tracker,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Login => "/login",
            Route::Tracker => "/",
            Route::Gallery => "/gallery",
        }
    }

    pub fn requires_session(self) -> bool {
        !matches!(self, Route::Login)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Returns the route that may actually be shown: protected routes fall back to
/// the login view when no token is persisted.
pub fn guard(route: Route, session: &SessionStore) -> Route {
    if route.requires_session() && !session.is_logged_in() {
        Route::Login
    } else {
        route
    }
}
