//! Console views and their paths

/// Path of the public entry view
pub const PUBLIC_ROOT: &str = "/";

/// Every view of the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Login form
    Login,
    /// Landing page after login
    Home,
    /// Agent list
    Agents,
    /// Agent create/edit form
    AddAgent,
    /// Attachment list
    Attachments,
    /// Customer service transcripts
    Transcripts,
    /// System settings
    Settings,
}

impl Route {
    /// All routes, in menu order
    pub const ALL: [Route; 7] = [
        Route::Login,
        Route::Home,
        Route::Agents,
        Route::AddAgent,
        Route::Attachments,
        Route::Transcripts,
        Route::Settings,
    ];

    /// URL path of the view
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => PUBLIC_ROOT,
            Route::Home => "/home",
            Route::Agents => "/agentes",
            Route::AddAgent => "/add-agente",
            Route::Attachments => "/anexos",
            Route::Transcripts => "/atendimentos",
            Route::Settings => "/configuracoes",
        }
    }

    /// Resolve a path to a view
    pub fn from_path(path: &str) -> Option<Route> {
        Route::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Whether the view requires an authenticated session
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Login)
    }
}

/// Outcome of evaluating the route guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    /// Render the requested view
    Render,
    /// Render nothing and navigate to this path instead
    Redirect(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_round_trip() {
        for route in Route::ALL {
            assert_eq!(Route::from_path(route.path()), Some(route));
        }
        assert_eq!(Route::from_path("/nope"), None);
    }

    #[test]
    fn test_only_login_is_public() {
        assert!(!Route::Login.is_protected());
        assert!(Route::ALL[1..].iter().all(Route::is_protected));
    }
}
