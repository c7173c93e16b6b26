//! Static route table mapping URL paths to views.
//!
//! SYSTEM CONTEXT
//! ==============
//! The navigation integration resolves the current location here to decide
//! which view mounts, and hands the extracted path parameters (character or
//! event id) to that view. No guards, redirects, or lazy loading.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

/// Views the application can mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum View {
    WorldView,
    Characters,
    CharacterChat,
    Events,
    EventDetail,
    GameMode,
    Werewolf,
}

impl View {
    /// The table entry for this view.
    pub fn route(self) -> &'static Route {
        // Every view has exactly one entry in ROUTES.
        ROUTES.iter().find(|r| r.view == self).unwrap_or(&ROUTES[0])
    }
}

/// One `{path, name, view}` entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Route {
    /// `matchit` pattern; `{id}` captures one segment.
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
}

pub const ROUTES: &[Route] = &[
    Route { path: "/", name: "WorldView", view: View::WorldView },
    Route { path: "/characters", name: "Characters", view: View::Characters },
    Route { path: "/character/{id}/chat", name: "CharacterChat", view: View::CharacterChat },
    Route { path: "/events", name: "Events", view: View::Events },
    Route { path: "/event/{id}", name: "EventDetail", view: View::EventDetail },
    Route { path: "/game-mode", name: "GameMode", view: View::GameMode },
    Route { path: "/werewolf", name: "Werewolf", view: View::Werewolf },
];

/// A resolved location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    pub route: &'static Route,
    /// Captured path parameters, in pattern order.
    pub params: Vec<(String, String)>,
}

impl RouteMatch {
    pub fn view(&self) -> View {
        self.route.view
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }
}

/// [`ROUTES`] compiled into a radix-tree matcher.
pub struct RouteTable {
    router: matchit::Router<&'static Route>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let mut router = matchit::Router::new();
        for route in ROUTES {
            if let Err(error) = router.insert(route.path, route) {
                tracing::error!(path = route.path, %error, "route rejected");
            }
        }
        Self { router }
    }
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a browser location (path, optionally with query string or
    /// fragment) to its route. Unknown paths resolve to `None`.
    pub fn resolve(&self, location: &str) -> Option<RouteMatch> {
        let path = location.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => "/",
            trimmed => trimmed,
        };
        let matched = self.router.at(path).ok()?;
        let params = matched.params.iter().map(|(k, v)| (k.to_owned(), v.to_owned())).collect();
        Some(RouteMatch { route: *matched.value, params })
    }
}

/// Location of the chat view for `character_id`.
pub fn character_chat_path(character_id: &str) -> String {
    format!("/character/{character_id}/chat")
}

/// Location of the detail view for `event_id`.
pub fn event_detail_path(event_id: &str) -> String {
    format!("/event/{event_id}")
}
