//! Hash-style routing between the viewer's pages.

/// Page shown in the window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    About,
    Scene,
    NotFound,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::About => "About",
            View::Scene => "Scene",
            View::NotFound => "Not found",
        }
    }
}

/// What a route path resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteTarget {
    View(View),
    Redirect(&'static str),
}

#[derive(Debug, Clone, Copy)]
pub struct Route {
    pub path: &'static str,
    pub target: RouteTarget,
}

pub const NOT_FOUND_PATH: &str = "/404";

pub static ROUTES: &[Route] = &[
    Route {
        path: "/about",
        target: RouteTarget::View(View::About),
    },
    Route {
        path: "/scene",
        target: RouteTarget::View(View::Scene),
    },
    Route {
        path: NOT_FOUND_PATH,
        target: RouteTarget::View(View::NotFound),
    },
    Route {
        path: "/",
        target: RouteTarget::Redirect("/scene"),
    },
];

/// Links shown in the navigation bar
pub const NAV_LINKS: &[(&str, &str)] = &[("/scene", "Scene"), ("/about", "About")];

/// Strip a leading `#` and make the path absolute
pub fn normalize(path: &str) -> String {
    let path = path.trim();
    let path = path.strip_prefix('#').unwrap_or(path);
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Resolve a path to a view, following redirects
///
/// Returns the final path and its view. Unknown paths land on the
/// not-found page.
pub fn resolve(path: &str) -> (String, View) {
    let mut current = normalize(path);

    // The table is static, so a handful of hops is always enough
    for _ in 0..ROUTES.len() {
        let target = ROUTES
            .iter()
            .find(|r| r.path == current)
            .map(|r| r.target)
            .unwrap_or(RouteTarget::Redirect(NOT_FOUND_PATH));

        match target {
            RouteTarget::View(view) => return (current, view),
            RouteTarget::Redirect(to) => {
                log::debug!("Route {} redirects to {}", current, to);
                current = to.to_string();
            }
        }
    }

    (NOT_FOUND_PATH.to_string(), View::NotFound)
}

/// Tracks the active route
#[derive(Debug, Clone)]
pub struct Router {
    path: String,
    view: View,
}

impl Router {
    pub fn new(initial: &str) -> Self {
        let (path, view) = resolve(initial);
        log::info!("Route: {}", path);
        Self { path, view }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn view(&self) -> View {
        self.view
    }

    /// Move to `path`; returns true when the active view changed
    pub fn navigate(&mut self, path: &str) -> bool {
        let (path, view) = resolve(path);
        let changed = view != self.view;
        if path != self.path {
            log::info!("Route: {} -> {}", self.path, path);
        }
        self.path = path;
        self.view = view;
        changed
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new("/")
    }
}
