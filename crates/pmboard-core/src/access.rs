//! Session predicate and route gate
//!
//! The gate decides, per navigation, which of three things a screen shows:
//! the unauthorized view, the forbidden view, or the screen itself. It only
//! reads the stored session; the server re-checks every API call, so this is
//! routing, not security.

use pmboard_types::{Role, Session};

/// Outcome of a protected-route check. Exactly one variant per check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    /// Token or role missing
    Unauthorized,
    /// Role present but not allowed here (unknown role strings included)
    Forbidden,
    /// Show the screen
    Render,
}

/// Outcome of a public-route (sign-in) check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicDecision {
    /// Already signed in: go to the role's home screen
    Redirect(&'static str),
    /// Show the public screen
    Render,
}

/// Decide whether `session` may see a screen restricted to `allowed`
pub fn authorize(session: &Session, allowed: &[Role]) -> GateDecision {
    if !session.is_authenticated() {
        return GateDecision::Unauthorized;
    }

    match session.role() {
        Some(role) if allowed.contains(&role) => GateDecision::Render,
        _ => GateDecision::Forbidden,
    }
}

/// Inverse check for sign-in-only screens.
///
/// An authenticated session with an unknown role has no home to go to, so
/// it gets the public screen and can sign in again.
pub fn public_gate(session: &Session) -> PublicDecision {
    match (session.is_authenticated(), session.role()) {
        (true, Some(role)) => PublicDecision::Redirect(role.home_path()),
        _ => PublicDecision::Render,
    }
}

/// What a route renders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    Dashboard,
    Projects,
    Tickets,
    Users,
    Assignments,
    Updates,
    Notifications,
}

/// A navigable screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDef {
    pub path: &'static str,
    pub title: &'static str,
    pub allowed: &'static [Role],
    pub screen: Screen,
    /// Listed in the sidebar
    pub nav: bool,
}

pub const ADMIN: &[Role] = &[Role::Admin];
pub const PM: &[Role] = &[Role::ProjectManager];
pub const DEV: &[Role] = &[Role::Developer];

const fn route(path: &'static str, title: &'static str, allowed: &'static [Role], screen: Screen) -> RouteDef {
    RouteDef { path, title, allowed, screen, nav: true }
}

/// Every role-prefixed screen of the dashboard
pub static ROUTES: &[RouteDef] = &[
    // Admin
    route("/admin/dashboard", "Dashboard", ADMIN, Screen::Dashboard),
    route("/admin/dashboard/projects", "Projects", ADMIN, Screen::Projects),
    route("/admin/dashboard/tickets", "Tickets", ADMIN, Screen::Tickets),
    route("/admin/dashboard/users", "Users", ADMIN, Screen::Users),
    route("/admin/dashboard/assignments", "Assignments", ADMIN, Screen::Assignments),
    route("/admin/dashboard/updates", "Team Updates", ADMIN, Screen::Updates),
    route("/admin/dashboard/notifications", "Notifications", ADMIN, Screen::Notifications),
    // Project manager
    route("/project-manager/dashboard", "Dashboard", PM, Screen::Dashboard),
    route("/project-manager/dashboard/projects", "Projects", PM, Screen::Projects),
    route("/project-manager/dashboard/tickets", "Tickets", PM, Screen::Tickets),
    route("/project-manager/dashboard/updates", "Team Updates", PM, Screen::Updates),
    route("/project-manager/dashboard/notifications", "Notifications", PM, Screen::Notifications),
    // Developer
    route("/developer-dashboard", "Dashboard", DEV, Screen::Dashboard),
    route("/developer-dashboard/tickets", "My Tickets", DEV, Screen::Tickets),
    route("/developer-dashboard/daily-updates", "Daily Updates", DEV, Screen::Updates),
    route("/developer-dashboard/notifications", "Notifications", DEV, Screen::Notifications),
];

/// A routed path: the screen plus the record id for detail views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub route: &'static RouteDef,
    pub detail: Option<String>,
}

/// Resolve a full path for rendering. Only ticket lists have a detail view
/// (`<tickets>/:id`); any other trailing segment is not a screen.
pub fn resolve(path: &str) -> Option<Resolved> {
    let route = route_for(path)?;
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let rest = path
        .strip_prefix(route.path)
        .unwrap_or_default()
        .trim_matches('/');

    match (route.screen, rest) {
        (_, "") => Some(Resolved { route, detail: None }),
        (Screen::Tickets, id) if !id.contains('/') => Some(Resolved {
            route,
            detail: Some(id.to_string()),
        }),
        _ => None,
    }
}

/// Resolve a path to the most specific route whose prefix matches on a
/// segment boundary (`/admin/dashboard/projects/42` → projects).
pub fn route_for(path: &str) -> Option<&'static RouteDef> {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let path = if path.len() > 1 { path.trim_end_matches('/') } else { path };

    ROUTES
        .iter()
        .filter(|route| {
            path == route.path
                || path
                    .strip_prefix(route.path)
                    .is_some_and(|rest| rest.starts_with('/'))
        })
        .max_by_key(|route| route.path.len())
}

/// Gate an arbitrary path. `None` when the path is not a protected screen.
pub fn gate_path(session: &Session, path: &str) -> Option<GateDecision> {
    route_for(path).map(|route| authorize(session, route.allowed))
}

/// Sidebar entries for a role
pub fn nav_for(role: Role) -> impl Iterator<Item = &'static RouteDef> {
    ROUTES
        .iter()
        .filter(move |route| route.nav && route.allowed.contains(&role))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(token: Option<&str>, role: Option<&str>) -> Session {
        Session::from_raw(token.map(String::from), role.map(String::from))
    }

    #[test]
    fn test_gate_examples() {
        assert_eq!(authorize(&session(None, None), &[Role::Admin]), GateDecision::Unauthorized);
        assert_eq!(
            authorize(&session(Some("t"), Some("developer")), &[Role::Admin]),
            GateDecision::Forbidden
        );
        assert_eq!(
            authorize(&session(Some("t"), Some("admin")), &[Role::Admin]),
            GateDecision::Render
        );
    }

    #[test]
    fn test_token_without_role_is_unauthorized() {
        assert_eq!(
            authorize(&session(Some("t"), None), &[Role::Admin]),
            GateDecision::Unauthorized
        );
        assert_eq!(
            authorize(&session(None, Some("admin")), &[Role::Admin]),
            GateDecision::Unauthorized
        );
    }

    #[test]
    fn test_unknown_role_is_forbidden() {
        assert_eq!(
            authorize(&session(Some("t"), Some("ADMIN")), &[Role::Admin]),
            GateDecision::Forbidden
        );
    }

    #[test]
    fn test_public_gate_redirects_signed_in() {
        assert_eq!(
            public_gate(&session(Some("t"), Some("project_manager"))),
            PublicDecision::Redirect("/project-manager/dashboard")
        );
        assert_eq!(public_gate(&session(None, None)), PublicDecision::Render);
        assert_eq!(public_gate(&session(Some("t"), Some("root"))), PublicDecision::Render);
    }

    #[test]
    fn test_route_for_longest_prefix() {
        let route = route_for("/admin/dashboard/projects/42").unwrap();
        assert_eq!(route.path, "/admin/dashboard/projects");
        let route = route_for("/admin/dashboard/").unwrap();
        assert_eq!(route.path, "/admin/dashboard");
        assert!(route_for("/admin/dashboardx").is_none());
        assert!(route_for("/sign-in").is_none());
    }

    #[test]
    fn test_route_for_ignores_query() {
        let route = route_for("/developer-dashboard/tickets?page=2").unwrap();
        assert_eq!(route.path, "/developer-dashboard/tickets");
    }

    #[test]
    fn test_home_paths_are_routes_for_their_role() {
        for role in Role::ALL {
            let route = route_for(role.home_path()).unwrap();
            assert!(route.allowed.contains(&role));
        }
    }

    #[test]
    fn test_nav_for_only_lists_own_routes() {
        assert!(nav_for(Role::Developer).all(|r| r.path.starts_with("/developer-dashboard")));
        assert_eq!(nav_for(Role::Admin).count(), 7);
    }

    #[test]
    fn test_resolve_detail_only_under_tickets() {
        let resolved = resolve("/project-manager/dashboard/tickets/t-42?tab=comments").unwrap();
        assert_eq!(resolved.route.screen, Screen::Tickets);
        assert_eq!(resolved.route.allowed, PM);
        assert_eq!(resolved.detail.as_deref(), Some("t-42"));

        let resolved = resolve("/admin/dashboard/").unwrap();
        assert_eq!(resolved.route.screen, Screen::Dashboard);
        assert_eq!(resolved.detail, None);

        assert!(resolve("/admin/dashboard/projects/42").is_none());
        assert!(resolve("/admin/dashboard/unknown").is_none());
        assert!(resolve("/developer-dashboard/tickets/1/edit").is_none());
        assert!(resolve("/").is_none());
    }

    #[test]
    fn test_gate_path() {
        let dev = session(Some("t"), Some("developer"));
        assert_eq!(gate_path(&dev, "/admin/dashboard"), Some(GateDecision::Forbidden));
        assert_eq!(gate_path(&dev, "/developer-dashboard/tickets"), Some(GateDecision::Render));
        assert_eq!(gate_path(&dev, "/"), None);
    }
}
