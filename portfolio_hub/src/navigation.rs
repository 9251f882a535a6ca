//! Navigation seam between the session core and its host.

/// Well-known view paths.
pub mod routes {
    /// Sign-in view
    pub const LOGIN: &str = "/login";

    /// Dashboard of an ordinary tenant user
    pub const USER_DASHBOARD: &str = "/user/dashboard";

    /// Dashboard of a platform admin
    pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
}

/// Host-provided navigation.
///
/// `navigate` is an in-app transition that keeps in-memory state. `reload`
/// is a full restart at `path`: the host drops its session state and rebuilds
/// it from the token store, running the startup check again.
pub trait Navigator: Send + Sync {
    fn navigate(&self, path: &str);

    fn reload(&self, path: &str);
}

/// Navigator that ignores every request
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNavigator;

impl Navigator for NullNavigator {
    fn navigate(&self, _path: &str) {}

    fn reload(&self, _path: &str) {}
}
