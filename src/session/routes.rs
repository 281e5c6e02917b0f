//! Static route classification for the admin console.

use anyhow::{anyhow, Result};

pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";
pub const FORGOT_PASSWORD_PATH: &str = "/forgot-password";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Paths reachable without a session.
pub const DEFAULT_PUBLIC_PATHS: [&str; 3] = [LOGIN_PATH, REGISTER_PATH, FORGOT_PASSWORD_PATH];

/// Sections of the console that require a session. Nothing consults this list
/// when classifying; anything not public is protected.
pub const CONSOLE_SECTIONS: [&str; 11] = [
    DASHBOARD_PATH,
    "/sb-management/countries",
    "/sb-management/branches",
    "/sb-management/roles",
    "/sb-management/staff",
    "/websites/base-template",
    "/websites/microsites-config",
    "/manage-components/menu",
    "/manage-components/testimonials",
    "/manage-components/food-delivery-embed",
    "/manage-components/careers",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePolicy {
    public_paths: Vec<String>,
    login_path: String,
    landing_path: String,
}

impl Default for RoutePolicy {
    fn default() -> Self {
        Self {
            public_paths: DEFAULT_PUBLIC_PATHS.iter().map(ToString::to_string).collect(),
            login_path: LOGIN_PATH.to_string(),
            landing_path: DASHBOARD_PATH.to_string(),
        }
    }
}

impl RoutePolicy {
    /// Build a policy from an explicit public allow-list.
    ///
    /// # Errors
    ///
    /// Returns an error if any path is not absolute, if an entry would make the
    /// whole console public, or if the login page is not public or the landing
    /// page is. Either of the last two would redirect a visitor to the page
    /// they are already on.
    pub fn new<I, P>(public_paths: I, login_path: &str, landing_path: &str) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<str>,
    {
        let public_paths = public_paths
            .into_iter()
            .map(|path| normalize_entry(path.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let policy = Self {
            public_paths,
            login_path: normalize_entry(login_path)?,
            landing_path: normalize_entry(landing_path)?,
        };

        if policy.classify(&policy.login_path) != RouteClass::Public {
            return Err(anyhow!(
                "login path {:?} must be one of the public paths",
                policy.login_path
            ));
        }
        if policy.classify(&policy.landing_path) != RouteClass::Protected {
            return Err(anyhow!(
                "landing path {:?} must not be a public path",
                policy.landing_path
            ));
        }

        Ok(policy)
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn landing_path(&self) -> &str {
        &self.landing_path
    }

    #[must_use]
    pub fn public_paths(&self) -> &[String] {
        &self.public_paths
    }

    /// Public iff `path` equals an allow-listed entry or sits below it on a
    /// segment boundary. Empty, relative, and dot-segment paths are protected.
    #[must_use]
    pub fn classify(&self, path: &str) -> RouteClass {
        let path = strip_suffixes(path);

        if !path.starts_with('/') || path.split('/').any(|seg| seg == "." || seg == "..") {
            return RouteClass::Protected;
        }

        if self
            .public_paths
            .iter()
            .any(|prefix| is_segment_prefix(prefix, path))
        {
            RouteClass::Public
        } else {
            RouteClass::Protected
        }
    }
}

fn strip_suffixes(path: &str) -> &str {
    path.find(['?', '#']).map_or(path, |end| &path[..end])
}

fn is_segment_prefix(prefix: &str, path: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

fn normalize_entry(path: &str) -> Result<String> {
    let trimmed = path.trim().trim_end_matches('/');
    if !trimmed.starts_with('/') {
        if path.trim().starts_with('/') {
            return Err(anyhow!("route path cannot be the console root"));
        }
        return Err(anyhow!("route path must be absolute: {path:?}"));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn default_public_paths() {
        let policy = RoutePolicy::default();
        assert_eq!(policy.classify("/login"), RouteClass::Public);
        assert_eq!(policy.classify("/register"), RouteClass::Public);
        assert_eq!(policy.classify("/forgot-password"), RouteClass::Public);
        assert_eq!(policy.login_path(), "/login");
        assert_eq!(policy.landing_path(), "/dashboard");
    }

    #[test]
    fn sub_paths_are_public() {
        let policy = RoutePolicy::default();
        assert_eq!(policy.classify("/login/"), RouteClass::Public);
        assert_eq!(policy.classify("/forgot-password/confirm"), RouteClass::Public);
        assert_eq!(policy.classify("/login?next=/dashboard"), RouteClass::Public);
        assert_eq!(policy.classify("/register#terms"), RouteClass::Public);
    }

    #[test]
    fn matching_respects_segment_boundaries() {
        let policy = RoutePolicy::default();
        assert_eq!(policy.classify("/login-extra-page"), RouteClass::Protected);
        assert_eq!(policy.classify("/loginx"), RouteClass::Protected);
        assert_eq!(policy.classify("/registered"), RouteClass::Protected);
        assert_eq!(policy.classify("/api/login"), RouteClass::Protected);
    }

    #[test]
    fn console_sections_are_protected() {
        let policy = RoutePolicy::default();
        for section in CONSOLE_SECTIONS {
            assert_eq!(policy.classify(section), RouteClass::Protected, "{section}");
        }
        assert_eq!(policy.classify("/sb-management/staff/42"), RouteClass::Protected);
        assert_eq!(policy.classify("/"), RouteClass::Protected);
    }

    #[test]
    fn malformed_paths_fail_safe() {
        let policy = RoutePolicy::default();
        for path in ["", "login", " /login", "?/login", "/login/../dashboard", "/./login"] {
            assert_eq!(policy.classify(path), RouteClass::Protected, "{path:?}");
        }
    }

    #[test]
    fn custom_policy_normalizes_entries() {
        let policy = RoutePolicy::new([" /signin/ ", "/status"], "/signin", "/home/").unwrap();
        assert_eq!(policy.public_paths(), ["/signin", "/status"]);
        assert_eq!(policy.landing_path(), "/home");
        assert_eq!(policy.classify("/signin/sso"), RouteClass::Public);
        assert_eq!(policy.classify("/login"), RouteClass::Protected);
    }

    #[test]
    fn custom_policy_rejects_bad_entries() {
        assert!(RoutePolicy::new(["login"], "/login", "/dashboard").is_err());
        assert!(RoutePolicy::new(["/"], "/login", "/dashboard").is_err());
        assert!(RoutePolicy::new(["/login"], "", "/dashboard").is_err());
    }

    #[test]
    fn custom_policy_rejects_self_redirects() {
        // Anonymous visitors on a protected login page would loop on it.
        let err = RoutePolicy::new(DEFAULT_PUBLIC_PATHS, "/signin", "/dashboard").unwrap_err();
        assert!(err.to_string().contains("/signin"), "{err}");

        // Signed-in visitors on a public landing page would loop on it.
        let err = RoutePolicy::new(["/login", "/dashboard"], "/login", "/dashboard").unwrap_err();
        assert!(err.to_string().contains("/dashboard"), "{err}");
        assert!(RoutePolicy::new(["/login"], "/login", "/login/welcome").is_err());

        assert!(RoutePolicy::new(["/auth"], "/auth/signin", "/home").is_ok());
        assert_eq!(
            RoutePolicy::new(DEFAULT_PUBLIC_PATHS, LOGIN_PATH, DASHBOARD_PATH).unwrap(),
            RoutePolicy::default()
        );
    }
}
