use crate::cli::{
    actions::{guard, login, Action},
    globals::{default_token_file, GlobalArgs},
};
use crate::session::RoutePolicy;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing or the route policy is invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = globals(matches)?;

    match matches.subcommand() {
        Some(("login", sub_m)) => Ok(Action::Login(login::Args {
            globals,
            email: sub_m
                .get_one::<String>("email")
                .cloned()
                .context("missing required argument: --email")?,
            password: sub_m
                .get_one::<String>("password")
                .map(|password| SecretString::from(password.clone())),
        })),
        Some(("logout", _)) => Ok(Action::Logout(globals)),
        Some(("status", _)) => Ok(Action::Status(globals)),
        Some(("guard", sub_m)) => Ok(Action::Guard(guard::Args {
            globals,
            path: sub_m
                .get_one::<String>("path")
                .cloned()
                .context("missing required argument: <path>")?,
        })),
        _ => Err(anyhow!("unknown subcommand")),
    }
}

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let api_url = matches
        .get_one::<String>("api-url")
        .cloned()
        .context("missing required argument: --api-url")?;

    let token_file = matches
        .get_one::<String>("token-file")
        .map_or_else(default_token_file, PathBuf::from);

    let public_paths: Vec<&String> = matches
        .get_many::<String>("public-path")
        .map(Iterator::collect)
        .unwrap_or_default();
    let login_path = matches
        .get_one::<String>("login-path")
        .context("missing required argument: --login-path")?;
    let landing_path = matches
        .get_one::<String>("landing-path")
        .context("missing required argument: --landing-path")?;

    let policy = RoutePolicy::new(public_paths, login_path, landing_path)
        .context("invalid route configuration")?;

    Ok(GlobalArgs::new(api_url, token_file, policy))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;
    use secrecy::ExposeSecret;

    #[test]
    fn test_login_action() {
        temp_env::with_vars(
            [
                ("SB_ADMIN_PASSWORD", None::<&str>),
                ("SB_ADMIN_PUBLIC_PATHS", None),
                ("SB_ADMIN_LOGIN_PATH", None),
                ("SB_ADMIN_LANDING_PATH", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "sb-admin",
                    "--token-file",
                    "/tmp/session.json",
                    "login",
                    "--email",
                    "johnny@sb.test",
                    "--password",
                    "1234",
                ]);

                let Action::Login(args) = handler(&matches).unwrap() else {
                    panic!("expected login action");
                };
                assert_eq!(args.email, "johnny@sb.test");
                assert_eq!(args.password.unwrap().expose_secret(), "1234");
                assert_eq!(args.globals.token_file, PathBuf::from("/tmp/session.json"));
                assert_eq!(args.globals.policy, RoutePolicy::default());
            },
        );
    }

    #[test]
    fn test_login_without_password() {
        temp_env::with_var("SB_ADMIN_PASSWORD", None::<&str>, || {
            let matches = commands::new().get_matches_from(vec![
                "sb-admin",
                "login",
                "--email",
                "johnny@sb.test",
            ]);
            let Action::Login(args) = handler(&matches).unwrap() else {
                panic!("expected login action");
            };
            assert!(args.password.is_none());
        });
    }

    #[test]
    fn test_guard_action_with_custom_policy() {
        temp_env::with_vars(
            [
                ("SB_ADMIN_PUBLIC_PATHS", None::<&str>),
                ("SB_ADMIN_LOGIN_PATH", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "sb-admin",
                    "guard",
                    "/signin",
                    "--public-path",
                    "/signin",
                    "--login-path",
                    "/signin",
                ]);
                let Action::Guard(args) = handler(&matches).unwrap() else {
                    panic!("expected guard action");
                };
                assert_eq!(args.path, "/signin");
                assert_eq!(args.globals.policy.public_paths(), ["/signin"]);
                assert_eq!(args.globals.policy.login_path(), "/signin");
            },
        );
    }

    #[test]
    fn test_login_path_outside_public_paths() {
        temp_env::with_vars(
            [
                ("SB_ADMIN_PUBLIC_PATHS", None::<&str>),
                ("SB_ADMIN_LOGIN_PATH", None),
                ("SB_ADMIN_LANDING_PATH", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec![
                    "sb-admin",
                    "--login-path",
                    "/signin",
                    "guard",
                    "/signin",
                ]);
                let err = handler(&matches).unwrap_err();
                assert!(format!("{err:#}").contains("/signin"), "{err:#}");
            },
        );
    }

    #[test]
    fn test_public_landing_path() {
        temp_env::with_vars(
            [
                ("SB_ADMIN_PUBLIC_PATHS", Some("/login,/dashboard")),
                ("SB_ADMIN_LOGIN_PATH", None),
                ("SB_ADMIN_LANDING_PATH", None),
            ],
            || {
                let matches = commands::new().get_matches_from(vec!["sb-admin", "status"]);
                assert!(handler(&matches).is_err());
            },
        );
    }

    #[test]
    fn test_invalid_public_path() {
        temp_env::with_var("SB_ADMIN_PUBLIC_PATHS", Some("login"), || {
            let matches = commands::new().get_matches_from(vec!["sb-admin", "status"]);
            assert!(handler(&matches).is_err());
        });
    }
}
