use crate::session::routes::{DASHBOARD_PATH, DEFAULT_PUBLIC_PATHS, LOGIN_PATH};
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub const DEFAULT_API_URL: &str = "http://localhost:3001";

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 4 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("sb-admin")
        .about("SB admin console session client")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("Base URL of the console API")
                .default_value(DEFAULT_API_URL)
                .env("SB_ADMIN_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("token-file")
                .long("token-file")
                .help("Where the session is stored, default: $XDG_CONFIG_HOME/sb-admin/session.json")
                .env("SB_ADMIN_TOKEN_FILE")
                .global(true),
        )
        .arg(
            Arg::new("public-path")
                .long("public-path")
                .help("Path reachable without a session, may be repeated")
                .env("SB_ADMIN_PUBLIC_PATHS")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .default_values(DEFAULT_PUBLIC_PATHS)
                .global(true),
        )
        .arg(
            Arg::new("login-path")
                .long("login-path")
                .help("Where anonymous visitors are sent")
                .default_value(LOGIN_PATH)
                .env("SB_ADMIN_LOGIN_PATH")
                .global(true),
        )
        .arg(
            Arg::new("landing-path")
                .long("landing-path")
                .help("Where signed-in visitors on public pages are sent")
                .default_value(DASHBOARD_PATH)
                .env("SB_ADMIN_LANDING_PATH")
                .global(true),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("SB_ADMIN_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Exchange credentials for a session")
                .arg(
                    Arg::new("email")
                        .short('e')
                        .long("email")
                        .help("Account email")
                        .env("SB_ADMIN_EMAIL")
                        .required(true),
                )
                .arg(
                    Arg::new("password")
                        .long("password")
                        .help("Account password, read from stdin when omitted")
                        .env("SB_ADMIN_PASSWORD")
                        .hide_env_values(true),
                ),
        )
        .subcommand(Command::new("logout").about("Forget the stored session"))
        .subcommand(Command::new("status").about("Show the stored session"))
        .subcommand(
            Command::new("guard")
                .about("Decide whether a console path may be shown")
                .arg(
                    Arg::new("path")
                        .help("Console path, e.g. /sb-management/staff")
                        .required(true),
                ),
        )
}
