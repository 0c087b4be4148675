//! The server is configured through the environment, so the command line only offers help and version output.
use std::{env, env::VarError};

// Only variables that never hold secrets
const DISPLAY_ENVS: [&str; 15] = [
    "RUST_LOG",
    "TOS_HOST",
    "TOS_PORT",
    "TOS_DATABASE_URL",
    "TOS_GATEWAY_HMAC_CHECKS",
    "TOS_GATEWAY_TIMEOUT_SECS",
    "TOS_RECONCILE_INTERVAL_SECS",
    "TOS_STALE_PAYMENT_AGE_SECS",
    "TOS_USE_X_FORWARDED_FOR",
    "TOS_USE_FORWARDED",
    "TOS_PAYTM_MERCHANT_ID",
    "TOS_PAYTM_WEBSITE",
    "TOS_PAYTM_BASE_URL",
    "TOS_PAYTM_CALLBACK_URL",
    "TOS_PAYTM_TIMEOUT_SECS",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliAction {
    RunServer,
    PrintVersion,
    PrintHelp,
}

impl CliAction {
    /// Anything other than no arguments or `--version`/`-V` gets the help text.
    pub fn from_args<I: IntoIterator<Item = String>>(args: I) -> Self {
        let args = args.into_iter().skip(1).collect::<Vec<_>>();
        match args.as_slice() {
            [] => CliAction::RunServer,
            [flag] if flag == "--version" || flag == "-V" => CliAction::PrintVersion,
            _ => CliAction::PrintHelp,
        }
    }
}

/// Returns true if the command line was handled and the server should not start.
pub fn handle_command_line_args() -> bool {
    match CliAction::from_args(env::args()) {
        CliAction::RunServer => false,
        CliAction::PrintVersion => {
            println!("table_order_server {}", env!("CARGO_PKG_VERSION"));
            true
        },
        CliAction::PrintHelp => {
            const README: &str = include_str!("./cli-help.txt");
            println!("\n{README}\n");
            println!("Current environment values (EXCLUDING variables that contain secrets):");
            DISPLAY_ENVS.iter().for_each(|&name| println!("  {name:<35} {:<15}", env_value(name)));
            true
        },
    }
}

fn env_value(name: &str) -> String {
    match env::var(name) {
        Ok(s) => s,
        Err(VarError::NotPresent) => "Not set".into(),
        Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
    }
}
