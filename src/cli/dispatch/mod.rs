//! Command-line argument dispatch and server initialization.
//!
//! This module maps validated CLI arguments to the appropriate action, such as
//! starting the API server with its full configuration state.

use crate::cli::actions::{Action, server::Args};
use crate::cli::commands::auth;
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        frontend_base_url: auth_opts.frontend_base_url,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        reset_token_ttl_seconds: auth_opts.reset_token_ttl_seconds,
        expose_reset_tokens: auth_opts.expose_reset_tokens,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::actions::Action;

    #[test]
    fn maps_matches_to_server_args() {
        temp_env::with_vars(
            [
                ("CUSTOS_PORT", None::<&str>),
                ("CUSTOS_FRONTEND_BASE_URL", None::<&str>),
                ("CUSTOS_SESSION_TTL_SECONDS", None::<&str>),
                ("CUSTOS_RESET_TOKEN_TTL_SECONDS", None::<&str>),
                ("CUSTOS_EXPOSE_RESET_TOKENS", None::<&str>),
            ],
            || {
                let command = crate::cli::commands::new();
                let matches = command.get_matches_from(vec![
                    "custos",
                    "--dsn",
                    "postgres://user@localhost:5432/custos",
                    "--port",
                    "9090",
                    "--expose-reset-tokens",
                ]);
                let action = handler(&matches);
                let Ok(Action::Server(args)) = action else {
                    panic!("expected a server action");
                };
                assert_eq!(args.port, 9090);
                assert_eq!(args.dsn, "postgres://user@localhost:5432/custos");
                assert_eq!(args.frontend_base_url, "http://localhost:3000");
                assert_eq!(args.session_ttl_seconds, 86_400);
                assert_eq!(args.reset_token_ttl_seconds, 3_600);
                assert!(args.expose_reset_tokens);
            },
        );
    }
}
