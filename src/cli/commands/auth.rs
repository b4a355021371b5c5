use clap::{Arg, ArgAction, Command};

#[derive(Debug)]
pub struct Options {
    pub frontend_base_url: String,
    pub session_ttl_seconds: i64,
    pub reset_token_ttl_seconds: i64,
    pub expose_reset_tokens: bool,
}

impl Options {
    /// Read the auth options out of parsed matches.
    ///
    /// # Errors
    /// Returns an error if a defaulted argument is somehow missing.
    pub fn parse(matches: &clap::ArgMatches) -> anyhow::Result<Self> {
        let frontend_base_url = matches
            .get_one::<String>("frontend-base-url")
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --frontend-base-url"))?;
        let session_ttl_seconds = matches
            .get_one::<i64>("session-ttl-seconds")
            .copied()
            .unwrap_or(86_400);
        let reset_token_ttl_seconds = matches
            .get_one::<i64>("reset-token-ttl-seconds")
            .copied()
            .unwrap_or(3_600);
        let expose_reset_tokens = matches.get_flag("expose-reset-tokens");
        Ok(Self {
            frontend_base_url,
            session_ttl_seconds,
            reset_token_ttl_seconds,
            expose_reset_tokens,
        })
    }
}

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("frontend-base-url")
                .long("frontend-base-url")
                .help("Frontend origin allowed to call the API with credentials")
                .env("CUSTOS_FRONTEND_BASE_URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Sliding session idle window in seconds")
                .env("CUSTOS_SESSION_TTL_SECONDS")
                .default_value("86400")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("reset-token-ttl-seconds")
                .long("reset-token-ttl-seconds")
                .help("Password reset token lifetime in seconds")
                .env("CUSTOS_RESET_TOKEN_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64)),
        )
        .arg(
            Arg::new("expose-reset-tokens")
                .long("expose-reset-tokens")
                .help("Return raw reset tokens in API responses (testing only)")
                .env("CUSTOS_EXPOSE_RESET_TOKENS")
                .action(ArgAction::SetTrue),
        )
}
