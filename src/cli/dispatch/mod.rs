use crate::cli::{
    actions::{hash_password, server, Action},
    commands::{auth, CMD_HASH_PASSWORD},
};
use anyhow::{Context, Result};
use secrecy::SecretString;

/// # Errors
/// Returns an error if required arguments are missing.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    if let Some(sub) = matches.subcommand_matches(CMD_HASH_PASSWORD) {
        let password = sub
            .get_one::<String>("password")
            .cloned()
            .context("missing required argument: <password>")?;
        return Ok(Action::HashPassword(hash_password::Args {
            password: SecretString::from(password),
        }));
    }

    let port = matches.get_one::<u16>("port").copied().unwrap_or(3001);
    let dsn = matches
        .get_one::<String>("dsn")
        .cloned()
        .context("missing required argument: --dsn")?;
    let jwt_secret = matches
        .get_one::<String>(auth::ARG_JWT_SECRET)
        .cloned()
        .context("missing required argument: --jwt-secret")?;
    let token_ttl_seconds = matches
        .get_one::<i64>(auth::ARG_TOKEN_TTL_SECONDS)
        .copied()
        .unwrap_or(crate::auth::DEFAULT_TOKEN_TTL_SECONDS);

    Ok(Action::Server(server::Args {
        port,
        dsn,
        jwt_secret: SecretString::from(jwt_secret),
        token_ttl_seconds,
    }))
}
