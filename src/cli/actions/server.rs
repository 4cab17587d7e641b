use crate::{api, auth::AuthConfig};
use anyhow::Result;
use secrecy::SecretString;
use tracing::info;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: String,
    pub jwt_secret: SecretString,
    pub token_ttl_seconds: i64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the auth configuration is invalid or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let auth_config =
        AuthConfig::new(args.jwt_secret).with_token_ttl_seconds(args.token_ttl_seconds);

    api::new(args.port, &args.dsn, auth_config).await
}

fn log_startup_args(args: &Args) {
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("dsn", redact_dsn(&args.dsn)),
        ("token_ttl_seconds", args.token_ttl_seconds.to_string()),
    ];
    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in &entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn redact_dsn(dsn: &str) -> String {
    match Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("REDACTED"));
            }
            parsed.to_string()
        }
        Err(_) => "invalid-dsn".to_string(),
    }
}

fn short_commit(hash: &str) -> &str {
    let trimmed = hash.trim();
    trimmed.get(..7).unwrap_or(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redact_dsn_hides_password() {
        assert_eq!(
            redact_dsn("postgres://books:hunter2@db:5432/bookshelf"),
            "postgres://books:REDACTED@db:5432/bookshelf"
        );
    }

    #[test]
    fn redact_dsn_without_password_is_unchanged() {
        assert_eq!(
            redact_dsn("postgres://db:5432/bookshelf"),
            "postgres://db:5432/bookshelf"
        );
    }

    #[test]
    fn redact_dsn_rejects_garbage() {
        assert_eq!(redact_dsn("not a url"), "invalid-dsn");
    }

    #[test]
    fn short_commit_truncates() {
        assert_eq!(short_commit("0123456789abcdef"), "0123456");
        assert_eq!(short_commit("abc"), "abc");
    }
}
