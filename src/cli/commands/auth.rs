use clap::{builder::NonEmptyStringValueParser, Arg, Command};

pub const ARG_JWT_SECRET: &str = "jwt-secret";
pub const ARG_TOKEN_TTL_SECONDS: &str = "token-ttl-seconds";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_JWT_SECRET)
                .long(ARG_JWT_SECRET)
                .help("Secret used to sign and verify access tokens")
                .env("BOOKSHELF_JWT_SECRET")
                .hide_env_values(true)
                .value_parser(NonEmptyStringValueParser::new())
                .required(true),
        )
        .arg(
            Arg::new(ARG_TOKEN_TTL_SECONDS)
                .long(ARG_TOKEN_TTL_SECONDS)
                .help("Access token lifetime in seconds")
                .env("BOOKSHELF_TOKEN_TTL_SECONDS")
                .default_value("3600")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
}
