use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

// Index is the equivalent `-v` count.
const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Accept a level name from `BOOKSHELF_LOG_LEVEL` and turn it into a `-v` count.
#[must_use]
pub fn validator_log_level() -> ValueParser {
    ValueParser::from(|level: &str| -> Result<u8, String> {
        LEVELS
            .iter()
            .position(|name| name.eq_ignore_ascii_case(level.trim()))
            .and_then(|index| u8::try_from(index).ok())
            .ok_or_else(|| {
                format!(
                    "invalid log level '{level}', expected one of: {}",
                    LEVELS.join(", ")
                )
            })
    })
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
            .env("BOOKSHELF_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(validator_log_level()),
    )
}
