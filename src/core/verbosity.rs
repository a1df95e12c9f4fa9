//! Counting verbosity flag.
//!
//! `-v` increments the level each time it appears, `-v=N` sets it, and the
//! boolean spellings `-v=true` / `-v=false` increment or reset it.

use std::str::FromStr;

use crate::BenchError;

/// One occurrence of the verbosity flag on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountToken {
    Increment,
    Set(u8),
}

impl FromStr for CountToken {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "true" => Ok(CountToken::Increment),
            "false" => Ok(CountToken::Set(0)),
            _ => s
                .parse::<u8>()
                .map(CountToken::Set)
                .map_err(|_| BenchError::Config(format!("invalid count {s:?}"))),
        }
    }
}

/// Verbosity level: 0 progress, 1 command echoes, 2 raw subprocess output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Verbosity(pub u8);

impl Verbosity {
    pub const COMMANDS: Verbosity = Verbosity(1);

    /// Fold flag occurrences in command-line order.
    pub fn from_tokens(start: Verbosity, tokens: &[CountToken]) -> Verbosity {
        tokens.iter().fold(start, |acc, token| match token {
            CountToken::Increment => Verbosity(acc.0.saturating_add(1)),
            CountToken::Set(n) => Verbosity(*n),
        })
    }

    /// Default tracing filter for this level.
    pub fn log_filter(self) -> &'static str {
        match self.0 {
            0 => "abbench=info",
            1 => "abbench=debug",
            _ => "abbench=trace",
        }
    }
}

/// clap value parser for a single occurrence.
pub fn parse_count_token(s: &str) -> Result<CountToken, String> {
    s.parse().map_err(|e: BenchError| e.to_string())
}
