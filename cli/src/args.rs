//! Command-line shape: `client [-r n <pr1=value1 pr2=value2 ...>] <URL>`.
//!
//! The `-r` block and the URL may come in either order. `n` declares exactly
//! how many `name=value` tokens follow it.

use hopget_core::Param;
use thiserror::Error;

pub const USAGE: &str = "Usage: client [-r n <pr1=value1 pr2=value2 …>] <URL>";

/// Validated invocation, built once and handed to the redirect loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CmdArgs {
    pub url: String,
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsageError {
    #[error("Unknown flag: {0}")]
    UnknownFlag(String),

    #[error("Has to be a number after -r")]
    MissingCount,

    #[error("Has to be a number after -r (got '{0}')")]
    InvalidCount(String),

    #[error("Too few parameters after -r (expected {expected}, got {got})")]
    TooFewParams { expected: usize, got: usize },

    #[error("Parameter '{0}' is not in the form name=value")]
    NotNameValue(String),

    #[error("Only one -r block is allowed")]
    RepeatedParams,

    #[error("Multiple URLs or extra arguments provided.")]
    MultipleUrls,

    #[error("No URL provided.")]
    MissingUrl,
}

impl CmdArgs {
    /// Parse the arguments after the program name.
    pub fn parse<I, S>(args: I) -> Result<Self, UsageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut args = args.into_iter().map(Into::into);
        let mut url = None;
        let mut params = None;

        while let Some(arg) = args.next() {
            if !arg.starts_with('-') {
                if url.replace(arg).is_some() {
                    return Err(UsageError::MultipleUrls);
                }
                continue;
            }
            if arg != "-r" {
                return Err(UsageError::UnknownFlag(arg));
            }
            if params.is_some() {
                return Err(UsageError::RepeatedParams);
            }

            let count = args.next().ok_or(UsageError::MissingCount)?;
            let expected = parse_count(&count).ok_or(UsageError::InvalidCount(count))?;
            let mut block = Vec::with_capacity(expected);
            for got in 0..expected {
                let token = args
                    .next()
                    .ok_or(UsageError::TooFewParams { expected, got })?;
                let param = token
                    .parse::<Param>()
                    .map_err(|e| UsageError::NotNameValue(e.0))?;
                block.push(param);
            }
            params = Some(block);
        }

        Ok(Self {
            url: url.ok_or(UsageError::MissingUrl)?,
            params: params.unwrap_or_default(),
        })
    }
}

/// A decimal count in `1..=65535`, digits only.
fn parse_count(s: &str) -> Option<usize> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match s.parse::<u16>().ok()? {
        0 => None,
        n => Some(usize::from(n)),
    }
}
