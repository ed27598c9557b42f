use std::fmt;

use duplex_config::ConfigError;

/// One of the two artifacts a duplex build produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Server,
    Client,
}

impl Target {
    pub fn as_str(&self) -> &'static str {
        match self {
            Target::Server => "server",
            Target::Client => "client",
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{target} build hook returned an unusable config: {reason}")]
    InvalidHookOutput { target: Target, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
