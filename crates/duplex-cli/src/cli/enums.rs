use clap::ValueEnum;
use duplex_config::BuildMode;

/// Build order
#[derive(Copy, Clone, PartialEq, Eq, Debug, ValueEnum)]
pub enum Mode {
    /// Server bundle first, then the client bundle
    #[value(name = "server-first")]
    ServerFirst,

    /// Client bundle first, then the server bundle (needs a client out_dir outside the server's)
    #[value(name = "client-first")]
    ClientFirst,

    /// Both bundles at once (needs out_dirs that do not contain each other)
    #[value(name = "parallel")]
    Parallel,

    /// Plain project build, no server or client bundles
    #[value(name = "skip")]
    Skip,
}

impl From<Mode> for BuildMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::ServerFirst => BuildMode::ServerFirst,
            Mode::ClientFirst => BuildMode::ClientFirst,
            Mode::Parallel => BuildMode::Parallel,
            Mode::Skip => BuildMode::Skip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_names_match_config_spelling() {
        for mode in Mode::value_variants() {
            let name = mode.to_possible_value().unwrap();
            assert_eq!(name.get_name(), BuildMode::from(*mode).as_str());
        }
    }
}
