use serde::Deserialize;
use std::path::PathBuf;

/// Sink file configuration
/// One append-only text file per switch: `<directory>/<file_prefix><id>.txt`
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Directory the sink files are created in
    /// Default: "."
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
    /// File name prefix, followed by the switch id
    /// Default: "s" (s1.txt .. s4.txt)
    #[serde(default = "default_file_prefix")]
    pub file_prefix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { directory: default_directory(), file_prefix: default_file_prefix() }
    }
}

fn default_directory() -> PathBuf {
    PathBuf::from(".")
}

fn default_file_prefix() -> String {
    "s".to_string()
}
