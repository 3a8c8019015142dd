use std::path::PathBuf;

/// A parsed `NAME=VALUE` assignment.
///
/// Names are not deduplicated: a re-declared name produces another binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    pub name: String,
    pub value: String,
    /// 1-based line on which the assignment started.
    pub line: u32,
}

impl Binding {
    pub fn new(name: impl Into<String>, value: impl Into<String>, line: u32) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            line,
        }
    }
}

/// Result of [`EnvLoader::load`](crate::EnvLoader::load).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedEnv {
    /// The dotenv file that was located and parsed.
    pub path: PathBuf,
    pub bindings: Vec<Binding>,
}
