use std::collections::{BTreeMap, HashMap};

/// Read-only name lookup used as the interpolation fallback.
///
/// The parser never touches the process environment directly; it asks an
/// `EnvLookup`, so tests can supply a fixed map instead.
pub trait EnvLookup {
    fn get_var(&self, name: &str) -> Option<String>;
}

/// Source of host environment values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostEnv {
    kind: HostEnvKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum HostEnvKind {
    /// Read through [`std::env::var_os`]. Values that are not valid UTF-8 are
    /// converted lossily.
    Process,
    Memory(BTreeMap<String, String>),
}

impl Default for HostEnv {
    fn default() -> Self {
        Self::process()
    }
}

impl HostEnv {
    /// Look names up in the current process environment.
    pub fn process() -> Self {
        Self {
            kind: HostEnvKind::Process,
        }
    }

    /// An empty in-memory environment.
    pub fn memory() -> Self {
        Self::from_memory(BTreeMap::new())
    }

    pub fn from_memory(map: BTreeMap<String, String>) -> Self {
        Self {
            kind: HostEnvKind::Memory(map),
        }
    }

    pub fn as_memory(&self) -> Option<&BTreeMap<String, String>> {
        match &self.kind {
            HostEnvKind::Memory(map) => Some(map),
            HostEnvKind::Process => None,
        }
    }

    pub fn as_memory_mut(&mut self) -> Option<&mut BTreeMap<String, String>> {
        match &mut self.kind {
            HostEnvKind::Memory(map) => Some(map),
            HostEnvKind::Process => None,
        }
    }
}

impl EnvLookup for HostEnv {
    fn get_var(&self, name: &str) -> Option<String> {
        match &self.kind {
            HostEnvKind::Process => {
                // `var_os` panics on names containing `=` or NUL.
                if name.is_empty() || name.contains(['=', '\0']) {
                    return None;
                }
                std::env::var_os(name).map(|value| value.to_string_lossy().into_owned())
            }
            HostEnvKind::Memory(map) => map.get(name).cloned(),
        }
    }
}

impl EnvLookup for BTreeMap<String, String> {
    fn get_var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl EnvLookup for HashMap<String, String> {
    fn get_var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

impl<F> EnvLookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn get_var(&self, name: &str) -> Option<String> {
        self(name)
    }
}
