use super::AddressRef;
use indexmap::IndexMap;

/// A read-only script described by its source file. Scripts take no signers.
#[derive(Clone, Debug, Default)]
pub struct ScriptTemplate {
    file: String,
    imports: IndexMap<String, AddressRef>,
    substitutions: IndexMap<String, String>,
}

impl ScriptTemplate {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            imports: IndexMap::new(),
            substitutions: IndexMap::new(),
        }
    }

    /// Set the import-address map. Replaces the entire map, as on
    /// [`ContractTemplate`](super::ContractTemplate).
    pub fn with_imports<I, K, A>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = (K, A)>,
        K: Into<String>,
        A: Into<AddressRef>,
    {
        self.imports = imports
            .into_iter()
            .map(|(name, addr)| (name.into(), addr.into()))
            .collect();
        self
    }

    /// Set the literal source substitutions. Replaces the entire map.
    pub fn with_substitutions<I, K, V>(mut self, substitutions: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.substitutions = substitutions
            .into_iter()
            .map(|(from, to)| (from.into(), to.into()))
            .collect();
        self
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn imports(&self) -> &IndexMap<String, AddressRef> {
        &self.imports
    }

    pub fn substitutions(&self) -> &IndexMap<String, String> {
        &self.substitutions
    }
}
