use super::AddressRef;
use indexmap::IndexMap;

/// A contract deployment described by its source file.
///
/// # Example
///
/// ```rust,ignore
/// let contract = ContractTemplate::new("Marketplace")
///     .with_imports([("FungibleToken", &alice)])
///     .with_substitutions([("getAccount(0x01)", "getAccount(0xBEEF)")]);
/// let result = harness.deploy(&alice, &contract).await?;
/// ```
#[derive(Clone, Debug, Default)]
pub struct ContractTemplate {
    file: String,
    imports: IndexMap<String, AddressRef>,
    substitutions: IndexMap<String, String>,
}

impl ContractTemplate {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            imports: IndexMap::new(),
            substitutions: IndexMap::new(),
        }
    }

    /// Set the import-address map.
    ///
    /// **Note**: this replaces the entire map; a previous `with_imports`
    /// call is discarded, not merged into.
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

    /// Set the literal source substitutions, applied after import templating
    /// in the order given here.
    ///
    /// **Note**: this replaces the entire map; a previous
    /// `with_substitutions` call is discarded, not merged into.
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_imports_replaces_the_whole_map() {
        let template = ContractTemplate::new("Marketplace")
            .with_imports([("A", AddressRef::from("0x01"))])
            .with_imports([("B", AddressRef::from("0x02"))]);

        assert_eq!(template.imports().len(), 1);
        assert!(template.imports().contains_key("B"));
        assert!(!template.imports().contains_key("A"));
    }

    #[test]
    fn with_substitutions_replaces_the_whole_map() {
        let template = ContractTemplate::new("Marketplace")
            .with_substitutions([("old", "new")])
            .with_substitutions([("foo", "bar")]);

        assert_eq!(template.substitutions().len(), 1);
        assert_eq!(template.substitutions().get("foo").map(String::as_str), Some("bar"));
    }
}
