use super::AddressRef;
use indexmap::IndexMap;

/// A transaction described by its source file.
///
/// Re-submittable: every [`Harness::send`](crate::Harness::send) call
/// re-resolves pending fields and re-fetches the templated source, so one
/// template can drive any number of submissions.
#[derive(Clone, Debug, Default)]
pub struct TransactionTemplate {
    file: String,
    imports: IndexMap<String, AddressRef>,
    substitutions: IndexMap<String, String>,
    signers: Vec<AddressRef>,
}

impl TransactionTemplate {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            imports: IndexMap::new(),
            substitutions: IndexMap::new(),
            signers: Vec::new(),
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

    /// Set the signer list, in signing order.
    ///
    /// **Note**: this replaces any previously set list. Leaving the list
    /// empty submits the transaction unsigned.
    pub fn with_signers<I, A>(mut self, signers: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<AddressRef>,
    {
        self.signers = signers.into_iter().map(Into::into).collect();
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

    pub fn signers(&self) -> &[AddressRef] {
        &self.signers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Address;

    #[test]
    fn signer_order_is_preserved() {
        let template = TransactionTemplate::new("transfer").with_signers([
            AddressRef::from(Address::new("0x01")),
            AddressRef::from(Address::new("0x02")),
            AddressRef::from(Address::new("0x03")),
        ]);

        let order: Vec<_> = template
            .signers()
            .iter()
            .map(|s| match s {
                AddressRef::Address(a) => a.as_str().to_string(),
                other => panic!("unexpected signer ref: {other:?}"),
            })
            .collect();
        assert_eq!(order, ["0x01", "0x02", "0x03"]);
    }

    #[test]
    fn with_signers_replaces_the_whole_list() {
        let template = TransactionTemplate::new("transfer")
            .with_signers([AddressRef::from(Address::new("0x01"))])
            .with_signers([AddressRef::from(Address::new("0x02"))]);

        assert_eq!(template.signers().len(), 1);
        assert!(matches!(&template.signers()[0], AddressRef::Address(a) if a.as_str() == "0x02"));
    }
}
