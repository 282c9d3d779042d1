use crate::engine::Address;
use crate::HarnessError;

/// A named account.
///
/// The alias is fixed at construction; the address is assigned exactly once,
/// when the account is created through the harness, and never changes
/// afterwards. [`Harness::create_account`](crate::Harness::create_account)
/// returns handles already resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    alias: String,
    address: Option<Address>,
}

impl Account {
    /// An account known only by alias, with no resolved address yet.
    pub fn named(alias: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            address: None,
        }
    }

    pub(crate) fn resolved(alias: impl Into<String>, address: Address) -> Self {
        Self {
            alias: alias.into(),
            address: Some(address),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// The resolved address, failing with
    /// [`HarnessError::UnresolvedAccount`] if the handle was never built.
    pub fn address(&self) -> crate::Result<&Address> {
        self.address
            .as_ref()
            .ok_or_else(|| HarnessError::UnresolvedAccount(self.alias.clone()).into())
    }

    pub fn try_address(&self) -> Option<&Address> {
        self.address.as_ref()
    }
}
