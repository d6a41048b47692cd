use std::collections::HashMap;

use tracing::{trace, warn};

use crate::collab::Vault;
use crate::error::TransferError;
use crate::money::Amount;
use crate::types::{Address, Currency};

type BalanceKey = (Currency, Address);

/// Balance table with an undo journal.
///
/// While a transaction is open every overwritten balance is journaled, and
/// `rollback` replays the journal backwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryVault {
    balances: HashMap<BalanceKey, Amount>,
    journal: Option<Vec<(BalanceKey, Amount)>>,
}

impl MemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `holder` out of thin air. Setup only; not journaled.
    pub fn mint(&mut self, currency: Currency, holder: Address, amount: Amount) {
        let balance = self.balances.entry((currency, holder)).or_insert(Amount::ZERO);
        *balance = balance.checked_add(amount).unwrap_or(Amount::MAX);
    }

    pub fn in_transaction(&self) -> bool {
        self.journal.is_some()
    }

    fn write(&mut self, key: BalanceKey, amount: Amount) {
        let previous = self.balances.insert(key, amount).unwrap_or(Amount::ZERO);
        if let Some(journal) = self.journal.as_mut() {
            journal.push((key, previous));
        }
    }
}

impl Vault for MemoryVault {
    fn balance_of(&self, currency: Currency, holder: Address) -> Amount {
        self.balances
            .get(&(currency, holder))
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn transfer(
        &mut self,
        currency: Currency,
        from: Address,
        to: Address,
        amount: Amount,
    ) -> Result<(), TransferError> {
        if to.is_zero() {
            return Err(TransferError::Rejected("transfer to the zero address".to_string()));
        }

        let available = self.balance_of(currency, from);
        let debited = available
            .checked_sub(amount)
            .ok_or(TransferError::InsufficientFunds {
                required: amount,
                available,
            })?;
        if from == to || amount.is_zero() {
            return Ok(());
        }

        let credited = self
            .balance_of(currency, to)
            .checked_add(amount)
            .ok_or_else(|| TransferError::Rejected("balance overflow".to_string()))?;

        self.write((currency, from), debited);
        self.write((currency, to), credited);
        trace!(%currency, %from, %to, %amount, "Transfer");
        Ok(())
    }

    fn begin(&mut self) {
        if self.journal.is_some() {
            warn!("Transaction already open; continuing it");
            return;
        }
        self.journal = Some(Vec::new());
    }

    fn commit(&mut self) {
        self.journal = None;
    }

    fn rollback(&mut self) {
        if let Some(journal) = self.journal.take() {
            for (key, previous) in journal.into_iter().rev() {
                self.balances.insert(key, previous);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    #[test]
    fn test_transfer_moves_balance() {
        let mut vault = MemoryVault::new();
        vault.mint(Currency::NATIVE, addr(1), Amount::new(100));

        vault.transfer(Currency::NATIVE, addr(1), addr(2), Amount::new(40)).unwrap();
        assert_eq!(vault.balance_of(Currency::NATIVE, addr(1)), Amount::new(60));
        assert_eq!(vault.balance_of(Currency::NATIVE, addr(2)), Amount::new(40));
    }

    #[test]
    fn test_transfer_insufficient_funds() {
        let mut vault = MemoryVault::new();
        vault.mint(Currency::NATIVE, addr(1), Amount::new(10));
        let err = vault
            .transfer(Currency::NATIVE, addr(1), addr(2), Amount::new(11))
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::InsufficientFunds { required, available }
                if required == Amount::new(11) && available == Amount::new(10)
        ));
    }

    #[test]
    fn test_rollback_restores_every_balance() {
        let mut vault = MemoryVault::new();
        vault.mint(Currency::NATIVE, addr(1), Amount::new(100));

        vault.begin();
        vault.transfer(Currency::NATIVE, addr(1), addr(2), Amount::new(30)).unwrap();
        vault.transfer(Currency::NATIVE, addr(2), addr(3), Amount::new(10)).unwrap();
        vault.rollback();

        assert!(!vault.in_transaction());
        assert_eq!(vault.balance_of(Currency::NATIVE, addr(1)), Amount::new(100));
        assert_eq!(vault.balance_of(Currency::NATIVE, addr(2)), Amount::ZERO);
        assert_eq!(vault.balance_of(Currency::NATIVE, addr(3)), Amount::ZERO);
    }

    #[test]
    fn test_commit_keeps_changes() {
        let mut vault = MemoryVault::new();
        vault.mint(Currency::NATIVE, addr(1), Amount::new(100));

        vault.begin();
        vault.transfer(Currency::NATIVE, addr(1), addr(2), Amount::new(30)).unwrap();
        vault.commit();
        vault.rollback();

        assert_eq!(vault.balance_of(Currency::NATIVE, addr(2)), Amount::new(30));
    }
}
