use std::collections::HashMap;

use tracing::debug;

use crate::collab::{PriceOracle, Vault};
use crate::error::OracleError;
use crate::money::Amount;
use crate::types::{Address, Currency};

/// Rate table quoting every currency against one reference.
///
/// Quotes and executions may differ: an execution rate better than the
/// quote makes swaps consume less than the quoted total, which is how the
/// refund path gets exercised. Swaps draw the reference leg from the
/// oracle's own liquidity account in the vault.
#[derive(Debug, Clone)]
pub struct TableOracle {
    reference: Currency,
    account: Address,
    quotes: HashMap<Currency, Amount>,
    execution: HashMap<Currency, Amount>,
}

impl TableOracle {
    pub fn new(reference: Currency, account: Address) -> Self {
        TableOracle {
            reference,
            account,
            quotes: HashMap::new(),
            execution: HashMap::new(),
        }
    }

    /// Quotes `rate` reference units per 10^18 units of `currency`.
    pub fn with_rate(mut self, currency: Currency, rate: Amount) -> Self {
        self.quotes.insert(currency, rate);
        self
    }

    /// Overrides the rate swaps actually execute at.
    pub fn with_execution_rate(mut self, currency: Currency, rate: Amount) -> Self {
        self.execution.insert(currency, rate);
        self
    }

    /// Holder of the reference liquidity.
    pub fn account(&self) -> Address {
        self.account
    }

    fn quote(&self, currency: Currency, reference: Currency) -> Result<Amount, OracleError> {
        if reference != self.reference {
            return Err(OracleError::UndefinedRate(currency));
        }
        if currency == reference {
            return Ok(Amount::new(Amount::SCALE));
        }
        self.quotes
            .get(&currency)
            .copied()
            .filter(|rate| !rate.is_zero())
            .ok_or(OracleError::UndefinedRate(currency))
    }
}

impl PriceOracle for TableOracle {
    fn rates(
        &self,
        currencies: &[Currency],
        reference: Currency,
        _reference_amount: Amount,
        _data: &[u8],
    ) -> Result<Vec<Amount>, OracleError> {
        currencies
            .iter()
            .map(|currency| self.quote(*currency, reference))
            .collect()
    }

    fn estimate_swap(
        &self,
        from: Currency,
        to: Currency,
        to_amount: Amount,
        _data: &[u8],
    ) -> Result<Amount, OracleError> {
        let cannot = OracleError::CannotEstimate { from, to };
        if to != self.reference || from == to {
            return Err(cannot);
        }
        let rate = self
            .execution
            .get(&from)
            .or_else(|| self.quotes.get(&from))
            .copied()
            .filter(|rate| !rate.is_zero())
            .ok_or(OracleError::CannotEstimate { from, to })?;

        to_amount
            .checked_mul_div_ceil(Amount::SCALE, rate.get())
            .ok_or(cannot)
    }

    fn swap(
        &self,
        vault: &mut dyn Vault,
        holder: Address,
        from: Currency,
        to: Currency,
        to_amount: Amount,
        data: &[u8],
    ) -> Result<Amount, OracleError> {
        let needed = self.estimate_swap(from, to, to_amount, data)?;
        vault.transfer(from, holder, self.account, needed)?;
        vault.transfer(to, self.account, holder, to_amount)?;

        debug!(%from, %to, consumed = %needed, received = %to_amount, "Swap executed");
        Ok(needed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryVault;

    fn addr(n: u8) -> Address {
        Address::new([n; 20])
    }

    fn usdc() -> Currency {
        Currency::token(addr(0xc0))
    }

    fn oracle() -> TableOracle {
        // 1 USDC unit (scaled) = 0.5 native units
        TableOracle::new(Currency::NATIVE, addr(0x0a))
            .with_rate(usdc(), Amount::new(Amount::SCALE / 2))
    }

    #[test]
    fn test_rates_in_request_order() {
        let rates = oracle()
            .rates(&[usdc(), Currency::NATIVE], Currency::NATIVE, Amount::new(1), &[])
            .unwrap();
        assert_eq!(rates, vec![Amount::new(Amount::SCALE / 2), Amount::new(Amount::SCALE)]);
    }

    #[test]
    fn test_unquoted_currency_is_undefined() {
        let other = Currency::token(addr(0xd0));
        assert!(matches!(
            oracle().rates(&[other], Currency::NATIVE, Amount::new(1), &[]),
            Err(OracleError::UndefinedRate(c)) if c == other
        ));
    }

    #[test]
    fn test_estimate_rounds_up() {
        let oracle = TableOracle::new(Currency::NATIVE, addr(0x0a))
            .with_rate(usdc(), Amount::new(3 * Amount::SCALE));
        // 10 / 3 needs 4 units so the swap is never short
        let needed = oracle
            .estimate_swap(usdc(), Currency::NATIVE, Amount::new(10), &[])
            .unwrap();
        assert_eq!(needed, Amount::new(4));
    }

    #[test]
    fn test_swap_moves_both_legs() {
        let oracle = oracle();
        let mut vault = MemoryVault::new();
        vault.mint(usdc(), addr(1), Amount::new(1000));
        vault.mint(Currency::NATIVE, oracle.account(), Amount::new(1000));

        let consumed = oracle
            .swap(&mut vault, addr(1), usdc(), Currency::NATIVE, Amount::new(100), &[])
            .unwrap();
        assert_eq!(consumed, Amount::new(200));
        assert_eq!(vault.balance_of(usdc(), addr(1)), Amount::new(800));
        assert_eq!(vault.balance_of(Currency::NATIVE, addr(1)), Amount::new(100));
    }

    #[test]
    fn test_swap_without_liquidity_fails() {
        let oracle = oracle();
        let mut vault = MemoryVault::new();
        vault.mint(usdc(), addr(1), Amount::new(1000));

        assert!(matches!(
            oracle.swap(&mut vault, addr(1), usdc(), Currency::NATIVE, Amount::new(100), &[]),
            Err(OracleError::Transfer(_))
        ));
    }
}
