// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use anyhow::Result;
use tesoro::application::Ledger;
use tesoro::domain::{AccountNumber, Amount, Cents, HashingParams, Profile};

/// Helper to create an empty ledger numbering from 1001 with cheap hashing
pub fn test_ledger() -> Result<Ledger> {
    Ok(Ledger::new(1001, HashingParams::insecure_fast())?)
}

/// Helper to build an amount from cents
pub fn amount(cents: Cents) -> Amount {
    Amount::from_cents(cents).unwrap()
}

/// Log lines of an account, oldest first
pub fn log_lines(ledger: &Ledger, number: AccountNumber) -> Vec<String> {
    ledger
        .history(number)
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect()
}

/// Test fixture: the two customers used throughout the scenarios
pub struct StandardAccounts {
    pub alice: AccountNumber,
    pub bob: AccountNumber,
}

impl StandardAccounts {
    /// Alice opens with 100.00 (pw1), Bob with 50.00 (pw2)
    pub fn create(ledger: &mut Ledger) -> Result<Self> {
        let alice = ledger
            .register(Profile::new("Alice", "Addr", "555-0100"), "pw1", 10000)?
            .number();
        let bob = ledger
            .register(Profile::new("Bob", "Addr", "555-0101"), "pw2", 5000)?
            .number();
        Ok(Self { alice, bob })
    }
}
