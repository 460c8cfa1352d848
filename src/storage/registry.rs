use std::collections::hash_map::Entry;
use std::collections::HashMap;

use crate::domain::{Account, AccountNumber};

/// Default first account number handed out by a fresh registry.
pub const DEFAULT_FIRST_ACCOUNT_NUMBER: AccountNumber = 1001;

/// In-memory store for accounts, keyed by account number.
///
/// Owns the account-number counter: every issued number is strictly below
/// `next_number`, and the counter only moves forward.
#[derive(Debug)]
pub struct Registry {
    accounts: HashMap<AccountNumber, Account>,
    next_number: AccountNumber,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_ACCOUNT_NUMBER)
    }
}

impl Registry {
    pub fn new(first_number: AccountNumber) -> Self {
        Self {
            accounts: HashMap::new(),
            next_number: first_number,
        }
    }

    /// The number the next registration will receive.
    pub fn peek_next_number(&self) -> AccountNumber {
        self.next_number
    }

    /// Reserve the next account number (post-increment).
    /// Returns None once the number space is exhausted.
    pub fn allocate_number(&mut self) -> Option<AccountNumber> {
        let number = self.next_number;
        self.next_number = number.checked_add(1)?;
        Some(number)
    }

    /// Store a new account and return a reference to it.
    ///
    /// Returns None, leaving the registry untouched, when the number was
    /// never allocated or already belongs to another account.
    pub(crate) fn insert(&mut self, account: Account) -> Option<&Account> {
        let number = account.number();
        if number >= self.next_number {
            return None;
        }
        match self.accounts.entry(number) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => Some(slot.insert(account)),
        }
    }

    pub fn get(&self, number: AccountNumber) -> Option<&Account> {
        self.accounts.get(&number)
    }

    pub fn get_mut(&mut self, number: AccountNumber) -> Option<&mut Account> {
        self.accounts.get_mut(&number)
    }

    pub fn contains(&self, number: AccountNumber) -> bool {
        self.accounts.contains_key(&number)
    }

    /// All accounts ordered by account number.
    pub fn list(&self) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self.accounts.values().collect();
        accounts.sort_by_key(|a| a.number());
        accounts
    }

    /// Sum of all balances.
    pub fn total_balance(&self) -> i128 {
        self.accounts
            .values()
            .map(|a| i128::from(a.balance()))
            .sum()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}
