use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::domain::{Account, AccountNumber, Amount, Cents, Profile};

use super::{BankError, Ledger, TransferReceipt};

/// Thread-safe handle to a [`Ledger`].
///
/// Every call runs inside one critical section, so concurrent readers never
/// observe half of a transfer. Cloning the handle shares the same ledger.
#[derive(Debug, Clone)]
pub struct SharedLedger {
    inner: Arc<Mutex<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ledger)),
        }
    }

    /// Run `f` with exclusive access to the ledger.
    pub fn with<R>(&self, f: impl FnOnce(&mut Ledger) -> R) -> R {
        let mut guard = self.lock();
        f(&mut *guard)
    }

    /// Returns the new account's number.
    pub fn register(
        &self,
        profile: Profile,
        password: &str,
        initial_deposit: Cents,
    ) -> Result<AccountNumber, BankError> {
        self.with(|ledger| {
            ledger
                .register(profile, password, initial_deposit)
                .map(Account::number)
        })
    }

    pub fn authenticate(
        &self,
        number: AccountNumber,
        password: &str,
    ) -> Result<AccountNumber, BankError> {
        self.with(|ledger| ledger.authenticate(number, password).map(Account::number))
    }

    pub fn deposit(&self, number: AccountNumber, amount: Amount) -> Result<Cents, BankError> {
        self.with(|ledger| ledger.deposit(number, amount))
    }

    pub fn withdraw(&self, number: AccountNumber, amount: Amount) -> Result<Cents, BankError> {
        self.with(|ledger| ledger.withdraw(number, amount))
    }

    pub fn transfer(
        &self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Amount,
    ) -> Result<TransferReceipt, BankError> {
        self.with(|ledger| ledger.transfer(from, to, amount))
    }

    pub fn update_profile(&self, number: AccountNumber, profile: Profile) -> Result<(), BankError> {
        self.with(|ledger| ledger.update_profile(number, profile).map(|_| ()))
    }

    /// Point-in-time copy of an account.
    pub fn snapshot(&self, number: AccountNumber) -> Result<Account, BankError> {
        self.with(|ledger| ledger.account(number).cloned())
    }

    pub fn total_balance(&self) -> i128 {
        self.with(|ledger| ledger.total_balance())
    }

    // Checks run before mutation inside the ledger, so a panic while the
    // lock is held cannot leave a half-applied operation behind.
    fn lock(&self) -> MutexGuard<'_, Ledger> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
