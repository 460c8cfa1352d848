use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Amount, Cents, Credential, Transaction, TransactionKind};

/// Account numbers are assigned sequentially by the ledger and never reused.
pub type AccountNumber = u32;

/// Identity details of an account holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub address: String,
    pub contact: String,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        address: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            contact: contact.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    #[error("insufficient funds: balance {balance}, required {required}")]
    InsufficientFunds { balance: Cents, required: Cents },

    #[error("balance would overflow")]
    BalanceOverflow,
}

/// A customer account: identity, credential, balance and transaction log.
///
/// The balance is never negative. Every balance change through the public
/// API appends exactly one entry to the history.
#[derive(Debug, Clone)]
pub struct Account {
    number: AccountNumber,
    profile: Profile,
    credential: Credential,
    balance: Cents,
    history: Vec<Transaction>,
}

impl Account {
    /// Create an account holding `initial_deposit`, which is recorded as the
    /// first history entry. The caller guarantees `initial_deposit >= 0`.
    pub fn new(
        number: AccountNumber,
        profile: Profile,
        credential: Credential,
        initial_deposit: Cents,
    ) -> Self {
        debug_assert!(initial_deposit >= 0, "initial deposit must not be negative");
        Self {
            number,
            profile,
            credential,
            balance: initial_deposit,
            history: vec![Transaction::new(TransactionKind::InitialDeposit {
                amount: initial_deposit,
            })],
        }
    }

    pub fn number(&self) -> AccountNumber {
        self.number
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn balance(&self) -> Cents {
        self.balance
    }

    /// Transaction log, oldest first.
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    pub fn validate_credential(&self, password: &str) -> bool {
        self.credential.verify(password)
    }

    pub fn deposit(&mut self, amount: Amount) -> Result<Cents, AccountError> {
        self.credit(amount)?;
        self.record(TransactionKind::Deposit { amount });
        Ok(self.balance)
    }

    /// Withdraw `amount` if the balance covers it. On failure nothing changes.
    pub fn withdraw(&mut self, amount: Amount) -> Result<Cents, AccountError> {
        self.debit(amount)?;
        self.record(TransactionKind::Withdrawal { amount });
        Ok(self.balance)
    }

    /// Append a free-form entry to the log.
    pub fn record_transaction(&mut self, text: impl Into<String>) {
        self.history.push(Transaction::note(text));
    }

    /// Replace the holder's identity details. Number, balance, credential
    /// and history are untouched.
    pub fn update_profile(&mut self, profile: Profile) {
        self.profile = profile;
    }

    /// True if crediting `amount` would not overflow the balance.
    pub fn can_credit(&self, amount: Amount) -> bool {
        self.balance.checked_add(amount.cents()).is_some()
    }

    pub fn covers(&self, amount: Amount) -> bool {
        amount.cents() <= self.balance
    }

    pub(crate) fn record(&mut self, kind: TransactionKind) {
        self.history.push(Transaction::new(kind));
    }

    /// Balance decrease without a log entry; transfer coordination logs its own.
    pub(crate) fn debit(&mut self, amount: Amount) -> Result<(), AccountError> {
        if !self.covers(amount) {
            return Err(AccountError::InsufficientFunds {
                balance: self.balance,
                required: amount.cents(),
            });
        }
        self.balance -= amount.cents();
        Ok(())
    }

    pub(crate) fn credit(&mut self, amount: Amount) -> Result<(), AccountError> {
        self.balance = self
            .balance
            .checked_add(amount.cents())
            .ok_or(AccountError::BalanceOverflow)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::domain::HashingParams;

    fn amount(cents: Cents) -> Amount {
        Amount::from_cents(cents).unwrap()
    }

    fn sample_account(initial: Cents) -> Account {
        let credential = Credential::hash("pw1", &HashingParams::insecure_fast()).unwrap();
        Account::new(
            1001,
            Profile::new("Alice", "Addr", "555-0100"),
            credential,
            initial,
        )
    }

    fn log_lines(account: &Account) -> Vec<String> {
        account.history().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_new_account_logs_initial_deposit() {
        let account = sample_account(10000);
        assert_eq!(account.number(), 1001);
        assert_eq!(account.balance(), 10000);
        assert_eq!(log_lines(&account), vec!["Initial Deposit: 100.00"]);
    }

    #[test]
    fn test_validate_credential() {
        let account = sample_account(0);
        assert!(account.validate_credential("pw1"));
        assert!(!account.validate_credential("wrong"));
    }

    #[test]
    fn test_deposit_and_withdraw() {
        let mut account = sample_account(10000);

        assert_eq!(account.deposit(amount(2550)), Ok(12550));
        assert_eq!(account.withdraw(amount(550)), Ok(12000));
        assert_eq!(
            log_lines(&account),
            vec!["Initial Deposit: 100.00", "Deposited: 25.50", "Withdraw: 5.50"]
        );
    }

    #[test]
    fn test_withdraw_entire_balance() {
        let mut account = sample_account(5000);
        assert_eq!(account.withdraw(amount(5000)), Ok(0));
        assert_eq!(account.balance(), 0);
    }

    #[test]
    fn test_overdraw_changes_nothing() {
        let mut account = sample_account(5000);

        let result = account.withdraw(amount(5001));

        assert_eq!(
            result,
            Err(AccountError::InsufficientFunds {
                balance: 5000,
                required: 5001
            })
        );
        assert_eq!(account.balance(), 5000);
        assert_eq!(account.history().len(), 1);
    }

    #[test]
    fn test_deposit_overflow_changes_nothing() {
        let mut account = sample_account(i64::MAX - 10);

        assert_eq!(account.deposit(amount(11)), Err(AccountError::BalanceOverflow));
        assert!(!account.can_credit(amount(11)));
        assert_eq!(account.balance(), i64::MAX - 10);
        assert_eq!(account.history().len(), 1);
    }

    #[test]
    fn test_update_profile_keeps_everything_else() {
        let mut account = sample_account(10000);
        account.deposit(amount(100)).unwrap();

        account.update_profile(Profile::new("Alice B.", "New Addr", "555-0199"));

        assert_eq!(account.profile().name, "Alice B.");
        assert_eq!(account.profile().address, "New Addr");
        assert_eq!(account.profile().contact, "555-0199");
        assert_eq!(account.number(), 1001);
        assert_eq!(account.balance(), 10100);
        assert_eq!(account.history().len(), 2);
        assert!(account.validate_credential("pw1"));
    }

    #[test]
    fn test_record_transaction_appends_note() {
        let mut account = sample_account(0);
        account.record_transaction("Card issued");
        assert_eq!(log_lines(&account), vec!["Initial Deposit: 0.00", "Card issued"]);
        assert_eq!(account.balance(), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 64,
            ..ProptestConfig::default()
        })]

        /// Property: deposits add exactly their sum, one log entry per call.
        #[test]
        fn deposits_add_their_sum(
            initial in 0i64..1_000_000,
            deposits in prop::collection::vec(1i64..1_000_000, 0..20)
        ) {
            let mut account = sample_account(initial);
            let log_before = account.history().len();

            for cents in &deposits {
                account.deposit(amount(*cents)).unwrap();
            }

            prop_assert_eq!(account.balance(), initial + deposits.iter().sum::<i64>());
            prop_assert_eq!(account.history().len(), log_before + deposits.len());
        }

        /// Property: a withdrawal either subtracts exactly and logs once,
        /// or fails leaving balance and log untouched.
        #[test]
        fn withdraw_is_guarded(initial in 0i64..100_000, requested in 1i64..200_000) {
            let mut account = sample_account(initial);

            let result = account.withdraw(amount(requested));

            if requested <= initial {
                prop_assert_eq!(result, Ok(initial - requested));
                prop_assert_eq!(account.history().len(), 2);
            } else {
                let is_insufficient = matches!(result, Err(AccountError::InsufficientFunds { .. }));
                prop_assert!(is_insufficient);
                prop_assert_eq!(account.balance(), initial);
                prop_assert_eq!(account.history().len(), 1);
            }
            prop_assert!(account.balance() >= 0);
        }

        /// Property: history replays to the current balance.
        #[test]
        fn history_replays_to_balance(
            initial in 0i64..100_000,
            ops in prop::collection::vec((any::<bool>(), 1i64..50_000), 0..30)
        ) {
            let mut account = sample_account(initial);
            for (is_deposit, cents) in ops {
                if is_deposit {
                    account.deposit(amount(cents)).unwrap();
                } else {
                    let _ = account.withdraw(amount(cents));
                }
            }

            let replayed: Cents = account.history().iter().map(|t| t.kind.balance_effect()).sum();
            prop_assert_eq!(replayed, account.balance());
        }
    }
}
