use tracing::{debug, info, warn};

use crate::config::Config;
use crate::domain::{
    Account, AccountNumber, Amount, AmountError, Cents, Credential, HashingParams, Profile,
    Transaction, TransactionKind,
};
use crate::storage::Registry;

use super::BankError;

/// Application service owning every account and coordinating all operations.
/// This is the primary interface for any client (console, tests, a service wrapper).
///
/// A `Ledger` is an ordinary value: create as many independent instances as needed.
/// For concurrent callers wrap it in a [`super::SharedLedger`].
#[derive(Debug)]
pub struct Ledger {
    registry: Registry,
    hashing: HashingParams,
    /// Verified against when an unknown account number tries to log in,
    /// so both failure causes cost the same.
    decoy: Credential,
}

/// Result of a completed transfer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    pub from: AccountNumber,
    pub to: AccountNumber,
    pub amount: Amount,
    pub sender_balance: Cents,
    pub recipient_balance: Cents,
}

impl Ledger {
    /// Create an empty ledger whose first account gets `first_number`.
    pub fn new(first_number: AccountNumber, hashing: HashingParams) -> Result<Self, BankError> {
        let decoy = Credential::hash("", &hashing)?;
        Ok(Self {
            registry: Registry::new(first_number),
            hashing,
            decoy,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, BankError> {
        Self::new(config.first_account_number, config.hashing)
    }

    // ========================
    // Account lifecycle
    // ========================

    /// Open a new account and return it.
    ///
    /// The initial deposit may be zero but not negative. Numbers are handed
    /// out sequentially and never reused.
    pub fn register(
        &mut self,
        profile: Profile,
        password: &str,
        initial_deposit: Cents,
    ) -> Result<&Account, BankError> {
        if initial_deposit < 0 {
            return Err(AmountError::NotPositive(initial_deposit).into());
        }

        let credential = Credential::hash(password, &self.hashing)?;
        let number = self
            .registry
            .allocate_number()
            .ok_or(BankError::AccountNumbersExhausted)?;

        info!(
            account = number,
            initial_deposit_cents = initial_deposit,
            "account registered"
        );

        let account = Account::new(number, profile, credential, initial_deposit);
        self.registry
            .insert(account)
            .ok_or(BankError::AccountNumberInUse(number))
    }

    /// Check an account number + password pair.
    ///
    /// Unknown accounts and wrong passwords produce the same
    /// [`BankError::AuthenticationFailed`].
    pub fn authenticate(
        &self,
        number: AccountNumber,
        password: &str,
    ) -> Result<&Account, BankError> {
        match self.registry.get(number) {
            Some(account) if account.validate_credential(password) => {
                info!(account = number, "login succeeded");
                Ok(account)
            }
            Some(_) => {
                warn!(account = number, "login failed");
                Err(BankError::AuthenticationFailed)
            }
            None => {
                let _ = self.decoy.verify(password);
                warn!(account = number, "login failed");
                Err(BankError::AuthenticationFailed)
            }
        }
    }

    pub fn update_profile(
        &mut self,
        number: AccountNumber,
        profile: Profile,
    ) -> Result<&Account, BankError> {
        let account = self.account_mut(number)?;
        account.update_profile(profile);
        debug!(account = number, "profile updated");
        Ok(account)
    }

    // ========================
    // Balance operations
    // ========================

    /// Deposit into an account. Returns the new balance.
    pub fn deposit(&mut self, number: AccountNumber, amount: Amount) -> Result<Cents, BankError> {
        let balance = self
            .account_mut(number)?
            .deposit(amount)
            .map_err(|e| BankError::from_account(number, e))?;
        debug!(account = number, amount_cents = amount.cents(), "deposit");
        Ok(balance)
    }

    /// Withdraw from an account. Returns the new balance; on insufficient
    /// funds the account is left untouched.
    pub fn withdraw(&mut self, number: AccountNumber, amount: Amount) -> Result<Cents, BankError> {
        let result = self
            .account_mut(number)?
            .withdraw(amount)
            .map_err(|e| BankError::from_account(number, e));

        match &result {
            Ok(_) => debug!(account = number, amount_cents = amount.cents(), "withdrawal"),
            Err(e) => warn!(account = number, amount_cents = amount.cents(), error = %e, "withdrawal rejected"),
        }
        result
    }

    /// Move `amount` from `from` to `to`.
    ///
    /// Every check runs before any balance changes, so a transfer is applied
    /// completely or not at all. Each side gets exactly one log entry.
    pub fn transfer(
        &mut self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Amount,
    ) -> Result<TransferReceipt, BankError> {
        let result = self.try_transfer(from, to, amount);
        match &result {
            Ok(_) => info!(from, to, amount_cents = amount.cents(), "transfer completed"),
            Err(e) => warn!(from, to, amount_cents = amount.cents(), error = %e, "transfer rejected"),
        }
        result
    }

    fn try_transfer(
        &mut self,
        from: AccountNumber,
        to: AccountNumber,
        amount: Amount,
    ) -> Result<TransferReceipt, BankError> {
        let sender = self.account(from)?;
        let recipient = self
            .registry
            .get(to)
            .ok_or(BankError::RecipientNotFound(to))?;

        if from == to {
            return Err(BankError::SelfTransfer(from));
        }
        if !sender.covers(amount) {
            return Err(BankError::InsufficientFunds {
                account: from,
                balance: sender.balance(),
                required: amount.cents(),
            });
        }
        if !recipient.can_credit(amount) {
            return Err(BankError::BalanceOverflow(to));
        }

        let sender = self.account_mut(from)?;
        sender
            .debit(amount)
            .map_err(|e| BankError::from_account(from, e))?;
        sender.record(TransactionKind::TransferOut { amount, to });
        let sender_balance = sender.balance();

        let recipient = self.account_mut(to)?;
        recipient
            .credit(amount)
            .map_err(|e| BankError::from_account(to, e))?;
        recipient.record(TransactionKind::TransferIn { amount, from });
        let recipient_balance = recipient.balance();

        Ok(TransferReceipt {
            from,
            to,
            amount,
            sender_balance,
            recipient_balance,
        })
    }

    /// Append a free-form note to an account's log.
    pub fn record_note(
        &mut self,
        number: AccountNumber,
        text: impl Into<String>,
    ) -> Result<(), BankError> {
        self.account_mut(number)?.record_transaction(text);
        Ok(())
    }

    // ========================
    // Queries
    // ========================

    pub fn account(&self, number: AccountNumber) -> Result<&Account, BankError> {
        self.registry
            .get(number)
            .ok_or(BankError::AccountNotFound(number))
    }

    pub fn balance(&self, number: AccountNumber) -> Result<Cents, BankError> {
        Ok(self.account(number)?.balance())
    }

    /// Transaction log of an account, oldest first.
    pub fn history(&self, number: AccountNumber) -> Result<&[Transaction], BankError> {
        Ok(self.account(number)?.history())
    }

    /// All accounts ordered by number.
    pub fn accounts(&self) -> Vec<&Account> {
        self.registry.list()
    }

    /// Sum of every account's balance.
    pub fn total_balance(&self) -> i128 {
        self.registry.total_balance()
    }

    /// The number the next registration will receive.
    pub fn next_account_number(&self) -> AccountNumber {
        self.registry.peek_next_number()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    fn account_mut(&mut self, number: AccountNumber) -> Result<&mut Account, BankError> {
        self.registry
            .get_mut(number)
            .ok_or(BankError::AccountNotFound(number))
    }
}
