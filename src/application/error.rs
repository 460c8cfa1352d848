use thiserror::Error;

use crate::domain::{AccountError, AccountNumber, AmountError, Cents, CredentialError};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BankError {
    #[error("Account not found: {0}")]
    AccountNotFound(AccountNumber),

    #[error("Recipient account not found: {0}")]
    RecipientNotFound(AccountNumber),

    /// Unknown account number and wrong password are deliberately the same error.
    #[error("Invalid account number or password")]
    AuthenticationFailed,

    #[error("Insufficient funds in account {account}: balance {balance}, required {required}")]
    InsufficientFunds {
        account: AccountNumber,
        balance: Cents,
        required: Cents,
    },

    #[error("Invalid amount: {0}")]
    InvalidAmount(#[from] AmountError),

    #[error("Cannot transfer from account {0} to itself")]
    SelfTransfer(AccountNumber),

    #[error("Balance of account {0} would overflow")]
    BalanceOverflow(AccountNumber),

    #[error("No account numbers left to assign")]
    AccountNumbersExhausted,

    #[error("Account number {0} is already in use")]
    AccountNumberInUse(AccountNumber),

    #[error("Credential error: {0}")]
    Credential(#[from] CredentialError),
}

impl BankError {
    /// Attach the account number to a domain-level account error.
    pub fn from_account(account: AccountNumber, err: AccountError) -> Self {
        match err {
            AccountError::InsufficientFunds { balance, required } => BankError::InsufficientFunds {
                account,
                balance,
                required,
            },
            AccountError::BalanceOverflow => BankError::BalanceOverflow(account),
        }
    }
}
