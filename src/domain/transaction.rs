use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{format_cents, AccountNumber, Amount, Cents};

pub type TransactionId = Uuid;

/// What happened to an account's balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    /// Opening balance recorded at registration (may be zero)
    InitialDeposit { amount: Cents },
    Deposit { amount: Amount },
    Withdrawal { amount: Amount },
    /// Outgoing side of a transfer
    TransferOut { amount: Amount, to: AccountNumber },
    /// Incoming side of a transfer
    TransferIn { amount: Amount, from: AccountNumber },
    /// Free-form entry with no balance effect
    Note { text: String },
}

impl TransactionKind {
    /// Signed balance effect of this entry in cents.
    pub fn balance_effect(&self) -> Cents {
        match self {
            TransactionKind::InitialDeposit { amount } => *amount,
            TransactionKind::Deposit { amount } | TransactionKind::TransferIn { amount, .. } => {
                amount.cents()
            }
            TransactionKind::Withdrawal { amount } | TransactionKind::TransferOut { amount, .. } => {
                -amount.cents()
            }
            TransactionKind::Note { .. } => 0,
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionKind::InitialDeposit { amount } => {
                write!(f, "Initial Deposit: {}", format_cents(*amount))
            }
            TransactionKind::Deposit { amount } => write!(f, "Deposited: {}", amount),
            TransactionKind::Withdrawal { amount } => write!(f, "Withdraw: {}", amount),
            TransactionKind::TransferOut { amount, to } => {
                write!(f, "Transferred: {} to Account: {}", amount, to)
            }
            TransactionKind::TransferIn { amount, from } => {
                write!(f, "Received: {} from Account: {}", amount, from)
            }
            TransactionKind::Note { text } => f.write_str(text),
        }
    }
}

/// One entry of an account's append-only transaction log.
/// Entries are immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    /// When the entry was appended
    pub recorded_at: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: TransactionKind,
}

impl Transaction {
    pub fn new(kind: TransactionKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            kind,
        }
    }

    pub fn note(text: impl Into<String>) -> Self {
        Self::new(TransactionKind::Note { text: text.into() })
    }
}

/// Renders the human-readable log line, e.g. "Deposited: 50.00".
impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}
