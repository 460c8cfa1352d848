use std::io::Write;
use std::str::FromStr;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Account, AccountNumber, Cents, Transaction};

/// Output format for an account statement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatementFormat {
    /// One log line per entry, as shown in the console
    #[default]
    Text,
    Csv,
    Json,
}

impl FromStr for StatementFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(StatementFormat::Text),
            "csv" => Ok(StatementFormat::Csv),
            "json" => Ok(StatementFormat::Json),
            other => bail!("unknown statement format '{}' (expected text, csv or json)", other),
        }
    }
}

/// Point-in-time statement of one account
#[derive(Debug, Clone, Serialize)]
pub struct Statement<'a> {
    pub account_number: AccountNumber,
    pub holder: &'a str,
    pub balance_cents: Cents,
    pub generated_at: DateTime<Utc>,
    pub transactions: &'a [Transaction],
}

impl<'a> Statement<'a> {
    pub fn new(account: &'a Account) -> Self {
        Self {
            account_number: account.number(),
            holder: &account.profile().name,
            balance_cents: account.balance(),
            generated_at: Utc::now(),
            transactions: account.history(),
        }
    }

    /// Write the statement in `format`. Returns the number of entries written.
    pub fn write<W: Write>(&self, format: StatementFormat, writer: W) -> Result<usize> {
        match format {
            StatementFormat::Text => self.write_text(writer),
            StatementFormat::Csv => self.write_csv(writer),
            StatementFormat::Json => self.write_json(writer),
        }
    }

    pub fn write_text<W: Write>(&self, mut writer: W) -> Result<usize> {
        for transaction in self.transactions {
            writeln!(writer, "{}", transaction)?;
        }
        Ok(self.transactions.len())
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["id", "recorded_at", "entry", "amount_cents"])?;

        for transaction in self.transactions {
            csv_writer.write_record(&[
                transaction.id.to_string(),
                transaction.recorded_at.to_rfc3339(),
                transaction.to_string(),
                transaction.kind.balance_effect().to_string(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(self.transactions.len())
    }

    pub fn write_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        serde_json::to_writer_pretty(&mut writer, self)?;
        writeln!(writer)?;
        Ok(self.transactions.len())
    }
}
