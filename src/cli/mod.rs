use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::application::{BankError, Ledger};
use crate::config::Config;
use crate::domain::{format_cents, parse_cents, AccountNumber, Amount, Profile};
use crate::io::{Statement, StatementFormat};
use crate::logging;

/// Tesoro - In-memory banking console
#[derive(Parser)]
#[command(name = "tesoro")]
#[command(about = "An interactive in-memory banking console")]
#[command(version)]
pub struct Cli {
    /// JSON config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Number assigned to the first registered account
    #[arg(long)]
    pub first_account: Option<AccountNumber>,

    /// Log output format: pretty, json
    #[arg(long)]
    pub log_format: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Resolve configuration: file and environment first, flags last.
    pub fn resolve_config(&self) -> Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(first) = self.first_account {
            config.first_account_number = first;
        }
        if let Some(format) = &self.log_format {
            config.log.format = format.parse()?;
        }
        if self.verbose {
            config.log.filter = "debug".to_string();
        }
        Ok(config)
    }

    pub fn run(self) -> Result<()> {
        let config = self.resolve_config()?;
        logging::init(&config.log);

        let ledger = Ledger::from_config(&config).context("Failed to initialize ledger")?;
        let stdin = std::io::stdin();
        let stdout = std::io::stdout();
        Console::new(ledger, stdin.lock(), stdout.lock()).run()
    }
}

/// One line typed at the console prompt
#[derive(Parser)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct ShellLine {
    #[command(subcommand)]
    command: ShellCommand,
}

#[derive(Subcommand)]
enum ShellCommand {
    /// Open a new account
    Register {
        #[arg(allow_hyphen_values = true)]
        name: String,
        #[arg(allow_hyphen_values = true)]
        address: String,
        #[arg(allow_hyphen_values = true)]
        contact: String,
        #[arg(allow_hyphen_values = true)]
        password: String,
        /// Initial deposit (e.g., "100.00" or "100")
        #[arg(allow_negative_numbers = true)]
        initial_deposit: String,
    },

    /// Log in to an account
    Login {
        account: AccountNumber,
        #[arg(allow_hyphen_values = true)]
        password: String,
    },

    /// Log out of the current account
    Logout,

    /// Deposit into the current account
    Deposit {
        /// Amount (e.g., "50.00" or "50")
        #[arg(allow_negative_numbers = true)]
        amount: String,
    },

    /// Withdraw from the current account
    Withdraw {
        /// Amount (e.g., "50.00" or "50")
        #[arg(allow_negative_numbers = true)]
        amount: String,
    },

    /// Transfer funds to another account
    Transfer {
        /// Recipient account number
        recipient: AccountNumber,

        /// Amount (e.g., "50.00" or "50")
        #[arg(allow_negative_numbers = true)]
        amount: String,
    },

    /// Show the current balance
    Balance,

    /// Show the account statement
    Statement {
        /// Format: text, csv, json
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Update name, address and contact of the current account
    Profile {
        #[arg(allow_hyphen_values = true)]
        name: String,
        #[arg(allow_hyphen_values = true)]
        address: String,
        #[arg(allow_hyphen_values = true)]
        contact: String,
    },

    /// Leave the console
    #[command(alias = "quit")]
    Exit,
}

enum Flow {
    Continue,
    Exit,
}

/// Interactive loop over a ledger. Reads commands from `input`, writes
/// results to `output`.
pub struct Console<R, W> {
    ledger: Ledger,
    session: Option<AccountNumber>,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Console<R, W> {
    pub fn new(ledger: Ledger, input: R, output: W) -> Self {
        Self {
            ledger,
            session: None,
            input,
            output,
        }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Run until `exit` or end of input.
    pub fn run(&mut self) -> Result<()> {
        writeln!(self.output, "--- Banking System ---")?;
        writeln!(self.output, "Type 'help' for a list of commands.")?;

        let mut line = String::new();
        loop {
            match self.session {
                Some(number) => write!(self.output, "tesoro[{}]> ", number)?,
                None => write!(self.output, "tesoro> ")?,
            }
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line).context("Failed to read input")? == 0 {
                writeln!(self.output)?;
                break;
            }

            let words: Vec<&str> = line.split_whitespace().collect();
            if words.is_empty() {
                continue;
            }

            let command = match ShellLine::try_parse_from(words) {
                Ok(parsed) => parsed.command,
                Err(e) => {
                    write!(self.output, "{}", e)?;
                    continue;
                }
            };

            if let Flow::Exit = self.execute(command)? {
                break;
            }
        }

        writeln!(self.output, "Exiting System. Goodbye!")?;
        Ok(())
    }

    fn execute(&mut self, command: ShellCommand) -> Result<Flow> {
        match command {
            ShellCommand::Register {
                name,
                address,
                contact,
                password,
                initial_deposit,
            } => {
                let initial = match parse_cents(&initial_deposit) {
                    Ok(cents) => cents,
                    Err(e) => {
                        writeln!(self.output, "Invalid amount: {}", e)?;
                        return Ok(Flow::Continue);
                    }
                };
                match self
                    .ledger
                    .register(Profile::new(name, address, contact), &password, initial)
                {
                    Ok(account) => writeln!(
                        self.output,
                        "Registration Successful! Your account number is: {}",
                        account.number()
                    )?,
                    Err(e) => writeln!(self.output, "Registration Failed. {}", e)?,
                }
            }

            ShellCommand::Login { account, password } => {
                match self.ledger.authenticate(account, &password) {
                    Ok(account) => {
                        self.session = Some(account.number());
                        writeln!(self.output, "Login Successful!")?;
                    }
                    Err(_) => writeln!(self.output, "Invalid Account Number or Password.")?,
                }
            }

            ShellCommand::Logout => {
                if self.session.take().is_some() {
                    writeln!(self.output, "Logging out...")?;
                } else {
                    writeln!(self.output, "Not logged in.")?;
                }
            }

            ShellCommand::Deposit { amount } => {
                let Some((number, amount)) = self.session_and_amount(&amount)? else {
                    return Ok(Flow::Continue);
                };
                match self.ledger.deposit(number, amount) {
                    Ok(balance) => writeln!(
                        self.output,
                        "Deposit Successful. New Balance: {}",
                        format_cents(balance)
                    )?,
                    Err(e) => writeln!(self.output, "Deposit Failed. {}", e)?,
                }
            }

            ShellCommand::Withdraw { amount } => {
                let Some((number, amount)) = self.session_and_amount(&amount)? else {
                    return Ok(Flow::Continue);
                };
                match self.ledger.withdraw(number, amount) {
                    Ok(balance) => writeln!(
                        self.output,
                        "Withdrawal Successful. New Balance: {}",
                        format_cents(balance)
                    )?,
                    Err(BankError::InsufficientFunds { .. }) => {
                        writeln!(self.output, "Insufficient Funds.")?
                    }
                    Err(e) => writeln!(self.output, "Withdrawal Failed. {}", e)?,
                }
            }

            ShellCommand::Transfer { recipient, amount } => {
                let Some((number, amount)) = self.session_and_amount(&amount)? else {
                    return Ok(Flow::Continue);
                };
                match self.ledger.transfer(number, recipient, amount) {
                    Ok(_) => writeln!(self.output, "Transfer Successful.")?,
                    Err(BankError::SelfTransfer(_)) => writeln!(
                        self.output,
                        "Transfer Failed. Cannot transfer to your own account."
                    )?,
                    Err(_) => writeln!(
                        self.output,
                        "Transfer Failed. Check Funds or Recipient Account."
                    )?,
                }
            }

            ShellCommand::Balance => {
                let Some(number) = self.require_session()? else {
                    return Ok(Flow::Continue);
                };
                let balance = self.ledger.balance(number)?;
                writeln!(self.output, "Balance: {}", format_cents(balance))?;
            }

            ShellCommand::Statement { format } => {
                let Some(number) = self.require_session()? else {
                    return Ok(Flow::Continue);
                };
                let format: StatementFormat = match format.parse() {
                    Ok(format) => format,
                    Err(e) => {
                        writeln!(self.output, "{}", e)?;
                        return Ok(Flow::Continue);
                    }
                };
                let statement = Statement::new(self.ledger.account(number)?);
                if format == StatementFormat::Text {
                    writeln!(self.output, "Account Statement:")?;
                }
                statement.write(format, &mut self.output)?;
            }

            ShellCommand::Profile {
                name,
                address,
                contact,
            } => {
                let Some(number) = self.require_session()? else {
                    return Ok(Flow::Continue);
                };
                self.ledger
                    .update_profile(number, Profile::new(name, address, contact))?;
                writeln!(self.output, "Profile Updated.")?;
            }

            ShellCommand::Exit => return Ok(Flow::Exit),
        }

        Ok(Flow::Continue)
    }

    /// The logged-in account, or a prompt to log in.
    fn require_session(&mut self) -> Result<Option<AccountNumber>> {
        if self.session.is_none() {
            writeln!(self.output, "Please log in first.")?;
        }
        Ok(self.session)
    }

    fn session_and_amount(&mut self, input: &str) -> Result<Option<(AccountNumber, Amount)>> {
        let Some(number) = self.require_session()? else {
            return Ok(None);
        };
        match Amount::parse(input) {
            Ok(amount) => Ok(Some((number, amount))),
            Err(e) => {
                writeln!(self.output, "Invalid amount: {}", e)?;
                Ok(None)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::domain::HashingParams;

    fn run_script(script: &str) -> (String, Ledger) {
        let ledger = Ledger::new(1001, HashingParams::insecure_fast()).unwrap();
        let mut output = Vec::new();
        let mut console = Console::new(ledger, Cursor::new(script.to_string()), &mut output);
        console.run().unwrap();
        let Console { ledger, .. } = console;
        (String::from_utf8(output).unwrap(), ledger)
    }

    #[test]
    fn test_register_login_and_transfer() {
        let (out, ledger) = run_script(
            "register Alice Addr 555-0100 pw1 100\n\
             register Bob Addr 555-0101 pw2 50.00\n\
             login 1001 pw1\n\
             transfer 1002 30\n\
             transfer 1002 1000\n\
             exit\n",
        );

        assert!(out.contains("Registration Successful! Your account number is: 1001"));
        assert!(out.contains("Registration Successful! Your account number is: 1002"));
        assert!(out.contains("Login Successful!"));
        assert!(out.contains("Transfer Successful."));
        assert!(out.contains("Transfer Failed. Check Funds or Recipient Account."));
        assert!(out.ends_with("Exiting System. Goodbye!\n"));
        assert_eq!(ledger.balance(1001), Ok(7000));
        assert_eq!(ledger.balance(1002), Ok(8000));
    }

    #[test]
    fn test_failed_login_message_is_uniform() {
        let (out, _) = run_script(
            "register Alice Addr 555-0100 pw1 100\n\
             login 1001 wrong\n\
             login 9999 pw1\n",
        );
        assert_eq!(out.matches("Invalid Account Number or Password.").count(), 2);
    }

    #[test]
    fn test_operations_require_login() {
        let (out, ledger) = run_script("register Alice Addr 555-0100 pw1 100\ndeposit 10\nbalance\n");
        assert_eq!(out.matches("Please log in first.").count(), 2);
        assert_eq!(ledger.balance(1001), Ok(10000));
    }

    #[test]
    fn test_deposit_withdraw_and_statement() {
        let (out, _) = run_script(
            "register Alice Addr 555-0100 pw1 100\n\
             login 1001 pw1\n\
             deposit 25.50\n\
             withdraw 500\n\
             withdraw 5.50\n\
             statement\n\
             logout\n",
        );

        assert!(out.contains("Deposit Successful. New Balance: 125.50"));
        assert!(out.contains("Insufficient Funds."));
        assert!(out.contains("Withdrawal Successful. New Balance: 120.00"));
        assert!(out.contains(
            "Account Statement:\nInitial Deposit: 100.00\nDeposited: 25.50\nWithdraw: 5.50\n"
        ));
        assert!(out.contains("Logging out..."));
    }

    #[test]
    fn test_invalid_amounts_are_rejected() {
        let (out, ledger) = run_script(
            "register Alice Addr 555-0100 pw1 -5\n\
             register Alice Addr 555-0100 pw1 100\n\
             login 1001 pw1\n\
             deposit -10\n\
             deposit abc\n\
             withdraw 0\n",
        );

        assert!(out.contains("Registration Failed."));
        assert_eq!(out.matches("Invalid amount:").count(), 4);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.history(1001).unwrap().len(), 1);
    }

    #[test]
    fn test_free_text_may_start_with_hyphen() {
        let (out, ledger) = run_script(
            "register Alice Addr 555-0100 -secret 100\n\
             login 1001 -secret\n\
             profile -Alicia- -Elsewhere -0199\n\
             logout\n\
             login 1001 secret\n",
        );

        assert!(out.contains("Registration Successful! Your account number is: 1001"));
        assert!(out.contains("Login Successful!"));
        assert!(out.contains("Profile Updated."));
        assert!(out.contains("Invalid Account Number or Password."));
        assert!(!out.contains("error:"));
        assert_eq!(ledger.len(), 1);
        assert!(ledger.authenticate(1001, "-secret").is_ok());

        let profile = ledger.account(1001).unwrap().profile();
        assert_eq!(profile.name, "-Alicia-");
        assert_eq!(profile.address, "-Elsewhere");
        assert_eq!(profile.contact, "-0199");
    }

    #[test]
    fn test_self_transfer_message() {
        let (out, _) = run_script(
            "register Alice Addr 555-0100 pw1 100\nlogin 1001 pw1\ntransfer 1001 10\n",
        );
        assert!(out.contains("Transfer Failed. Cannot transfer to your own account."));
    }

    #[test]
    fn test_unknown_command_keeps_running() {
        let (out, _) = run_script("fly away\nregister Alice Addr 555-0100 pw1 1\n");
        assert!(out.contains("error:"));
        assert!(out.contains("Registration Successful!"));
    }

    #[test]
    fn test_profile_update() {
        let (_, ledger) = run_script(
            "register Alice Addr 555-0100 pw1 100\nlogin 1001 pw1\nprofile Alicia Elsewhere 555-0199\n",
        );
        let profile = ledger.account(1001).unwrap().profile();
        assert_eq!(profile.name, "Alicia");
        assert_eq!(profile.address, "Elsewhere");
        assert_eq!(profile.contact, "555-0199");
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::parse_from(["tesoro", "--first-account", "2001", "--log-format", "json", "-v"]);
        let config = cli.resolve_config().unwrap();
        assert_eq!(config.first_account_number, 2001);
        assert_eq!(config.log.format, crate::config::LogFormat::Json);
        assert_eq!(config.log.filter, "debug");
    }
}
