//! CLI binary for driving the VicCoin library from a terminal.

use std::io::{self, Write as _};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, Table};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use secrecy::{ExposeSecret as _, SecretString};
use viccoin_rs::category::{CategoryContext, CategoryTables};
use viccoin_rs::format::{format_currency, format_date_for_display, format_percent, parse_date};
use viccoin_rs::models::{
    CategoryRef, FinancialSummary, NaiveDate, SubmittedTransaction, Transaction, TransactionKind,
    TrendDirection, UserProfile,
};
use viccoin_rs::report::{Period, Report, Severity};
use viccoin_rs::storage::{BlockingStorage, FileStorage};
use viccoin_rs::viccoin::{Reconciliation, TransactionFilter, VicCoinBlocking};
use viccoin_rs::wizard::{
    CategoryChoice, ChatMessage, Speaker, TransactionWizard, WizardError, WizardStep,
};

/// Environment variable name for the API token.
const TOKEN_ENV: &str = "VICCOIN_TOKEN";
/// Environment variable name for the API base URL.
const BASE_URL_ENV: &str = "VICCOIN_BASE_URL";

/// Last entry of the category menu, for a name not in the list.
const OTHER_CATEGORY: &str = "Outra...";
/// Prompt for a category typed by hand.
const CATEGORY_NAME_PROMPT: &str = "Nome da categoria";
/// Prompt for a corrected date.
const NEW_DATE_PROMPT: &str = "Nova data (DD/MM/AAAA)";

/// VicCoin CLI: record transactions and browse reports.
#[derive(Debug, Parser)]
#[command(name = "viccoin", version, about)]
struct Cli {
    /// Override the storage directory (default: XDG data dir).
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
enum Command {
    /// Create an account. Sign in afterwards with `login`.
    Register {
        /// Display name.
        #[arg(long)]
        name: String,
        /// Account e-mail.
        #[arg(long)]
        email: String,
        /// Password. Prompted twice, without echo, when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign in and store the session token.
    Login {
        /// Account e-mail.
        #[arg(long)]
        email: String,
        /// Password. Prompted without echo when omitted.
        #[arg(long)]
        password: Option<String>,
    },
    /// Show the signed-in user's profile.
    Profile,
    /// Forget the stored session.
    Logout,
    /// Show account totals.
    Summary,
    /// List transactions. Salary entries are hidden unless --all is given.
    Transactions(TransactionArgs),
    /// Show the chart, category breakdown and insights of a period.
    Report {
        /// week, month, quarter, year or all.
        #[arg(default_value = "month")]
        period: Period,
    },
    /// Record a transaction through the entry wizard.
    Add(AddArgs),
    /// Show or extend the category lists.
    #[command(subcommand)]
    Categories(CategoriesCommand),
    /// List transactions waiting to be sent.
    Pending,
    /// Resend queued transactions.
    Sync,
}

/// Arguments for the `transactions` subcommand.
#[derive(Debug, Default, Args)]
struct TransactionArgs {
    /// Start date (inclusive). Requires --to.
    #[arg(long, requires = "to", value_parser = parse_date_arg)]
    from: Option<NaiveDate>,
    /// End date (inclusive). Requires --from.
    #[arg(long, requires = "from", value_parser = parse_date_arg)]
    to: Option<NaiveDate>,
    /// Only this kind (despesa, ganho, salario).
    #[arg(long)]
    kind: Option<TransactionKind>,
    /// Raw category reference (a name, or a table position).
    #[arg(long)]
    category: Option<String>,
    /// Description substring (case-insensitive).
    #[arg(long)]
    text: Option<String>,
    /// Include salary entries.
    #[arg(long)]
    all: bool,
}

/// Arguments for the `add` subcommand. Without `--amount` or
/// `--category` the wizard asks for every answer not given.
#[derive(Debug, Args)]
struct AddArgs {
    /// despesa, ganho or salario.
    kind: TransactionKind,
    /// Amount, e.g. `1.234,56`.
    #[arg(long, allow_hyphen_values = true)]
    amount: Option<String>,
    /// Optional description.
    #[arg(long)]
    description: Option<String>,
    /// Category name.
    #[arg(long)]
    category: Option<String>,
    /// Date when not today (DD/MM/YYYY or YYYY-MM-DD).
    #[arg(long, value_parser = parse_date_arg)]
    date: Option<NaiveDate>,
}

/// Subcommands of `categories`.
#[derive(Debug, Subcommand)]
enum CategoriesCommand {
    /// Show the category lists.
    List {
        /// Only this list (despesa, ganho, salario, geral).
        #[arg(value_parser = parse_context)]
        context: Option<CategoryContext>,
    },
    /// Append a category to a list.
    Add {
        /// Target list (despesa, ganho, salario, geral).
        #[arg(value_parser = parse_context)]
        context: CategoryContext,
        /// Name of the new category.
        name: String,
    },
}

/// Parses a date in `DD/MM/YYYY` or `YYYY-MM-DD` format for clap.
fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).ok_or_else(|| format!("invalid date: {s:?}"))
}

/// Parses a category list name for clap.
fn parse_context(s: &str) -> Result<CategoryContext, String> {
    let wanted = s.trim().to_lowercase();
    if let Some(context) = CategoryContext::ALL
        .into_iter()
        .find(|context| context.as_str() == wanted)
    {
        return Ok(context);
    }
    wanted
        .parse::<TransactionKind>()
        .map(CategoryContext::from)
        .map_err(|err| err.to_string())
}

/// Reads a non-empty environment variable.
fn read_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|val| !val.is_empty())
}

/// Prints an error line and returns the failure exit code.
fn fail(context: &str, err: &dyn core::fmt::Display) -> io::Result<ExitCode> {
    writeln!(
        io::stderr().lock(),
        "{} {context}: {err}",
        "error:".red().bold()
    )?;
    Ok(ExitCode::FAILURE)
}

/// Runs the CLI, returning an appropriate exit code.
fn run() -> io::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let _dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let storage = match create_storage(cli.data_dir) {
        Ok(storage) => storage,
        Err(err) => return fail("failed to initialize storage", &err),
    };

    let mut builder = VicCoinBlocking::builder().storage(storage);
    if let Some(token) = read_env(TOKEN_ENV) {
        builder = builder.token(token);
    }
    if let Some(url) = read_env(BASE_URL_ENV) {
        builder = builder.base_url(url);
    }
    let mut client = match builder.build() {
        Ok(client) => client,
        Err(err) => return fail("failed to build client", &err),
    };

    match client.restore_session() {
        Ok(true) => {}
        Ok(false) => tracing::debug!("no session; run `viccoin login` to sign in"),
        Err(err) => return fail("failed to read session", &err),
    }

    dispatch(&mut client, cli.command)
}

/// Creates the storage backend, using `data_dir` if provided or the
/// default XDG data directory otherwise.
fn create_storage(data_dir: Option<PathBuf>) -> viccoin_rs::error::Result<FileStorage> {
    let dir = match data_dir {
        Some(dir) => dir,
        None => FileStorage::default_dir()?,
    };
    FileStorage::new(dir)
}

/// Dispatches to the appropriate subcommand handler.
fn dispatch<S: BlockingStorage>(
    client: &mut VicCoinBlocking<S>,
    command: Command,
) -> io::Result<ExitCode> {
    match command {
        Command::Register {
            name,
            email,
            password,
        } => cmd_register(client, &name, &email, password),
        Command::Login { email, password } => cmd_login(client, &email, password),
        Command::Profile => cmd_profile(client),
        Command::Logout => cmd_logout(client),
        Command::Summary => cmd_summary(client),
        Command::Transactions(args) => cmd_transactions(client, &args),
        Command::Report { period } => cmd_report(client, period),
        Command::Add(args) => cmd_add(client, &args),
        Command::Categories(sub) => cmd_categories(client, sub),
        Command::Pending => cmd_pending(client),
        Command::Sync => cmd_sync(client),
    }
}

/// Prompts for a password on the terminal without echoing it.
fn read_password(prompt: &str) -> io::Result<SecretString> {
    rpassword::prompt_password(prompt).map(SecretString::from)
}

/// Returns the password when both entries match.
fn matching_password(first: SecretString, again: &SecretString) -> Option<SecretString> {
    (first.expose_secret() == again.expose_secret()).then_some(first)
}

/// Executes the `register` subcommand.
fn cmd_register<S: BlockingStorage>(
    client: &VicCoinBlocking<S>,
    name: &str,
    email: &str,
    password: Option<String>,
) -> io::Result<ExitCode> {
    let secret = match password {
        Some(given) => SecretString::from(given),
        None => {
            let first = read_password("Password: ")?;
            let again = read_password("Repeat password: ")?;
            match matching_password(first, &again) {
                Some(confirmed) => confirmed,
                None => return fail("registration aborted", &"passwords do not match"),
            }
        }
    };
    let spinner = make_spinner("Creating account...");

    match client.register(name, email, secret) {
        Ok(_) => {
            spinner.finish_and_clear();
            writeln!(
                io::stdout().lock(),
                "{} {name}; sign in with `viccoin login --email {email}`",
                "Account created for".green().bold()
            )?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            fail("registration failed", &err)
        }
    }
}

/// Executes the `login` subcommand.
fn cmd_login<S: BlockingStorage>(
    client: &mut VicCoinBlocking<S>,
    email: &str,
    password: Option<String>,
) -> io::Result<ExitCode> {
    let secret = match password {
        Some(given) => SecretString::from(given),
        None => read_password("Password: ")?,
    };
    let spinner = make_spinner("Signing in...");

    match client.login(email, secret) {
        Ok(response) => {
            spinner.finish_and_clear();
            let name = response
                .user
                .as_ref()
                .map_or(email, |user| user.name.as_str());
            writeln!(io::stdout().lock(), "{} {name}", "Signed in as".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            fail("login failed", &err)
        }
    }
}

/// Executes the `profile` subcommand. Falls back to the cached profile
/// when the service cannot be reached.
fn cmd_profile<S: BlockingStorage>(client: &VicCoinBlocking<S>) -> io::Result<ExitCode> {
    let spinner = make_spinner("Fetching profile...");
    let fetched = client.refresh_profile();
    spinner.finish_and_clear();

    match fetched {
        Ok(profile) => {
            print_profile(&profile)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => match client.profile() {
            Ok(Some(cached)) => {
                writeln!(
                    io::stderr().lock(),
                    "{} {err}; showing cached profile",
                    "warning:".yellow().bold()
                )?;
                print_profile(&cached)?;
                Ok(ExitCode::SUCCESS)
            }
            Ok(None) => fail("failed to fetch profile", &err),
            Err(read_err) => fail("failed to read profile", &read_err),
        },
    }
}

/// Executes the `logout` subcommand.
fn cmd_logout<S: BlockingStorage>(client: &mut VicCoinBlocking<S>) -> io::Result<ExitCode> {
    match client.logout() {
        Ok(()) => {
            writeln!(io::stdout().lock(), "{}", "Signed out.".green().bold())?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("logout failed", &err),
    }
}

/// Executes the `summary` subcommand.
fn cmd_summary<S: BlockingStorage>(client: &VicCoinBlocking<S>) -> io::Result<ExitCode> {
    let spinner = make_spinner("Fetching summary...");

    match client.snapshot() {
        Ok(snapshot) => {
            spinner.finish_and_clear();
            print_sample_notice(snapshot.is_sample())?;
            print_summary(&snapshot.summary)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            fail("failed to fetch summary", &err)
        }
    }
}

/// Builds a [`TransactionFilter`] from CLI arguments.
fn build_transaction_filter(args: &TransactionArgs) -> TransactionFilter {
    let mut filter = if args.all {
        TransactionFilter::new()
    } else {
        TransactionFilter::for_display()
    };
    if let Some((from_date, to_date)) = args.from.zip(args.to) {
        filter = filter.date_range(from_date, to_date);
    }
    if let Some(kind) = args.kind {
        filter = filter.kind(kind);
    }
    if let Some(raw) = args.category.as_deref() {
        let category = raw
            .trim()
            .parse::<u32>()
            .map_or_else(|_| CategoryRef::from(raw.trim()), CategoryRef::Index);
        filter = filter.category(category);
    }
    if let Some(needle) = args.text.as_deref() {
        filter = filter.text(needle);
    }
    filter
}

/// Executes the `transactions` subcommand.
fn cmd_transactions<S: BlockingStorage>(
    client: &VicCoinBlocking<S>,
    args: &TransactionArgs,
) -> io::Result<ExitCode> {
    let filter = build_transaction_filter(args);
    let spinner = make_spinner("Fetching transactions...");

    let fetched = client
        .transactions(&filter)
        .and_then(|txs| client.category_tables().map(|tables| (txs, tables)));
    spinner.finish_and_clear();

    match fetched {
        Ok((txs, tables)) => {
            print_transactions_table("Transactions", &txs, &tables)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to read transactions", &err),
    }
}

/// Executes the `report` subcommand.
fn cmd_report<S: BlockingStorage>(client: &VicCoinBlocking<S>, period: Period) -> io::Result<ExitCode> {
    let spinner = make_spinner("Building report...");

    match client.report(period) {
        Ok(report) => {
            spinner.finish_and_clear();
            print_report(&report)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            fail("failed to build report", &err)
        }
    }
}

/// Answers every wizard step from the `add` arguments. Stops at the
/// first rejected answer.
fn run_wizard(
    wizard: &mut TransactionWizard,
    tables: &CategoryTables,
    args: &AddArgs,
) -> Result<(), WizardError> {
    wizard.submit_amount(args.amount.as_deref().unwrap_or_default())?;
    match args.description.as_deref() {
        Some(text) => wizard.submit_description(text)?,
        None => wizard.skip_description()?,
    }
    let choice = args
        .category
        .as_deref()
        .map(|name| CategoryChoice::lookup(tables, args.kind.into(), name));
    wizard.submit_category(choice)?;
    if let Some(date) = args.date.filter(|&date| date != wizard.date()) {
        wizard.skip_date()?;
        wizard.correct_date(date)?;
    }
    wizard.confirm_date()
}

/// Source of answers for an interactive wizard run.
trait Prompter {
    /// Asks for a line of text.
    fn text(&mut self, prompt: &str, allow_empty: bool) -> io::Result<String>;

    /// Asks to pick one of `items` and returns its position.
    fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<usize>;

    /// Asks a yes/no question.
    fn confirm(&mut self, prompt: &str) -> io::Result<bool>;
}

/// Terminal prompts rendered with dialoguer.
struct TerminalPrompter {
    /// Prompt styling.
    theme: ColorfulTheme,
}

impl Prompter for TerminalPrompter {
    fn text(&mut self, prompt: &str, allow_empty: bool) -> io::Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(allow_empty)
            .interact_text()
            .map_err(io::Error::from)
    }

    fn select(&mut self, prompt: &str, items: &[String]) -> io::Result<usize> {
        Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(items)
            .default(0)
            .interact()
            .map_err(io::Error::from)
    }

    fn confirm(&mut self, prompt: &str) -> io::Result<bool> {
        Confirm::with_theme(&self.theme)
            .with_prompt(prompt)
            .default(true)
            .interact()
            .map_err(io::Error::from)
    }
}

/// The wizard's latest question.
fn current_question(wizard: &TransactionWizard) -> String {
    wizard
        .transcript()
        .iter()
        .rev()
        .find(|message| message.speaker == Speaker::Bot)
        .map_or_else(String::new, |message| message.text.clone())
}

/// Asks for a category from the context's list, or typed by hand.
/// Returns `None` when a blank name was typed.
fn pick_category(
    tables: &CategoryTables,
    context: CategoryContext,
    question: &str,
    prompter: &mut dyn Prompter,
) -> io::Result<Option<String>> {
    let names = tables.names(context);
    let mut items = names.to_vec();
    items.push(OTHER_CATEGORY.to_owned());
    let picked = prompter.select(question, &items)?;
    match names.get(picked) {
        Some(name) => Ok(Some(name.clone())),
        None => {
            let typed = prompter.text(CATEGORY_NAME_PROMPT, true)?;
            let trimmed = typed.trim();
            Ok((!trimmed.is_empty()).then(|| trimmed.to_owned()))
        }
    }
}

/// Drives the wizard step by step. Answers given in `args` are used
/// first; every other answer is asked for, and rejected answers are asked
/// for again.
fn prompt_wizard(
    wizard: &mut TransactionWizard,
    tables: &CategoryTables,
    args: &AddArgs,
    prompter: &mut dyn Prompter,
) -> io::Result<()> {
    let context = CategoryContext::from(wizard.kind());
    let mut amount = args.amount.clone();
    let mut description = args.description.clone();
    let mut category = args.category.clone();
    let mut date = args.date;

    loop {
        match wizard.step() {
            WizardStep::AwaitingAmount => {
                let raw = match amount.take() {
                    Some(given) => given,
                    None => prompter.text(&current_question(wizard), false)?,
                };
                match wizard.submit_amount(&raw) {
                    Ok(()) | Err(WizardError::InvalidAmount { .. }) => {}
                    Err(err) => return Err(io::Error::other(err)),
                }
            }
            WizardStep::AwaitingDescription => {
                let text = match description.take() {
                    Some(given) => given,
                    None => prompter.text(&current_question(wizard), true)?,
                };
                wizard.submit_description(&text).map_err(io::Error::other)?;
            }
            WizardStep::AwaitingCategory => {
                let name = match category.take() {
                    Some(given) => Some(given),
                    None => pick_category(tables, context, &current_question(wizard), prompter)?,
                };
                let choice = name.map(|picked| CategoryChoice::lookup(tables, context, &picked));
                match wizard.submit_category(choice) {
                    Ok(()) | Err(WizardError::MissingCategory) => {}
                    Err(err) => return Err(io::Error::other(err)),
                }
            }
            WizardStep::AwaitingDateConfirmation => {
                let question = format!(
                    "Confirma a data: {}?",
                    format_date_for_display(wizard.date())
                );
                match date.take() {
                    Some(given) => {
                        if given != wizard.date() {
                            wizard.skip_date().map_err(io::Error::other)?;
                            wizard.correct_date(given).map_err(io::Error::other)?;
                        }
                        wizard.confirm_date().map_err(io::Error::other)?;
                    }
                    None if prompter.confirm(&question)? => {
                        wizard.confirm_date().map_err(io::Error::other)?;
                    }
                    None => {
                        wizard.skip_date().map_err(io::Error::other)?;
                        let raw = prompter.text(NEW_DATE_PROMPT, false)?;
                        match parse_date(&raw) {
                            Some(corrected) => {
                                wizard.correct_date(corrected).map_err(io::Error::other)?;
                            }
                            None => writeln!(
                                io::stderr().lock(),
                                "{} invalid date: '{raw}'",
                                "warning:".yellow().bold()
                            )?,
                        }
                    }
                }
            }
            WizardStep::Completed => return Ok(()),
        }
    }
}

/// Executes the `add` subcommand on the terminal.
fn cmd_add<S: BlockingStorage>(client: &VicCoinBlocking<S>, args: &AddArgs) -> io::Result<ExitCode> {
    let mut prompter = TerminalPrompter {
        theme: ColorfulTheme::default(),
    };
    add_transaction(client, args, &mut prompter)
}

/// Runs the wizard and submits the record. With both `--amount` and
/// `--category` given nothing is asked; otherwise `prompter` supplies the
/// missing answers.
fn add_transaction<S: BlockingStorage>(
    client: &VicCoinBlocking<S>,
    args: &AddArgs,
    prompter: &mut dyn Prompter,
) -> io::Result<ExitCode> {
    let tables = match client.category_tables() {
        Ok(tables) => tables,
        Err(err) => return fail("failed to read categories", &err),
    };

    let mut wizard = client.wizard(args.kind);
    let answered = if args.amount.is_some() && args.category.is_some() {
        run_wizard(&mut wizard, &tables, args)
    } else {
        prompt_wizard(&mut wizard, &tables, args, prompter)?;
        Ok(())
    };
    print_transcript(wizard.transcript())?;
    let record = match answered.and_then(|()| wizard.finalize()) {
        Ok(record) => record,
        Err(err) => return fail("transaction not recorded", &err),
    };

    let spinner = make_spinner("Sending...");
    match client.submit(record) {
        Ok(submitted) => {
            spinner.finish_and_clear();
            print_submitted(&submitted)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            spinner.finish_and_clear();
            fail("failed to store transaction", &err)
        }
    }
}

/// Executes the `categories` subcommands.
fn cmd_categories<S: BlockingStorage>(
    client: &VicCoinBlocking<S>,
    command: CategoriesCommand,
) -> io::Result<ExitCode> {
    match command {
        CategoriesCommand::List { context } => match client.category_tables() {
            Ok(tables) => {
                let contexts = context.map_or_else(|| CategoryContext::ALL.to_vec(), |one| vec![one]);
                for one in contexts {
                    print_category_list(one, tables.names(one))?;
                }
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => fail("failed to read categories", &err),
        },
        CategoriesCommand::Add { context, name } => match client.add_category(context, &name) {
            Ok(names) => {
                print_category_list(context, &names)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => fail("category not added", &err),
        },
    }
}

/// Executes the `pending` subcommand.
fn cmd_pending<S: BlockingStorage>(client: &VicCoinBlocking<S>) -> io::Result<ExitCode> {
    let queued = client
        .pending_transactions()
        .and_then(|txs| client.category_tables().map(|tables| (txs, tables)));

    match queued {
        Ok((txs, tables)) => {
            print_transactions_table("Pending", &txs, &tables)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => fail("failed to read pending transactions", &err),
    }
}

/// Executes the `sync` subcommand. Fails while anything stays queued.
fn cmd_sync<S: BlockingStorage>(client: &VicCoinBlocking<S>) -> io::Result<ExitCode> {
    let spinner = make_spinner("Sending pending transactions...");

    match client.reconcile_pending() {
        Ok(outcome) => {
            spinner.finish_and_clear();
            print_reconciliation(&outcome)?;
            Ok(if outcome.is_complete() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Err(err) => {
            spinner.finish_and_clear();
            fail("sync failed", &err)
        }
    }
}

// ── Output formatting ────────────────────────────────────────────────

/// Header cell in the table accent colour.
fn header(title: &str) -> Cell {
    Cell::new(title).fg(Color::Cyan)
}

/// Creates a table with the shared preset.
fn new_table() -> Table {
    let mut table = Table::new();
    _ = table.load_preset(UTF8_FULL);
    table
}

/// Warns that the figures shown are the example dataset.
fn print_sample_notice(is_sample: bool) -> io::Result<()> {
    if is_sample {
        writeln!(
            io::stderr().lock(),
            "{} service unavailable, showing example data",
            "warning:".yellow().bold()
        )?;
    }
    Ok(())
}

/// Prints account totals.
fn print_summary(summary: &FinancialSummary) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let mut table = new_table();
    _ = table.set_header(vec![header("Income"), header("Expenses"), header("Balance")]);
    let balance_colour = if summary.balance < 0.0_f64 {
        Color::Red
    } else {
        Color::Green
    };
    _ = table.add_row(vec![
        Cell::new(format_currency(summary.total_income, true)).fg(Color::Green),
        Cell::new(format_currency(summary.total_expense, true)).fg(Color::Red),
        Cell::new(format_currency(summary.balance, true)).fg(balance_colour),
    ]);

    writeln!(out, "{}", "Summary".green().bold())?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    if let Some(comparison) = summary.comparison.as_ref() {
        let percent = format_percent(comparison.variation_percent);
        let line = match comparison.direction {
            TrendDirection::Increase => format!("Spending up {percent} on last month").red().to_string(),
            TrendDirection::Decrease => {
                format!("Spending down {percent} on last month").green().to_string()
            }
        };
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Prints transactions in a table. Queued local entries are marked.
fn print_transactions_table(
    title: &str,
    txs: &[Transaction],
    tables: &CategoryTables,
) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if txs.is_empty() {
        writeln!(out, "{}", "No transactions found.".dimmed())?;
        return Ok(());
    }

    let mut table = new_table();
    _ = table.set_header(vec![
        header("Date"),
        header("Kind"),
        header("Category"),
        header("Description"),
        header("Amount"),
        header("Status"),
    ]);

    for tx in txs {
        let date = tx
            .parsed_date()
            .map_or_else(|| tx.date.clone(), format_date_for_display);
        let category = tables.resolve(tx.kind.into(), &tx.category).display_name;
        let amount_colour = if tx.kind.is_expense() {
            Color::Red
        } else {
            Color::Green
        };
        let status = if tx.id.is_local() {
            Cell::new("pending").fg(Color::Yellow)
        } else {
            Cell::new("saved").fg(Color::DarkGrey)
        };
        _ = table.add_row(vec![
            Cell::new(date),
            Cell::new(tx.kind),
            Cell::new(category),
            Cell::new(tx.description_or_empty()),
            Cell::new(format_currency(tx.amount, true)).fg(amount_colour),
            status,
        ]);
    }

    writeln!(
        out,
        "{} {}",
        title.green().bold(),
        format_args!("({})", txs.len()).dimmed()
    )?;
    writeln!(out)?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the chart, the category breakdown, the totals and the insights.
fn print_report(report: &Report) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {}",
        format_args!("Report: {}", report.period).green().bold(),
        format_args!(
            "({} to {})",
            format_date_for_display(report.range.start),
            format_date_for_display(report.range.end)
        )
        .dimmed()
    )?;
    writeln!(out)?;

    let mut chart = new_table();
    _ = chart.set_header(vec![header("Bucket"), header("Expenses"), header("Income")]);
    let rows = report
        .chart
        .labels
        .iter()
        .zip(&report.chart.expense_series)
        .zip(&report.chart.income_series);
    for ((label, &expense), &income) in rows {
        _ = chart.add_row(vec![
            Cell::new(label),
            Cell::new(format_currency(expense, true)).fg(Color::Red),
            Cell::new(format_currency(income, true)).fg(Color::Green),
        ]);
    }
    writeln!(out, "{chart}")?;
    writeln!(out)?;

    if report.categories.is_empty() {
        writeln!(out, "{}", "No expenses in this period.".dimmed())?;
    } else {
        let mut categories = new_table();
        _ = categories.set_header(vec![
            header("Category"),
            header("Total"),
            header("Share"),
            header("Count"),
        ]);
        for aggregate in &report.categories {
            _ = categories.add_row(vec![
                Cell::new(&aggregate.display_name),
                Cell::new(format_currency(aggregate.total, true)),
                Cell::new(format!("{}%", aggregate.percent_of_total)),
                Cell::new(aggregate.count),
            ]);
        }
        writeln!(out, "{categories}")?;
    }
    writeln!(out)?;

    writeln!(out, "{}", "Insights".green().bold())?;
    for insight in &report.insights {
        let title = match insight.severity {
            Severity::Positive => insight.title.green().to_string(),
            Severity::Warning => insight.title.yellow().to_string(),
            Severity::Negative => insight.title.red().to_string(),
            Severity::Neutral => insight.title.magenta().to_string(),
        };
        writeln!(out, "  {title}: {}", insight.description)?;
    }
    Ok(())
}

/// Prints one category list with 1-based positions.
fn print_category_list(context: CategoryContext, names: &[String]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let mut table = new_table();
    _ = table.set_header(vec![header("#"), header("Name")]);
    for (name, position) in names.iter().zip(1_u32..) {
        _ = table.add_row(vec![Cell::new(position), Cell::new(name)]);
    }
    writeln!(out, "{}", context.green().bold())?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the wizard chat transcript.
fn print_transcript(messages: &[ChatMessage]) -> io::Result<()> {
    let mut out = io::stdout().lock();
    for message in messages {
        match message.speaker {
            Speaker::Bot => writeln!(out, "{} {}", "bot:".cyan().bold(), message.text)?,
            Speaker::User => writeln!(out, "{} {}", "you:".bold(), message.text)?,
            Speaker::Summary => {
                for line in message.text.lines() {
                    writeln!(out, "     {}", line.dimmed())?;
                }
            }
        }
    }
    Ok(())
}

/// Prints where a submitted transaction ended up.
fn print_submitted(submitted: &SubmittedTransaction) -> io::Result<()> {
    let mut out = io::stdout().lock();
    if submitted.persisted {
        writeln!(
            out,
            "{} {}",
            "Saved".green().bold(),
            format_args!("(id {})", submitted.transaction.id).dimmed()
        )?;
    } else if submitted.queued {
        writeln!(
            out,
            "{} service unavailable, queued as {}; run `viccoin sync` later",
            "Queued:".yellow().bold(),
            submitted.transaction.id
        )?;
    } else {
        writeln!(
            out,
            "{} the service did not return an id; it shows up after the next refresh",
            "Saved:".yellow().bold()
        )?;
    }
    Ok(())
}

/// Prints the user's profile.
fn print_profile(profile: &UserProfile) -> io::Result<()> {
    let mut out = io::stdout().lock();
    let mut table = new_table();
    _ = table.set_header(vec![header("Name"), header("E-mail"), header("Id")]);
    _ = table.add_row(vec![
        Cell::new(&profile.name),
        Cell::new(&profile.email),
        Cell::new(&profile.uid).fg(Color::DarkGrey),
    ]);
    writeln!(out, "{}", "Profile".green().bold())?;
    writeln!(out, "{table}")?;
    Ok(())
}

/// Prints the outcome of resending the queue.
fn print_reconciliation(outcome: &Reconciliation) -> io::Result<()> {
    let mut out = io::stdout().lock();
    writeln!(
        out,
        "{} {} sent, {} still pending",
        "Sync:".green().bold(),
        outcome.sent.len(),
        outcome.failed.len()
    )?;
    for done in &outcome.sent {
        writeln!(
            out,
            "  {} -> {}",
            done.local_id.dimmed(),
            done.transaction.id
        )?;
    }
    Ok(())
}

/// Creates a spinner with the given message.
fn make_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(message.to_owned());
    spinner.enable_steady_tick(core::time::Duration::from_millis(80));
    spinner
}

/// Entry point.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            let _ignored = writeln!(io::stderr(), "fatal I/O error: {err}");
            ExitCode::FAILURE
        }
    }
}
