//! Conversational transaction entry as an explicit state machine.
//!
//! The wizard asks for an amount, an optional description, a category and
//! a date confirmation, in that order. Every accepted answer advances
//! exactly one [`WizardStep`]; a rejected answer leaves the step
//! unchanged and records the validation prompt in the transcript.
//!
//! ```
//! use viccoin_rs::clock::FixedClock;
//! use viccoin_rs::models::{NaiveDate, TransactionKind};
//! use viccoin_rs::wizard::{CategoryChoice, TransactionWizard, WizardStep};
//!
//! let clock = FixedClock::new(NaiveDate::from_ymd_opt(2024, 5, 30).unwrap());
//! let mut wizard = TransactionWizard::new(TransactionKind::Expense, &clock);
//! wizard.submit_amount("42,50")?;
//! wizard.skip_description()?;
//! wizard.submit_category(Some(CategoryChoice::named("Lazer")))?;
//! wizard.confirm_date()?;
//! assert_eq!(wizard.step(), WizardStep::Completed);
//!
//! let record = wizard.finalize()?;
//! assert_eq!(record.description, "Lazer");
//! assert_eq!(record.date, "2024-05-30");
//! # Ok::<(), viccoin_rs::wizard::WizardError>(())
//! ```

use core::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use crate::category::{CategoryContext, CategoryTables, same_name};
use crate::clock::Clock;
use crate::format::{format_currency, format_date_for_api, format_date_for_display, parse_amount};
use crate::models::{CategoryRef, NewTransaction, TransactionKind};

/// Prompt shown when the amount is rejected.
const INVALID_AMOUNT_PROMPT: &str = "Por favor, informe um valor válido.";
/// Prompt asking for the description.
const DESCRIPTION_PROMPT: &str = "Qual a descrição? (opcional)";
/// Echo recorded when the description is skipped.
const NO_DESCRIPTION: &str = "Sem descrição";
/// Prompt asking for the category.
const CATEGORY_PROMPT: &str = "Escolha uma categoria:";
/// Prompt shown when no category was selected.
const MISSING_CATEGORY_PROMPT: &str = "Por favor, selecione uma categoria.";

/// Position in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    /// Waiting for a positive amount.
    AwaitingAmount,
    /// Waiting for an optional description.
    AwaitingDescription,
    /// Waiting for a category selection.
    AwaitingCategory,
    /// Waiting for the date to be confirmed or corrected.
    AwaitingDateConfirmation,
    /// All answers collected.
    Completed,
}

impl fmt::Display for WizardStep {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match *self {
            Self::AwaitingAmount => "awaiting amount",
            Self::AwaitingDescription => "awaiting description",
            Self::AwaitingCategory => "awaiting category",
            Self::AwaitingDateConfirmation => "awaiting date confirmation",
            Self::Completed => "completed",
        })
    }
}

/// Validation failures. The wizard state is unchanged when one is
/// returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WizardError {
    /// The amount is not a number greater than zero.
    #[error("invalid amount: {input:?}")]
    InvalidAmount {
        /// What the user typed.
        input: String,
    },

    /// No category was selected.
    #[error("a category must be selected")]
    MissingCategory,

    /// The operation does not belong to the current step.
    #[error("wizard is {actual}, expected {expected}")]
    WrongStep {
        /// Step the operation belongs to.
        expected: WizardStep,
        /// Step the wizard is in.
        actual: WizardStep,
    },
}

/// Who wrote a transcript line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// Wizard prompt.
    Bot,
    /// Echo of the user's answer.
    User,
    /// Final recap of the record.
    Summary,
}

/// One line of the chat transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Author.
    pub speaker: Speaker,
    /// Text in Portuguese.
    pub text: String,
}

/// A category picked by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryChoice {
    /// Reference sent to the service.
    pub id: CategoryRef,
    /// Name shown in the transcript and used as a fallback description.
    pub name: String,
}

impl CategoryChoice {
    /// A free-text category.
    #[must_use]
    pub fn named(name: &str) -> Self {
        Self {
            id: CategoryRef::from(name),
            name: name.to_owned(),
        }
    }

    /// Looks `name` up in the context's list, ignoring case and accents.
    /// A listed category is referenced by its 1-based position, anything
    /// else by name.
    #[must_use]
    pub fn lookup(tables: &CategoryTables, context: CategoryContext, name: &str) -> Self {
        let wanted = name.trim();
        tables
            .names(context)
            .iter()
            .zip(1_u32..)
            .find(|&(listed, _)| same_name(listed, wanted))
            .map_or_else(
                || Self::named(wanted),
                |(listed, index)| Self {
                    id: CategoryRef::Index(index),
                    name: listed.clone(),
                },
            )
    }
}

/// The wizard itself. Create one per transaction.
#[derive(Debug, Clone)]
pub struct TransactionWizard {
    /// Kind of the transaction being entered.
    kind: TransactionKind,
    /// Current step.
    step: WizardStep,
    /// Accepted amount.
    amount: Option<f64>,
    /// Accepted description, if one was given.
    description: Option<String>,
    /// Selected category.
    category: Option<CategoryChoice>,
    /// Date of the transaction; today unless corrected.
    date: NaiveDate,
    /// Whether the date correction affordance is open.
    date_picker_open: bool,
    /// Chat transcript.
    transcript: Vec<ChatMessage>,
}

impl TransactionWizard {
    /// Starts a wizard for `kind`, dated `clock`'s today, and records the
    /// opening question.
    #[must_use]
    pub fn new(kind: TransactionKind, clock: &dyn Clock) -> Self {
        let verb = if kind.is_expense() { "gastou" } else { "recebeu" };
        let mut wizard = Self {
            kind,
            step: WizardStep::AwaitingAmount,
            amount: None,
            description: None,
            category: None,
            date: clock.today(),
            date_picker_open: false,
            transcript: Vec::new(),
        };
        wizard.say(Speaker::Bot, format!("Quanto você {verb}?"));
        wizard
    }

    /// Kind of transaction being entered.
    #[inline]
    #[must_use]
    pub const fn kind(&self) -> TransactionKind {
        self.kind
    }

    /// Current step.
    #[inline]
    #[must_use]
    pub const fn step(&self) -> WizardStep {
        self.step
    }

    /// Accepted amount, once past the first step.
    #[inline]
    #[must_use]
    pub const fn amount(&self) -> Option<f64> {
        self.amount
    }

    /// Accepted description.
    #[inline]
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Selected category.
    #[inline]
    #[must_use]
    pub const fn category(&self) -> Option<&CategoryChoice> {
        self.category.as_ref()
    }

    /// Date the transaction will carry.
    #[inline]
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }

    /// Whether the date correction affordance is open.
    #[inline]
    #[must_use]
    pub const fn is_date_picker_open(&self) -> bool {
        self.date_picker_open
    }

    /// Chat transcript so far.
    #[inline]
    #[must_use]
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Accepts the amount typed by the user.
    ///
    /// # Errors
    ///
    /// [`WizardError::InvalidAmount`] unless the input parses to a number
    /// greater than zero; [`WizardError::WrongStep`] outside the amount
    /// step.
    pub fn submit_amount(&mut self, raw: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::AwaitingAmount)?;
        let Some(amount) = parse_amount(raw).filter(|&value| value > 0.0) else {
            self.say(Speaker::Bot, INVALID_AMOUNT_PROMPT.to_owned());
            return Err(WizardError::InvalidAmount {
                input: raw.to_owned(),
            });
        };
        self.amount = Some(amount);
        self.say(Speaker::User, format_currency(amount, true));
        self.say(Speaker::Bot, DESCRIPTION_PROMPT.to_owned());
        self.step = WizardStep::AwaitingDescription;
        Ok(())
    }

    /// Accepts a description. Blank input counts as skipping it.
    ///
    /// # Errors
    ///
    /// [`WizardError::WrongStep`] outside the description step.
    pub fn submit_description(&mut self, text: &str) -> Result<(), WizardError> {
        self.expect_step(WizardStep::AwaitingDescription)?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return self.skip_description();
        }
        self.description = Some(trimmed.to_owned());
        self.say(Speaker::User, trimmed.to_owned());
        self.ask_category();
        Ok(())
    }

    /// Skips the description, clearing any previous one.
    ///
    /// # Errors
    ///
    /// [`WizardError::WrongStep`] outside the description step.
    pub fn skip_description(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::AwaitingDescription)?;
        self.description = None;
        self.say(Speaker::User, NO_DESCRIPTION.to_owned());
        self.ask_category();
        Ok(())
    }

    /// Accepts the category selection.
    ///
    /// # Errors
    ///
    /// [`WizardError::MissingCategory`] when `choice` is `None`;
    /// [`WizardError::WrongStep`] outside the category step.
    pub fn submit_category(&mut self, choice: Option<CategoryChoice>) -> Result<(), WizardError> {
        self.expect_step(WizardStep::AwaitingCategory)?;
        let Some(selected) = choice else {
            self.say(Speaker::Bot, MISSING_CATEGORY_PROMPT.to_owned());
            return Err(WizardError::MissingCategory);
        };
        self.say(Speaker::User, selected.name.clone());
        self.category = Some(selected);
        self.say(
            Speaker::Bot,
            format!("Confirma a data: {}?", format_date_for_display(self.date)),
        );
        self.step = WizardStep::AwaitingDateConfirmation;
        Ok(())
    }

    /// Confirms the held date and completes the wizard.
    ///
    /// # Errors
    ///
    /// [`WizardError::WrongStep`] outside the date step.
    pub fn confirm_date(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::AwaitingDateConfirmation)?;
        self.date_picker_open = false;
        self.say(Speaker::User, format_date_for_display(self.date));
        let noun = if self.kind.is_expense() {
            "Despesa"
        } else {
            "Recebimento"
        };
        self.say(Speaker::Bot, format!("{noun} adicionado(a) com sucesso!"));
        let recap = self.recap();
        self.say(Speaker::Summary, recap);
        self.step = WizardStep::Completed;
        tracing::debug!(kind = %self.kind, "wizard completed");
        Ok(())
    }

    /// Opens the date correction affordance without advancing.
    ///
    /// # Errors
    ///
    /// [`WizardError::WrongStep`] outside the date step.
    pub fn skip_date(&mut self) -> Result<(), WizardError> {
        self.expect_step(WizardStep::AwaitingDateConfirmation)?;
        self.date_picker_open = true;
        Ok(())
    }

    /// Replaces the held date and closes the correction affordance. The
    /// date still has to be confirmed.
    ///
    /// # Errors
    ///
    /// [`WizardError::WrongStep`] outside the date step.
    pub fn correct_date(&mut self, date: NaiveDate) -> Result<(), WizardError> {
        self.expect_step(WizardStep::AwaitingDateConfirmation)?;
        self.date = date;
        self.date_picker_open = false;
        self.say(
            Speaker::User,
            format!("Data alterada para: {}", format_date_for_display(date)),
        );
        Ok(())
    }

    /// Produces the record to send to the service.
    ///
    /// The description falls back to the category name when none was
    /// given.
    ///
    /// # Errors
    ///
    /// [`WizardError::WrongStep`] unless the wizard is completed.
    pub fn finalize(&self) -> Result<NewTransaction, WizardError> {
        self.expect_step(WizardStep::Completed)?;
        let wrong_step = || WizardError::WrongStep {
            expected: WizardStep::Completed,
            actual: self.step,
        };
        let amount = self.amount.ok_or_else(wrong_step)?;
        let category = self.category.as_ref().ok_or_else(wrong_step)?;
        Ok(NewTransaction {
            amount,
            description: self
                .description
                .clone()
                .unwrap_or_else(|| category.name.clone()),
            category: category.id.clone(),
            date: format_date_for_api(self.date),
            kind: self.kind,
            recurring: false,
        })
    }

    /// Fails with [`WizardError::WrongStep`] unless at `expected`.
    fn expect_step(&self, expected: WizardStep) -> Result<(), WizardError> {
        if self.step == expected {
            Ok(())
        } else {
            Err(WizardError::WrongStep {
                expected,
                actual: self.step,
            })
        }
    }

    /// Records the category prompt and advances to the category step.
    fn ask_category(&mut self) {
        self.say(Speaker::Bot, CATEGORY_PROMPT.to_owned());
        self.step = WizardStep::AwaitingCategory;
    }

    /// Multi-line recap of the collected answers.
    fn recap(&self) -> String {
        let mut lines = vec![format!(
            "Valor: {}",
            format_currency(self.amount.unwrap_or_default(), true)
        )];
        if let Some(description) = self.description.as_deref() {
            lines.push(format!("Descrição: {description}"));
        }
        if let Some(category) = self.category.as_ref() {
            lines.push(format!("Categoria: {}", category.name));
        }
        lines.push(format!("Data: {}", format_date_for_display(self.date)));
        lines.join("\n")
    }

    /// Appends a transcript line.
    fn say(&mut self, speaker: Speaker, text: String) {
        self.transcript.push(ChatMessage { speaker, text });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn clock() -> FixedClock {
        FixedClock::new(NaiveDate::from_ymd_opt(2024, 5, 30).unwrap())
    }

    fn last_text(wizard: &TransactionWizard) -> &str {
        wizard.transcript().last().map_or("", |m| m.text.as_str())
    }

    fn at_date_step(kind: TransactionKind) -> TransactionWizard {
        let mut wizard = TransactionWizard::new(kind, &clock());
        wizard.submit_amount("100").unwrap();
        wizard.submit_description("Mercado").unwrap();
        wizard
            .submit_category(Some(CategoryChoice::named("Supermercado")))
            .unwrap();
        wizard
    }

    #[test]
    fn opening_question_depends_on_kind() {
        let expense = TransactionWizard::new(TransactionKind::Expense, &clock());
        assert_eq!(last_text(&expense), "Quanto você gastou?");
        let income = TransactionWizard::new(TransactionKind::Income, &clock());
        assert_eq!(last_text(&income), "Quanto você recebeu?");
    }

    #[test]
    fn zero_amount_does_not_advance() {
        let mut wizard = TransactionWizard::new(TransactionKind::Expense, &clock());
        let err = wizard.submit_amount("0").unwrap_err();
        assert!(matches!(err, WizardError::InvalidAmount { .. }));
        assert_eq!(wizard.step(), WizardStep::AwaitingAmount);
        assert_eq!(last_text(&wizard), INVALID_AMOUNT_PROMPT);
        assert_eq!(wizard.amount(), None);
    }

    #[test]
    fn garbage_and_negative_amounts_are_rejected() {
        let mut wizard = TransactionWizard::new(TransactionKind::Expense, &clock());
        assert!(wizard.submit_amount("abc").is_err());
        assert!(wizard.submit_amount("-5").is_err());
        assert!(wizard.submit_amount("").is_err());
        assert_eq!(wizard.step(), WizardStep::AwaitingAmount);
    }

    #[test]
    fn comma_decimal_amount_is_accepted() {
        let mut wizard = TransactionWizard::new(TransactionKind::Expense, &clock());
        wizard.submit_amount("12,50").unwrap();
        assert_eq!(wizard.amount(), Some(12.5));
        assert_eq!(wizard.step(), WizardStep::AwaitingDescription);
        assert_eq!(last_text(&wizard), DESCRIPTION_PROMPT);
    }

    #[test]
    fn skip_description_clears_and_advances() {
        let mut wizard = TransactionWizard::new(TransactionKind::Expense, &clock());
        wizard.submit_amount("10").unwrap();
        wizard.skip_description().unwrap();
        assert_eq!(wizard.description(), None);
        assert_eq!(wizard.step(), WizardStep::AwaitingCategory);
        assert!(wizard.transcript().iter().any(|m| m.text == NO_DESCRIPTION));
    }

    #[test]
    fn blank_description_counts_as_skip() {
        let mut wizard = TransactionWizard::new(TransactionKind::Expense, &clock());
        wizard.submit_amount("10").unwrap();
        wizard.submit_description("   ").unwrap();
        assert_eq!(wizard.description(), None);
        assert_eq!(wizard.step(), WizardStep::AwaitingCategory);
    }

    #[test]
    fn missing_category_does_not_advance() {
        let mut wizard = TransactionWizard::new(TransactionKind::Expense, &clock());
        wizard.submit_amount("10").unwrap();
        wizard.skip_description().unwrap();
        assert_eq!(wizard.submit_category(None), Err(WizardError::MissingCategory));
        assert_eq!(wizard.step(), WizardStep::AwaitingCategory);
        assert_eq!(last_text(&wizard), MISSING_CATEGORY_PROMPT);
    }

    #[test]
    fn date_prompt_shows_today() {
        let wizard = at_date_step(TransactionKind::Expense);
        assert_eq!(wizard.step(), WizardStep::AwaitingDateConfirmation);
        assert_eq!(last_text(&wizard), "Confirma a data: 30/05/2024?");
    }

    #[test]
    fn skip_date_opens_picker_without_advancing() {
        let mut wizard = at_date_step(TransactionKind::Expense);
        wizard.skip_date().unwrap();
        assert!(wizard.is_date_picker_open());
        assert_eq!(wizard.step(), WizardStep::AwaitingDateConfirmation);

        let corrected = NaiveDate::from_ymd_opt(2024, 5, 28).unwrap();
        wizard.correct_date(corrected).unwrap();
        assert!(!wizard.is_date_picker_open());
        assert_eq!(wizard.date(), corrected);
        assert_eq!(last_text(&wizard), "Data alterada para: 28/05/2024");

        wizard.confirm_date().unwrap();
        assert_eq!(wizard.finalize().unwrap().date, "2024-05-28");
    }

    #[test]
    fn completed_wizard_produces_record() {
        let mut wizard = at_date_step(TransactionKind::Expense);
        wizard.confirm_date().unwrap();
        assert_eq!(wizard.step(), WizardStep::Completed);

        let record = wizard.finalize().unwrap();
        assert!((record.amount - 100.0).abs() < f64::EPSILON);
        assert_eq!(record.description, "Mercado");
        assert_eq!(record.category, CategoryRef::from("Supermercado"));
        assert_eq!(record.date, "2024-05-30");
        assert_eq!(record.kind, TransactionKind::Expense);

        let summary = wizard.transcript().last().unwrap();
        assert_eq!(summary.speaker, Speaker::Summary);
        assert_eq!(
            summary.text,
            "Valor: R$ 100,00\nDescrição: Mercado\nCategoria: Supermercado\nData: 30/05/2024"
        );
    }

    #[test]
    fn income_completion_message() {
        let mut wizard = at_date_step(TransactionKind::Income);
        wizard.confirm_date().unwrap();
        let messages = wizard.transcript();
        assert!(messages
            .iter()
            .any(|m| m.text == "Recebimento adicionado(a) com sucesso!"));
    }

    #[test]
    fn operations_out_of_order_are_rejected() {
        let mut wizard = TransactionWizard::new(TransactionKind::Expense, &clock());
        let err = wizard.confirm_date().unwrap_err();
        assert_eq!(
            err,
            WizardError::WrongStep {
                expected: WizardStep::AwaitingDateConfirmation,
                actual: WizardStep::AwaitingAmount,
            }
        );
        assert!(wizard.finalize().is_err());
        assert!(wizard.skip_description().is_err());
        assert_eq!(wizard.step(), WizardStep::AwaitingAmount);
        assert!(err.to_string().contains("awaiting amount"));
    }

    #[test]
    fn lookup_prefers_listed_position() {
        let tables = CategoryTables::default();
        let choice = CategoryChoice::lookup(&tables, CategoryContext::Expense, "moradia");
        assert_eq!(choice.id, CategoryRef::Index(3));
        assert_eq!(choice.name, "Moradia");

        let salary = CategoryChoice::lookup(&tables, CategoryContext::Salary, "Bônus");
        assert_eq!(salary.id, CategoryRef::Index(4));

        let free = CategoryChoice::lookup(&tables, CategoryContext::Expense, "Pets");
        assert_eq!(free.id, CategoryRef::from("Pets"));
    }

    #[test]
    fn lookup_ignores_accents_and_case() {
        let tables = CategoryTables::default();
        for typed in ["saude", "SAÚDE", " Saude "] {
            let choice = CategoryChoice::lookup(&tables, CategoryContext::Expense, typed);
            assert_eq!(choice.id, CategoryRef::Index(4));
            assert_eq!(choice.name, "Saúde");
        }
    }
}
