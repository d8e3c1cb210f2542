//! Payloads for creating transactions and the service's acknowledgements.

use serde::ser::SerializeStruct as _;
use serde::{Deserialize, Serialize, Serializer};

use super::{CategoryRef, Transaction, TransactionId, TransactionKind};

/// A finalized transaction record ready to be sent to the service.
///
/// Produced by [`TransactionWizard::finalize`](crate::wizard::TransactionWizard::finalize).
/// Salary records carry their date as `data_recebimento`, every other kind
/// as `data`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewTransaction {
    /// Amount in BRL (> 0).
    #[serde(rename = "valor")]
    pub amount: f64,
    /// Description; the category name when the user gave none.
    #[serde(rename = "descricao")]
    pub description: String,
    /// Selected category.
    #[serde(rename = "categoria")]
    pub category: CategoryRef,
    /// Date in `YYYY-MM-DD` form.
    #[serde(rename = "data", alias = "data_recebimento")]
    pub date: String,
    /// Expense, income or salary. Selects the endpoint.
    #[serde(rename = "tipo")]
    pub kind: TransactionKind,
    /// Whether the transaction repeats.
    #[serde(rename = "recorrente", default)]
    pub recurring: bool,
}

impl Serialize for NewTransaction {
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let date_key = if self.kind == TransactionKind::Salary {
            "data_recebimento"
        } else {
            "data"
        };
        let mut record = serializer.serialize_struct("NewTransaction", 6)?;
        record.serialize_field("valor", &self.amount)?;
        record.serialize_field("descricao", &self.description)?;
        record.serialize_field("categoria", &self.category)?;
        record.serialize_field(date_key, &self.date)?;
        record.serialize_field("tipo", &self.kind)?;
        record.serialize_field("recorrente", &self.recurring)?;
        record.end()
    }
}

impl NewTransaction {
    /// Rebuilds the payload of a locally stored transaction, e.g. one
    /// waiting in the pending queue.
    #[must_use]
    pub fn from_transaction(transaction: &Transaction) -> Self {
        Self {
            amount: transaction.amount,
            description: transaction.description_or_empty().to_owned(),
            category: transaction.category.clone(),
            date: transaction.date.clone(),
            kind: transaction.kind,
            recurring: transaction.recurring,
        }
    }

    /// Converts the record into a [`Transaction`] carrying `id`.
    #[must_use]
    pub fn into_transaction(self, id: TransactionId) -> Transaction {
        Transaction {
            id,
            kind: self.kind,
            amount: self.amount,
            category: self.category,
            description: Some(self.description),
            date: self.date,
            recurring: self.recurring,
        }
    }
}

/// Id fields the service may use to acknowledge an insert.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitIds {
    /// Id of a created expense.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub despesa_id: Option<TransactionId>,
    /// Id of a created income.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ganho_id: Option<TransactionId>,
    /// Id of a created salary entry.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub salario_id: Option<TransactionId>,
}

impl SubmitIds {
    /// First id present, in expense/income/salary order.
    fn first(&self) -> Option<&TransactionId> {
        self.despesa_id
            .as_ref()
            .or(self.ganho_id.as_ref())
            .or(self.salario_id.as_ref())
    }
}

/// Response of the create and update endpoints.
///
/// The ids may arrive nested under `data` or at the top level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Whether the service accepted the record.
    #[serde(default)]
    pub success: bool,
    /// Human-readable status message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Nested ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<SubmitIds>,
    /// Top-level ids.
    #[serde(flatten)]
    pub ids: SubmitIds,
}

impl SubmitResponse {
    /// Returns the id the service assigned, wherever it was reported.
    #[must_use]
    pub fn assigned_id(&self) -> Option<&TransactionId> {
        self.data
            .as_ref()
            .and_then(SubmitIds::first)
            .or_else(|| self.ids.first())
    }
}

/// Outcome of submitting a wizard record through the facade.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedTransaction {
    /// The record as it now exists locally.
    pub transaction: Transaction,
    /// `true` when the service stored the record under a known id.
    pub persisted: bool,
    /// `true` when the service could not be reached and the record was
    /// queued for later reconciliation.
    pub queued: bool,
}
