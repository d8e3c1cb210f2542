//! Data models for VicCoin API entities.
//!
//! This module contains strongly-typed representations of transactions,
//! API request/response payloads, newtype ID wrappers, and enumeration
//! types for constrained values. Wire names are the service's Portuguese
//! field names.

mod category_ref;
mod enums;
mod ids;
mod lenient;
mod period_report;
mod submission;
mod summary;
mod transaction;
mod user;

pub use category_ref::CategoryRef;
pub use chrono::NaiveDate;
pub use enums::{ParseEnumError, ReportInterval, TransactionKind};
pub use ids::{TransactionId, UserId};
pub use period_report::{PeriodReport, PeriodReportResponse, ReportWindow};
pub use submission::{NewTransaction, SubmitIds, SubmitResponse, SubmittedTransaction};
pub use summary::{FinancialSummary, MonthComparison, TransactionList, TrendDirection};
pub use transaction::Transaction;
pub use user::{LoginRequest, LoginResponse, RegisterRequest, UserProfile, UserResponse};
