//! Core library of the `VicCoin` personal finance app.
//!
//! This crate provides the reports engine (period chart, category
//! breakdown, insight cards), the conversational transaction wizard, a
//! typed client for the VicCoin HTTP API and pluggable local storage,
//! tied together by the [`viccoin`] facade.

pub mod category;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod client;
pub mod clock;
pub mod error;
pub mod format;
pub mod models;
pub mod report;
pub mod storage;
#[cfg(any(feature = "async", feature = "blocking"))]
pub mod viccoin;
pub mod wizard;
