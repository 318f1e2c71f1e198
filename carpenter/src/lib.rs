//! Closed and maximal frequent item set mining with Carpenter: the
//! transactions are intersected depth-first and the resulting item sets are
//! collected in a prefix tree repository.

pub mod carp;

#[cfg(feature = "python")]
mod python;

pub use carp::{
    mine, CarpError, CarpResult, CarpenterConfig, EvalMeasure, ItemOrder, ItemsetStorage, Mode,
    Target, TransactionBag, Variant,
};
