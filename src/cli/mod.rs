//! Terminal rendering for the command line.

pub mod setup;
pub mod status;
pub mod summary;
pub mod transactions;
pub mod ui;
