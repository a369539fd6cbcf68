//! Library side of the `hs-codes` binary: command reports, table rendering
//! and logging setup.

pub mod commands;
pub mod logging;
pub mod summary;
