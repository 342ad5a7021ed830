//! Database pool, schema and precomputed summaries

pub mod init;
pub mod summaries;

pub use init::*;
pub use summaries::*;
