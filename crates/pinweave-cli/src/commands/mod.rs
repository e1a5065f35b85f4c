//! CLI command implementations.

pub mod init;
pub mod inspect;
pub mod run;
