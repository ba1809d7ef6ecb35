//! Library surface of the typeroll CLI, split out so integration tests can
//! drive argument parsing and logging setup directly.

pub mod cli;
pub mod logger;
