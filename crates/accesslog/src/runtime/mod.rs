//! Runtime module: process lifecycle (CLI, boot, ingest).

pub mod boot;
pub mod cli;
pub mod ingest;
