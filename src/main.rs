//! Binary entrypoint.
//!
//! The crate is split into Clean Architecture layers:
//! - domain: the bookmark forest and the pure sort
//! - usecase: the load / sort / backup / save run + progress events
//! - infrastructure: XML document IO, process table, terminal prompts
//! - interface: CLI wiring, configuration, logging

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    sourcetree_bookmark_sorter::interface::cli::run().await
}
