//! Command implementations for the CLI.

mod config;
mod export;
mod fetch;
mod import;
mod info;
mod inventory;
mod query;

pub use config::cmd_config;
pub use export::cmd_export;
pub use fetch::cmd_fetch;
pub use import::cmd_import;
pub use info::cmd_info;
pub use inventory::cmd_inventory;
pub use query::{cmd_precip, cmd_temperature};
