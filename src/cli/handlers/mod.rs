//! CLI command handlers

pub mod airdrop;
pub mod fetch;

pub use airdrop::handle_airdrop_command;
pub use fetch::handle_fetch_command;
