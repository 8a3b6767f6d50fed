//! Legacy fetch command, permanently disabled

use crate::cli::output::print_error;
use crate::Result;

/// Print the migration notice for the retired `fetch` command
pub fn handle_fetch_command() -> Result<()> {
    print_error("The 'fetch' command is deprecated.");
    eprintln!("   Please use the 'airdrop' command instead.");
    eprintln!("   Run: castdrop airdrop --help");
    Ok(())
}
