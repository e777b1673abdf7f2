use std::io::Write;

use bastion_security::dangerous::insecure_read_token;
use colored::Colorize;

use super::CommandResult;

/// Print a token's contents **without** checking its signature, expiry or
/// audience.
pub fn run(token: &str, out: &mut dyn Write) -> CommandResult {
    let info = insecure_read_token(token)?;

    writeln!(
        out,
        "{}",
        "UNVERIFIED: signature, expiry and audience were not checked"
            .yellow()
            .bold()
    )?;
    writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
    Ok(())
}
