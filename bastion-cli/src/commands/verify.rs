use std::io::Write;

use bastion_security::JwtService;
use colored::Colorize;

use super::CommandResult;

/// Validate `token` exactly as a server would and print the decoded model.
pub fn run(service: &JwtService, token: &str, out: &mut dyn Write) -> CommandResult {
    let info = service.validate_jwt(token.trim())?;
    let remaining = info.seconds_remaining_at(service.now());

    writeln!(
        out,
        "{} expires in {remaining}s",
        "Valid token;".green().bold()
    )?;
    writeln!(out, "{}", serde_json::to_string_pretty(&info)?)?;
    Ok(())
}
