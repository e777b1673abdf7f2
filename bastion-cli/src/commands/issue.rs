use std::io::Write;

use bastion_security::{JwtService, TokenRequest};

use super::CommandResult;

/// Arguments of `bastion issue`.
#[derive(Debug, Clone, Default)]
pub struct IssueArgs {
    pub account_id: String,
    pub username: Option<String>,
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub permissions: u32,
    pub admin: bool,
    pub delay: u64,
}

impl From<IssueArgs> for TokenRequest {
    fn from(args: IssueArgs) -> Self {
        TokenRequest {
            account_id: args.account_id,
            username: args.username,
            email: args.email,
            first_name: args.first_name,
            last_name: args.last_name,
            permissions: args.permissions,
            is_admin: args.admin,
            delay_secs: args.delay,
        }
    }
}

/// Print a freshly signed token on its own line, for piping.
pub fn run(service: &JwtService, args: IssueArgs, out: &mut dyn Write) -> CommandResult {
    let jwt = service.generate_jwt(&args.into())?;
    writeln!(out, "{jwt}")?;
    Ok(())
}
