use std::fs;
use std::io::Write;
use std::path::Path;

use bastion_security::KeyPair;
use colored::Colorize;

use super::CommandResult;

pub const PRIVATE_FILE: &str = "private.pem";
pub const PUBLIC_FILE: &str = "public.pem";

/// Write a new RSA-2048 pair to `dir/private.pem` and `dir/public.pem`.
///
/// Existing files are left alone unless `force` is set.
pub fn run(dir: &Path, force: bool, out: &mut dyn Write) -> CommandResult {
    let private_path = dir.join(PRIVATE_FILE);
    let public_path = dir.join(PUBLIC_FILE);

    if !force {
        for path in [&private_path, &public_path] {
            if path.exists() {
                return Err(format!("{} already exists (use --force to overwrite)", path.display()).into());
            }
        }
    }

    let pair = KeyPair::generate()?;
    fs::create_dir_all(dir)?;
    fs::write(&private_path, &pair.private_pem)?;
    fs::write(&public_path, &pair.public_pem)?;

    writeln!(out, "{} {}", "Wrote".green().bold(), private_path.display())?;
    writeln!(out, "{} {}", "Wrote".green().bold(), public_path.display())?;
    writeln!(out)?;
    writeln!(out, "Add to application.yaml:")?;
    writeln!(out, "  security:")?;
    writeln!(out, "    jwt:")?;
    writeln!(out, "      keys:")?;
    writeln!(out, "        privatefile: {}", private_path.display())?;
    writeln!(out, "        publicfile: {}", public_path.display())?;
    Ok(())
}
