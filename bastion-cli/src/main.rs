use std::io;
use std::path::PathBuf;

use bastion_cli::commands::{self, inspect, issue, keygen, verify};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "bastion", version, about = "Bastion CLI - manage keys and tokens")]
struct Cli {
    /// Directory holding application.yaml and .env files
    #[arg(long, global = true, default_value = ".")]
    config_dir: PathBuf,

    /// Configuration profile (overridden by BASTION_PROFILE)
    #[arg(long, global = true, default_value = "dev")]
    profile: String,

    /// Log diagnostics to the terminal
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an RSA key pair
    Keygen {
        /// Directory to write private.pem and public.pem into
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Overwrite existing key files
        #[arg(long)]
        force: bool,
    },
    /// Issue a signed token
    Issue {
        /// Subject of the token
        account_id: String,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        /// Permission bitmask
        #[arg(long, default_value_t = 0)]
        permissions: u32,
        /// Mark the token as an admin token
        #[arg(long)]
        admin: bool,
        /// Seconds before the token becomes valid
        #[arg(long, default_value_t = 0)]
        delay: u64,
    },
    /// Validate a token and print its contents
    Verify {
        token: String,
    },
    /// Decode a token without verifying it
    Inspect {
        token: String,
    },
}

fn main() {
    let cli = Cli::parse();
    if cli.verbose {
        bastion_core::init_tracing();
    }

    let mut out = io::stdout().lock();
    let result = match cli.command {
        Commands::Keygen { out: dir, force } => keygen::run(&dir, force, &mut out),
        Commands::Issue {
            account_id,
            username,
            email,
            first_name,
            last_name,
            permissions,
            admin,
            delay,
        } => {
            let request = issue::IssueArgs {
                account_id,
                username,
                email,
                first_name,
                last_name,
                permissions,
                admin,
                delay,
            };
            commands::load_service(&cli.config_dir, &cli.profile)
                .and_then(|service| issue::run(&service, request, &mut out))
        }
        Commands::Verify { token } => commands::load_service(&cli.config_dir, &cli.profile)
            .and_then(|service| verify::run(&service, &token, &mut out)),
        Commands::Inspect { token } => inspect::run(&token, &mut out),
    };

    if let Err(e) = result {
        eprintln!("{}", colored::Colorize::red(format!("Error: {e}").as_str()));
        std::process::exit(1);
    }
}
