//! # bastion-cli
//!
//! The `bastion` binary: offline tooling around the token service.
//!
//! | Command | Description |
//! |---------|-------------|
//! | `bastion keygen [--out DIR]` | Write a fresh RSA key pair as PEM files |
//! | `bastion issue <account-id> ...` | Issue a token with the configured keys |
//! | `bastion verify <token>` | Fully validate a token and print its contents |
//! | `bastion inspect <token>` | Decode a token **without** verifying it |
//!
//! `issue` and `verify` read the same `application.yaml` / `.env` /
//! environment layers as a server (see [`commands::load_service`]).

pub mod commands;
