// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Tierchat - a chat-completion gateway with complexity-based model routing.
//!
//! This is the binary entry point.

mod serve;
mod shell;

use clap::{Parser, Subcommand};
use colored::Colorize;

/// Tierchat - routes each chat message to the cheapest adequate Gemini tier.
#[derive(Parser, Debug)]
#[command(name = "tierchat", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP gateway.
    Serve,
    /// Launch an interactive chat session in the terminal.
    Shell {
        /// Print the routing trace (score, tokens, model, parameters) for every reply.
        #[arg(long)]
        thinking: bool,
        /// Keep code fences in replies instead of unwrapping them.
        #[arg(long)]
        keep_fences: bool,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match tierchat_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            tierchat_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) => serve::run_serve(config).await,
        Some(Commands::Shell {
            thinking,
            keep_fences,
        }) => {
            shell::run_shell(
                config,
                shell::ShellOptions {
                    thinking,
                    keep_fences,
                },
            )
            .await
        }
        Some(Commands::Config) => match toml::to_string_pretty(&config.redacted()) {
            Ok(rendered) => {
                print!("{rendered}");
                Ok(())
            }
            Err(e) => Err(tierchat_core::TierchatError::Internal(format!(
                "failed to render config: {e}"
            ))),
        },
        None => {
            println!("tierchat: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = tierchat_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.gateway.port, 8001);
    }

    #[test]
    fn shell_flags_parse() {
        let cli = Cli::parse_from(["tierchat", "shell", "--thinking", "--keep-fences"]);
        match cli.command {
            Some(Commands::Shell {
                thinking,
                keep_fences,
            }) => {
                assert!(thinking);
                assert!(keep_fences);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::parse_from(["tierchat"]);
        assert!(cli.command.is_none());
    }

    #[test]
    fn redacted_config_renders_as_toml() {
        let mut config = tierchat_config::TierchatConfig::default();
        config.gemini.api_key = Some("AIza-secret".into());
        let rendered = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(rendered.contains("[REDACTED]"));
        assert!(!rendered.contains("AIza-secret"));
    }
}
