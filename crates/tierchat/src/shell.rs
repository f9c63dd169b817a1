// SPDX-FileCopyrightText: 2026 Tierchat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `tierchat shell` command implementation.
//!
//! Interactive REPL with colored prompt and readline history. Each line is
//! routed to a tier; switching tiers rebuilds the session and replays the
//! recent transcript so context survives the switch.

use std::io::IsTerminal;
use std::sync::Arc;

use colored::Colorize;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use secrecy::{ExposeSecret, SecretString};
use tierchat_agent::{ChatSession, FenceMode, SessionReply, Transition, timeout_notice};
use tierchat_config::TierchatConfig;
use tierchat_core::TierchatError;
use tierchat_gemini::{GeminiProvider, resolve_api_key};

/// Flags from the command line.
#[derive(Debug, Clone, Copy)]
pub struct ShellOptions {
    pub thinking: bool,
    pub keep_fences: bool,
}

/// A parsed REPL line.
#[derive(Debug, PartialEq, Eq)]
enum Command<'a> {
    Quit,
    Reset,
    ToggleThinking,
    Stats,
    Message(&'a str),
    Empty,
}

fn parse_line(line: &str) -> Command<'_> {
    match line.trim() {
        "" => Command::Empty,
        "/quit" | "/exit" => Command::Quit,
        "/reset" => Command::Reset,
        "/thinking" => Command::ToggleThinking,
        "/stats" => Command::Stats,
        text => Command::Message(text),
    }
}

/// Runs the interactive shell.
pub async fn run_shell(mut config: TierchatConfig, options: ShellOptions) -> Result<(), TierchatError> {
    crate::serve::init_tracing("warn");

    if resolve_api_key(&config.gemini).is_err() {
        let key = prompt_api_key()?;
        config.gemini.api_key = Some(key.expose_secret().to_string());
    }
    let provider = GeminiProvider::new(&config.gemini)?;

    let fences = if options.keep_fences {
        FenceMode::Keep
    } else {
        FenceMode::Reflow
    };
    let mut session = ChatSession::new(&config, Arc::new(provider), fences);
    let mut thinking = options.thinking;

    let mut rl = DefaultEditor::new()
        .map_err(|e| TierchatError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "tierchat shell".bold().green());
    println!(
        "Commands: {} {} {} {}\n",
        "/reset".yellow(),
        "/thinking".yellow(),
        "/stats".yellow(),
        "/quit".yellow()
    );

    let prompt = format!("{}> ", "you".green());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };

        match parse_line(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Reset => {
                session.reset();
                println!("{}", "conversation reset".dimmed());
            }
            Command::ToggleThinking => {
                thinking = !thinking;
                let state = if thinking { "on" } else { "off" };
                println!("{}", format!("thinking trace {state}").dimmed());
            }
            Command::Stats => {
                let stats = session.stats();
                println!(
                    "total messages: {}  your messages: {}",
                    stats.total, stats.user
                );
            }
            Command::Message(text) => {
                let _ = rl.add_history_entry(text);
                match session.send(text).await {
                    Ok(reply) => {
                        if thinking {
                            print_trace(&session, &reply);
                        }
                        println!("{}\n{}", "assistant>".cyan(), reply.text);
                        println!("{}\n", caption(&reply).dimmed());
                    }
                    Err(TierchatError::Timeout { duration }) => {
                        eprintln!("{}", timeout_notice(duration.as_secs()).yellow());
                    }
                    Err(e) => {
                        eprintln!("{}", format!("An error occurred: {e}").red());
                    }
                }
            }
        }
    }

    println!("{}", "goodbye".dimmed());
    Ok(())
}

/// Asks for the API key on the terminal until a non-empty one is entered.
fn prompt_api_key() -> Result<SecretString, TierchatError> {
    if !std::io::stdin().is_terminal() {
        return Err(TierchatError::Config(
            "Gemini API key not found. Set GEMINI_API_KEY or run interactively.".to_string(),
        ));
    }
    loop {
        eprint!("Gemini API key: ");
        let key = rpassword::read_password()
            .map_err(|e| TierchatError::Config(format!("failed to read API key: {e}")))?;
        let key = key.trim();
        if !key.is_empty() {
            return Ok(SecretString::from(key.to_string()));
        }
        eprintln!("{}", "Please add your Gemini API key to start chatting.".yellow());
    }
}

fn print_trace(session: &ChatSession, reply: &SessionReply) {
    for line in trace_lines(session, reply) {
        println!("{line}");
    }
}

fn trace_lines(session: &ChatSession, reply: &SessionReply) -> Vec<String> {
    let decision = &reply.decision;
    let binding = session.selector().binding(decision.tier);

    let mut lines = vec![format!("{} {}", "score:".bold(), decision.score())];
    if let Some(estimate) = reply.estimate {
        let note = if estimate.approximate { " (estimated)" } else { "" };
        lines.push(format!("{} ~{}{note}", "tokens:".bold(), estimate.count));
    }
    lines.push(format!(
        "{} {} ({})",
        "model:".bold(),
        decision.model,
        decision.tier
    ));
    match reply.transition {
        Transition::Rebuilt { from } if reply.replayed_context => lines.push(format!(
            "{} switching from {from} to {}, replaying conversation history",
            "context:".bold(),
            decision.tier
        )),
        _ if reply.replayed_context => lines.push(format!(
            "{} replaying conversation history into the {} session",
            "context:".bold(),
            decision.tier
        )),
        _ => {}
    }
    lines.push(format!(
        "{} temperature={}, top-p={}, top-k={}",
        "parameters:".bold(),
        binding.temperature,
        binding.top_p,
        binding.top_k
    ));
    lines
}

fn caption(reply: &SessionReply) -> String {
    let mut caption = format!(
        "model: {} | complexity score: {}",
        reply.decision.model,
        reply.decision.score()
    );
    if let Some(estimate) = reply.estimate {
        caption.push_str(&format!(" | tokens: ~{}", estimate.count));
    }
    if matches!(reply.transition, Transition::Rebuilt { .. }) {
        caption.push_str(" | model switched with context preserved");
    }
    caption
}

#[cfg(test)]
mod tests {
    use super::*;
    use tierchat_test_utils::{MockGenerator, test_config};

    #[test]
    fn parses_commands_and_messages() {
        assert_eq!(parse_line("  /quit "), Command::Quit);
        assert_eq!(parse_line("/exit"), Command::Quit);
        assert_eq!(parse_line("/reset"), Command::Reset);
        assert_eq!(parse_line("/thinking"), Command::ToggleThinking);
        assert_eq!(parse_line("/stats"), Command::Stats);
        assert_eq!(parse_line("   "), Command::Empty);
        assert_eq!(parse_line(" what is 2+2? "), Command::Message("what is 2+2?"));
    }

    #[tokio::test]
    async fn trace_reports_tier_switch_with_replayed_context() {
        let mock = MockGenerator::with_texts(&["hello", "d/dx"]);
        let mut session =
            ChatSession::new(&test_config(), Arc::new(mock.clone()), FenceMode::Reflow);

        let first = session.send("hi").await.unwrap();
        assert!(
            !trace_lines(&session, &first)
                .iter()
                .any(|l| l.contains("replaying"))
        );

        let switched = session.send("Explain the derivative?").await.unwrap();
        let lines = trace_lines(&session, &switched);
        let expected = format!("switching from lite to {}", switched.decision.tier);
        assert!(
            lines.iter().any(|l| l.contains(&expected)),
            "got: {lines:?}"
        );
        assert!(lines.iter().any(|l| l.contains("~10")), "got: {lines:?}");
    }
}
