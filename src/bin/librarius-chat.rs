//! Interactive chat application for the librarius resource assistant.
//!
//! This binary provides a streaming REPL interface for conversing with the
//! resource-library assistant backend.
//!
//! # Usage
//!
//! ```bash
//! # Basic usage against the local development backend
//! librarius-chat
//!
//! # Point at a deployed backend
//! librarius-chat --base-url https://library.example.com/api/v1/
//!
//! # Single-shot replies instead of streaming
//! librarius-chat --no-stream
//!
//! # Disable colors (useful for piping output)
//! librarius-chat --no-color
//! ```
//!
//! # Commands
//!
//! While chatting, you can use slash commands:
//! - `/help` - Show available commands
//! - `/clear` - Reset the conversation
//! - `/suggestions` - Show the current suggested questions
//! - `/stream on|off` - Toggle streaming vs single-shot replies
//! - `/stats` - Show session statistics
//! - `/quit` - Exit the application

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use librarius::chat::{
    ChatArgs, ChatCommand, ChatConfig, ConversationSession, PlainTextRenderer, Renderer,
    help_text, parse_command,
};
use librarius::{ChatTransport, Librarius};

/// Main entry point for the librarius-chat application.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (args, _) = ChatArgs::from_command_line_relaxed("librarius-chat [OPTIONS]");
    let config = ChatConfig::resolve(&args)?;
    let use_color = config.use_color;
    let mut streaming = config.streaming;

    let client = Librarius::with_options(config.base_url.clone(), config.timeout)?;
    let mut session = ConversationSession::new(client, config);
    let mut renderer = PlainTextRenderer::with_color(use_color);
    let mut rl = DefaultEditor::new()?;

    // Flag for interrupt handling during streaming
    let interrupted = Arc::new(AtomicBool::new(false));

    // Set up Ctrl+C handler
    let interrupted_clone = interrupted.clone();
    ctrlc::set_handler(move || {
        interrupted_clone.store(true, Ordering::Relaxed);
    })?;

    println!("Library Assistant");
    println!("Type /help for commands, /quit to exit\n");
    println!("Assistant: {}", session.messages()[0].content);
    renderer.print_suggestions(session.suggestions());
    println!();

    loop {
        // Reset interrupt flag before each input
        interrupted.store(false, Ordering::Relaxed);

        let readline = match session.take_pending_input() {
            Some(seed) => rl.readline_with_initial("You: ", (&seed, "")),
            None => rl.readline("You: "),
        };

        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                let _ = rl.add_history_entry(line);

                // Check for slash commands
                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Clear => {
                            session.reset();
                            renderer.print_info("Conversation cleared.");
                        }
                        ChatCommand::Suggestions => {
                            renderer.print_suggestions(session.suggestions());
                        }
                        ChatCommand::Stream(enabled) => {
                            streaming = enabled;
                            if enabled {
                                renderer.print_info("Streaming replies enabled.");
                            } else {
                                renderer.print_info("Single-shot replies enabled.");
                            }
                        }
                        ChatCommand::Stats => {
                            print_stats(&session);
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            renderer.print_error(&message);
                        }
                    }
                    continue;
                }

                // Regular message - send to the backend
                println!("Assistant:");
                let outcome = if streaming {
                    session
                        .send(line, &mut renderer, interrupted.clone())
                        .await
                } else {
                    session.send_once(line, &mut renderer).await
                };
                if let Err(e) = outcome {
                    renderer.print_error(&e.to_string());
                }
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C at prompt - soft interrupt
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D - exit
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                renderer.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn print_stats<T: ChatTransport>(session: &ConversationSession<T>) {
    let stats = session.stats();
    println!("    Session Statistics:");
    println!("      Messages: {}", stats.message_count);
    println!("      Suggestions: {}", stats.suggestion_count);
    println!("      Requests: {}", stats.request_count);
    println!("      Failures: {}", stats.failure_count);
    println!("      State: {:?}", stats.state);
    if let Some(error) = session.last_error() {
        println!("      Last error: {}", error);
    }
}
