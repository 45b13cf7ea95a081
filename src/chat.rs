//! Interactive `docqa chat` loop.
//!
//! Plain lines are questions; lines starting with `/` are commands.

use std::path::PathBuf;

use anyhow::Result;
use docqa_core::{CollectionSession, Role};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use crate::commands::{ingest_files, print_batch, print_files, print_turn, read_inputs};
use crate::formats::list_formats;
use crate::progress::IngestProgressReporter;

const HELP: &str = "\
Commands:
  /use NAME        switch to collection NAME (discards files and history)
  /add PATH...     ingest files or directories
  /files           list ingested documents
  /history         show the conversation
  /clear-chat      forget the conversation, keep documents
  /clear           delete the collection's documents and conversation
  /formats         list supported formats
  /help            show this help
  /quit            exit";

#[derive(Debug, PartialEq, Eq)]
pub enum ChatCommand {
    Ask(String),
    Use(String),
    Add(Vec<PathBuf>),
    Files,
    History,
    ClearChat,
    Clear,
    Formats,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

pub fn parse_command(line: &str) -> ChatCommand {
    let line = line.trim();
    if line.is_empty() {
        return ChatCommand::Empty;
    }
    let Some(rest) = line.strip_prefix('/') else {
        return ChatCommand::Ask(line.to_string());
    };
    let (cmd, arg) = match rest.split_once(char::is_whitespace) {
        Some((cmd, arg)) => (cmd, arg.trim()),
        None => (rest, ""),
    };
    match cmd {
        "use" => ChatCommand::Use(arg.to_string()),
        "add" => ChatCommand::Add(arg.split_whitespace().map(PathBuf::from).collect()),
        "files" => ChatCommand::Files,
        "history" => ChatCommand::History,
        "clear-chat" => ChatCommand::ClearChat,
        "clear" => ChatCommand::Clear,
        "formats" => ChatCommand::Formats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        other => ChatCommand::Unknown(other.to_string()),
    }
}

/// Run the loop until `/quit` or end of input.
pub async fn run_chat(
    mut session: CollectionSession,
    progress: &dyn IngestProgressReporter,
) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    println!(
        "docqa chat on collection '{}'. Type /help for commands.",
        session.collection_name()
    );

    loop {
        stdout
            .write_all(format!("{}> ", session.collection_name()).as_bytes())
            .await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };

        match parse_command(&line) {
            ChatCommand::Empty => {}
            ChatCommand::Quit => break,
            ChatCommand::Help => println!("{}", HELP),
            ChatCommand::Formats => list_formats(session.loaders()),
            ChatCommand::Files => print_files(&session),
            ChatCommand::Ask(prompt) => {
                session.ask(&prompt).await;
                if let Some(turn) = session.conversation().last() {
                    print_turn(turn);
                }
            }
            ChatCommand::Use(name) => match session.set_collection(&name) {
                Ok(true) => println!("Switched to collection '{}'.", session.collection_name()),
                Ok(false) => println!("Already on collection '{}'.", session.collection_name()),
                Err(e) => println!("{}", e),
            },
            ChatCommand::Add(paths) => {
                if paths.is_empty() {
                    println!("usage: /add PATH...");
                    continue;
                }
                let inputs = read_inputs(&paths);
                let batch = ingest_files(&mut session, inputs.files, progress).await;
                print_batch(&inputs.failures, &batch);
            }
            ChatCommand::History => {
                for turn in session.conversation().turns() {
                    let who = match turn.role() {
                        Role::User => "you",
                        Role::Assistant => "docqa",
                    };
                    println!("{} [{}]: {}", who, turn.created_at().format("%H:%M"), turn.content());
                }
            }
            ChatCommand::ClearChat => {
                session.clear_history();
                println!("Conversation cleared.");
            }
            ChatCommand::Clear => match session.clear().await {
                Ok(()) => println!("Collection '{}' cleared.", session.collection_name()),
                Err(e) => println!("{}", e),
            },
            ChatCommand::Unknown(cmd) => println!("Unknown command /{}. Type /help.", cmd),
        }
    }
    Ok(())
}
