//! Chat command: a line-based REPL over one chat session.

use anyhow::{Context, Result};
use pixsync_core::chat::{AttachedFile, Author, ChatMessage, ChatSession, PromptOrchestrator};
use pixsync_core::config::PixsyncConfig;
use pixsync_core::gemini::AspectRatio;
use pixsync_core::http::CurlTransport;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use super::{build_orchestrator, save_image};

/// One parsed input line.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ChatInput<'a> {
    Prompt(&'a str),
    Attach(&'a str),
    Clear,
    History,
    Quit,
    Empty,
    Unknown(&'a str),
}

pub(crate) fn parse_input(line: &str) -> ChatInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ChatInput::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return ChatInput::Prompt(line);
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((n, a)) => (n, a.trim()),
        None => (command, ""),
    };
    match name {
        "attach" if !arg.is_empty() => ChatInput::Attach(arg),
        "clear" => ChatInput::Clear,
        "history" => ChatInput::History,
        "quit" | "exit" => ChatInput::Quit,
        _ => ChatInput::Unknown(line),
    }
}

/// Run the REPL on stdin until `/quit` or end of input.
pub async fn run_chat(cfg: &PixsyncConfig, aspect: AspectRatio, out_dir: Option<PathBuf>) -> Result<()> {
    let orchestrator = build_orchestrator(cfg)?;
    let out_dir = match out_dir {
        Some(d) => d,
        None => std::env::current_dir()?,
    };
    tokio::task::spawn_blocking(move || repl(&orchestrator, aspect, &out_dir)).await?
}

fn repl(orchestrator: &PromptOrchestrator<CurlTransport>, aspect: AspectRatio, out_dir: &Path) -> Result<()> {
    let mut session = ChatSession::new();
    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    println!("pixsync chat ({aspect}). /attach <path>, /clear, /history, /quit");

    loop {
        print!("> ");
        stdout.flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        match parse_input(&line) {
            ChatInput::Empty => {}
            ChatInput::Quit => break,
            ChatInput::Unknown(cmd) => println!("unknown command: {cmd}"),
            ChatInput::Clear => {
                session.clear_attachment();
                println!("attachment cleared");
            }
            ChatInput::History => {
                for message in session.messages() {
                    print_message(message);
                }
            }
            ChatInput::Attach(path) => match AttachedFile::from_path(Path::new(path)) {
                Ok(file) => {
                    println!("attached {} ({})", file.filename, file.mime_type);
                    session.attach(file);
                }
                Err(e) => println!("cannot attach {path}: {e}"),
            },
            ChatInput::Prompt(text) => {
                println!("working...");
                let message = orchestrator.submit(&mut session, text, aspect).clone();
                print_message(&message);
                if !message.is_error() {
                    println!("{}", save_line(&message, out_dir));
                }
            }
        }
    }
    Ok(())
}

/// Save the image and describe the outcome; a failed write never ends the session.
fn save_line(message: &ChatMessage, out_dir: &Path) -> String {
    match save_image(message, None, out_dir)
        .with_context(|| format!("save image for message {}", message.id()))
    {
        Ok(path) => format!("  saved {}", path.display()),
        Err(e) => {
            tracing::warn!("{:#}", e);
            format!("  could not save image: {:#}", e)
        }
    }
}

fn print_message(message: &ChatMessage) {
    let time = message.timestamp().format("%H:%M:%S");
    let media = if message.is_media_analysis() { " [media]" } else { "" };
    match message.author() {
        Author::User => println!("[{time}] you{media}: {}", message.text_content()),
        Author::Ai if message.is_error() => println!("[{time}] ai: {}", message.text_content()),
        Author::Ai => println!(
            "[{time}] ai: image ({})",
            message.interpretation_text().unwrap_or("no interpretation")
        ),
    }
}
