//! Line-oriented chat loop

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use architect_core::Role;

use crate::app::{self, App};

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Message(&'a str),
    Clear,
    History,
    Providers,
    Exit,
    Help,
    Unknown(&'a str),
    Empty,
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    if line.is_empty() {
        return Input::Empty;
    }
    let Some(command) = line.strip_prefix('/') else {
        return Input::Message(line);
    };
    match command.split_whitespace().next().unwrap_or_default() {
        "clear" => Input::Clear,
        "history" => Input::History,
        "providers" => Input::Providers,
        "exit" | "quit" => Input::Exit,
        "help" => Input::Help,
        _ => Input::Unknown(line),
    }
}

const HELP: &str = "Commands: /clear, /history, /providers, /exit";

pub async fn run(app: &App) -> Result<()> {
    println!("Architect chat. {}", HELP);
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Empty => continue,
            Input::Exit => break,
            Input::Help => println!("{}", HELP),
            Input::Clear => {
                app.session.clear_history();
                println!("History cleared.");
            }
            Input::History => {
                for message in app.session.history() {
                    let who = match message.role {
                        Role::User => "you",
                        Role::Assistant => "ai",
                    };
                    println!("[{}] {}", who, message.content);
                }
            }
            Input::Providers => app::print_status(&app.manager),
            Input::Unknown(command) => eprintln!("Unknown command: {}", command),
            Input::Message(text) => match app.session.send_message(text).await {
                Ok(reply) => println!("{}\n", reply),
                Err(e) => eprintln!("Error: {}", e.user_message()),
            },
        }
    }

    Ok(())
}
