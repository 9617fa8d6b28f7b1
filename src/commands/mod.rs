// src/commands/mod.rs
pub mod render;

use std::io::Write;
use std::path::PathBuf;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::controller::Controller;
use crate::services::catalog;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Message(String),
    Upload(Vec<PathBuf>),
    Cancel,
    Dataset,
    Tools(Option<usize>),
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let Some(rest) = line.trim_start().strip_prefix('/') else {
            return Self::Message(line.to_string());
        };

        let mut words = rest.split_whitespace();
        let name = words.next().unwrap_or_default();
        match name {
            "upload" => Self::Upload(words.map(PathBuf::from).collect()),
            "cancel" => Self::Cancel,
            "dataset" => Self::Dataset,
            "tools" => match words.next().map(str::parse::<usize>) {
                None => Self::Tools(None),
                Some(Ok(n)) => Self::Tools(Some(n)),
                Some(Err(_)) => Self::Unknown(line.trim().to_string()),
            },
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line.trim().to_string()),
        }
    }
}

/// Interactive loop: one line of `input` at a time, interleaved with answers
/// from outstanding requests. Returns on `/quit`, or once input has ended and
/// every outstanding request has been answered.
pub async fn run<R, W>(controller: &mut Controller, input: R, out: &mut W) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "insight-chat, /help for commands")?;
    if let Some(dataset) = controller.session().dataset() {
        writeln!(out, "using dataset {} [{}]", dataset.filename, dataset.dataset_id)?;
    }
    for turn in controller.session().transcript() {
        writeln!(out, "{}", render::turn(turn))?;
    }

    let mut lines = input.lines();
    let mut reading = true;
    loop {
        tokio::select! {
            line = lines.next_line(), if reading => {
                match line? {
                    Some(line) => {
                        if !execute(controller, Command::parse(&line), out)? {
                            break;
                        }
                    }
                    None => reading = false,
                }
            }
            Some(event) = controller.next_event() => {
                controller.handle(event.clone());
                for line in render::event(&event, controller.session()) {
                    writeln!(out, "{line}")?;
                }
            }
        }
        out.flush()?;
        if !reading && controller.is_idle() {
            break;
        }
    }
    Ok(())
}

// Returns false when the loop should stop.
fn execute<W: Write>(
    controller: &mut Controller,
    command: Command,
    out: &mut W,
) -> std::io::Result<bool> {
    match command {
        Command::Message(text) => {
            controller.set_input(text);
            if controller.submit_input().is_err() {
                print_banner(controller, out)?;
            }
        }
        Command::Upload(files) => {
            controller.open_uploader();
            if let Some(first) = files.first() {
                writeln!(out, "{}", render::selected_file(first))?;
            }
            if controller.submit_upload(files).is_err() {
                print_banner(controller, out)?;
            }
        }
        Command::Cancel => {
            controller.cancel_upload();
            writeln!(out, "uploader closed")?;
        }
        Command::Dataset => writeln!(out, "{}", render::dataset(controller.session().dataset()))?,
        Command::Tools(None) => writeln!(out, "{}", render::tools())?,
        Command::Tools(Some(position)) => match catalog::tool(position) {
            Some(tool) => {
                controller.set_input(tool.query());
                match controller.submit_input() {
                    Ok(()) => {
                        if let Some(turn) = controller.session().transcript().last() {
                            writeln!(out, "{}", render::turn(turn))?;
                        }
                    }
                    Err(_) => print_banner(controller, out)?,
                }
            }
            None => writeln!(out, "{}", render::banner(&format!("no analysis number {position}")))?,
        },
        Command::Help => writeln!(out, "{}", render::HELP)?,
        Command::Quit => return Ok(false),
        Command::Unknown(text) => {
            let message = format!("unknown command {text}, /help for commands");
            writeln!(out, "{}", render::banner(&message))?
        }
    }
    Ok(true)
}

fn print_banner<W: Write>(controller: &Controller, out: &mut W) -> std::io::Result<()> {
    if let Some(message) = controller.session().error() {
        writeln!(out, "{}", render::banner(message))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_a_message() {
        assert_eq!(
            Command::parse("summarize wave 2"),
            Command::Message("summarize wave 2".into())
        );
        assert_eq!(Command::parse("  "), Command::Message("  ".into()));
    }

    #[test]
    fn parses_slash_commands() {
        assert_eq!(
            Command::parse("/upload wave1.sav wave2.sav"),
            Command::Upload(vec!["wave1.sav".into(), "wave2.sav".into()])
        );
        assert_eq!(Command::parse("/upload"), Command::Upload(Vec::new()));
        assert_eq!(Command::parse("/tools"), Command::Tools(None));
        assert_eq!(Command::parse("/tools 2"), Command::Tools(Some(2)));
        assert_eq!(Command::parse("/exit"), Command::Quit);
        assert_eq!(
            Command::parse("/tools two"),
            Command::Unknown("/tools two".into())
        );
        assert_eq!(Command::parse("/chart"), Command::Unknown("/chart".into()));
    }
}
