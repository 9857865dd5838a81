//! Line-oriented interactive player.

use std::io::{self, Write};

use services::CoursePlayerService;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::render;

pub const HELP: &str = "\
Commands:
  next | n            go to the next lesson
  prev | p            go to the previous lesson
  jump <n>            open lesson number n (see `lessons`)
  watch <pct>         record how much of the video you have watched
  step                next step of a step-by-step lesson
  back-step           previous step
  note <text>         save a note for this lesson (empty text clears it)
  complete | done     mark this lesson complete
  bw                  toggle low-bandwidth mode
  lessons             list all lessons
  resources           list downloadable resources
  status              course progress summary
  help                show this help
  quit | q            leave the player
";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Next,
    Previous,
    Jump(usize),
    Watch(u8),
    Step,
    BackStep,
    Note(String),
    Complete,
    Bandwidth,
    Lessons,
    Resources,
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command {0:?}; type `help` for a list")]
    Unknown(String),
    #[error("`{0}` needs an argument")]
    MissingArgument(&'static str),
    #[error("`{command}` expects a number, got {raw:?}")]
    InvalidNumber { command: &'static str, raw: String },
}

/// Parse one input line. Blank lines yield `Ok(None)`.
///
/// # Errors
///
/// Returns `CommandError` for unknown commands or malformed arguments.
pub fn parse_command(line: &str) -> Result<Option<ReplCommand>, CommandError> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word.to_ascii_lowercase().as_str() {
        "next" | "n" => ReplCommand::Next,
        "prev" | "p" | "previous" => ReplCommand::Previous,
        "jump" | "j" => {
            let n: usize = number("jump", rest)?;
            ReplCommand::Jump(n.saturating_sub(1))
        }
        "watch" | "w" => {
            let pct: u32 = number("watch", rest.trim_end_matches('%'))?;
            ReplCommand::Watch(u8::try_from(pct.min(100)).unwrap_or(100))
        }
        "step" | "s" => ReplCommand::Step,
        "back-step" | "back" | "b" => ReplCommand::BackStep,
        "note" => ReplCommand::Note(rest.to_owned()),
        "complete" | "done" | "c" => ReplCommand::Complete,
        "bw" | "low-bandwidth" => ReplCommand::Bandwidth,
        "lessons" | "ls" => ReplCommand::Lessons,
        "resources" | "res" => ReplCommand::Resources,
        "status" => ReplCommand::Status,
        "help" | "?" | "h" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        _ => return Err(CommandError::Unknown(word.to_owned())),
    };
    Ok(Some(command))
}

fn number<T: std::str::FromStr>(command: &'static str, raw: &str) -> Result<T, CommandError> {
    if raw.is_empty() {
        return Err(CommandError::MissingArgument(command));
    }
    raw.parse().map_err(|_| CommandError::InvalidNumber {
        command,
        raw: raw.to_owned(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Drive `player` from `input` until EOF or `quit`, writing to `out`.
///
/// # Errors
///
/// Returns `io::Error` if reading input or writing output fails.
pub async fn run<R, W>(player: &mut CoursePlayerService, input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    write!(out, "{}", render::lesson_view(player.state()))?;
    prompt(out)?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        match parse_command(&line) {
            Ok(Some(command)) => {
                if execute(player, command, out).await? == Flow::Quit {
                    break;
                }
            }
            Ok(None) => {}
            Err(err) => writeln!(out, "{err}")?,
        }
        if let Some(notice) = player.active_notice() {
            writeln!(out, "* {}", notice.message())?;
        }
        prompt(out)?;
    }
    out.flush()
}

fn prompt<W: Write>(out: &mut W) -> io::Result<()> {
    write!(out, "> ")?;
    out.flush()
}

async fn execute<W: Write>(
    player: &mut CoursePlayerService,
    command: ReplCommand,
    out: &mut W,
) -> io::Result<Flow> {
    let current = player.current().lesson.id().clone();
    let moved = match command {
        ReplCommand::Next => report_edge(player.go_next().await, "This is the last lesson.", out)?,
        ReplCommand::Previous => {
            report_edge(player.go_previous().await, "This is the first lesson.", out)?
        }
        ReplCommand::Jump(index) => player.jump_to(index).await,
        ReplCommand::Watch(pct) => {
            if !player.current().lesson.is_video() {
                writeln!(out, "This lesson has no video.")?;
                return Ok(Flow::Continue);
            }
            player.set_watch_percent(&current, pct).await;
            true
        }
        ReplCommand::Step => report_edge(
            player.next_step(&current).await,
            "No further steps.",
            out,
        )?,
        ReplCommand::BackStep => report_edge(
            player.previous_step(&current).await,
            "Already at the first step.",
            out,
        )?,
        ReplCommand::Note(text) => {
            let cleared = text.trim().is_empty();
            if player.set_note(&current, text).await {
                writeln!(out, "{}", if cleared { "Note cleared." } else { "Note saved." })?;
            }
            return Ok(Flow::Continue);
        }
        ReplCommand::Complete => {
            let outcome = player.complete_current().await;
            write!(out, "{}", render::outcome(&outcome))?;
            true
        }
        ReplCommand::Bandwidth => {
            player.toggle_low_bandwidth().await;
            true
        }
        ReplCommand::Lessons => {
            write!(out, "{}", render::lesson_list(&player.state().lesson_list()))?;
            return Ok(Flow::Continue);
        }
        ReplCommand::Resources => {
            write!(
                out,
                "{}",
                render::resources(player.state().catalogue().course())
            )?;
            return Ok(Flow::Continue);
        }
        ReplCommand::Status => {
            write!(out, "{}", render::status(player.state()))?;
            return Ok(Flow::Continue);
        }
        ReplCommand::Help => {
            write!(out, "{HELP}")?;
            return Ok(Flow::Continue);
        }
        ReplCommand::Quit => return Ok(Flow::Quit),
    };

    if moved {
        write!(out, "{}", render::lesson_view(player.state()))?;
    }
    Ok(Flow::Continue)
}

fn report_edge<W: Write>(changed: bool, message: &str, out: &mut W) -> io::Result<bool> {
    if !changed {
        writeln!(out, "{message}")?;
    }
    Ok(changed)
}
