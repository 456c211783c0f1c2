// ============================================================
// Layer 1 - Interactive Shell
// ============================================================
// One command per line, each mapped to exactly one Request:
//
//   train                 → Request::Train
//   load remote|local     → Request::LoadRemote / LoadLocal
//   save                  → Request::SaveLocal
//   remove                → Request::RemoveLocal
//   predict a,b,c,d       → Request::Predict
//   evaluate              → Request::Evaluate
//   status                → Request::Status
//   export <dir>          → Request::Export
//   help | quit
//
// Because the loop handles one line at a time and the controller
// holds the session exclusively, a second "train" can only start
// after the first has returned.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;

use crate::application::controller::{Controller, Request};

const HELP: &str = "\
Commands:
  train                 train a new model from scratch
  load remote|local     load the hosted or the locally saved model
  save                  save the current model locally
  remove                delete the locally saved model
  predict a,b,c,d       classify sepal length, sepal width, petal length, petal width
  evaluate              results table for the test split
  status                model, local and remote availability
  export <dir>          write the current model in the hosted layout
  help                  show this text
  quit                  leave the shell";

#[derive(Debug, PartialEq)]
pub enum ShellLine {
    Request(Request),
    Help,
    Quit,
    Empty,
}

pub fn parse_line(line: &str) -> Result<ShellLine, String> {
    let line = line.trim();
    let (cmd, rest) = match line.split_once(char::is_whitespace) {
        Some((cmd, rest)) => (cmd, rest.trim()),
        None              => (line, ""),
    };

    let parsed = match (cmd, rest) {
        ("", _)                    => ShellLine::Empty,
        ("help" | "?", _)          => ShellLine::Help,
        ("quit" | "exit", _)       => ShellLine::Quit,
        ("train", "")              => ShellLine::Request(Request::Train),
        ("load", "remote")         => ShellLine::Request(Request::LoadRemote),
        ("load", "local")          => ShellLine::Request(Request::LoadLocal),
        ("save", "")               => ShellLine::Request(Request::SaveLocal),
        ("remove", "")             => ShellLine::Request(Request::RemoveLocal),
        ("evaluate", "")           => ShellLine::Request(Request::Evaluate),
        ("status", "")             => ShellLine::Request(Request::Status),
        ("predict", values)        => ShellLine::Request(Request::Predict(parse_features(values)?)),
        ("export", dir) if !dir.is_empty() => ShellLine::Request(Request::Export(PathBuf::from(dir))),
        _ => return Err(format!("Unrecognised command '{line}'. Type 'help' for a list.")),
    };
    Ok(parsed)
}

fn parse_features(values: &str) -> Result<Vec<f32>, String> {
    if values.is_empty() {
        return Err("predict needs four comma-separated measurements".to_string());
    }
    values
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|v| !v.is_empty())
        .map(|v| v.parse::<f32>().map_err(|_| format!("'{v}' is not a number")))
        .collect()
}

/// Read commands from `input` until EOF or `quit`, writing responses to `out`.
pub fn run_shell(controller: &mut Controller, input: impl BufRead, mut out: impl Write) -> Result<()> {
    writeln!(out, "iris-lab shell. Type 'help' for commands.")?;
    write!(out, "> ")?;
    out.flush()?;

    for line in input.lines() {
        match parse_line(&line?) {
            Ok(ShellLine::Request(request)) => writeln!(out, "{}", controller.handle(request))?,
            Ok(ShellLine::Help)             => writeln!(out, "{HELP}")?,
            Ok(ShellLine::Quit)             => return Ok(()),
            Ok(ShellLine::Empty)            => {}
            Err(message)                    => writeln!(out, "{message}")?,
        }
        write!(out, "> ")?;
        out.flush()?;
    }
    Ok(())
}
