//! Replay script parsing.
//!
//! One command per line. Blank lines and `#` comments are skipped.
//!
//! ```text
//! down 3        # cursor down, animated
//! page 1        # view and cursor down one screen
//! goto 120 4    # bring (120, 4) into view and put the cursor there
//! remote 10 0   # cursor pushed by the remote buffer
//! wheel 0 -45   # mouse wheel, pixels
//! resize 800 400
//! select on
//! wait 200
//! paint
//! ```

use anyhow::{bail, Context, Result};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Down(u32),
    Up(u32),
    Left(u32),
    Right(u32),
    /// Whole screens; negative pages go up.
    Page(i32),
    Goto { row: u32, col: u32 },
    Remote { row: u32, col: u32 },
    Wheel { dx: i32, dy: i32 },
    Resize { width: i32, height: i32 },
    Select(bool),
    Wait(u64),
    Paint,
}

pub fn parse(source: &str) -> Result<Vec<Step>> {
    source
        .lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let line = line.split('#').next().unwrap_or_default().trim();
            (!line.is_empty()).then_some((index + 1, line))
        })
        .map(|(number, line)| parse_line(line).with_context(|| format!("line {number}: '{line}'")))
        .collect()
}

fn parse_line(line: &str) -> Result<Step> {
    let mut words = line.split_whitespace();
    let Some(name) = words.next() else {
        bail!("empty command");
    };
    let args: Vec<&str> = words.collect();

    let step = match name {
        "down" => Step::Down(one(&args)?),
        "up" => Step::Up(one(&args)?),
        "left" => Step::Left(one(&args)?),
        "right" => Step::Right(one(&args)?),
        "page" => Step::Page(one(&args)?),
        "goto" => {
            let (row, col) = two(&args)?;
            Step::Goto { row, col }
        },
        "remote" => {
            let (row, col) = two(&args)?;
            Step::Remote { row, col }
        },
        "wheel" => {
            let (dx, dy) = two(&args)?;
            Step::Wheel { dx, dy }
        },
        "resize" => {
            let (width, height) = two(&args)?;
            Step::Resize { width, height }
        },
        "select" => match args.as_slice() {
            ["on"] => Step::Select(true),
            ["off"] => Step::Select(false),
            _ => bail!("expected 'on' or 'off'"),
        },
        "wait" => Step::Wait(one(&args)?),
        "paint" => {
            if !args.is_empty() {
                bail!("paint takes no arguments");
            }
            Step::Paint
        },
        other => bail!("unknown command '{other}'"),
    };
    Ok(step)
}

fn one<T>(args: &[&str]) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match args {
        [value] => Ok(value.parse()?),
        _ => bail!("expected 1 argument, got {}", args.len()),
    }
}

fn two<T>(args: &[&str]) -> Result<(T, T)>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match args {
        [a, b] => Ok((a.parse()?, b.parse()?)),
        _ => bail!("expected 2 arguments, got {}", args.len()),
    }
}
