// ABOUTME: Line-oriented command language for driving the partition tree.
// ABOUTME: One command per line; blank lines and `#` comments are skipped.

use anyhow::{bail, Context, Result};
use tiler_layout::{Direction, PartitionId};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Split(PartitionId, Direction),
    Remove(PartitionId),
    Resize(PartitionId, f64),
    /// Pointer drag on partition's resize handle, released at a canvas cell
    Drag { id: PartitionId, col: u16, row: u16 },
    Show,
    Tree,
    Dump,
    Check,
    Quit,
}

/// Parse one line, returning `None` for blank lines and comments
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match (verb, args.as_slice()) {
        ("split", [id, dir]) => Command::Split(parse_id(id)?, parse_direction(dir)?),
        ("remove" | "rm", [id]) => Command::Remove(parse_id(id)?),
        ("resize", [id, size]) => Command::Resize(
            parse_id(id)?,
            size.trim_end_matches('%')
                .parse()
                .with_context(|| format!("invalid size '{}'", size))?,
        ),
        ("drag", [id, col, row]) => Command::Drag {
            id: parse_id(id)?,
            col: col.parse().with_context(|| format!("invalid column '{}'", col))?,
            row: row.parse().with_context(|| format!("invalid row '{}'", row))?,
        },
        ("show", []) => Command::Show,
        ("tree", []) => Command::Tree,
        ("dump", []) => Command::Dump,
        ("check", []) => Command::Check,
        ("quit" | "exit", []) => Command::Quit,
        (verb, args) => bail!("unknown command '{}' with {} argument(s)", verb, args.len()),
    };
    Ok(Some(command))
}

fn parse_id(word: &str) -> Result<PartitionId> {
    word.parse()
        .map(PartitionId)
        .with_context(|| format!("invalid partition id '{}'", word))
}

fn parse_direction(word: &str) -> Result<Direction> {
    match word {
        "v" | "vertical" => Ok(Direction::Vertical),
        "h" | "horizontal" => Ok(Direction::Horizontal),
        other => bail!("invalid direction '{}', expected v or h", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mutations() {
        assert_eq!(
            parse_line("split 3 v").unwrap(),
            Some(Command::Split(PartitionId(3), Direction::Vertical))
        );
        assert_eq!(
            parse_line("  split 0 horizontal  ").unwrap(),
            Some(Command::Split(PartitionId(0), Direction::Horizontal))
        );
        assert_eq!(parse_line("rm 4").unwrap(), Some(Command::Remove(PartitionId(4))));
        assert_eq!(
            parse_line("resize 2 37.5%").unwrap(),
            Some(Command::Resize(PartitionId(2), 37.5))
        );
        assert_eq!(
            parse_line("drag 1 10 3").unwrap(),
            Some(Command::Drag {
                id: PartitionId(1),
                col: 10,
                row: 3
            })
        );
    }

    #[test]
    fn skips_blank_and_comments() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   # just a note").unwrap(), None);
        assert_eq!(parse_line("show # trailing").unwrap(), Some(Command::Show));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert!(parse_line("split 1").is_err());
        assert!(parse_line("split x v").is_err());
        assert!(parse_line("split 1 diagonal").is_err());
        assert!(parse_line("resize 1 big").is_err());
        assert!(parse_line("explode").is_err());
        assert!(parse_line("show now").is_err());
    }
}
