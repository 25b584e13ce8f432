// src/keys/mod.rs
use anyhow::{Context, Result};
use std::{fs, path::Path};
use tracing::debug;

use crate::error::CleanError;

/// Read the code dictionary and split it into raw blocks, one per recoded
/// column, in file order.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_blocks<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| CleanError::io(path, e))
        .with_context(|| format!("Failed to read code dictionary {:?}", path))?;

    let blocks = split_blocks(&text);
    debug!(blocks = blocks.len(), "split code dictionary");
    Ok(blocks)
}

/// A line consisting only of a newline closes the running block, which is
/// trimmed before being stored. Whatever is left at end of input is stored
/// untrimmed.
pub fn split_blocks(text: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut running = String::new();

    for line in text.split_inclusive('\n') {
        if line == "\n" || line == "\r\n" {
            blocks.push(running.trim().to_string());
            running.clear();
            continue;
        }
        running.push_str(line);
    }

    blocks.push(running);
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn splits_on_blank_lines() {
        let text = "STATEICP\tState\n1\t\tMaine\n\nSEX\tSex\n1\t\tMale\n2\t\tFemale\n";
        let blocks = split_blocks(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0], "STATEICP\tState\n1\t\tMaine");
        assert_eq!(blocks[1], "SEX\tSex\n1\t\tMale\n2\t\tFemale\n");
    }

    #[test]
    fn final_block_keeps_trailing_whitespace() {
        let blocks = split_blocks("A\n1\t\tx  \n\nB\n2\t\ty  \n");
        assert_eq!(blocks[0], "A\n1\t\tx");
        assert_eq!(blocks[1], "B\n2\t\ty  \n");
    }

    #[test]
    fn final_block_without_newline() {
        let blocks = split_blocks("A\n1\t\tx\n\nB\n2\t\ty");
        assert_eq!(blocks, vec!["A\n1\t\tx".to_string(), "B\n2\t\ty".to_string()]);
    }

    #[test]
    fn consecutive_blank_lines_yield_empty_block() {
        let blocks = split_blocks("A\n1\t\tx\n\n\nB\n");
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[1], "");
    }

    #[test]
    fn whitespace_only_line_does_not_split() {
        let blocks = split_blocks("A\n1\t\tx\n \nB\n");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn load_blocks_reads_file() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        write!(tmp, "SEX\tSex\n1\t\tMale\n\nRACE\tRace\n1\t\tWhite\n")?;
        let blocks = load_blocks(tmp.path())?;
        assert_eq!(blocks.len(), 2);
        Ok(())
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_blocks("/definitely/not/here/post_strat_keys.txt").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CleanError>(),
            Some(CleanError::Io { .. })
        ));
    }
}
