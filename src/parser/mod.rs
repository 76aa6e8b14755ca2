//! Recovery of structured values from the raw text external tools print.
//!
//! Two modes exist because the tools are inconsistent about what they emit:
//!
//! * **Identifier mode** returns the last non-blank line. Tools that print a
//!   bare identifier often precede it with warnings.
//! * **Destination mode** returns the path announced on the first
//!   `[ExtractAudio] Destination:` line.

use std::path::{Path, PathBuf};

use crate::error::ParseError;

/// Prefix yt-dlp uses to announce the file written by audio extraction
pub const DESTINATION_MARKER: &str = "[ExtractAudio] Destination:";

/// Which field to recover from a tool's output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseMode {
    Identifier,
    /// Relative destinations are resolved against `output_dir`
    Destination { output_dir: PathBuf },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedField {
    Identifier(String),
    Destination(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputParser {
    mode: ParseMode,
}

impl OutputParser {
    pub fn identifier() -> Self {
        Self {
            mode: ParseMode::Identifier,
        }
    }

    pub fn destination(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            mode: ParseMode::Destination {
                output_dir: output_dir.into(),
            },
        }
    }

    pub fn mode(&self) -> &ParseMode {
        &self.mode
    }

    pub fn parse(&self, raw: &str) -> Result<ParsedField, ParseError> {
        match &self.mode {
            ParseMode::Identifier => parse_identifier(raw).map(ParsedField::Identifier),
            ParseMode::Destination { output_dir } => {
                parse_destination(raw, output_dir).map(ParsedField::Destination)
            }
        }
    }
}

/// Last line that is non-blank after trimming
pub fn parse_identifier(raw: &str) -> Result<String, ParseError> {
    raw.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .ok_or(ParseError::NoIdentifierFound)
}

/// Path on the first destination marker line. The tool reports a single
/// extraction per run, so later marker lines are ignored.
pub fn parse_destination(raw: &str, output_dir: &Path) -> Result<PathBuf, ParseError> {
    let reported = raw
        .lines()
        .map(str::trim)
        .find_map(|line| line.strip_prefix(DESTINATION_MARKER))
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
        .ok_or(ParseError::NoDestinationFound)?;

    let path = Path::new(reported);
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }

    // Relative paths are reported against the tool's working directory, not
    // ours; only the file name is trustworthy.
    let file_name = path.file_name().ok_or(ParseError::NoDestinationFound)?;
    Ok(output_dir.join(file_name))
}
