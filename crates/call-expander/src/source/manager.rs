use std::{cell::RefCell, collections::HashMap, path::Path, sync::Arc};

use tracing::debug;

use crate::{
    error::{ExpandError, Result},
    source::{
        location::{CharSpan, FileLocation, FilePosition, Location, SourceLocation, SourceRange, TargetLocation, paths_match},
        text_pos::{byte_offset_from_line_col, line_col_from_byte_offset},
    },
    syntax::lexer::measure_token_length,
};

/// Owns the text of every file a request needs and answers raw-text queries
/// by location.
///
/// Buffers are either inserted up front or, when disk access is enabled,
/// read on first use. Resolution is single-threaded, so the cache lives in a
/// `RefCell`.
#[derive(Debug, Default)]
pub struct SourceManager {
    buffers: RefCell<HashMap<String, Arc<str>>>,
    read_from_disk: bool,
}

impl SourceManager {
    /// A manager that only knows the buffers inserted into it.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A manager that reads files from disk the first time they are needed.
    pub fn with_disk_access() -> Self {
        Self {
            buffers: RefCell::default(),
            read_from_disk: true,
        }
    }

    pub fn insert(
        &self,
        path: impl Into<String>,
        text: impl Into<Arc<str>>,
    ) {
        self.buffers.borrow_mut().insert(path.into(), text.into());
    }

    /// Read `path` from disk and keep it, replacing any earlier buffer.
    pub fn load(
        &self,
        path: &Path,
    ) -> Result<Arc<str>> {
        let text = std::fs::read_to_string(path).map_err(|source| ExpandError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let text: Arc<str> = Arc::from(text);
        debug!("[sources] loaded {} ({} bytes)", path.display(), text.len());
        self.buffers.borrow_mut().insert(path.display().to_string(), text.clone());
        Ok(text)
    }

    /// The buffer for `file`.
    pub fn buffer(
        &self,
        file: &str,
    ) -> Result<Arc<str>> {
        if let Some(text) = self.lookup(file) {
            return Ok(text);
        }
        if self.read_from_disk && Path::new(file).is_file() {
            return self.load(Path::new(file));
        }
        Err(ExpandError::SourceUnavailable {
            file: file.to_owned(),
        })
    }

    fn lookup(
        &self,
        file: &str,
    ) -> Option<Arc<str>> {
        let buffers = self.buffers.borrow();
        if let Some(text) = buffers.get(file) {
            return Some(text.clone());
        }
        buffers.iter().find(|(path, _)| paths_match(path, file)).map(|(_, text)| text.clone())
    }

    /// Raw text of `[begin, end)` in `file`.
    pub fn slice(
        &self,
        file: &str,
        begin: usize,
        end: usize,
    ) -> Result<String> {
        let buffer = self.buffer(file)?;
        buffer.get(begin..end).map(str::to_owned).ok_or_else(|| ExpandError::RangeOutOfBounds {
            file: file.to_owned(),
            begin,
            end,
        })
    }

    /// The characters covered by a token range.
    pub fn span_of(
        &self,
        range: &SourceRange,
    ) -> Result<CharSpan> {
        let begin = canonical(&range.begin)?;
        let end = canonical(&range.end)?;
        if !paths_match(&begin.file, &end.file) {
            return Err(ExpandError::RangeSpansFiles {
                begin_file: begin.file.to_string(),
                end_file: end.file.to_string(),
            });
        }
        Ok(CharSpan {
            file: begin.file.clone(),
            begin: begin.offset,
            end: (end.offset + end.tok_len).max(begin.offset),
        })
    }

    /// Raw source text of a token range.
    pub fn text(
        &self,
        range: &SourceRange,
    ) -> Result<String> {
        let span = self.span_of(range)?;
        self.slice(&span.file, span.begin, span.end)
    }

    /// Raw source text from `begin` up to, not including, the token at `end`.
    pub fn text_between(
        &self,
        begin: &SourceLocation,
        end: &SourceLocation,
    ) -> Result<String> {
        let begin = canonical(begin)?;
        let end = canonical(end)?;
        self.slice(&begin.file, begin.offset, end.offset.max(begin.offset))
    }

    /// Length of the token that starts exactly at `offset`, zero for
    /// whitespace or the end of the buffer.
    pub fn token_length_at(
        &self,
        file: &str,
        offset: usize,
    ) -> Result<usize> {
        let buffer = self.buffer(file)?;
        Ok(measure_token_length(&buffer, offset))
    }

    /// Output location for a byte offset.
    pub fn location_at(
        &self,
        file: &str,
        offset: usize,
    ) -> Result<Location> {
        let buffer = self.buffer(file)?;
        let (line, column) = line_col_from_byte_offset(&buffer, offset);
        Ok(Location {
            filename: file.to_owned(),
            offset,
            line,
            column,
        })
    }

    /// Byte offset of a 1-based line/column in `file`.
    pub fn offset_of(
        &self,
        file: &str,
        line: u32,
        column: u32,
    ) -> Result<usize> {
        let buffer = self.buffer(file)?;
        byte_offset_from_line_col(&buffer, line, column).ok_or_else(|| ExpandError::InvalidTarget {
            file: file.to_owned(),
            line,
            column,
        })
    }

    /// Resolve a user supplied line/column into a byte position.
    pub fn resolve_target(
        &self,
        target: &TargetLocation,
    ) -> Result<FilePosition> {
        let offset = self.offset_of(&target.file, target.line, target.column)?;
        Ok(FilePosition {
            file: Arc::from(target.file.as_str()),
            offset,
        })
    }
}

fn canonical(loc: &SourceLocation) -> Result<&FileLocation> {
    loc.canonical().ok_or_else(|| ExpandError::invariant("source range without a file location"))
}

#[cfg(test)]
#[path = "../../tests/src/source/manager_tests.rs"]
mod tests;
