use std::{path::Path, sync::Arc};

use serde::Serialize;

/// A concrete position inside one file buffer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileLocation {
    pub file: Arc<str>,
    /// Byte offset from the start of the buffer.
    pub offset: usize,
    /// 1-based line.
    pub line: u32,
    /// 1-based byte column.
    pub col: u32,
    /// Length of the token starting here.
    pub tok_len: usize,
}

/// A location as the front end reports it: where the characters are spelled
/// and where the surrounding macro (if any) was expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceLocation {
    pub spelling: Option<FileLocation>,
    pub expansion: Option<FileLocation>,
}

impl SourceLocation {
    /// A location that did not come out of a macro expansion.
    pub fn at(loc: FileLocation) -> Self {
        Self {
            spelling: Some(loc.clone()),
            expansion: Some(loc),
        }
    }

    /// The position once macro layers are resolved.
    ///
    /// Prefers the expansion location, i.e. the place the user sees in their
    /// file, over the spelling inside a macro body.
    pub fn canonical(&self) -> Option<&FileLocation> {
        self.expansion.as_ref().or(self.spelling.as_ref())
    }

    /// Whether this location was produced by a macro expansion.
    pub fn is_macro_expansion(&self) -> bool {
        match (&self.spelling, &self.expansion) {
            (Some(spelling), Some(expansion)) => {
                spelling.offset != expansion.offset || !paths_match(&spelling.file, &expansion.file)
            },
            _ => false,
        }
    }

    /// Canonical equality against a resolved target position.
    pub fn same_position(
        &self,
        target: &FilePosition,
    ) -> bool {
        self.canonical().is_some_and(|loc| loc.offset == target.offset && paths_match(&loc.file, &target.file))
    }

    /// Returns a copy moved `delta` bytes inside the same buffer.
    ///
    /// The token length is unknown after the move and reset to zero.
    pub(crate) fn with_offset(
        &self,
        delta: isize,
    ) -> Self {
        let shift = |loc: &FileLocation| FileLocation {
            file: loc.file.clone(),
            offset: loc.offset.saturating_add_signed(delta),
            line: loc.line,
            col: (loc.col as isize + delta).max(1) as u32,
            tok_len: 0,
        };
        Self {
            spelling: self.spelling.as_ref().map(shift),
            expansion: self.expansion.as_ref().map(shift),
        }
    }
}

/// A token range in clang's convention: `end` is the *start* of the last
/// token, so the covered characters end at `end.offset + end.tok_len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceRange {
    pub begin: SourceLocation,
    pub end: SourceLocation,
}

impl SourceRange {
    pub fn new(
        begin: SourceLocation,
        end: SourceLocation,
    ) -> Self {
        Self {
            begin,
            end,
        }
    }

    /// Whether `target` falls on a character this range covers.
    pub fn covers(
        &self,
        target: &FilePosition,
    ) -> bool {
        let (Some(begin), Some(end)) = (self.begin.canonical(), self.end.canonical()) else {
            return false;
        };
        paths_match(&begin.file, &target.file)
            && begin.offset <= target.offset
            && target.offset < (end.offset + end.tok_len.max(1)).max(begin.offset + 1)
    }
}

/// A half-open byte span inside one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharSpan {
    pub file: Arc<str>,
    pub begin: usize,
    pub end: usize,
}

/// The resolved target of a request: a file and a byte offset in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePosition {
    pub file: Arc<str>,
    pub offset: usize,
}

/// The position a user points at, as it arrives from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetLocation {
    pub file: String,
    pub line: u32,
    pub column: u32,
}

/// Output form of a position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub filename: String,
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

impl From<&FileLocation> for Location {
    fn from(loc: &FileLocation) -> Self {
        Self {
            filename: loc.file.to_string(),
            offset: loc.offset,
            line: loc.line,
            column: loc.col,
        }
    }
}

/// Output form of a range; `end` is exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Range {
    pub begin: Location,
    pub end: Location,
}

/// Compare two file paths for equality, tolerating symlinks and relative
/// spellings of the same file.
pub fn paths_match(
    a: &str,
    b: &str,
) -> bool {
    if a == b {
        return true;
    }
    let pa = Path::new(a);
    let pb = Path::new(b);
    if let (Ok(ca), Ok(cb)) = (pa.canonicalize(), pb.canonicalize()) {
        return ca == cb;
    }
    false
}
