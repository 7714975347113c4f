//! Locations, ranges and source buffers.

mod location;
mod manager;
mod text_pos;

pub use location::{
    CharSpan, FileLocation, FilePosition, Location, Range, SourceLocation, SourceRange, TargetLocation, paths_match,
};
pub use manager::SourceManager;
pub use text_pos::{byte_offset_from_line_col, line_col_from_byte_offset};
