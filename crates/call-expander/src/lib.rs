pub mod compiler;
pub mod config;
pub mod error;
pub mod expand;
pub mod macros;
pub mod source;
pub mod syntax;
pub mod tree;

pub use config::ExpandSettings;
pub use error::{ExpandError, Result};
pub use expand::{ExpansionRequest, Query, QueryOptions, resolve};
pub use macros::{HeaderSearch, MacroTrace, scan_macros, trace_macros};
pub use source::{SourceManager, TargetLocation};
pub use tree::{Tree, TreeBuilder, load_clang_json};

#[cfg(test)]
#[path = "../tests/src/support.rs"]
pub(crate) mod test_support;
