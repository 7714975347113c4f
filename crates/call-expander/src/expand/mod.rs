//! Resolution of the callable at a target position.
//!
//! Macro invocations are offered first, since the preprocessor runs before
//! the parser sees any call. The first candidate whose invocation token sits
//! exactly at the target completes the request.

mod binder;
mod collector;
mod context;
mod matcher;
mod names;
mod query;

use tracing::debug;

pub use binder::{ParameterBinder, is_infix_binary};
pub use collector::DeclarationCollector;
pub use context::{CallContextWalker, is_assignment};
pub use matcher::{Candidate, LocationMatcher};
pub use names::name_location;
pub use query::{
    AssigneeData, AssigneeType, CallData, DeclarationData, DefinitionData, ParameterMap, Query, QueryOptions,
    ScopeContext, ScopeKind, WriteOnce,
};

use crate::{
    config::SearchSettings,
    error::Result,
    macros::MacroTrace,
    source::{FilePosition, SourceManager},
    tree::Tree,
};

/// Everything one resolution needs. Nothing in here is modified.
pub struct ExpansionRequest<'a> {
    pub tree: &'a Tree,
    pub sources: &'a SourceManager,
    pub macros: &'a MacroTrace,
    pub target: FilePosition,
    pub options: QueryOptions,
    pub search: SearchSettings,
}

/// Resolve the callable at `request.target`.
///
/// Returns an empty query when nothing is invoked there. Any error aborts the
/// whole request; no partially filled query escapes.
pub fn resolve(request: &ExpansionRequest<'_>) -> Result<Query> {
    let mut query = Query::new(request.options);
    let matcher =
        LocationMatcher::new(request.tree, request.sources, &request.target, request.search.max_walk_depth);

    for expansion in request.macros.expansions() {
        if matcher.match_expansion(request.macros, expansion, &mut query)? {
            return Ok(query);
        }
    }

    for id in request.tree.preorder() {
        if let Some(candidate) = Candidate::at(request.tree, id)
            && matcher.match_candidate(&candidate, &mut query)?
        {
            return Ok(query);
        }
    }

    debug!("[match] nothing callable at {}:{}", request.target.file, request.target.offset);
    Ok(query)
}
