use std::collections::HashMap;

use serde::Deserialize;

pub const DEFAULT_MAX_WALK_DEPTH: usize = 8;
pub const MIN_MAX_WALK_DEPTH: usize = 1;
pub const MAX_MAX_WALK_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSettings {
    /// How many expression levels above a call the context walk looks for a
    /// return, assignment or declaration before giving up.
    pub max_walk_depth: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            max_walk_depth: DEFAULT_MAX_WALK_DEPTH,
        }
    }
}

impl SearchSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: SearchSettingsPatch,
    ) {
        if let Some(v) = patch.max_walk_depth {
            self.max_walk_depth = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.max_walk_depth = self.max_walk_depth.clamp(MIN_MAX_WALK_DEPTH, MAX_MAX_WALK_DEPTH);
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct SearchSettingsPatch {
    pub(crate) max_walk_depth: Option<usize>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, toml::Value>,
}
