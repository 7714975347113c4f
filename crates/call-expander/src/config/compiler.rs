use std::collections::HashMap;

use serde::Deserialize;

pub const DEFAULT_CLANG: &str = "clang++";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerSettings {
    /// The clang driver that produces the AST dump.
    pub clang: String,
    pub include_paths: Vec<String>,
    pub extra_flags: Vec<String>,
}

impl Default for CompilerSettings {
    fn default() -> Self {
        Self {
            clang: DEFAULT_CLANG.to_string(),
            include_paths: Vec::new(),
            extra_flags: Vec::new(),
        }
    }
}

impl CompilerSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: CompilerSettingsPatch,
    ) {
        if let Some(v) = patch.clang {
            self.clang = v;
        }
        if let Some(v) = patch.include_paths {
            self.include_paths = v;
        }
        if let Some(v) = patch.extra_flags {
            self.extra_flags = v;
        }
    }

    pub(crate) fn normalize(&mut self) {
        self.clang = self.clang.trim().to_string();
        if self.clang.is_empty() {
            self.clang = DEFAULT_CLANG.to_string();
        }
        self.include_paths =
            self.include_paths.iter().map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect();
        self.extra_flags = self.extra_flags.iter().map(|f| f.trim().to_string()).filter(|f| !f.is_empty()).collect();
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct CompilerSettingsPatch {
    pub(crate) clang: Option<String>,
    pub(crate) include_paths: Option<Vec<String>>,
    pub(crate) extra_flags: Option<Vec<String>>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, toml::Value>,
}
