use std::collections::HashMap;

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OutputSettings {
    /// Indent the printed JSON.
    pub pretty: bool,
}

impl OutputSettings {
    pub(crate) fn apply_patch(
        &mut self,
        patch: OutputSettingsPatch,
    ) {
        if let Some(v) = patch.pretty {
            self.pretty = v;
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub(crate) struct OutputSettingsPatch {
    pub(crate) pretty: Option<bool>,
    #[serde(flatten)]
    pub(crate) _extra: HashMap<String, toml::Value>,
}
