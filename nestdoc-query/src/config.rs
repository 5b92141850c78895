use serde::{Deserialize, Serialize};

/// How positional array-filter aliases are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AliasStrategy {
    #[default]
    /// `<collection>Id`, e.g. `usersId`. A path that traverses the same
    /// collection name twice cannot be compiled.
    CollectionName,
    /// `d<depth>Id`, e.g. `d0Id`, `d1Id`. Always unambiguous.
    Depth,
}

/// Names used when compiling paths against the persisted tenant shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Field holding the tenant name on each tenant document.
    pub tenant_field: String,
    /// Array of single-key environment objects on each tenant document.
    pub scope_field: String,
    /// Positional alias bound to the environment element.
    pub environment_alias: String,
    /// Identifier field stamped on every collection member.
    pub id_field: String,
    pub alias_strategy: AliasStrategy,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            tenant_field: "username".to_string(),
            scope_field: "environments".to_string(),
            environment_alias: "envId".to_string(),
            id_field: "_id".to_string(),
            alias_strategy: AliasStrategy::CollectionName,
        }
    }
}
