use std::fmt;

use serde::{Deserialize, Serialize};

/// Toolkit category for organization and discovery.
///
/// Toolkits outside these categories pass any string to
/// [`crate::ToolkitDecl::category`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolCategory {
    /// Web and video search engines
    Search,
    /// Custom user-defined tools
    Custom,
}

impl ToolCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Search => "Search",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<ToolCategory> for String {
    fn from(category: ToolCategory) -> Self {
        category.as_str().to_string()
    }
}
