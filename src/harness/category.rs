//! Category tags.

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Category a test case is grouped under.
///
/// The built-in constants cover the default battery; any other tag can be
/// created with [`Category::new`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Category(Cow<'static, str>);

impl Category {
    /// Server reachability and model inventory
    pub const INFRASTRUCTURE: Category = Category(Cow::Borrowed("infrastructure"));
    /// Chat behavior across languages and tasks
    pub const FUNCTIONALITY: Category = Category(Cow::Borrowed("functionality"));
    /// Latency, parallel load, memory
    pub const PERFORMANCE: Category = Category(Cow::Borrowed("performance"));
    /// Hostile input and request bursts
    pub const SECURITY: Category = Category(Cow::Borrowed("security"));
    /// Degenerate input handling
    pub const USABILITY: Category = Category(Cow::Borrowed("usability"));
    /// Repeatability
    pub const RELIABILITY: Category = Category(Cow::Borrowed("reliability"));
    /// API surface and network conditions
    pub const COMPATIBILITY: Category = Category(Cow::Borrowed("compatibility"));

    /// Create an arbitrary category tag
    pub fn new(name: impl Into<String>) -> Self {
        Category(Cow::Owned(name.into()))
    }

    /// Tag as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Tag with its first letter capitalized (`"infrastructure"` → `"Infrastructure"`)
    pub fn title(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for Category {
    fn from(name: &'static str) -> Self {
        Category(Cow::Borrowed(name))
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Category(Cow::Owned(name))
    }
}

impl From<&Category> for Category {
    fn from(category: &Category) -> Self {
        category.clone()
    }
}
