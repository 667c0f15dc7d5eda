use super::string_schema;
use std::fmt::Display;
use std::str::FromStr;

/// The categories every registry starts with and always contains.
pub const BASE_CATEGORIES: [&str; 7] = [
    "futbol",
    "basketbol",
    "voleybol",
    "duygusal",
    "mizah",
    "film",
    "dizi",
];

/// The feed selector matching every category; it is never a tag itself.
pub const CATEGORY_ALL: &str = "all";

/// A normalized category tag.
///
/// The set of categories is open-ended and grows at runtime, so a tag is a
/// validated string rather than a closed enum: it is trimmed, lower-cased,
/// never empty and never [`CATEGORY_ALL`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub struct Category(String);

impl Category {
    /// Normalize a raw tag, returning `None` if nothing is left of it or
    /// if it names the `all` selector.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() || normalized == CATEGORY_ALL {
            None
        } else {
            Some(Self(normalized))
        }
    }

    /// The normalized tag
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The tag with its first character capitalized, for display
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Whether this tag belongs to [`BASE_CATEGORIES`]
    pub fn is_base(&self) -> bool {
        BASE_CATEGORIES.contains(&self.0.as_str())
    }

    /// The tag legacy records without a category are filed under
    pub fn fallback() -> Self {
        Self("mizah".to_owned())
    }
}

/// A category normalized to nothing, or to the reserved selector
#[derive(Debug, thiserror::Error)]
#[error("category is empty or reserved")]
pub struct EmptyCategory;

impl TryFrom<String> for Category {
    type Error = EmptyCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or(EmptyCategory)
    }
}

impl FromStr for Category {
    type Err = EmptyCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(EmptyCategory)
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        value.0
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

string_schema!(Category, "Category", "\\S");

/// The active set of categories, in insertion order.
///
/// A registry always contains [`BASE_CATEGORIES`]. It grows whenever an
/// unseen tag is admitted and shrinks only through [`CategoryRegistry::remove`].
/// Removing a tag never touches the submissions that carry it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "Vec<Category>", into = "Vec<Category>")
)]
pub struct CategoryRegistry(indexmap::IndexSet<Category, rustc_hash::FxBuildHasher>);

impl Default for CategoryRegistry {
    fn default() -> Self {
        Self(
            BASE_CATEGORIES
                .iter()
                .map(|tag| Category((*tag).to_owned()))
                .collect(),
        )
    }
}

impl CategoryRegistry {
    /// A registry holding only the base set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag if it is not yet known; returns true if it was added.
    pub fn add(&mut self, category: Category) -> bool {
        self.0.insert(category)
    }

    /// Remove a tag; returns true if it was removed.
    ///
    /// Base categories cannot be removed.
    pub fn remove(&mut self, category: &Category) -> bool {
        if category.is_base() {
            false
        } else {
            self.0.shift_remove(category)
        }
    }

    /// Whether the tag is in the active set
    pub fn contains(&self, category: &Category) -> bool {
        self.0.contains(category)
    }

    /// The active tags, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.0.iter()
    }

    /// The number of active tags
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false, as the base set is never removed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Extend<Category> for CategoryRegistry {
    fn extend<T: IntoIterator<Item = Category>>(&mut self, iter: T) {
        self.0.extend(iter)
    }
}

impl FromIterator<Category> for CategoryRegistry {
    fn from_iter<T: IntoIterator<Item = Category>>(iter: T) -> Self {
        let mut registry = Self::default();
        registry.extend(iter);
        registry
    }
}

impl From<Vec<Category>> for CategoryRegistry {
    fn from(value: Vec<Category>) -> Self {
        value.into_iter().collect()
    }
}

impl From<CategoryRegistry> for Vec<Category> {
    fn from(value: CategoryRegistry) -> Self {
        value.0.into_iter().collect()
    }
}

#[cfg(feature = "schemars")]
impl schemars::JsonSchema for CategoryRegistry {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        "CategoryRegistry".into()
    }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        <Vec<Category> as schemars::JsonSchema>::json_schema(generator)
    }
}

/// The category selector of the feed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "String", into = "String")
)]
pub enum CategoryFilter {
    /// Keep every submission (the "all" sentinel)
    #[default]
    All,
    /// Keep only submissions carrying exactly this tag
    Only(Category),
}

impl CategoryFilter {
    /// Whether a submission with `category` passes the filter
    pub fn accepts(&self, category: &Category) -> bool {
        match self {
            Self::All => true,
            Self::Only(selected) => selected == category,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = EmptyCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case(CATEGORY_ALL) {
            Ok(Self::All)
        } else {
            Ok(Self::Only(s.parse()?))
        }
    }
}

impl TryFrom<String> for CategoryFilter {
    type Error = EmptyCategory;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CategoryFilter> for String {
    fn from(value: CategoryFilter) -> Self {
        value.to_string()
    }
}

impl Display for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str(CATEGORY_ALL),
            Self::Only(category) => category.fmt(f),
        }
    }
}

string_schema!(CategoryFilter, "CategoryFilter", "\\S");
