use std::collections::BTreeMap;
use std::fmt;

/// The key every built-in classifier sets.
pub const CATEGORY_KEY: &str = "category";

/// Block-palette category a modifier can place a block in.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Category {
    Motion,
    Looks,
    Sound,
    Events,
    Control,
    Sensing,
    Operators,
    Variables,
    MyBlock,
    Pen,
    Extension,
    /// A category introduced by an extension, stored uppercased.
    Custom(String),
}

impl Category {
    /// Look up a category by name, case-insensitively. Unknown names become `Custom`.
    pub fn from_name(name: &str) -> Category {
        match name.to_ascii_uppercase().as_str() {
            "MOTION" => Category::Motion,
            "LOOKS" => Category::Looks,
            "SOUND" => Category::Sound,
            "EVENTS" => Category::Events,
            "CONTROL" => Category::Control,
            "SENSING" => Category::Sensing,
            "OPERATORS" => Category::Operators,
            "VARIABLES" => Category::Variables,
            "MYBLOCK" => Category::MyBlock,
            "PEN" => Category::Pen,
            "EXTENSION" => Category::Extension,
            other => Category::Custom(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Category::Motion => "MOTION",
            Category::Looks => "LOOKS",
            Category::Sound => "SOUND",
            Category::Events => "EVENTS",
            Category::Control => "CONTROL",
            Category::Sensing => "SENSING",
            Category::Operators => "OPERATORS",
            Category::Variables => "VARIABLES",
            Category::MyBlock => "MYBLOCK",
            Category::Pen => "PEN",
            Category::Extension => "EXTENSION",
            Category::Custom(name) => name,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What the modifier of one atomic block says about it.
///
/// Each key is set at most once; the first classifier to claim a key keeps it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModifierClassification {
    values: BTreeMap<String, Category>,
    /// The block reports a list rather than a single value.
    pub list: bool,
}

impl ModifierClassification {
    pub fn get(&self, key: &str) -> Option<&Category> {
        self.values.get(key)
    }

    pub fn category(&self) -> Option<&Category> {
        self.get(CATEGORY_KEY)
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// No key set and not a list.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty() && !self.list
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &Category)> {
        self.values.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Set `key` unless it is already set. Returns whether the value was stored.
    pub(crate) fn set(&mut self, key: &str, value: Category) -> bool {
        if self.is_set(key) {
            return false;
        }
        self.values.insert(key.to_string(), value);
        true
    }
}

impl fmt::Display for ModifierClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("-");
        }
        let mut parts: Vec<String> = self
            .entries()
            .map(|(key, value)| format!("{} = {}", key, value))
            .collect();
        if self.list {
            parts.push("list".to_string());
        }
        f.write_str(&parts.join(", "))
    }
}
