use crate::classification::{CATEGORY_KEY, Category, ModifierClassification};

/// A test over a lowercased modifier label.
#[derive(Debug, Clone)]
pub enum Matcher {
    Exact(String),
    Prefix(String),
    Suffix(String),
    Function(fn(&str) -> bool),
}

impl Matcher {
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Matcher::Exact(word) => text == word,
            Matcher::Prefix(prefix) => text.starts_with(prefix.as_str()),
            Matcher::Suffix(suffix) => text.ends_with(suffix.as_str()),
            Matcher::Function(test) => test(text),
        }
    }
}

/// One entry of the classifier registry: when any matcher accepts the
/// modifier label, `key` is set to `category` (and the list flag raised if
/// `list` is true).
#[derive(Debug, Clone)]
pub struct Classifier {
    pub name: String,
    pub key: String,
    pub category: Category,
    pub list: bool,
    pub matchers: Vec<Matcher>,
}

impl Classifier {
    /// A classifier setting the category key, with no matchers yet.
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Classifier {
            name: name.into(),
            key: CATEGORY_KEY.to_string(),
            category,
            list: false,
            matchers: Vec::new(),
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    pub fn marks_list(mut self) -> Self {
        self.list = true;
        self
    }

    pub fn matching(mut self, matcher: Matcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    pub fn exact(self, word: &str) -> Self {
        self.matching(Matcher::Exact(word.to_lowercase()))
    }

    pub fn prefix(self, prefix: &str) -> Self {
        self.matching(Matcher::Prefix(prefix.to_lowercase()))
    }

    pub fn suffix(self, suffix: &str) -> Self {
        self.matching(Matcher::Suffix(suffix.to_lowercase()))
    }

    /// `text` must already be lowercased.
    pub fn matches(&self, text: &str) -> bool {
        self.matchers.iter().any(|matcher| matcher.matches(text))
    }

    pub(crate) fn apply(&self, classification: &mut ModifierClassification) {
        if classification.set(&self.key, self.category.clone()) && self.list {
            classification.list = true;
        }
    }

    /// The built-in registry, in evaluation order: list, my-block, variable.
    pub fn builtin() -> Vec<Classifier> {
        vec![
            Classifier::new("list", Category::Variables)
                .marks_list()
                .suffix("list"),
            Classifier::new("myblock", Category::MyBlock)
                .exact("local")
                .matching(Matcher::Function(is_my_blocks))
                .exact("custom-arg"),
            Classifier::new("variable", Category::Variables)
                .exact("user-defined")
                .exact("custom")
                .exact("variable")
                .exact("variables"),
        ]
    }
}

/// `my block`, `my blocks`, `myblocks`, ...
fn is_my_blocks(text: &str) -> bool {
    text.strip_prefix("my")
        .map(|rest| rest.trim_start_matches([' ', '\t']))
        .is_some_and(|rest| rest.starts_with("block"))
}
