use std::path::Path;

use serde::Deserialize;

use analyser::{CATEGORY_KEY, Category, Classifier, ModifierAnalyser};

/// A classifier declared in TOML:
///
/// ```toml
/// [[classifier]]
/// name = "pen"
/// category = "PEN"
/// exact = ["pen"]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierConfig {
    pub name: String,

    /// Classification key to set. Defaults to "category".
    #[serde(default = "default_key")]
    pub key: String,

    /// Category name; unknown names become extension categories.
    pub category: String,

    /// Also mark the block as list-valued.
    #[serde(default)]
    pub list: bool,

    /// Modifier labels matched exactly (case-insensitive).
    #[serde(default)]
    pub exact: Vec<String>,

    #[serde(default)]
    pub prefix: Vec<String>,

    #[serde(default)]
    pub suffix: Vec<String>,
}

fn default_key() -> String {
    CATEGORY_KEY.to_string()
}

/// Top level of a `--config` file.
#[derive(Debug, Default, Deserialize)]
pub struct AnalyserConfig {
    #[serde(default, rename = "classifier")]
    pub classifiers: Vec<ClassifierConfig>,
}

impl ClassifierConfig {
    pub fn to_classifier(&self) -> Result<Classifier, String> {
        if self.exact.is_empty() && self.prefix.is_empty() && self.suffix.is_empty() {
            return Err(format!(
                "classifier '{}' has no exact, prefix or suffix patterns",
                self.name
            ));
        }

        let mut classifier = Classifier::new(self.name.clone(), Category::from_name(&self.category))
            .with_key(self.key.clone());
        if self.list {
            classifier = classifier.marks_list();
        }
        for word in &self.exact {
            classifier = classifier.exact(word);
        }
        for prefix in &self.prefix {
            classifier = classifier.prefix(prefix);
        }
        for suffix in &self.suffix {
            classifier = classifier.suffix(suffix);
        }
        Ok(classifier)
    }
}

/// The built-in registry followed by `extra`, in declaration order.
pub fn build_analyser(extra: &[ClassifierConfig]) -> Result<ModifierAnalyser, String> {
    let mut analyser = ModifierAnalyser::builtin();
    for config in extra {
        analyser = analyser.with_classifier(config.to_classifier()?);
    }
    Ok(analyser)
}

/// Read a TOML config file and build the analyser it describes.
pub fn load(path: &Path) -> Result<ModifierAnalyser, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read '{}': {}", path.display(), e))?;
    let config: AnalyserConfig =
        toml::from_str(&text).map_err(|e| format!("TOML parse error: {}", e))?;
    build_analyser(&config.classifiers)
}
