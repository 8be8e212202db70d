pub mod classification;
pub mod classifier;
pub mod diagnostic;
pub mod modifier;

pub use classification::{CATEGORY_KEY, Category, ModifierClassification};
pub use classifier::{Classifier, Matcher};
pub use diagnostic::{CONFLICT_MESSAGE, DiagnosticSink, Warning, WarningCollector};
pub use modifier::ModifierAnalyser;
