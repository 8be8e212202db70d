use std::ops::Range;

use blocktext::Code;
use blocktext::block::{Atomic, Modifier};

use crate::classification::ModifierClassification;
use crate::classifier::Classifier;
use crate::diagnostic::{CONFLICT_MESSAGE, DiagnosticSink};

/// Derives a [`ModifierClassification`] from an atomic block's modifier by
/// consulting an ordered classifier registry. Read-only once built.
#[derive(Debug, Clone)]
pub struct ModifierAnalyser {
    classifiers: Vec<Classifier>,
}

impl ModifierAnalyser {
    /// The built-in list, my-block and variable classifiers.
    pub fn builtin() -> Self {
        ModifierAnalyser {
            classifiers: Classifier::builtin(),
        }
    }

    /// Append a classifier; it is consulted after every existing one.
    pub fn with_classifier(mut self, classifier: Classifier) -> Self {
        self.classifiers.push(classifier);
        self
    }

    pub fn classifiers(&self) -> &[Classifier] {
        &self.classifiers
    }

    /// Classify one atomic block, reporting conflicts against its span.
    pub fn classify(
        &self,
        atomic: &Atomic,
        sink: &mut dyn DiagnosticSink,
    ) -> ModifierClassification {
        self.classify_modifier(atomic.modifier.as_ref(), atomic.span.clone(), sink)
    }

    /// Run every classifier, in order, over the modifier label. A classifier
    /// whose key is already set does not overwrite it; it reports a conflict
    /// against `context` instead.
    pub fn classify_modifier(
        &self,
        modifier: Option<&Modifier>,
        context: Range<usize>,
        sink: &mut dyn DiagnosticSink,
    ) -> ModifierClassification {
        let mut classification = ModifierClassification::default();
        let Some(modifier) = modifier else {
            return classification;
        };

        let text = modifier.name().to_lowercase();
        for classifier in &self.classifiers {
            if !classifier.matches(&text) {
                continue;
            }
            if classification.is_set(&classifier.key) {
                sink.report(context.clone(), CONFLICT_MESSAGE);
            } else {
                classifier.apply(&mut classification);
            }
        }
        classification
    }

    /// Classify every atomic block of `code`, in walk order.
    pub fn analyse_code<'c>(
        &self,
        code: &'c Code,
        sink: &mut dyn DiagnosticSink,
    ) -> Vec<(&'c Atomic, ModifierClassification)> {
        code.atomic_blocks()
            .into_iter()
            .map(|atomic| (atomic, self.classify(atomic, sink)))
            .collect()
    }
}

impl Default for ModifierAnalyser {
    fn default() -> Self {
        ModifierAnalyser::builtin()
    }
}
