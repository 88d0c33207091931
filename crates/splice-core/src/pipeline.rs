//! Text-in, text-out rendering
//!
//! Wires the stages together: parse, splice, prune, emit. Output is only
//! returned once the whole stream has been processed, so a failing marker
//! never leaves partial YAML behind.

use crate::error::Result;
use crate::evaluate::Evaluator;
use crate::marker::DEFAULT_TARGET;
use crate::prune::Prune;
use crate::splice::Splice;
use crate::yaml::{self, EventReader};

/// Rendering options
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Target for markers that name none
    pub default_target: String,
    /// Remove documents left empty by suppression
    pub prune_empty_documents: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            default_target: DEFAULT_TARGET.to_string(),
            prune_empty_documents: true,
        }
    }
}

impl RenderOptions {
    /// Set default target
    #[inline]
    #[must_use]
    pub fn with_default_target(mut self, target: impl Into<String>) -> Self {
        self.default_target = target.into();
        self
    }

    /// Enable or disable empty-document pruning
    #[inline]
    #[must_use]
    pub fn with_pruning(mut self, enabled: bool) -> Self {
        self.prune_empty_documents = enabled;
        self
    }
}

/// Render one YAML text, evaluating its markers with `evaluator`
///
/// # Errors
/// Returns the first parse, evaluation, structural, or emit error.
pub fn render<E: Evaluator>(input: &str, evaluator: E, options: &RenderOptions) -> Result<String> {
    let mut bytes = input.as_bytes();
    let spliced = Splice::new(EventReader::new(&mut bytes), evaluator)
        .with_default_target(options.default_target.as_str());

    let output = if options.prune_empty_documents {
        yaml::emit(Prune::new(spliced))?
    } else {
        yaml::emit(spliced)?
    };
    tracing::trace!(input_len = input.len(), output_len = output.len(), "rendered");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpliceError;
    use crate::evaluate::{Evaluation, MockEvaluator};

    fn literal(yaml_text: &'static str) -> MockEvaluator {
        let mut evaluator = MockEvaluator::new();
        evaluator
            .expect_evaluate()
            .returning(move |_, _| Ok(Evaluation::Events(yaml::parse_str(yaml_text)?)));
        evaluator
    }

    #[test]
    fn plain_document_is_unchanged() {
        let mut evaluator = MockEvaluator::new();
        evaluator.expect_evaluate().never();
        let out = render("a: 1\nb: two\n", evaluator, &RenderOptions::default()).unwrap();
        assert_eq!(out, "a: 1\nb: two\n");
    }

    #[test]
    fn inline_value_rendered() {
        let out = render("x: (!py 1+1!)\n", literal("2"), &RenderOptions::default()).unwrap();
        assert_eq!(out, "x: 2\n");
    }

    #[test]
    fn suppressed_document_is_pruned() {
        let mut evaluator = MockEvaluator::new();
        evaluator
            .expect_evaluate()
            .returning(|_, _| Ok(Evaluation::NoValue));
        let input = "--- a\n--- (*py pass*)\n--- b\n";

        let pruned = render(input, &mut evaluator, &RenderOptions::default()).unwrap();
        assert!(!pruned.contains("(*"));
        assert_eq!(pruned.matches("---").count(), 2);
        assert!(pruned.contains('a') && pruned.contains('b'));
    }

    #[test]
    fn failure_yields_no_output() {
        let mut evaluator = MockEvaluator::new();
        evaluator
            .expect_evaluate()
            .returning(|target, _| Err(SpliceError::evaluation_failure(target, vec!["boom".into()])));
        let err = render("a: 1\nb: (!py raise!)\n", evaluator, &RenderOptions::default())
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn options_builders() {
        let options = RenderOptions::default()
            .with_default_target("ruby")
            .with_pruning(false);
        assert_eq!(options.default_target, "ruby");
        assert!(!options.prune_empty_documents);
    }
}
