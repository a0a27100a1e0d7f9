use crate::{EnvError, EvalError, Expr};
use ariadne::{Config, Label, Report, ReportKind, Source};
use std::ops::Range;

const SOURCE_ID: &str = "expr";

// Char range of the first whole-token occurrence of `needle` in `source`.
fn locate(source: &str, needle: &str) -> Option<Range<usize>> {
    source.match_indices(needle).find_map(|(start, _)| {
        let end = start + needle.len();
        let before = source[..start].chars().next_back();
        let after = source[end..].chars().next();
        let is_token = matches!(before, None | Some('(' | ' '))
            && matches!(after, None | Some(')' | ' '));
        is_token.then(|| {
            let char_start = source[..start].chars().count();
            char_start..char_start + needle.chars().count()
        })
    })
}

impl EvalError {
    fn label(&self) -> &'static str {
        match self {
            EvalError::Env(EnvError::UnboundName(_)) => "This name is not bound in any enclosing scope",
            EvalError::Env(EnvError::ReadOnly(_)) => "Built-in bindings cannot be removed",
            EvalError::NotCallable(_) => "This value cannot be applied",
            EvalError::ArityMismatch { .. } => "Called with the wrong number of arguments",
            EvalError::ArityError { .. } => "Wrong number of operands for this operation",
            EvalError::TypeError { .. } => "This operand has the wrong shape",
            EvalError::DivisionByZero => "A divisor in this expression is zero",
            EvalError::DepthExceeded(_) => "Recursion went too deep while evaluating this",
        }
    }

    /// Renders the error against the printed form of the top-level expression
    /// that failed, pointing at the culprit when it can be found.
    pub fn report(&self, expr: &Expr, color: bool) -> String {
        let source = expr.to_string();
        let whole = 0..source.chars().count();
        let span = self
            .culprit()
            .and_then(|culprit| locate(&source, &culprit))
            .unwrap_or(whole);

        let report = Report::build(ReportKind::Error, (SOURCE_ID, span.clone()))
            .with_config(Config::default().with_color(color))
            .with_message(self.to_string())
            .with_label(Label::new((SOURCE_ID, span)).with_message(self.label()))
            .finish();

        let mut out = Vec::new();
        match report.write((SOURCE_ID, Source::from(source.as_str())), &mut out) {
            Ok(()) => String::from_utf8_lossy(&out).into_owned(),
            Err(_) => self.to_string(),
        }
    }

    pub fn pretty_print(&self, expr: &Expr) {
        eprint!("{}", self.report(expr, true));
    }
}
