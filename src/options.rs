/// Evaluation depth allowed before giving up with `DepthExceeded`.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// What a `setq` form evaluates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SetqReturn {
    /// The value operand as written, unevaluated. `(setq x (+ 1 2))` gives `(+ 1 2)`.
    #[default]
    Expression,
    /// The value that was bound. `(setq x (+ 1 2))` gives `3`.
    Value,
}

/// Knobs for an `Interpreter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvalOptions {
    pub max_depth: usize,
    pub setq_returns: SetqReturn,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            max_depth: DEFAULT_MAX_DEPTH,
            setq_returns: SetqReturn::default(),
        }
    }
}

impl EvalOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_setq_returns(mut self, setq_returns: SetqReturn) -> Self {
        self.setq_returns = setq_returns;
        self
    }
}
