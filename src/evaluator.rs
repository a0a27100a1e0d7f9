use crate::environment::{EnvError, EnvRef, Environment};
use crate::options::{EvalOptions, SetqReturn};
use crate::stack::ensure_sufficient_stack;
use crate::types::{Atom, Expr, Lambda, Value};
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, trace};

// --- Evaluation Error ---
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error(transparent)]
    Env(#[from] EnvError), // Errors from environment lookup and removal
    #[error("Not callable: {0}")]
    NotCallable(Value), // Operator position resolved to data
    #[error("'{name}' takes {expected} arguments, got {found}")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("'{name}' expects {expected} operands, got {found}")]
    ArityError {
        name: String,
        expected: String,
        found: usize,
    },
    #[error("'{operation}' expects a {expected}, got {found}")]
    TypeError {
        operation: String,
        expected: &'static str,
        found: Value,
    },
    #[error("Division by zero")]
    DivisionByZero,
    #[error("Maximum evaluation depth of {0} exceeded")]
    DepthExceeded(usize),
}

impl EvalError {
    /// The name or value the error is about, if there is one.
    pub fn culprit(&self) -> Option<String> {
        match self {
            EvalError::Env(EnvError::UnboundName(name) | EnvError::ReadOnly(name)) => {
                Some(name.clone())
            }
            EvalError::NotCallable(value) => Some(value.to_string()),
            EvalError::ArityMismatch { name, .. } | EvalError::ArityError { name, .. } => {
                Some(name.clone())
            }
            EvalError::TypeError { found, .. } => Some(found.to_string()),
            EvalError::DivisionByZero | EvalError::DepthExceeded(_) => None,
        }
    }
}

// Result type alias for convenience
pub type EvalResult<T = Value> = Result<T, EvalError>;

// --- Special Forms ---

/// Forms whose operands reach the handler unevaluated. Matched by name before
/// any environment lookup, so they cannot be shadowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    Quote,
    Lambda,
    Cond,
    Set,
    Setq,
}

impl SpecialForm {
    pub const ALL: [SpecialForm; 5] = [
        SpecialForm::Quote,
        SpecialForm::Lambda,
        SpecialForm::Cond,
        SpecialForm::Set,
        SpecialForm::Setq,
    ];

    pub fn from_name(name: &str) -> Option<Self> {
        SpecialForm::ALL.into_iter().find(|form| form.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            SpecialForm::Quote => "quote",
            SpecialForm::Lambda => "lambda",
            SpecialForm::Cond => "cond",
            SpecialForm::Set => "set",
            SpecialForm::Setq => "setq",
        }
    }
}

fn expect_operands(form: SpecialForm, operands: &[Expr], expected: usize) -> EvalResult<()> {
    if operands.len() != expected {
        return Err(EvalError::ArityError {
            name: form.name().to_string(),
            expected: format!("exactly {}", expected),
            found: operands.len(),
        });
    }
    Ok(())
}

fn expect_symbol<'a>(form: SpecialForm, expr: &'a Expr) -> EvalResult<&'a str> {
    expr.as_symbol().ok_or_else(|| EvalError::TypeError {
        operation: form.name().to_string(),
        expected: "symbol",
        found: Value::from(expr),
    })
}

// --- Interpreter ---

/// Owns the builtin table and runs the eval/apply cycle.
pub struct Interpreter {
    builtins: EnvRef,
    options: EvalOptions,
}

impl Default for Interpreter {
    fn default() -> Self {
        Interpreter::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Interpreter::with_options(EvalOptions::default())
    }

    pub fn with_options(options: EvalOptions) -> Self {
        Interpreter {
            builtins: Environment::new_builtins(),
            options,
        }
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    /// The sealed root frame shared by every global environment of this interpreter.
    pub fn builtins(&self) -> &EnvRef {
        &self.builtins
    }

    /// A fresh top-level frame enclosing the builtins. Top-level definitions land here.
    pub fn global_environment(&self) -> EnvRef {
        Environment::new_enclosed(self.builtins.clone())
    }

    /// Evaluates `expr` within `env`.
    pub fn evaluate(&self, expr: &Expr, env: &EnvRef) -> EvalResult {
        self.eval_at(expr, env, 0)
    }

    /// Applies a callee to already evaluated arguments. A symbol callee is
    /// resolved through `env` first.
    pub fn apply(&self, callee: Value, args: Vec<Value>, env: &EnvRef) -> EvalResult {
        self.apply_at(callee, args, env, 0)
    }

    fn eval_at(&self, expr: &Expr, env: &EnvRef, depth: usize) -> EvalResult {
        if depth > self.options.max_depth {
            return Err(EvalError::DepthExceeded(self.options.max_depth));
        }
        // Recursion is host recursion; grow the stack rather than overflow it.
        ensure_sufficient_stack(|| self.eval_expr(expr, env, depth))
    }

    fn eval_expr(&self, expr: &Expr, env: &EnvRef, depth: usize) -> EvalResult {
        match expr {
            // Unbound symbols are their own value
            Expr::Atom(Atom::Symbol(name)) => {
                Ok(env.borrow().get_or(name, Value::Symbol(name.clone())))
            }
            Expr::Atom(atom) => Ok(Value::from(atom)),
            Expr::List(elements) => {
                let Some((head, operands)) = elements.split_first() else {
                    return Ok(Value::List(Vec::new()));
                };

                if let Some(form) = head.as_symbol().and_then(SpecialForm::from_name) {
                    return self.eval_special_form(form, operands, env, depth);
                }

                let callee = match head {
                    Expr::Atom(Atom::Symbol(name)) => Value::Symbol(name.clone()),
                    Expr::Atom(atom) => return Err(EvalError::NotCallable(Value::from(atom))),
                    Expr::List(_) => self.eval_at(head, env, depth + 1)?,
                };

                let mut args = Vec::with_capacity(operands.len());
                for operand in operands {
                    args.push(self.eval_at(operand, env, depth + 1)?);
                }

                self.apply_at(callee, args, env, depth)
            }
        }
    }

    #[tracing::instrument(level = "trace", skip_all, fields(callee = %callee, argc = args.len()))]
    fn apply_at(&self, callee: Value, args: Vec<Value>, env: &EnvRef, depth: usize) -> EvalResult {
        let (name, resolved) = match callee {
            Value::Symbol(name) => {
                let resolved = env.borrow().lookup(&name)?;
                (name, resolved)
            }
            other => (other.to_string(), other),
        };

        match resolved {
            Value::Primitive(primitive) => (primitive.func)(args),
            Value::Closure(lambda) => self.call_lambda(&name, &lambda, args, depth),
            other => Err(EvalError::NotCallable(other)),
        }
    }

    fn call_lambda(
        &self,
        name: &str,
        lambda: &Lambda,
        args: Vec<Value>,
        depth: usize,
    ) -> EvalResult {
        if lambda.params.len() != args.len() {
            return Err(EvalError::ArityMismatch {
                name: name.to_string(),
                expected: lambda.params.len(),
                found: args.len(),
            });
        }

        // The frame encloses the definition-time scope, not the caller's.
        let frame = Environment::new_enclosed(lambda.env.clone());
        {
            let mut frame_mut = frame.borrow_mut();
            for (param, arg) in lambda.params.iter().zip(args) {
                frame_mut.bind(param.clone(), arg);
            }
        }
        self.eval_at(&lambda.body, &frame, depth + 1)
    }

    fn eval_special_form(
        &self,
        form: SpecialForm,
        operands: &[Expr],
        env: &EnvRef,
        depth: usize,
    ) -> EvalResult {
        trace!(form = form.name(), operands = operands.len(), "special form");
        match form {
            SpecialForm::Quote => evaluate_quote(operands),
            SpecialForm::Lambda => evaluate_lambda(operands, env),
            SpecialForm::Cond => self.evaluate_cond(operands, env, depth),
            SpecialForm::Set => evaluate_set(operands, env),
            SpecialForm::Setq => self.evaluate_setq(operands, env, depth),
        }
    }

    fn evaluate_cond(&self, clauses: &[Expr], env: &EnvRef, depth: usize) -> EvalResult {
        for clause in clauses {
            match clause {
                Expr::List(pair) if pair.len() == 2 => {
                    if self.eval_at(&pair[0], env, depth + 1)?.is_truthy() {
                        return self.eval_at(&pair[1], env, depth + 1);
                    }
                }
                other => {
                    return Err(EvalError::TypeError {
                        operation: SpecialForm::Cond.name().to_string(),
                        expected: "(condition result) clause",
                        found: Value::from(other),
                    });
                }
            }
        }
        Ok(Value::Boolean(false))
    }

    fn evaluate_setq(&self, operands: &[Expr], env: &EnvRef, depth: usize) -> EvalResult {
        expect_operands(SpecialForm::Setq, operands, 2)?;
        let name = expect_symbol(SpecialForm::Setq, &operands[0])?;

        let value = self.eval_at(&operands[1], env, depth + 1)?;
        debug!(symbol = name, value = %value, "setq");
        env.borrow_mut().bind(name, value.clone());

        match self.options.setq_returns {
            SetqReturn::Expression => Ok(Value::from(&operands[1])),
            SetqReturn::Value => Ok(value),
        }
    }
}

fn evaluate_quote(operands: &[Expr]) -> EvalResult {
    expect_operands(SpecialForm::Quote, operands, 1)?;
    Ok(Value::from(&operands[0]))
}

fn evaluate_lambda(operands: &[Expr], env: &EnvRef) -> EvalResult {
    expect_operands(SpecialForm::Lambda, operands, 2)?;

    let malformed = |expected: &'static str| EvalError::TypeError {
        operation: SpecialForm::Lambda.name().to_string(),
        expected,
        found: Value::from(&operands[0]),
    };
    let Expr::List(param_exprs) = &operands[0] else {
        return Err(malformed("parameter list"));
    };

    let mut params: Vec<String> = Vec::with_capacity(param_exprs.len());
    for param in param_exprs {
        let name = param.as_symbol().ok_or_else(|| malformed("parameter list of symbols"))?;
        if params.iter().any(|p| p == name) {
            return Err(malformed("parameter list without duplicates"));
        }
        params.push(name.to_string());
    }

    debug!(?params, "lambda");
    Ok(Value::Closure(Rc::new(Lambda {
        params,
        body: operands[1].clone(),
        env: env.clone(),
    })))
}

// Binds the value operand as data, without evaluating it.
fn evaluate_set(operands: &[Expr], env: &EnvRef) -> EvalResult {
    expect_operands(SpecialForm::Set, operands, 2)?;
    let name = expect_symbol(SpecialForm::Set, &operands[0])?;

    let value = Value::from(&operands[1]);
    debug!(symbol = name, value = %value, "set");
    env.borrow_mut().bind(name, value.clone());
    Ok(value)
}

thread_local! {
    // Built once per thread; `Interpreter` holds `Rc`s so it cannot be shared across threads.
    static DEFAULT_INTERPRETER: Interpreter = Interpreter::new();
}

/// Evaluates `expr` within `env` using a default interpreter.
pub fn evaluate(expr: &Expr, env: &EnvRef) -> EvalResult {
    DEFAULT_INTERPRETER.with(|interpreter| interpreter.evaluate(expr, env))
}
