// Declare modules publicly so they are part of the library interface
pub mod environment;
pub mod evaluator;
pub mod options;
pub mod pretty_print;
pub mod primitives;
pub mod stack;
pub mod types;

pub use environment::{EnvError, EnvRef, Environment};
pub use evaluator::{EvalError, EvalResult, Interpreter, SpecialForm, evaluate};
pub use options::{DEFAULT_MAX_DEPTH, EvalOptions, SetqReturn};
pub use types::{Atom, Expr, Lambda, Primitive, Value};
