use crate::environment::EnvRef;
use crate::evaluator::EvalResult;
use std::fmt;
use std::rc::Rc;

/// A primitive value inside an expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Number(f64),    // Using f64 for every number, like the primitives do
    Boolean(bool),  // Literal true/false, independent of the `#t`/`#nil` bindings
    Symbol(String), // Looked up when evaluated, self-evaluating when unbound
}

/// Program text. Trees are built by the caller; there is no reader.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Atom(Atom),
    List(Vec<Expr>), // e.g. (+ 1 2), (setq x 10)
}

impl Expr {
    pub fn symbol(name: impl Into<String>) -> Self {
        Expr::Atom(Atom::Symbol(name.into()))
    }

    pub fn number(n: f64) -> Self {
        Expr::Atom(Atom::Number(n))
    }

    /// Returns the symbol name if this expression is a symbol atom.
    pub fn as_symbol(&self) -> Option<&str> {
        match self {
            Expr::Atom(Atom::Symbol(name)) => Some(name),
            _ => None,
        }
    }
}

impl From<Atom> for Expr {
    fn from(atom: Atom) -> Self {
        Expr::Atom(atom)
    }
}

impl From<f64> for Expr {
    fn from(n: f64) -> Self {
        Expr::number(n)
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        Expr::number(f64::from(n))
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::Atom(Atom::Boolean(b))
    }
}

impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Expr::symbol(name)
    }
}

impl From<String> for Expr {
    fn from(name: String) -> Self {
        Expr::symbol(name)
    }
}

impl From<Vec<Expr>> for Expr {
    fn from(items: Vec<Expr>) -> Self {
        Expr::List(items)
    }
}

/// Builds an `Expr::List`, converting each item with `Expr::from`.
///
/// ```
/// use nanolisp::list;
/// let call = list!["factorial", list!["-", "x", 1]];
/// assert_eq!(call.to_string(), "(factorial (- x 1))");
/// ```
#[macro_export]
macro_rules! list {
    ($($item:expr),* $(,)?) => {
        $crate::types::Expr::List(vec![$($crate::types::Expr::from($item)),*])
    };
}

fn write_number(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    write!(f, "{}", n)
}

fn write_boolean(f: &mut fmt::Formatter<'_>, b: bool) -> fmt::Result {
    write!(f, "{}", if b { "#t" } else { "#nil" })
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    write!(f, "(")?;
    let mut first = true;
    for item in items {
        if !first {
            write!(f, " ")?;
        }
        write!(f, "{}", item)?;
        first = false;
    }
    write!(f, ")")
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Atom::Number(n) => write_number(f, *n),
            Atom::Boolean(b) => write_boolean(f, *b),
            Atom::Symbol(s) => write!(f, "{}", s),
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Atom(atom) => write!(f, "{}", atom),
            Expr::List(items) => write_list(f, items),
        }
    }
}

/// The result of evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Symbol(String),
    List(Vec<Value>), // Quoted data, never code
    Closure(Rc<Lambda>),
    Primitive(Primitive),
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
            Value::Closure(_) => "lambda",
            Value::Primitive(_) => "primitive",
        }
    }

    /// `#nil`, `0` and the empty list are false; everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Boolean(b) => *b,
            Value::Number(n) => *n != 0.0,
            Value::List(items) => !items.is_empty(),
            Value::Symbol(_) | Value::Closure(_) | Value::Primitive(_) => true,
        }
    }
}

// Expressions become data when quoted or bound by `set`.
impl From<&Expr> for Value {
    fn from(expr: &Expr) -> Self {
        match expr {
            Expr::Atom(atom) => Value::from(atom),
            Expr::List(items) => Value::List(items.iter().map(Value::from).collect()),
        }
    }
}

impl From<&Atom> for Value {
    fn from(atom: &Atom) -> Self {
        match atom {
            Atom::Number(n) => Value::Number(*n),
            Atom::Boolean(b) => Value::Boolean(*b),
            Atom::Symbol(s) => Value::Symbol(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => write_number(f, *n),
            Value::Boolean(b) => write_boolean(f, *b),
            Value::Symbol(s) => write!(f, "{}", s),
            Value::List(items) => write_list(f, items),
            Value::Closure(lambda) => {
                write!(f, "#<lambda ")?;
                write_list(f, &lambda.params)?;
                write!(f, ">")
            }
            Value::Primitive(primitive) => write!(f, "#<primitive:{}>", primitive.name),
        }
    }
}

/// A user-defined function created by `lambda`.
pub struct Lambda {
    pub params: Vec<String>,
    pub body: Expr,
    pub env: EnvRef, // Definition-time scope; call frames enclose this
}

// The captured environment usually holds the closure itself, so it is left out.
impl fmt::Debug for Lambda {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lambda")
            .field("params", &self.params)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

// Closures are equal only to themselves.
impl PartialEq for Lambda {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other)
    }
}

pub type PrimitiveFunc = fn(Vec<Value>) -> EvalResult;

/// A built-in strict operation: the function pointer and its name.
#[derive(Clone)]
pub struct Primitive {
    pub name: &'static str,
    pub func: PrimitiveFunc,
}

impl fmt::Debug for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Primitive({})", self.name)
    }
}

// Function pointers don't compare reliably, the name does.
impl PartialEq for Primitive {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_display_expr() {
        let expr = list![
            "setq",
            "factorial",
            list!["lambda", list!["x"], list!["*", "x", 2.5]]
        ];
        assert_eq!(expr.to_string(), "(setq factorial (lambda (x) (* x 2.5)))");
        assert_eq!(Expr::from(true).to_string(), "#t");
        assert_eq!(Expr::from(false).to_string(), "#nil");
        assert_eq!(list![].to_string(), "()");
    }

    #[test]
    fn test_quoted_data_conversion() {
        let expr = list![1, "a", list![true]];
        assert_eq!(
            Value::from(&expr),
            Value::List(vec![
                Value::Number(1.0),
                Value::Symbol("a".to_string()),
                Value::List(vec![Value::Boolean(true)]),
            ])
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(Value::Boolean(true).is_truthy());
        assert!(!Value::Boolean(false).is_truthy());
        assert!(!Value::Number(0.0).is_truthy());
        assert!(Value::Number(-1.0).is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::List(vec![Value::Number(0.0)]).is_truthy());
        assert!(Value::Symbol("anything".to_string()).is_truthy());
    }

    #[test]
    fn test_display_values() {
        assert_eq!(Value::Number(120.0).to_string(), "120");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(
            Value::List(vec![Value::Number(2.0), Value::Number(3.0)]).to_string(),
            "(2 3)"
        );
        assert_eq!(Value::Boolean(false).to_string(), "#nil");
    }
}
