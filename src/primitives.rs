use crate::evaluator::{EvalError, EvalResult};
use crate::types::Value;

// Checks the number of arguments
macro_rules! check_arity {
    ($args:expr, $expected:expr, $name:expr) => {
        if $args.len() != $expected {
            return Err(EvalError::ArityError {
                name: $name.to_string(),
                expected: format!("exactly {}", $expected),
                found: $args.len(),
            });
        }
    };
    // Variant for minimum number of args
    ($args:expr, min $expected:expr, $name:expr) => {
        if $args.len() < $expected {
            return Err(EvalError::ArityError {
                name: $name.to_string(),
                expected: format!("at least {}", $expected),
                found: $args.len(),
            });
        }
    };
}

// Extracts a number from a Value or returns a TypeError
fn expect_number(value: &Value, operator: &str) -> EvalResult<f64> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(EvalError::TypeError {
            operation: operator.to_string(),
            expected: "number",
            found: other.clone(),
        }),
    }
}

// `car` and `cdr` both need a list with at least one element
fn expect_non_empty_list<'a>(value: &'a Value, operator: &str) -> EvalResult<&'a [Value]> {
    match value {
        Value::List(items) if !items.is_empty() => Ok(items),
        other => Err(EvalError::TypeError {
            operation: operator.to_string(),
            expected: "non-empty list",
            found: other.clone(),
        }),
    }
}

pub fn prim_fold_numbers<F: Fn(f64, f64) -> f64>(
    args: &[Value],
    start: f64,
    func: F,
    operator: &str,
) -> EvalResult {
    let mut acc = start;
    for value in args {
        acc = func(acc, expect_number(value, operator)?);
    }
    Ok(Value::Number(acc))
}

pub fn prim_add(args: Vec<Value>) -> EvalResult {
    // (+) -> 0
    // (+ 1 2 3) -> 6
    prim_fold_numbers(&args, 0.0, |acc, val| acc + val, "+")
}

pub fn prim_sub(args: Vec<Value>) -> EvalResult {
    // (- x) -> x
    // (- x y z) -> x - y - z
    check_arity!(args, min 1, "-");
    let first = expect_number(&args[0], "-")?;
    prim_fold_numbers(&args[1..], first, |acc, val| acc - val, "-")
}

pub fn prim_mul(args: Vec<Value>) -> EvalResult {
    // (*) -> 1
    // (* 1 2 3) -> 6
    prim_fold_numbers(&args, 1.0, |acc, val| acc * val, "*")
}

pub fn prim_div(args: Vec<Value>) -> EvalResult {
    // (/ x) -> x
    // (/ x y z) -> x / y / z
    check_arity!(args, min 1, "/");
    let mut result = expect_number(&args[0], "/")?;
    for value in &args[1..] {
        let divisor = expect_number(value, "/")?;
        if divisor == 0.0 {
            return Err(EvalError::DivisionByZero);
        }
        result /= divisor;
    }
    Ok(Value::Number(result))
}

pub fn prim_equal(args: Vec<Value>) -> EvalResult {
    // (equal? a b) -> structural equality; anything past the second operand is ignored
    check_arity!(args, min 2, "equal?");
    Ok(Value::Boolean(args[0] == args[1]))
}

// --- List Primitives ---

pub fn prim_car(args: Vec<Value>) -> EvalResult {
    // (car list) -> first item
    check_arity!(args, 1, "car");
    let items = expect_non_empty_list(&args[0], "car")?;
    Ok(items[0].clone())
}

pub fn prim_cdr(args: Vec<Value>) -> EvalResult {
    // (cdr list) -> rest of list, () for a single element
    check_arity!(args, 1, "cdr");
    let items = expect_non_empty_list(&args[0], "cdr")?;
    Ok(Value::List(items[1..].to_vec()))
}
