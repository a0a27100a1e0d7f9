use nanolisp::{EvalOptions, Interpreter, Value, list};
use std::process::ExitCode;

/// Enable with `RUST_LOG=nanolisp=debug` or `RUST_LOG=nanolisp=trace`.
fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    // Only initialize if RUST_LOG is set
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_level(true))
            .with(EnvFilter::from_default_env())
            .init();
    }
}

fn options_from_env() -> EvalOptions {
    let options = EvalOptions::default();
    match std::env::var("NANOLISP_MAX_DEPTH") {
        Ok(raw) => match raw.parse() {
            Ok(max_depth) => options.with_max_depth(max_depth),
            Err(_) => {
                tracing::warn!(value = %raw, "ignoring invalid NANOLISP_MAX_DEPTH");
                options
            }
        },
        Err(_) => options,
    }
}

fn main() -> ExitCode {
    init_tracing();

    let interpreter = Interpreter::with_options(options_from_env());
    let env = interpreter.global_environment();

    let program = [
        list![
            "setq",
            "factorial",
            list![
                "lambda",
                list!["x"],
                list![
                    "cond",
                    list![list!["equal?", "x", 0], 1],
                    list![true, list!["*", "x", list!["factorial", list!["-", "x", 1]]]]
                ]
            ]
        ],
        list!["factorial", 5],
    ];

    let mut result = Value::Boolean(false);
    for expr in &program {
        match interpreter.evaluate(expr, &env) {
            Ok(value) => result = value,
            Err(e) => {
                e.pretty_print(expr);
                return ExitCode::FAILURE;
            }
        }
    }

    println!("{}", result);
    ExitCode::SUCCESS
}
