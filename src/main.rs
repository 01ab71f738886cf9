use exprtrace::{diagnostics, evaluate, validate_syntax, Bindings};
use std::env;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        usage();
        process::exit(1);
    }

    let command = &args[1];
    let expression = &args[2];

    match command.as_str() {
        "check" => match validate_syntax(expression) {
            Ok(variables) => {
                if variables.is_empty() {
                    println!("Expression is valid and references no variables.");
                } else {
                    println!("Expression is valid. Variables: {}", variables.join(", "));
                }
            }
            Err(errors) => {
                diagnostics::emit_syntax_errors(expression, &errors.errors);
                process::exit(1);
            }
        },
        "eval" => {
            let bindings = match parse_bindings(&args[3..]) {
                Ok(bindings) => bindings,
                Err(message) => {
                    eprintln!("{message}");
                    process::exit(1);
                }
            };
            match evaluate(expression, &bindings) {
                Ok(trace) => {
                    for (idx, step) in trace.steps.iter().enumerate() {
                        println!("{:>3}. [{}] {}", idx + 1, step.operation, step.description);
                    }
                    println!("Result: {}", trace.result);
                }
                Err(errors) => {
                    diagnostics::emit_syntax_errors(expression, &errors.errors);
                    process::exit(1);
                }
            }
        }
        _ => {
            usage();
            process::exit(1);
        }
    }
}

// Bindings are passed as name=value pairs; `name=null` binds an explicit null.
fn parse_bindings(pairs: &[String]) -> Result<Bindings, String> {
    let mut bindings = Bindings::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(format!(
                "Invalid binding '{pair}': expected name=value or name=null"
            ));
        };
        if name.is_empty() {
            return Err(format!("Invalid binding '{pair}': empty variable name"));
        }
        if value == "null" {
            bindings.insert_null(name);
        } else {
            bindings.insert(name, value);
        }
    }
    Ok(bindings)
}

fn usage() {
    eprintln!("Usage: exprtrace check \"<expression>\"");
    eprintln!("       exprtrace eval \"<expression>\" [name=value | name=null ...]");
}
