use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};

use crate::error::Error;
use crate::interpreter::{Interpreter, Value};
use crate::{lexer, parser};

fn normalize_output(output: &str) -> String {
    output.replace("\r\n", "\n").trim_end().to_string()
}

fn run_source(source: &str, input: &str, output: &mut Vec<u8>) -> Result<Value, Error> {
    let tokens = lexer::tokenize(source)?;
    let program = parser::parse(tokens)?;
    let mut interpreter = Interpreter::with_io(output, Cursor::new(input.as_bytes().to_vec()));
    Ok(interpreter.run(&program)?)
}

/// Sweeps `tests/programs`: each `.rk` file runs against an optional `.in`
/// stdin fixture and is checked against either a `.out` output fixture or an
/// `.err` fixture naming a substring of the expected error.
#[test]
fn slow_runs_fixture_programs() -> Result<()> {
    let programs_dir = Path::new("tests/programs");
    let mut programs = Vec::new();

    for entry in
        fs::read_dir(programs_dir).with_context(|| format!("Reading {}", programs_dir.display()))?
    {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) == Some("rk") {
            programs.push(path);
        }
    }

    ensure!(
        !programs.is_empty(),
        "No .rk programs found in {}",
        programs_dir.display()
    );
    programs.sort();

    for path in programs {
        let source =
            fs::read_to_string(&path).with_context(|| format!("Reading {}", path.display()))?;
        let input_path = path.with_extension("in");
        let input = if input_path.exists() {
            fs::read_to_string(&input_path)
                .with_context(|| format!("Reading {}", input_path.display()))?
        } else {
            String::new()
        };

        let mut output = Vec::new();
        let result = run_source(&source, &input, &mut output);
        let output = String::from_utf8_lossy(&output).into_owned();

        let expected_error_path = path.with_extension("err");
        if expected_error_path.exists() {
            let expected_error = fs::read_to_string(&expected_error_path)
                .with_context(|| format!("Reading {}", expected_error_path.display()))?;
            let expected_error = expected_error.trim();

            let Err(err) = result else {
                bail!("Expected an error for {}", path.display());
            };
            let error = err.to_string();
            ensure!(
                error.contains(expected_error),
                "Expected error containing '{expected_error}' for {}, got '{error}'",
                path.display()
            );
            continue;
        }

        result.with_context(|| format!("Running {}", path.display()))?;
        let expected_path = path.with_extension("out");
        let expected = fs::read_to_string(&expected_path)
            .with_context(|| format!("Reading {}", expected_path.display()))?;
        assert_eq!(
            normalize_output(&output),
            normalize_output(&expected),
            "Output mismatch for {}",
            path.display()
        );
    }

    Ok(())
}
