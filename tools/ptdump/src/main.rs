//! Dump the token stream of protobuf-style text files.
//!
//! Reads each argument file (or stdin when none are given), prints one line
//! per token with its position and kind, then reports any collected errors.
//! Exits nonzero if any input had errors.

use std::io::Read;
use std::process::ExitCode;

use prototext_lexer::{ErrorLog, SliceInput, Tokenizer};

fn main() -> ExitCode {
    let paths: Vec<String> = std::env::args().skip(1).collect();

    let mut clean = true;
    if paths.is_empty() {
        let mut data = Vec::new();
        if let Err(err) = std::io::stdin().read_to_end(&mut data) {
            eprintln!("ptdump: <stdin>: {err}");
            return ExitCode::FAILURE;
        }
        clean = dump("<stdin>", &data);
    } else {
        for path in &paths {
            match std::fs::read(path) {
                Ok(data) => clean &= dump(path, &data),
                Err(err) => {
                    eprintln!("ptdump: {path}: {err}");
                    clean = false;
                }
            }
        }
    }

    if clean {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Tokenize one input and print its tokens and errors. Returns true when
/// the input tokenized without errors.
fn dump(name: &str, data: &[u8]) -> bool {
    let mut log = ErrorLog::new();
    {
        let mut tokenizer = Tokenizer::new(SliceInput::new(data), &mut log);
        while tokenizer.next() {
            let token = tokenizer.current();
            println!(
                "{name}:{}:{}-{}: {:?} {}",
                token.line + 1,
                token.column + 1,
                token.end_column + 1,
                token.kind,
                String::from_utf8_lossy(&token.text),
            );
        }
    }

    for report in &log.errors {
        eprintln!(
            "{name}:{}:{}: error: {}",
            report.line + 1,
            report.column + 1,
            report.message,
        );
    }
    for report in &log.warnings {
        eprintln!(
            "{name}:{}:{}: warning: {}",
            report.line + 1,
            report.column + 1,
            report.message,
        );
    }
    log.is_clean()
}
