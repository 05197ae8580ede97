//! `ardenc`: scan Arden sources and report diagnostics.
//!
//! The parser and code generator live elsewhere; this driver exposes the
//! front-end's lexer over real files, which is what editor tooling and
//! the test suite shell out to.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;

use arden::{Arena, Diagnostics, Lexer, Payload, TokenKind};

#[derive(Parser)]
#[command(name = "ardenc", version, about = "Arden front-end driver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token stream for a source file.
    Tokens {
        file: PathBuf,
        /// Emit tokens as JSON records.
        #[arg(long)]
        json: bool,
    },
    /// Scan a source file and report lexical diagnostics.
    Check {
        file: PathBuf,
        /// Emit diagnostics as JSON records.
        #[arg(long)]
        json: bool,
    },
}

/// Flat record for `tokens --json`.
#[derive(Serialize)]
struct TokenRecord<'a> {
    kind: TokenKind,
    lexeme: &'a str,
    line: u32,
    payload: Payload<'a>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match cli.command {
        Command::Tokens { file, json } => run_tokens(file, json),
        Command::Check { file, json } => run_check(file, json),
    }
}

fn read_source(file: &PathBuf) -> Result<String, ExitCode> {
    fs::read_to_string(file).map_err(|err| {
        eprintln!("ardenc: cannot read {}: {err}", file.display());
        ExitCode::FAILURE
    })
}

fn run_tokens(file: PathBuf, json: bool) -> ExitCode {
    let source = match read_source(&file) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let arena = Arena::new();
    let filename = file.display().to_string();
    let mut lexer = Lexer::new(&arena, &source, &filename);

    loop {
        let token = lexer.scan_token();
        if json {
            let record = TokenRecord {
                kind: token.kind,
                lexeme: token.lexeme,
                line: token.line,
                payload: token.payload,
            };
            match serde_json::to_string(&record) {
                Ok(line) => println!("{line}"),
                Err(err) => {
                    eprintln!("ardenc: serialization failed: {err}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            println!("{:4}  {:?}  {}", token.line, token.kind, token.lexeme);
        }
        if token.kind == TokenKind::Eof {
            return ExitCode::SUCCESS;
        }
    }
}

fn run_check(file: PathBuf, json: bool) -> ExitCode {
    let source = match read_source(&file) {
        Ok(source) => source,
        Err(code) => return code,
    };
    let arena = Arena::new();
    let filename = file.display().to_string();
    let mut lexer = Lexer::new(&arena, &source, &filename);
    let mut diags = Diagnostics::new();

    loop {
        let token = lexer.scan_token();
        match token.kind {
            TokenKind::Error => diags.lex_error(&filename, token.line, token.lexeme),
            TokenKind::Eof => break,
            _ => {}
        }
    }

    if json {
        for diag in diags.iter() {
            match serde_json::to_string(diag) {
                Ok(line) => println!("{line}"),
                Err(err) => {
                    eprintln!("ardenc: serialization failed: {err}");
                    return ExitCode::FAILURE;
                }
            }
        }
    } else {
        for diag in diags.iter() {
            eprintln!("{}", diag.render_colored());
        }
    }

    if diags.has_errors() {
        ExitCode::FAILURE
    } else {
        println!("{}: ok", filename);
        ExitCode::SUCCESS
    }
}
