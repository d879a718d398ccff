//! Read ISLISP forms from stdin, and print:
//! - each form on stdout, as read
//! - its class on stderr
//!
//! A parse error is reported, and reading continues with the next form.
//! Input that ends inside a form is reported, and ends the read.
//!
//! ```ignore
//! <input.lsp read_forms
//! ```
//!
//! With the `tracing-subscriber` feature, the reader's trace goes to stderr too.

use std::io::Read;
use std::process::ExitCode;

use islisp::reader::{parse, ReadErr, Tokenizer};
use islisp::Storage;

fn main() -> ExitCode {
    #[cfg(feature = "tracing-subscriber")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_writer(std::io::stderr)
        .init();

    let mut bytes = Vec::new();
    if let Err(e) = std::io::stdin().lock().read_to_end(&mut bytes) {
        eprintln!("error: could not read input: {e}");
        return ExitCode::FAILURE;
    }

    let store = Storage::default();
    let mut tokens = Tokenizer::new(&bytes);
    let mut status = ExitCode::SUCCESS;
    loop {
        match parse(&store, &mut tokens) {
            Ok(Some(form)) => {
                println!("{}", store.display(form));
                eprintln!("{}", store.class_of(form));
            }
            Ok(None) => break,
            Err(ReadErr::Error(condition)) => {
                eprintln!("error: {}", store.display(store.put(condition)));
                status = ExitCode::FAILURE;
            }
            Err(e @ ReadErr::Incomplete(_)) => {
                eprintln!("error: {e}");
                status = ExitCode::FAILURE;
                break;
            }
        }
    }
    status
}
