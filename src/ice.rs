use std::fmt;

use colored::Colorize;

/// Reports an internal compiler defect and aborts the compilation in
/// progress.
///
/// Reaching this means an earlier pass handed the backend a tree it
/// promised could not exist, or a language feature grew a front end without
/// a matching lowering rule. There is no recovery and no partial output;
/// anything already written to the output stream is invalid in its
/// entirety. The panic unwinds the whole codegen run, which lets tests
/// observe the condition without taking the test runner down with it.
pub fn bug(message: impl fmt::Display) -> ! {
    eprintln!(
        "{} {message}",
        "internal compiler error:".bright_red().bold()
    );

    #[cfg(feature = "error-backtrace")]
    eprintln!("{}", std::backtrace::Backtrace::force_capture());

    panic!("internal compiler error: {message}");
}
