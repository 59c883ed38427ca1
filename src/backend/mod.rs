//! The backend of the compiler turns the resolved, type checked AST into a
//! C translation unit.
//!
//! Emission happens in a fixed order so the generated text compiles in a
//! single pass: standard headers, uninitialized global declarations,
//! function prototypes, function definitions, test functions, and finally
//! an entry point that runs the deferred global initializers and the test
//! driver. [`assemble_program`] produces the whole unit;
//! [`compile_to_executable`] additionally hands it to the system C
//! compiler, the way the old backends handed their output to the
//! assembler.

use std::{
    io::{self, Write},
    path::Path,
    process::Command,
};

use once_cell::sync::Lazy;

use self::transpile::Transpiler;
use crate::ast::{FunctionRegistry, Node};

pub mod transpile;

/// The system C compiler used to turn generated translation units into
/// executables. Overridable through the `CC` environment variable.
static SYSTEM_C_COMPILER: Lazy<String> =
    Lazy::new(|| std::env::var("CC").unwrap_or_else(|_| String::from("cc")));

/// Emits the complete generated program into `out`: every section of the
/// translation unit in its required order, followed by the entry point.
///
/// The modules and the registry are read-only context; the output stream's
/// acquisition and release belong to the caller.
pub fn assemble_program<W: Write>(
    out: W,
    modules: &[Node],
    registry: &FunctionRegistry,
) -> io::Result<()> {
    let mut transpiler = Transpiler::new(out, modules, registry);

    transpiler.emit_preamble()?;
    transpiler.declare_globals()?;
    transpiler.prototype_functions()?;
    transpiler.define_functions()?;
    transpiler.define_tests()?;
    transpiler.emit_entry_point()
}

/// Builds the command that compiles one generated C file into an
/// executable.
pub fn compiler_command(input_file: &Path, output_file: &Path) -> Command {
    let mut cmd = Command::new(&**SYSTEM_C_COMPILER);

    cmd.args([
        "-o",
        output_file
            .to_str()
            .expect("Could not convert output_file to string"),
        input_file
            .to_str()
            .expect("Could not convert input_file to string"),
    ]);

    cmd
}

/// Assembles the program into a temporary file and invokes the system C
/// compiler on it to produce `output_file`.
pub fn compile_to_executable(
    modules: &[Node],
    registry: &FunctionRegistry,
    output_file: &Path,
) -> io::Result<()> {
    let mut source = Vec::new();
    assemble_program(&mut source, modules, registry)?;

    let temp_file = mktemp::Temp::new_file()?;
    std::fs::write(&temp_file, &source)?;

    let status = compiler_command(temp_file.as_ref(), output_file).status()?;
    if !status.success() {
        return Err(io::Error::other(format!(
            "C compiler exited with {status}"
        )));
    }

    Ok(())
}
