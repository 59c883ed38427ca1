//! Temporary driver that runs the backend over a built-in sample program
//! until the front end lands.

use std::{io::Write, path::PathBuf};

use clap::Parser as ClapParser;
use colored::Colorize;

use brookc::{
    ast::{BinaryOperatorKind, FunctionRegistry, Node, UnaryOperatorKind},
    backend,
    builder::{
        ProgramBuilder, binary, block, bool_literal, break_statement, call, char_literal,
        continue_statement, elif_statement, else_statement, expression, function, get,
        if_statement, int_literal, let_binding, module, negate, parameter, return_statement, test,
        unary, while_loop,
    },
    ty::Type,
};

#[derive(Debug, ClapParser)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Write the generated C here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Compile the generated C with the system C compiler instead of
    /// printing it (honors `CC`, defaults to `cc`)
    #[arg(long)]
    compile: bool,
}

fn main() {
    let args = Args::parse();

    let modules = sample_program();
    let registry = FunctionRegistry::collect(&modules);

    if args.compile {
        let output = args.output.unwrap_or_else(|| PathBuf::from("a.out"));

        if let Err(error) = backend::compile_to_executable(&modules, &registry, &output) {
            eprintln!("{} {error}", "error:".bright_red().bold());
            std::process::exit(1);
        }

        return;
    }

    let mut source = Vec::new();
    backend::assemble_program(&mut source, &modules, &registry)
        .expect("Failed to assemble the generated program");

    match args.output {
        Some(path) => std::fs::write(path, &source).expect("Failed to write output file"),
        None => std::io::stdout()
            .write_all(&source)
            .expect("Failed to write to stdout"),
    }
}

/// Covers every construct the backend lowers: a deferred global
/// initializer, mutual recursion across function declarations, pointer
/// locals, branch chains, loop control, and a handful of passing tests.
fn sample_program() -> Vec<Node> {
    let mut symbols = ProgramBuilder::new();

    let double = symbols.declare("double");
    let limit = symbols.declare("limit");

    let double_x = symbols.declare("x");
    let double_fn = function(
        double,
        Type::I32,
        vec![parameter(double_x, Type::I32)],
        block(vec![return_statement(Some(binary(
            BinaryOperatorKind::Multiply,
            get(double_x),
            int_literal(2),
        )))]),
    );

    let is_even = symbols.declare("is_even");
    let is_odd = symbols.declare("is_odd");

    let even_n = symbols.declare("n");
    let is_even_fn = function(
        is_even,
        Type::Bool,
        vec![parameter(even_n, Type::I32)],
        block(vec![
            if_statement(
                binary(BinaryOperatorKind::Equals, get(even_n), int_literal(0)),
                block(vec![return_statement(Some(bool_literal(true)))]),
            ),
            return_statement(Some(call(
                is_odd,
                vec![binary(
                    BinaryOperatorKind::Subtract,
                    get(even_n),
                    int_literal(1),
                )],
            ))),
        ]),
    );

    let odd_n = symbols.declare("n");
    let is_odd_fn = function(
        is_odd,
        Type::Bool,
        vec![parameter(odd_n, Type::I32)],
        block(vec![
            if_statement(
                binary(BinaryOperatorKind::Equals, get(odd_n), int_literal(0)),
                block(vec![return_statement(Some(bool_literal(false)))]),
            ),
            return_statement(Some(call(
                is_even,
                vec![binary(
                    BinaryOperatorKind::Subtract,
                    get(odd_n),
                    int_literal(1),
                )],
            ))),
        ]),
    );

    let even_odd_test = symbols.declare("even_odd_disagree");
    let loop_n = symbols.declare("n");
    let even_odd = test(
        even_odd_test,
        "even_odd_disagree",
        block(vec![
            let_binding(loop_n, Type::I32, Some(int_literal(0))),
            while_loop(
                bool_literal(true),
                block(vec![
                    if_statement(
                        binary(
                            BinaryOperatorKind::GreaterThanOrEqualTo,
                            get(loop_n),
                            get(limit),
                        ),
                        block(vec![break_statement()]),
                    ),
                    expression(binary(
                        BinaryOperatorKind::Assign,
                        get(loop_n),
                        binary(BinaryOperatorKind::Add, get(loop_n), int_literal(1)),
                    )),
                    if_statement(
                        call(is_odd, vec![get(loop_n)]),
                        block(vec![continue_statement()]),
                    ),
                    if_statement(
                        unary(
                            UnaryOperatorKind::LogicalNot,
                            call(is_even, vec![get(loop_n)]),
                        ),
                        block(vec![return_statement(Some(bool_literal(false)))]),
                    ),
                ]),
            ),
            return_statement(Some(bool_literal(true))),
        ]),
    );

    let pointer_test = symbols.declare("pointer_roundtrip");
    let c = symbols.declare("c");
    let p = symbols.declare("p");
    let pp = symbols.declare("pp");
    let pointer_roundtrip = test(
        pointer_test,
        "pointer_roundtrip",
        block(vec![
            let_binding(c, Type::U8, Some(char_literal('A'))),
            let_binding(
                p,
                Type::U8.pointer_to(),
                Some(unary(UnaryOperatorKind::AddressOf, get(c))),
            ),
            let_binding(
                pp,
                Type::U8.pointer_to().pointer_to(),
                Some(unary(UnaryOperatorKind::AddressOf, get(p))),
            ),
            if_statement(
                unary(
                    UnaryOperatorKind::LogicalNot,
                    binary(
                        BinaryOperatorKind::Equals,
                        unary(UnaryOperatorKind::Deref, get(p)),
                        char_literal('A'),
                    ),
                ),
                block(vec![return_statement(Some(bool_literal(false)))]),
            ),
            return_statement(Some(binary(
                BinaryOperatorKind::Equals,
                unary(
                    UnaryOperatorKind::Deref,
                    unary(UnaryOperatorKind::Deref, get(pp)),
                ),
                char_literal('A'),
            ))),
        ]),
    );

    let branch_test = symbols.declare("branch_chain");
    let v = symbols.declare("v");
    let r = symbols.declare("r");
    let branch_chain = test(
        branch_test,
        "branch_chain",
        block(vec![
            let_binding(v, Type::I32, Some(int_literal(7))),
            let_binding(r, Type::I32, Some(int_literal(0))),
            if_statement(
                binary(BinaryOperatorKind::LessThan, get(v), int_literal(5)),
                block(vec![expression(binary(
                    BinaryOperatorKind::Assign,
                    get(r),
                    int_literal(1),
                ))]),
            ),
            elif_statement(
                binary(BinaryOperatorKind::LessThan, get(v), int_literal(10)),
                block(vec![expression(binary(
                    BinaryOperatorKind::Assign,
                    get(r),
                    int_literal(2),
                ))]),
            ),
            else_statement(block(vec![expression(binary(
                BinaryOperatorKind::Assign,
                get(r),
                int_literal(3),
            ))])),
            return_statement(Some(binary(
                BinaryOperatorKind::Equals,
                get(r),
                int_literal(2),
            ))),
        ]),
    );

    let negation_test = symbols.declare("negation_cancels");
    let negation_cancels = test(
        negation_test,
        "negation_cancels",
        block(vec![return_statement(Some(binary(
            BinaryOperatorKind::Equals,
            negate(negate(get(limit))),
            get(limit),
        )))]),
    );

    vec![module(vec![
        let_binding(limit, Type::I32, Some(call(double, vec![int_literal(5)]))),
        double_fn,
        is_even_fn,
        is_odd_fn,
        even_odd,
        pointer_roundtrip,
        branch_chain,
        negation_cancels,
    ])]
}
