//! Lowering from the resolved, type checked AST to C source text.
//!
//! The backend carries no knowledge of C's operator precedence table.
//! Instead, every non-wrapper expression node is emitted inside its own
//! pair of parentheses, so the generated expression always groups exactly
//! the way the source tree does no matter how C would have parsed the bare
//! spelling. Redundant parentheses in the output are the entire cost.

use std::io::{self, Write};

use indoc::indoc;
use itertools::Itertools;

use crate::{
    ast::{BinaryOperatorKind, FunctionRegistry, LiteralKind, Node, NodeKind, UnaryOperatorKind},
    ice,
    ty::Type,
};

/// Maps a resolved Brook type to its C spelling.
///
/// Total over the type system and deterministic: `Ptr<Ptr<i32>>` comes back
/// as `int**`, one trailing `*` per pointer layer.
pub fn lower_type(ty: &Type) -> String {
    match ty {
        Type::U8 => "char".to_owned(),
        Type::I32 => "int".to_owned(),
        Type::Bool => "bool".to_owned(),
        Type::Void => "void".to_owned(),
        Type::Pointer(child) => format!("{}*", lower_type(child)),
    }
}

impl BinaryOperatorKind {
    /// The C spelling of this operator.
    pub fn token(self) -> &'static str {
        match self {
            Self::Assign => "=",
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqualTo => ">=",
            Self::LessThan => "<",
            Self::LessThanOrEqualTo => "<=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
        }
    }
}

impl UnaryOperatorKind {
    /// The C spelling of this prefix operator.
    pub fn token(self) -> &'static str {
        match self {
            Self::LogicalNot => "!",
            Self::AddressOf => "&",
            Self::Deref => "*",
        }
    }
}

fn report_arity(node: &Node, expected: &str) -> ! {
    ice::bug(format!(
        "malformed {:?} node: expected {expected}, found {} children",
        node.kind,
        node.children.len()
    ));
}

/// Streams the C translation of one program into a writer.
///
/// Borrows the module list and the function registry for the duration of a
/// single emission pass and never mutates either; ownership and lifetime of
/// the output stream stay with the caller.
pub struct Transpiler<'ctx, W> {
    out: W,
    modules: &'ctx [Node],
    registry: &'ctx FunctionRegistry<'ctx>,
}

impl<'ctx, W: Write> Transpiler<'ctx, W> {
    pub fn new(out: W, modules: &'ctx [Node], registry: &'ctx FunctionRegistry<'ctx>) -> Self {
        Self {
            out,
            modules,
            registry,
        }
    }

    pub fn into_writer(self) -> W {
        self.out
    }

    /// The fixed set of C standard facilities every generated program
    /// relies on.
    pub fn emit_preamble(&mut self) -> io::Result<()> {
        write!(
            self.out,
            indoc! {r#"
                #include <stdlib.h>
                #include <stdint.h>
                #include <stdbool.h>
                #include <stdio.h>
                #include <assert.h>
            "#}
        )?;

        write!(self.out, "\n\n\n")
    }

    /// Declares storage for every top level binding, without initializers.
    ///
    /// Initializers may reference other globals or call functions that have
    /// not been declared yet at this point in the output, so only the
    /// declarations go up front; [`Self::emit_global_initializers`] assigns
    /// the values once every function definition exists.
    pub fn declare_globals(&mut self) -> io::Result<()> {
        for module in self.modules {
            self.declare_module_globals(module)?;
        }

        Ok(())
    }

    fn declare_module_globals(&mut self, module: &Node) -> io::Result<()> {
        self.expect_declaration_list(module);

        for node in &module.children {
            if let NodeKind::Let { symbol, ty } = &node.kind {
                writeln!(self.out, "{} {};", lower_type(ty), symbol.mangled())?;
            }
        }

        write!(self.out, "\n\n\n")
    }

    /// Assigns every initialized top level binding its value, as bare
    /// assignment statements in module declaration order.
    ///
    /// These land in the generated program's entry point, after every
    /// function definition, because the initializer expressions are allowed
    /// to call them.
    pub fn emit_global_initializers(&mut self) -> io::Result<()> {
        for module in self.modules {
            self.emit_module_global_initializers(module)?;
        }

        Ok(())
    }

    fn emit_module_global_initializers(&mut self, module: &Node) -> io::Result<()> {
        self.expect_declaration_list(module);

        for node in &module.children {
            let NodeKind::Let { symbol, .. } = &node.kind else {
                continue;
            };

            match node.children.as_slice() {
                [] => {}
                [initializer] => {
                    write!(self.out, "{} = ", symbol.mangled())?;
                    self.lower_expr(initializer)?;
                    writeln!(self.out, ";")?;
                }
                _ => report_arity(node, "at most one initializer"),
            }
        }

        Ok(())
    }

    /// Signature-only declarations for every registered function, in
    /// registry order, so the definitions that follow can reference each
    /// other freely in a single C pass.
    pub fn prototype_functions(&mut self) -> io::Result<()> {
        for function in self.registry.functions() {
            self.lower_function_signature(function)?;
            writeln!(self.out, ";")?;
        }

        write!(self.out, "\n\n\n")
    }

    /// Full definitions for every registered function, in the same order as
    /// the prototypes.
    pub fn define_functions(&mut self) -> io::Result<()> {
        for function in self.registry.functions() {
            self.lower_function_signature(function)?;

            let Some(body) = function.first_child() else {
                report_arity(function, "a body block");
            };
            self.lower_block(body, 0)?;
            writeln!(self.out)?;
        }

        write!(self.out, "\n\n\n")
    }

    /// Lowers a function's return type, canonical name, and parameter list,
    /// with no trailing newline. Shared between prototypes and definitions
    /// so the two can never drift apart.
    fn lower_function_signature(&mut self, node: &Node) -> io::Result<()> {
        let NodeKind::Function { symbol, signature } = &node.kind else {
            ice::bug(format!("cannot lower {:?} as a function", node.kind));
        };

        let parameters = signature
            .parameters
            .iter()
            .map(|parameter| {
                format!(
                    "{} {}",
                    lower_type(&parameter.ty),
                    parameter.symbol.mangled()
                )
            })
            .join(", ");

        write!(
            self.out,
            "{} {}({parameters})",
            lower_type(&signature.return_type),
            symbol.mangled()
        )
    }

    /// One `bool test_<index>()` function per test declaration, across all
    /// modules in module order, each body lowered like any other block.
    pub fn define_tests(&mut self) -> io::Result<()> {
        for module in self.modules {
            self.expect_declaration_list(module);

            for node in &module.children {
                if let NodeKind::Test { symbol, .. } = &node.kind {
                    writeln!(self.out, "bool test_{}()", symbol.0)?;

                    let Some(body) = node.first_child() else {
                        report_arity(node, "a body block");
                    };
                    self.lower_block(body, 0)?;
                }
            }
        }

        Ok(())
    }

    /// The statement sequence that runs every test in order: a banner with
    /// the test's source level name, the call, an early `exit(EXIT_FAILURE)`
    /// on the first failure, and a closing tally once every test has passed.
    ///
    /// Only statements are emitted here; the caller places them inside the
    /// generated program's entry point.
    pub fn emit_test_driver(&mut self) -> io::Result<()> {
        write!(self.out, "\n\n")?;

        let mut test_count = 0usize;

        for module in self.modules {
            for node in &module.children {
                if let NodeKind::Test { symbol, name } = &node.kind {
                    test_count += 1;

                    write!(
                        self.out,
                        indoc! {r#"
                            printf("\nRunning test '{0}'\n");
                            if(!test_{1}())
                            {{
                            printf("Test failed\n");
                            exit(EXIT_FAILURE);
                            }}
                            printf("Test succeeded\n\n");
                        "#},
                        name, symbol.0
                    )?;
                }
            }
        }

        writeln!(
            self.out,
            r#"printf("\nAll {test_count} tests succeeded\n");"#
        )
    }

    /// The generated program's `main`: global initializers first, so every
    /// value exists before the first test runs, then the test driver.
    pub fn emit_entry_point(&mut self) -> io::Result<()> {
        writeln!(self.out, "int main()")?;
        writeln!(self.out, "{{")?;
        self.emit_global_initializers()?;
        self.emit_test_driver()?;
        writeln!(self.out, "return EXIT_SUCCESS;")?;
        writeln!(self.out, "}}")
    }

    /// Lowers one block of statements, brace delimited, in sibling order.
    ///
    /// `depth` tracks lexical nesting for future formatting bookkeeping; it
    /// has no effect on the emitted text.
    pub fn lower_block(&mut self, node: &Node, depth: usize) -> io::Result<()> {
        if !matches!(node.kind, NodeKind::Block) {
            ice::bug(format!("cannot lower {:?} as a block", node.kind));
        }

        writeln!(self.out, "{{")?;

        for statement in &node.children {
            self.lower_statement(statement, depth)?;
        }

        writeln!(self.out, "}}")
    }

    fn lower_statement(&mut self, node: &Node, depth: usize) -> io::Result<()> {
        match &node.kind {
            NodeKind::Block => self.lower_block(node, depth + 1),
            NodeKind::Expression => {
                // Discard the value explicitly so the C compiler never
                // warns about an unused result
                write!(self.out, "(void) ")?;
                self.lower_expr(node)?;
                writeln!(self.out, ";")
            }
            NodeKind::Let { symbol, ty } => {
                write!(self.out, "{} {}", lower_type(ty), symbol.mangled())?;

                match node.children.as_slice() {
                    [] => {}
                    [initializer] => {
                        write!(self.out, " = ")?;
                        self.lower_expr(initializer)?;
                    }
                    _ => report_arity(node, "at most one initializer"),
                }

                writeln!(self.out, ";")
            }
            NodeKind::If => self.lower_branch("if", node, depth),
            NodeKind::Elif => self.lower_branch("else if", node, depth),
            NodeKind::Else => {
                let [body] = node.children.as_slice() else {
                    report_arity(node, "exactly one body block");
                };

                writeln!(self.out, "else")?;
                self.lower_block(body, depth + 1)
            }
            NodeKind::While => self.lower_branch("while", node, depth),
            NodeKind::Break => {
                if !node.children.is_empty() {
                    report_arity(node, "no children");
                }
                writeln!(self.out, "break;")
            }
            NodeKind::Continue => {
                if !node.children.is_empty() {
                    report_arity(node, "no children");
                }
                writeln!(self.out, "continue;")
            }
            NodeKind::Return => match node.children.as_slice() {
                [] => writeln!(self.out, "return;"),
                [value] => {
                    write!(self.out, "return ")?;
                    self.lower_expr(value)?;
                    writeln!(self.out, ";")
                }
                _ => report_arity(node, "at most one value"),
            },
            // Emitted by the global/function pass, nothing to do here
            NodeKind::Function { .. } | NodeKind::Struct => Ok(()),
            NodeKind::Module
            | NodeKind::Name
            | NodeKind::Binary(_)
            | NodeKind::Unary(_)
            | NodeKind::Negate
            | NodeKind::Call { .. }
            | NodeKind::Get { .. }
            | NodeKind::Literal(_)
            | NodeKind::Test { .. } => {
                ice::bug(format!("cannot lower {:?} as a statement", node.kind))
            }
        }
    }

    /// The shared shape of `if`, `else if`, and `while`: a keyword, a
    /// parenthesized condition, and a braced body.
    fn lower_branch(&mut self, keyword: &str, node: &Node, depth: usize) -> io::Result<()> {
        let [condition, body] = node.children.as_slice() else {
            report_arity(node, "a condition and a body block");
        };

        write!(self.out, "{keyword}")?;
        self.lower_expr(condition)?;
        writeln!(self.out)?;
        self.lower_block(body, depth + 1)
    }

    /// Writes one expression subtree with no trailing newline.
    ///
    /// Every node below the grouping wrappers contributes exactly one pair
    /// of enclosing parentheses; the condition emitted after `if` or
    /// `while` is parenthesized by the same rule rather than by the caller.
    pub fn lower_expr(&mut self, node: &Node) -> io::Result<()> {
        // The parser's grouping wrappers carry no semantics of their own:
        // lower the wrapped tree and emit nothing else
        if let NodeKind::Expression | NodeKind::Name = &node.kind {
            return match node.children.as_slice() {
                [inner] => self.lower_expr(inner),
                _ => report_arity(node, "exactly one wrapped expression"),
            };
        }

        write!(self.out, "(")?;

        match &node.kind {
            NodeKind::Expression | NodeKind::Name => unreachable!("wrappers are handled above"),
            NodeKind::Negate => {
                let [operand] = node.children.as_slice() else {
                    report_arity(node, "exactly one operand");
                };

                write!(self.out, "-")?;
                self.lower_expr(operand)?;
            }
            NodeKind::Binary(operator) => {
                let [lhs, rhs] = node.children.as_slice() else {
                    report_arity(node, "exactly two operands");
                };

                self.lower_expr(lhs)?;
                write!(self.out, " {} ", operator.token())?;
                self.lower_expr(rhs)?;
            }
            NodeKind::Unary(operator) => {
                let [operand] = node.children.as_slice() else {
                    report_arity(node, "exactly one operand");
                };

                write!(self.out, "{}", operator.token())?;
                self.lower_expr(operand)?;
            }
            NodeKind::Get { symbol } => {
                write!(self.out, "{}", symbol.mangled())?;
            }
            NodeKind::Call { callee } => {
                write!(self.out, "{}(", callee.mangled())?;

                for (i, argument) in node.children.iter().enumerate() {
                    if i != 0 {
                        write!(self.out, ", ")?;
                    }
                    self.lower_expr(argument)?;
                }

                write!(self.out, ")")?;
            }
            NodeKind::Literal(literal) => match literal.kind {
                // A u8 literal is written as the numeric code of its single
                // source character, so no C escaping is ever needed
                LiteralKind::U8 => {
                    let Some(byte) = literal.text.bytes().next() else {
                        ice::bug("u8 literal with no character");
                    };
                    write!(self.out, "{byte}")?;
                }
                // Already validated by the type checker, emitted untouched
                LiteralKind::I32 | LiteralKind::Bool => {
                    write!(self.out, "{}", literal.text)?;
                }
            },
            NodeKind::Module
            | NodeKind::Block
            | NodeKind::Let { .. }
            | NodeKind::If
            | NodeKind::Elif
            | NodeKind::Else
            | NodeKind::While
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Return
            | NodeKind::Function { .. }
            | NodeKind::Struct
            | NodeKind::Test { .. } => {
                ice::bug(format!("cannot lower {:?} as an expression", node.kind))
            }
        }

        write!(self.out, ")")
    }

    fn expect_declaration_list(&self, node: &Node) {
        if !matches!(node.kind, NodeKind::Module | NodeKind::Block) {
            ice::bug(format!(
                "expected a module or block of declarations, found {:?}",
                node.kind
            ));
        }
    }
}
