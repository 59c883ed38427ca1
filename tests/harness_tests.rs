use brookc::{
    ast::{BinaryOperatorKind, FunctionRegistry, Node, SymbolId},
    backend::{self, transpile::Transpiler},
    builder::{binary, block, bool_literal, int_literal, module, return_statement, test},
};
use indoc::indoc;

/// Two test declarations split across two modules, with symbol indices that
/// differ from their declaration order.
fn fixture() -> Vec<Node> {
    let addition = test(
        SymbolId(5),
        "addition_works",
        block(vec![return_statement(Some(binary(
            BinaryOperatorKind::Equals,
            binary(BinaryOperatorKind::Add, int_literal(2), int_literal(2)),
            int_literal(4),
        )))]),
    );

    let truth = test(
        SymbolId(9),
        "truth_holds",
        block(vec![return_statement(Some(bool_literal(true)))]),
    );

    vec![module(vec![addition]), module(vec![truth])]
}

fn assemble(modules: &[Node]) -> String {
    let registry = FunctionRegistry::collect(modules);
    let mut out = Vec::new();
    backend::assemble_program(&mut out, modules, &registry).expect("assembly should not fail");
    String::from_utf8(out).expect("generated text should be utf-8")
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("expected {needle:?} in generated output"))
}

#[test]
fn test_functions_return_bool_and_use_the_canonical_name() {
    let output = assemble(&fixture());

    assert!(output.contains("bool test_5()"));
    assert!(output.contains("bool test_9()"));
    assert!(position(&output, "bool test_5()") < position(&output, "int main()"));
}

#[test]
fn banners_use_the_source_level_test_name() {
    let output = assemble(&fixture());

    assert!(output.contains(r#"printf("\nRunning test 'addition_works'\n");"#));
    assert!(output.contains(r#"printf("\nRunning test 'truth_holds'\n");"#));
    assert!(!output.contains("Running test 'symbol_"));
    assert!(!output.contains("Running test 'test_"));
}

#[test]
fn the_driver_runs_tests_in_module_order() {
    let output = assemble(&fixture());

    let first_banner = position(&output, "Running test 'addition_works'");
    let first_call = position(&output, "if(!test_5())");
    let second_banner = position(&output, "Running test 'truth_holds'");
    let second_call = position(&output, "if(!test_9())");
    let summary = position(&output, r#"printf("\nAll 2 tests succeeded\n");"#);

    assert!(first_banner < first_call);
    assert!(first_call < second_banner);
    assert!(second_banner < second_call);
    assert!(second_call < summary);
}

#[test]
fn every_failure_path_exits_the_process() {
    let output = assemble(&fixture());

    assert_eq!(output.matches("exit(EXIT_FAILURE);").count(), 2);
    assert_eq!(output.matches(r#"printf("Test failed\n");"#).count(), 2);
}

#[test]
fn the_driver_emits_statements_only() {
    let modules = fixture();
    let registry = FunctionRegistry::collect(&modules);
    let mut transpiler = Transpiler::new(Vec::new(), &modules, &registry);
    transpiler
        .emit_test_driver()
        .expect("driver emission should not fail");
    let driver =
        String::from_utf8(transpiler.into_writer()).expect("generated text should be utf-8");

    // No function definitions and no entry point, just the run sequence
    assert!(!driver.contains("bool test_"));
    assert!(!driver.contains("int main()"));
    assert_eq!(
        driver,
        indoc! {r#"


            printf("\nRunning test 'addition_works'\n");
            if(!test_5())
            {
            printf("Test failed\n");
            exit(EXIT_FAILURE);
            }
            printf("Test succeeded\n\n");
            printf("\nRunning test 'truth_holds'\n");
            if(!test_9())
            {
            printf("Test failed\n");
            exit(EXIT_FAILURE);
            }
            printf("Test succeeded\n\n");
            printf("\nAll 2 tests succeeded\n");
        "#}
    );
}

#[test]
fn test_bodies_lower_like_any_other_block() {
    let modules = fixture();
    let registry = FunctionRegistry::collect(&modules);
    let mut transpiler = Transpiler::new(Vec::new(), &modules, &registry);
    transpiler
        .define_tests()
        .expect("test emission should not fail");
    let tests = String::from_utf8(transpiler.into_writer()).expect("generated text should be utf-8");

    assert_eq!(
        tests,
        indoc! {r#"
            bool test_5()
            {
            return (((2) + (2)) == (4));
            }
            bool test_9()
            {
            return (true);
            }
        "#}
    );
}
