mod common;

use common::*;
use ptx_ast::{print_node, Printer};

#[test]
fn test_print_leaf_on_one_line() {
    let mut ast = ptx_ast();
    let d = linking(&mut ast, ".extern");
    assert_eq!(print_node(ast.get(d).unwrap()), r#"(LinkingDirective :directive ".extern")"#);
}

#[test]
fn test_print_absent_child_as_nil() {
    let mut ast = ptx_ast();
    let l = label(&mut ast, "L_end", None);
    assert_eq!(print_node(ast.get(l).unwrap()), r#"(Label :name "L_end" :stmt nil)"#);
}

#[test]
fn test_print_nested_child() {
    let mut ast = ptx_ast();
    let d = linking(&mut ast, ".extern");
    let l = label(&mut ast, "L1", Some(d));

    let expected = r#"(Label
  :name "L1"
  :stmt (LinkingDirective :directive ".extern"))"#;
    assert_eq!(print_node(ast.get(l).unwrap()), expected);
}

#[test]
fn test_print_sequences() {
    let mut ast = ptx_ast();
    let l = label(&mut ast, "L0", None);
    let k = entry(&mut ast, "k", vec![], vec![l]);

    let expected = r#"(Entry
  :linking ".visible"
  :kernel_name "k"
  :param_list ()
  :performance_tuning nil
  :kernel_body (
    (Label :name "L0" :stmt nil)))"#;
    assert_eq!(print_node(ast.get(k).unwrap()), expected);
}

#[test]
fn test_print_integer_attribute() {
    let mut ast = ptx_ast();
    let p = EntryParamBuilder::new("n").align(4).build(&mut ast);
    let printed = print_node(ast.get(p).unwrap());
    assert!(printed.starts_with(r#"(EntryParam :space ".param" :align 4 :param_type ".u64""#));
}

#[test]
fn test_print_escapes_strings() {
    let mut ast = ptx_ast();
    let d = linking(&mut ast, "a\"b\\c");
    assert_eq!(print_node(ast.get(d).unwrap()), r#"(LinkingDirective :directive "a\"b\\c")"#);
}

#[test]
fn test_custom_indent() {
    let mut ast = ptx_ast();
    let d = linking(&mut ast, ".weak");
    let l = label(&mut ast, "L", Some(d));

    let printed = Printer::with_indent(4).print(ast.get(l).unwrap());
    assert!(printed.contains("\n    :name \"L\""));
}

#[test]
fn test_print_deep_chain() {
    let mut ast = ptx_ast();
    let root = label_chain(&mut ast, 100_000);

    let text = Printer::with_indent(0).print(ast.get(root).unwrap());

    assert!(text.starts_with("(Label\n:name \"L99999\"\n:stmt (Label\n"));
    assert!(text.ends_with("(LinkingDirective :directive \".extern\")))"));
    assert_eq!(text.matches("(Label").count(), 100_000);
}
