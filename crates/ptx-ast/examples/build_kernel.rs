use std::sync::Arc;

use ptx_ast::{ptx, print_node, Ast, Scalar, Value, Visitor};

fn main() {
    let registry = match ptx::registry() {
        Ok(registry) => Arc::new(registry),
        Err(e) => {
            eprintln!("Schema error: {}", e);
            return;
        }
    };

    println!("Loaded {} node kinds:", registry.len());
    for kind in registry.kinds() {
        println!("  {}", kind);
    }

    let mut ast = Ast::new(registry);
    match build(&mut ast) {
        Ok(root) => {
            let Ok(node) = ast.get(root) else { return };
            println!("\n{}\n", print_node(node));

            let labels = Visitor::new().on("Label", |v, names: &mut Vec<String>, node| {
                if let Ok(Scalar::Str(name)) = node.attr("name") {
                    names.push(name.clone());
                }
                v.descend(node, names);
            });
            let mut names = Vec::new();
            labels.dispatch(node, &mut names);
            println!("Labels: {}", names.join(", "));
        }
        Err(e) => {
            eprintln!("Build error: {}", e);
        }
    }
}

fn build(ast: &mut Ast) -> ptx_ast::Result<ptx_ast::NodeId> {
    let param = ast.construct(
        "EntryParam",
        vec![
            ".param".into(),
            Scalar::None.into(),
            ".u64".into(),
            "vector_add_param_0".into(),
            Scalar::None.into(),
            Scalar::None.into(),
            Scalar::None.into(),
            Scalar::None.into(),
            Scalar::None.into(),
        ],
    )?;
    let exit = ast.construct("Label", vec!["$L__BB0_2".into(), Value::Absent])?;
    let kernel = ast.construct(
        "Entry",
        vec![
            ".visible".into(),
            "vector_add".into(),
            vec![param].into(),
            Scalar::None.into(),
            vec![exit].into(),
        ],
    )?;
    ast.construct("Ptx", vec!["7.0".into(), "sm_80".into(), 64i64.into(), vec![kernel].into()])
}
