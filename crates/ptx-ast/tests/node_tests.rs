mod common;

use common::*;
use ptx_ast::{AstError, FieldCategory, NodeId, Scalar, Value};

#[test]
fn test_construct_linking_directive() {
    let mut ast = ptx_ast();
    let id = linking(&mut ast, ".extern");
    let node = ast.get(id).unwrap();

    assert_eq!(node.kind_name(), "LinkingDirective");
    assert_eq!(node.attr("directive").unwrap(), &Scalar::Str(".extern".to_string()));
    assert!(node.parent().is_none());
}

#[test]
fn test_construct_takes_ownership_of_children() {
    let mut ast = ptx_ast();
    let stmt = linking(&mut ast, ".weak");
    let l1 = label(&mut ast, "L1", Some(stmt));

    let child = ast.get(stmt).unwrap();
    assert_eq!(child.parent().map(|p| p.id()), Some(l1));
    let roots: Vec<NodeId> = ast.roots().map(|n| n.id()).collect();
    assert_eq!(roots, vec![l1]);
}

#[test]
fn test_label_without_statement() {
    let mut ast = ptx_ast();
    let id = label(&mut ast, "L_end", None);
    let node = ast.get(id).unwrap();
    assert!(node.child("stmt").unwrap().is_none());
}

#[test]
fn test_unknown_kind() {
    let mut ast = ptx_ast();
    let err = ast.construct("Instruction", vec![]).unwrap_err();
    assert_eq!(err, AstError::UnknownKind { kind: "Instruction".to_string() });
    assert!(ast.is_empty());
}

#[test]
fn test_arity_mismatch_constructs_nothing() {
    let mut ast = ptx_ast();
    let err = ast.construct("Label", vec!["L1".into()]).unwrap_err();
    assert_eq!(
        err,
        AstError::ArityMismatch { kind: "Label".to_string(), expected: 2, found: 1 }
    );
    assert!(ast.is_empty());

    let err = ast.construct("LinkingDirective", vec![".extern".into(), ".weak".into()]).unwrap_err();
    assert!(matches!(err, AstError::ArityMismatch { expected: 1, found: 2, .. }));
    assert!(ast.is_empty());
}

#[test]
fn test_scalar_in_child_slot() {
    let mut ast = ptx_ast();
    let err = ast.construct("Label", vec!["L1".into(), "oops".into()]).unwrap_err();
    assert_eq!(
        err,
        AstError::FieldShapeMismatch {
            kind: "Label".to_string(),
            field: "stmt".to_string(),
            index: 1,
            expected: FieldCategory::SingleChild,
            found: "a scalar",
        }
    );
}

#[test]
fn test_node_in_attribute_slot() {
    let mut ast = ptx_ast();
    let d = linking(&mut ast, ".extern");
    let err = ast.construct("Label", vec![d.into(), Value::Absent]).unwrap_err();
    assert!(matches!(err, AstError::FieldShapeMismatch { index: 0, found: "a node", .. }));
    // The directive was not claimed by the failed construction
    assert!(ast.get(d).unwrap().parent().is_none());
}

#[test]
fn test_single_node_in_sequence_slot() {
    let mut ast = ptx_ast();
    let d = linking(&mut ast, ".extern");
    let values: Vec<Value> = vec![".version 7.0".into(), "sm_80".into(), "64".into(), d.into()];
    let err = ast.construct("Ptx", values).unwrap_err();
    assert!(matches!(
        err,
        AstError::FieldShapeMismatch { expected: FieldCategory::ChildSequence, .. }
    ));
}

#[test]
fn test_absent_marker_only_for_single_child() {
    let mut ast = ptx_ast();
    let err = ast.construct("LinkingDirective", vec![Value::Absent]).unwrap_err();
    assert!(matches!(err, AstError::FieldShapeMismatch { found: "an absent marker", .. }));
}

#[test]
fn test_child_attached_elsewhere_is_ownership_conflict() {
    let mut ast = ptx_ast();
    let stmt = linking(&mut ast, ".extern");
    let _owner = label(&mut ast, "L1", Some(stmt));

    let err = ast.construct("Label", vec!["L2".into(), stmt.into()]).unwrap_err();
    assert_eq!(
        err,
        AstError::OwnershipConflict { kind: "Label".to_string(), field: "stmt".to_string(), child: stmt }
    );
    assert_eq!(ast.len(), 2);
}

#[test]
fn test_same_child_twice_is_ownership_conflict() {
    let mut ast = ptx_ast();
    let stmt = linking(&mut ast, ".extern");
    let values: Vec<Value> = vec!["7.0".into(), "sm_80".into(), "64".into(), vec![stmt, stmt].into()];
    let err = ast.construct("Ptx", values).unwrap_err();
    assert!(matches!(err, AstError::OwnershipConflict { child, .. } if child == stmt));
    assert!(ast.get(stmt).unwrap().parent().is_none());
}

#[test]
fn test_failed_construction_leaves_earlier_children_unclaimed() {
    let mut ast = ptx_ast();
    let a = linking(&mut ast, ".extern");
    let b = linking(&mut ast, ".weak");
    let _owner = label(&mut ast, "L1", Some(b));

    let result = ast.construct(
        "Entry",
        vec![".visible".into(), "k".into(), Value::Nodes(vec![]), Scalar::None.into(), vec![a, b].into()],
    );
    assert!(matches!(result, Err(AstError::OwnershipConflict { .. })));
    assert!(ast.get(a).unwrap().parent().is_none());
}

#[test]
fn test_unknown_node_id() {
    let mut ast = ptx_ast();
    let err = ast.construct("Label", vec!["L1".into(), NodeId(42).into()]).unwrap_err();
    assert_eq!(err, AstError::UnknownNode { id: NodeId(42) });
    assert!(ast.get(NodeId(0)).is_err());
}

#[test]
fn test_accessors_check_field_names() {
    let mut ast = ptx_ast();
    let id = label(&mut ast, "L1", None);
    let node = ast.get(id).unwrap();

    let err = node.attr("kernel_name").unwrap_err();
    assert_eq!(
        err,
        AstError::UnknownField { kind: "Label".to_string(), field: "kernel_name".to_string() }
    );
}

#[test]
fn test_accessors_check_field_categories() {
    let mut ast = ptx_ast();
    let id = label(&mut ast, "L1", None);
    let node = ast.get(id).unwrap();

    assert!(matches!(
        node.attr("stmt"),
        Err(AstError::FieldShapeMismatch { expected: FieldCategory::SingleChild, .. })
    ));
    assert!(matches!(node.child("name"), Err(AstError::FieldShapeMismatch { .. })));
    assert!(matches!(node.children("stmt"), Err(AstError::FieldShapeMismatch { .. })));
}

#[test]
fn test_entry_param_attributes() {
    let mut ast = ptx_ast();
    let id = EntryParamBuilder::new("in_ptr").align(8).array_spec("[4]").build(&mut ast);
    let node = ast.get(id).unwrap();

    assert_eq!(node.attr("space").unwrap().as_str(), Some(".param"));
    assert_eq!(node.attr("align").unwrap().as_int(), Some(8));
    assert_eq!(node.attr("array_spec").unwrap().as_str(), Some("[4]"));
    assert!(node.attr("name2").unwrap().is_none());
    assert!(node.children_of().is_empty());
}

#[test]
fn test_identifier_decl_with_declarators() {
    let mut ast = ptx_ast();
    let a = label(&mut ast, "a", None);
    let b = label(&mut ast, "b", None);
    let id = ast
        .construct("IdentifierDecl", vec![".reg".into(), Scalar::None.into(), vec![a, b].into()])
        .unwrap();

    let node = ast.get(id).unwrap();
    let decls: Vec<NodeId> = node.children("variable_declarator").unwrap().iter().map(|n| n.id()).collect();
    assert_eq!(decls, vec![a, b]);
}

#[test]
fn test_ast_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ptx_ast::Ast>();
}

#[test]
fn test_release_and_rebuild_renamed_label() {
    let mut ast = ptx_ast();
    let d = linking(&mut ast, ".extern");
    let l1 = label(&mut ast, "L1", Some(d));

    let mut values = ast.release(l1).unwrap();
    assert_eq!(values, vec![Value::from("L1"), Value::Node(d)]);
    assert!(ast.get(d).unwrap().parent().is_none());

    values[0] = "L1_renamed".into();
    let renamed = ast.construct("Label", values).unwrap();

    let node = ast.get(renamed).unwrap();
    assert_eq!(node.attr("name").unwrap().as_str(), Some("L1_renamed"));
    assert_eq!(node.child("stmt").unwrap().map(|c| c.id()), Some(d));
    assert_eq!(ast.len(), 2);
    let roots: Vec<NodeId> = ast.roots().map(|n| n.id()).collect();
    assert_eq!(roots, vec![renamed]);
}

#[test]
fn test_released_node_is_rejected() {
    let mut ast = ptx_ast();
    let d = linking(&mut ast, ".extern");
    ast.release(d).unwrap();

    assert_eq!(ast.get(d).unwrap_err(), AstError::ReleasedNode { id: d });
    assert_eq!(ast.release(d).unwrap_err(), AstError::ReleasedNode { id: d });
    let err = ast.construct("Label", vec!["L1".into(), d.into()]).unwrap_err();
    assert_eq!(err, AstError::ReleasedNode { id: d });
    assert!(ast.is_empty());
    assert_eq!(ast.roots().count(), 0);
}

#[test]
fn test_release_owned_node_fails() {
    let mut ast = ptx_ast();
    let d = linking(&mut ast, ".extern");
    let l1 = label(&mut ast, "L1", Some(d));

    assert_eq!(ast.release(d).unwrap_err(), AstError::StillOwned { id: d, parent: l1 });
    assert_eq!(ast.len(), 2);
}

#[test]
fn test_release_frees_every_sequence_child() {
    let mut ast = ptx_ast();
    let l0 = label(&mut ast, "L0", None);
    let l1 = label(&mut ast, "L1", None);
    let k = entry(&mut ast, "kernel", vec![], vec![l0, l1]);

    ast.release(k).unwrap();

    let roots: Vec<NodeId> = ast.roots().map(|n| n.id()).collect();
    assert_eq!(roots, vec![l0, l1]);
    entry(&mut ast, "kernel2", vec![], vec![l1, l0]);
}

#[test]
fn test_discard_drops_subtree() {
    let mut ast = ptx_ast();
    let d = linking(&mut ast, ".extern");
    let l0 = label(&mut ast, "L0", Some(d));
    let k = entry(&mut ast, "kernel", vec![], vec![l0]);
    let other = linking(&mut ast, ".weak");

    assert_eq!(ast.discard(k).unwrap(), 3);
    assert_eq!(ast.len(), 1);
    assert_eq!(ast.get(l0).unwrap_err(), AstError::ReleasedNode { id: l0 });
    let roots: Vec<NodeId> = ast.roots().map(|n| n.id()).collect();
    assert_eq!(roots, vec![other]);
}

#[test]
fn test_id_from_other_tree_out_of_range_is_unknown() {
    let mut big = ptx_ast();
    linking(&mut big, ".extern");
    let foreign = linking(&mut big, ".weak");

    let mut small = ptx_ast();
    let err = small.construct("Label", vec!["L1".into(), foreign.into()]).unwrap_err();
    assert_eq!(err, AstError::UnknownNode { id: foreign });
    assert!(small.is_empty());
}
