// Shared helpers for building PTX fixture trees

#![allow(dead_code)]

use std::sync::Arc;

use ptx_ast::{ptx, Ast, NodeId, Scalar, Value};

pub fn ptx_ast() -> Ast {
    Ast::new(Arc::new(ptx::registry().unwrap()))
}

pub fn linking(ast: &mut Ast, directive: &str) -> NodeId {
    ast.construct("LinkingDirective", vec![directive.into()]).unwrap()
}

pub fn label(ast: &mut Ast, name: &str, stmt: Option<NodeId>) -> NodeId {
    ast.construct("Label", vec![name.into(), stmt.into()]).unwrap()
}

pub fn entry(ast: &mut Ast, name: &str, params: Vec<NodeId>, body: Vec<NodeId>) -> NodeId {
    ast.construct(
        "Entry",
        vec![".visible".into(), name.into(), params.into(), Value::Scalar(Scalar::None), body.into()],
    )
    .unwrap()
}

/// Builder for single (unpaired) `.param` declarations
pub struct EntryParamBuilder {
    space: String,
    align: Option<i64>,
    param_type: String,
    name: String,
    array_spec: Option<String>,
}

impl EntryParamBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            space: ".param".to_string(),
            align: None,
            param_type: ".u64".to_string(),
            name: name.into(),
            array_spec: None,
        }
    }

    pub fn param_type(mut self, param_type: impl Into<String>) -> Self {
        self.param_type = param_type.into();
        self
    }

    pub fn align(mut self, align: i64) -> Self {
        self.align = Some(align);
        self
    }

    pub fn array_spec(mut self, spec: impl Into<String>) -> Self {
        self.array_spec = Some(spec.into());
        self
    }

    pub fn build(self, ast: &mut Ast) -> NodeId {
        let values: Vec<Value> = vec![
            self.space.into(),
            Scalar::from(self.align).into(),
            self.param_type.into(),
            self.name.into(),
            Scalar::from(self.array_spec).into(),
            Scalar::None.into(),
            Scalar::None.into(),
            Scalar::None.into(),
            Scalar::None.into(),
        ];
        ast.construct("EntryParam", values).unwrap()
    }
}

/// `depth` labels nested through their `stmt` field around one directive
pub fn label_chain(ast: &mut Ast, depth: usize) -> NodeId {
    let mut id = linking(ast, ".extern");
    for i in 0..depth {
        id = label(ast, &format!("L{}", i), Some(id));
    }
    id
}
