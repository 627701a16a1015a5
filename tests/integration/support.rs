//! Source tree builder shared by the integration tests

use lingxi::frontend::descriptor::{
    ClassKind, DeclarationKind, DescriptorTable, SymbolId, Visibility,
};
use lingxi::frontend::name::{FqName, Name};
use lingxi::frontend::resolve::REQUIRE_VERSION;
use lingxi::frontend::tree::{
    Annotation, CallShape, Class, Const, ConstValue, Constructor, File, FunctionCall,
    FunctionShape, NamedArgument, NamedFunction, NamedReference, Node, Property, ValueParameter,
};
use lingxi::util::span::{Position, Span};

pub fn fq(text: &str) -> FqName {
    FqName::parse(text).unwrap()
}

/// Declares descriptors while building the matching tree nodes.
///
/// Every node gets its own line so diagnostics have distinct anchors.
#[derive(Default)]
pub struct SourceBuilder {
    pub table: DescriptorTable,
    line: usize,
}

impl SourceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Continues declaring into an existing table
    pub fn with_table(table: DescriptorTable) -> Self {
        Self { table, line: 0 }
    }

    pub fn span(&mut self) -> Span {
        self.line += 1;
        Span::new(Position::new(self.line, 1), Position::new(self.line, 20))
    }

    pub fn file(
        &mut self,
        package: &str,
        declarations: Vec<Node>,
    ) -> Node {
        File {
            span: self.span(),
            name: format!("{}.lx", package),
            package: fq(package),
            declarations,
        }
        .into()
    }

    /// Declares a class and builds its members inside `members`.
    pub fn class(
        &mut self,
        path: &str,
        kind: ClassKind,
        container: Option<SymbolId>,
        annotations: Vec<Node>,
        members: impl FnOnce(&mut Self, SymbolId) -> Vec<Node>,
    ) -> Node {
        let path = fq(path);
        let name = path.short_name().cloned().unwrap();
        let symbol = self.table.declare(
            path,
            DeclarationKind::Class(kind),
            Visibility::Public,
            container,
        );
        let span = self.span();
        let declarations = members(self, symbol);
        Class {
            span,
            symbol,
            name,
            annotations,
            declarations,
        }
        .into()
    }

    pub fn constructor(
        &mut self,
        class_path: &str,
        container: SymbolId,
    ) -> Node {
        let symbol = self.table.declare(
            fq(class_path).child(Name::init()),
            DeclarationKind::Constructor { arity: 0 },
            Visibility::Public,
            Some(container),
        );
        Constructor {
            delegated_call: None,
            function: FunctionShape {
                span: self.span(),
                symbol,
                annotations: Vec::new(),
                parameters: Vec::new(),
                body: None,
            },
        }
        .into()
    }

    /// Declares a function with one value parameter per entry of `parameters`.
    pub fn function(
        &mut self,
        path: &str,
        container: Option<SymbolId>,
        parameters: &[&str],
        annotations: Vec<Node>,
        body: Option<Node>,
    ) -> Node {
        let path = fq(path);
        let name = path.short_name().cloned().unwrap();
        let symbol = self.table.declare(
            path.clone(),
            DeclarationKind::Function {
                arity: parameters.len() as u32,
            },
            Visibility::Public,
            container,
        );
        let parameters = parameters
            .iter()
            .map(|parameter| {
                let parameter_symbol = self.table.declare(
                    path.child(Name::identifier(parameter)),
                    DeclarationKind::ValueParameter,
                    Visibility::Public,
                    Some(symbol),
                );
                ValueParameter {
                    span: self.span(),
                    symbol: parameter_symbol,
                    property: None,
                    name: Name::identifier(parameter),
                    annotations: Vec::new(),
                    default_value: None,
                }
                .into()
            })
            .collect();
        NamedFunction {
            name,
            function: FunctionShape {
                span: self.span(),
                symbol,
                annotations,
                parameters,
                body: body.map(Box::new),
            },
        }
        .into()
    }

    pub fn property(
        &mut self,
        path: &str,
        mutable: bool,
        visibility: Visibility,
        container: Option<SymbolId>,
        annotations: Vec<Node>,
    ) -> Node {
        let path = fq(path);
        let name = path.short_name().cloned().unwrap();
        let symbol = self.table.declare(
            path,
            DeclarationKind::Property { mutable },
            visibility,
            container,
        );
        Property {
            span: self.span(),
            symbol,
            name,
            annotations,
            initializer: None,
        }
        .into()
    }

    /// `callee()` with an unresolved callee reference
    pub fn call(
        &mut self,
        callee: &str,
    ) -> Node {
        let span = self.span();
        FunctionCall {
            callee_reference: Box::new(NamedReference::new(Name::identifier(callee), span).into()),
            call: CallShape::new(Vec::new(), span),
        }
        .into()
    }
}

fn constant(value: ConstValue) -> Node {
    Const {
        span: Span::dummy(),
        value,
    }
    .into()
}

/// `@RequireVersion(version, name = "value", ...)`; numeric values become integers
pub fn require_version(
    version: &str,
    named: &[(&str, &str)],
) -> Node {
    let mut arguments = vec![constant(ConstValue::String(version.to_string()))];
    for (name, value) in named {
        let value = match value.parse::<i64>() {
            Ok(number) => ConstValue::Int(number),
            Err(_) => ConstValue::String(value.to_string()),
        };
        arguments.push(
            NamedArgument {
                span: Span::dummy(),
                name: Name::identifier(name),
                expression: Box::new(constant(value)),
            }
            .into(),
        );
    }
    Annotation {
        span: Span::dummy(),
        name: Name::identifier(REQUIRE_VERSION),
        use_site_target: None,
        arguments,
    }
    .into()
}
