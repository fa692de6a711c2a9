//! PHP syntax tree.
//!
//! The node set covers what the generated controllers, policy and loader
//! files need. Every node owns its children, so trees can be cloned and
//! rearranged freely. Nodes serialise with a `nodeType` discriminator that
//! follows the PHP-Parser naming (`Expr_Variable`, `Stmt_If`, ...).
//!
//! Use the validated constructors in [`build`] rather than assembling nodes
//! by hand; they reject malformed identifiers before anything is printed.

pub mod build;
mod error;

use std::fmt;

use serde::Serialize;

pub use error::AstError;

/// A possibly namespaced name (`WP_Error`, `Acme\Jobs\Policy`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "nodeType", rename = "Name")]
pub struct Name {
    pub parts: Vec<String>,
}

impl Name {
    pub fn last(&self) -> &str {
        self.parts.last().map(String::as_str).unwrap_or_default()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.parts.join("\\"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOp {
    Identical,
    NotIdentical,
    Equal,
    NotEqual,
    Smaller,
    SmallerOrEqual,
    Greater,
    GreaterOrEqual,
    BooleanAnd,
    BooleanOr,
    Plus,
    Minus,
    Mul,
    Div,
    Concat,
    Coalesce,
}

impl BinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOp::Identical => "===",
            BinaryOp::NotIdentical => "!==",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Smaller => "<",
            BinaryOp::SmallerOrEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::BooleanAnd => "&&",
            BinaryOp::BooleanOr => "||",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Concat => ".",
            BinaryOp::Coalesce => "??",
        }
    }

    fn node_name(&self) -> &'static str {
        match self {
            BinaryOp::Identical => "Identical",
            BinaryOp::NotIdentical => "NotIdentical",
            BinaryOp::Equal => "Equal",
            BinaryOp::NotEqual => "NotEqual",
            BinaryOp::Smaller => "Smaller",
            BinaryOp::SmallerOrEqual => "SmallerOrEqual",
            BinaryOp::Greater => "Greater",
            BinaryOp::GreaterOrEqual => "GreaterOrEqual",
            BinaryOp::BooleanAnd => "BooleanAnd",
            BinaryOp::BooleanOr => "BooleanOr",
            BinaryOp::Plus => "Plus",
            BinaryOp::Minus => "Minus",
            BinaryOp::Mul => "Mul",
            BinaryOp::Div => "Div",
            BinaryOp::Concat => "Concat",
            BinaryOp::Coalesce => "Coalesce",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CastKind {
    Int,
    Float,
    String,
    Bool,
    Array,
}

impl CastKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            CastKind::Int => "int",
            CastKind::Float => "float",
            CastKind::String => "string",
            CastKind::Bool => "bool",
            CastKind::Array => "array",
        }
    }
}

/// An entry of an `array( ... )` literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "nodeType", rename = "ArrayItem")]
pub struct ArrayItem {
    pub key: Option<Expr>,
    pub value: Expr,
}

/// One arm of a `match` expression; no conditions means `default`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "nodeType", rename = "MatchArm")]
pub struct MatchArm {
    pub conds: Vec<Expr>,
    pub body: Expr,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "nodeType")]
pub enum Expr {
    #[serde(rename = "Expr_Variable")]
    Variable { name: String },
    #[serde(rename = "Scalar_String")]
    String { value: String },
    #[serde(rename = "Scalar_Int")]
    Int { value: i64 },
    #[serde(rename = "Expr_ConstFetch")]
    ConstFetch { name: Name },
    #[serde(rename = "Expr_ClassConstFetch")]
    ClassConstFetch { class: Name, name: String },
    #[serde(rename = "Expr_Array")]
    Array { items: Vec<ArrayItem> },
    #[serde(rename = "Expr_ArrayDimFetch")]
    ArrayDimFetch {
        var: Box<Expr>,
        dim: Option<Box<Expr>>,
    },
    #[serde(rename = "Expr_PropertyFetch")]
    PropertyFetch { var: Box<Expr>, name: String },
    #[serde(rename = "Expr_FuncCall")]
    FuncCall { name: Name, args: Vec<Expr> },
    #[serde(rename = "Expr_MethodCall")]
    MethodCall {
        var: Box<Expr>,
        name: String,
        args: Vec<Expr>,
    },
    #[serde(rename = "Expr_StaticCall")]
    StaticCall {
        class: Name,
        name: String,
        args: Vec<Expr>,
    },
    #[serde(rename = "Expr_New")]
    New { class: Name, args: Vec<Expr> },
    #[serde(rename = "Expr_Assign")]
    Assign { var: Box<Expr>, expr: Box<Expr> },
    #[serde(rename = "Expr_BinaryOp")]
    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    #[serde(rename = "Expr_BooleanNot")]
    BooleanNot { expr: Box<Expr> },
    #[serde(rename = "Expr_Instanceof")]
    Instanceof { expr: Box<Expr>, class: Name },
    #[serde(rename = "Expr_Cast")]
    Cast { kind: CastKind, expr: Box<Expr> },
    #[serde(rename = "Expr_Ternary")]
    Ternary {
        cond: Box<Expr>,
        #[serde(rename = "if")]
        if_true: Option<Box<Expr>>,
        #[serde(rename = "else")]
        if_false: Box<Expr>,
    },
    #[serde(rename = "Expr_Isset")]
    Isset { vars: Vec<Expr> },
    #[serde(rename = "Expr_ArrowFunction")]
    ArrowFunction {
        #[serde(rename = "static")]
        is_static: bool,
        params: Vec<Param>,
        expr: Box<Expr>,
    },
    #[serde(rename = "Expr_Match")]
    Match { cond: Box<Expr>, arms: Vec<MatchArm> },
}

impl Expr {
    /// The PHP-Parser node type, including the operator or cast suffix.
    pub fn node_type(&self) -> String {
        let name = match self {
            Expr::Variable { .. } => "Expr_Variable",
            Expr::String { .. } => "Scalar_String",
            Expr::Int { .. } => "Scalar_Int",
            Expr::ConstFetch { .. } => "Expr_ConstFetch",
            Expr::ClassConstFetch { .. } => "Expr_ClassConstFetch",
            Expr::Array { .. } => "Expr_Array",
            Expr::ArrayDimFetch { .. } => "Expr_ArrayDimFetch",
            Expr::PropertyFetch { .. } => "Expr_PropertyFetch",
            Expr::FuncCall { .. } => "Expr_FuncCall",
            Expr::MethodCall { .. } => "Expr_MethodCall",
            Expr::StaticCall { .. } => "Expr_StaticCall",
            Expr::New { .. } => "Expr_New",
            Expr::Assign { .. } => "Expr_Assign",
            Expr::BinaryOp { op, .. } => return format!("Expr_BinaryOp_{}", op.node_name()),
            Expr::BooleanNot { .. } => "Expr_BooleanNot",
            Expr::Instanceof { .. } => "Expr_Instanceof",
            Expr::Cast { kind, .. } => {
                let suffix = match kind {
                    CastKind::Int => "Int",
                    CastKind::Float => "Double",
                    CastKind::String => "String",
                    CastKind::Bool => "Bool",
                    CastKind::Array => "Array",
                };
                return format!("Expr_Cast_{suffix}");
            }
            Expr::Ternary { .. } => "Expr_Ternary",
            Expr::Isset { .. } => "Expr_Isset",
            Expr::ArrowFunction { .. } => "Expr_ArrowFunction",
            Expr::Match { .. } => "Expr_Match",
        };
        name.to_string()
    }
}

/// A function or method parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "nodeType", rename = "Param")]
pub struct Param {
    pub name: String,
    #[serde(rename = "type")]
    pub type_hint: Option<String>,
    pub default: Option<Expr>,
}

/// A `/** ... */` comment, one entry per line without the ` * ` prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "nodeType", rename = "Comment_Doc")]
pub struct DocComment {
    pub lines: Vec<String>,
}

impl DocComment {
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn keyword(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "nodeType", rename = "Stmt_ClassMethod")]
pub struct ClassMethod {
    pub name: String,
    pub visibility: Visibility,
    #[serde(rename = "static")]
    pub is_static: bool,
    pub params: Vec<Param>,
    pub return_type: Option<String>,
    pub stmts: Vec<Stmt>,
    pub doc: Option<DocComment>,
}

impl ClassMethod {
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn private(self) -> Self {
        self.visibility(Visibility::Private)
    }

    pub fn protected(self) -> Self {
        self.visibility(Visibility::Protected)
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, ty: impl Into<String>) -> Self {
        self.return_type = Some(ty.into());
        self
    }

    pub fn doc(mut self, doc: DocComment) -> Self {
        self.doc = Some(doc);
        self
    }

    pub fn body(mut self, stmts: Vec<Stmt>) -> Self {
        self.stmts = stmts;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "nodeType", rename = "Stmt_ClassConst")]
pub struct ClassConst {
    pub name: String,
    pub visibility: Visibility,
    pub value: Expr,
}

/// A class declaration; wrap it in [`Stmt::Class`] to place it in a file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Class {
    pub name: String,
    #[serde(rename = "final")]
    pub is_final: bool,
    #[serde(rename = "abstract")]
    pub is_abstract: bool,
    pub extends: Option<Name>,
    pub consts: Vec<ClassConst>,
    pub methods: Vec<ClassMethod>,
    pub doc: Option<DocComment>,
}

impl Class {
    pub fn final_(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn abstract_(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn extends(mut self, parent: Name) -> Self {
        self.extends = Some(parent);
        self
    }

    pub fn constant(mut self, constant: ClassConst) -> Self {
        self.consts.push(constant);
        self
    }

    pub fn method(mut self, method: ClassMethod) -> Self {
        self.methods.push(method);
        self
    }

    pub fn methods(mut self, methods: impl IntoIterator<Item = ClassMethod>) -> Self {
        self.methods.extend(methods);
        self
    }

    pub fn doc(mut self, doc: DocComment) -> Self {
        self.doc = Some(doc);
        self
    }

    pub fn find_method(&self, name: &str) -> Option<&ClassMethod> {
        self.methods.iter().find(|method| method.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "nodeType")]
pub enum Stmt {
    #[serde(rename = "Stmt_Expression")]
    Expression { expr: Expr },
    #[serde(rename = "Stmt_Return")]
    Return { expr: Option<Expr> },
    #[serde(rename = "Stmt_If")]
    If {
        cond: Expr,
        stmts: Vec<Stmt>,
        #[serde(rename = "else")]
        else_stmts: Option<Vec<Stmt>>,
    },
    #[serde(rename = "Stmt_Foreach")]
    Foreach {
        expr: Expr,
        key_var: Option<Expr>,
        value_var: Expr,
        stmts: Vec<Stmt>,
    },
    #[serde(rename = "Stmt_Continue")]
    Continue,
    /// Comment carrier; with no comments it prints as a blank line.
    #[serde(rename = "Stmt_Nop")]
    Nop { comments: Vec<String> },
    #[serde(rename = "Stmt_Function")]
    Function {
        name: String,
        params: Vec<Param>,
        return_type: Option<String>,
        stmts: Vec<Stmt>,
        doc: Option<DocComment>,
    },
    #[serde(rename = "Stmt_Class")]
    Class(Class),
}

impl Stmt {
    pub fn node_type(&self) -> &'static str {
        match self {
            Stmt::Expression { .. } => "Stmt_Expression",
            Stmt::Return { .. } => "Stmt_Return",
            Stmt::If { .. } => "Stmt_If",
            Stmt::Foreach { .. } => "Stmt_Foreach",
            Stmt::Continue => "Stmt_Continue",
            Stmt::Nop { .. } => "Stmt_Nop",
            Stmt::Function { .. } => "Stmt_Function",
            Stmt::Class(_) => "Stmt_Class",
        }
    }

    /// Whether this is a `// @wp-kernel` metadata marker.
    pub fn is_marker(&self) -> bool {
        match self {
            Stmt::Nop { comments } => comments
                .iter()
                .any(|comment| comment.starts_with(crate::macros::MARKER_PREFIX)),
            _ => false,
        }
    }

    pub fn blank() -> Self {
        Stmt::Nop {
            comments: Vec::new(),
        }
    }
}

/// A complete PHP source file.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PhpFile {
    pub strict_types: bool,
    pub doc: Option<DocComment>,
    pub namespace: Option<Name>,
    pub uses: Vec<Name>,
    pub stmts: Vec<Stmt>,
}

impl PhpFile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict_types(mut self) -> Self {
        self.strict_types = true;
        self
    }

    pub fn doc(mut self, doc: DocComment) -> Self {
        self.doc = Some(doc);
        self
    }

    pub fn namespace(mut self, namespace: Name) -> Self {
        self.namespace = Some(namespace);
        self
    }

    pub fn uses(mut self, name: Name) -> Self {
        if !self.uses.contains(&name) {
            self.uses.push(name);
        }
        self
    }

    pub fn stmt(mut self, stmt: Stmt) -> Self {
        self.stmts.push(stmt);
        self
    }

    pub fn stmts(mut self, stmts: impl IntoIterator<Item = Stmt>) -> Self {
        self.stmts.extend(stmts);
        self
    }
}

/// A node paired with the lines it is expected to print as.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Printable<T> {
    pub node: T,
    pub lines: Vec<String>,
}

impl<T> Printable<T> {
    pub fn new(node: T, lines: Vec<String>) -> Self {
        Self { node, lines }
    }

    pub fn into_node(self) -> T {
        self.node
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_expr_serialises_with_node_type() {
        let expr = Expr::Assign {
            var: Box::new(Expr::Variable {
                name: "post_id".into(),
            }),
            expr: Box::new(Expr::Int { value: 0 }),
        };

        assert_eq!(
            serde_json::to_value(&expr).unwrap(),
            json!({
                "nodeType": "Expr_Assign",
                "var": { "nodeType": "Expr_Variable", "name": "post_id" },
                "expr": { "nodeType": "Scalar_Int", "value": 0 },
            })
        );
    }

    #[test]
    fn test_node_type_includes_operator() {
        let expr = Expr::BinaryOp {
            op: BinaryOp::SmallerOrEqual,
            left: Box::new(Expr::Variable { name: "id".into() }),
            right: Box::new(Expr::Int { value: 0 }),
        };
        assert_eq!(expr.node_type(), "Expr_BinaryOp_SmallerOrEqual");

        let cast = Expr::Cast {
            kind: CastKind::Int,
            expr: Box::new(Expr::Variable { name: "id".into() }),
        };
        assert_eq!(cast.node_type(), "Expr_Cast_Int");
    }

    #[test]
    fn test_name_display() {
        let name = Name {
            parts: vec!["Acme".into(), "Jobs".into(), "Policy".into()],
        };
        assert_eq!(name.to_string(), "Acme\\Jobs\\Policy");
        assert_eq!(name.last(), "Policy");
    }

    #[test]
    fn test_marker_detection() {
        let marker = Stmt::Nop {
            comments: vec!["// @wp-kernel resource.wpPost.mutation sync-meta".into()],
        };
        assert!(marker.is_marker());
        assert!(!Stmt::blank().is_marker());
    }
}
