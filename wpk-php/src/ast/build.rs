//! Validated node constructors.
//!
//! Anything that ends up as a PHP identifier is checked here; literals and
//! operators cannot be malformed and are returned directly.

use super::{
    ArrayItem, AstError, BinaryOp, CastKind, Class, ClassConst, ClassMethod, DocComment, Expr,
    MatchArm, Name, Param, Stmt, Visibility,
};

pub type Result<T> = std::result::Result<T, AstError>;

/// Whether `value` is a plain PHP identifier (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

fn identifier(what: &'static str, value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(AstError::Empty { what });
    }
    if !is_identifier(value) {
        return Err(AstError::invalid(what, value));
    }
    Ok(value.to_string())
}

/// A name such as `WP_Error` or `Acme\Jobs\Policy`; a leading `\` is dropped.
pub fn name(value: &str) -> Result<Name> {
    let trimmed = value.trim().trim_start_matches('\\');
    if trimmed.is_empty() {
        return Err(AstError::Empty { what: "name" });
    }
    let parts = trimmed
        .split('\\')
        .map(|part| identifier("name", part))
        .collect::<Result<Vec<_>>>()?;
    Ok(Name { parts })
}

/// `$name`; a leading `$` is accepted and stripped.
pub fn variable(value: &str) -> Result<Expr> {
    let name = value.strip_prefix('$').unwrap_or(value);
    Ok(Expr::Variable {
        name: identifier("variable", name)?,
    })
}

pub fn this() -> Expr {
    Expr::Variable {
        name: "this".to_string(),
    }
}

pub fn string(value: impl Into<String>) -> Expr {
    Expr::String {
        value: value.into(),
    }
}

pub fn int(value: i64) -> Expr {
    Expr::Int { value }
}

fn constant(value: &str) -> Expr {
    Expr::ConstFetch {
        name: Name {
            parts: vec![value.to_string()],
        },
    }
}

pub fn bool(value: bool) -> Expr {
    constant(if value { "true" } else { "false" })
}

pub fn null() -> Expr {
    constant("null")
}

pub fn class_const(class: &str, constant: &str) -> Result<Expr> {
    Ok(Expr::ClassConstFetch {
        class: name(class)?,
        name: identifier("constant", constant)?,
    })
}

pub fn item(value: Expr) -> ArrayItem {
    ArrayItem { key: None, value }
}

pub fn keyed(key: impl Into<String>, value: Expr) -> ArrayItem {
    ArrayItem {
        key: Some(string(key)),
        value,
    }
}

pub fn array(items: Vec<ArrayItem>) -> Expr {
    Expr::Array { items }
}

/// A list of string literals.
pub fn string_list<I, S>(values: I) -> Expr
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    array(values.into_iter().map(|value| item(string(value))).collect())
}

pub fn dim(var: Expr, key: Expr) -> Expr {
    Expr::ArrayDimFetch {
        var: Box::new(var),
        dim: Some(Box::new(key)),
    }
}

/// `$var[]`
pub fn append(var: Expr) -> Expr {
    Expr::ArrayDimFetch {
        var: Box::new(var),
        dim: None,
    }
}

pub fn property(var: Expr, property: &str) -> Result<Expr> {
    Ok(Expr::PropertyFetch {
        var: Box::new(var),
        name: identifier("property", property)?,
    })
}

pub fn func_call(function: &str, args: Vec<Expr>) -> Result<Expr> {
    Ok(Expr::FuncCall {
        name: name(function)?,
        args,
    })
}

pub fn method_call(var: Expr, method: &str, args: Vec<Expr>) -> Result<Expr> {
    Ok(Expr::MethodCall {
        var: Box::new(var),
        name: identifier("method", method)?,
        args,
    })
}

/// `$this->method( ... )`
pub fn this_call(method: &str, args: Vec<Expr>) -> Result<Expr> {
    method_call(this(), method, args)
}

pub fn static_call(class: &str, method: &str, args: Vec<Expr>) -> Result<Expr> {
    Ok(Expr::StaticCall {
        class: name(class)?,
        name: identifier("method", method)?,
        args,
    })
}

pub fn new(class: &str, args: Vec<Expr>) -> Result<Expr> {
    Ok(Expr::New {
        class: name(class)?,
        args,
    })
}

/// `var = expr`; only variables, array elements and properties are
/// assignable.
pub fn assign(var: Expr, expr: Expr) -> Result<Expr> {
    match var {
        Expr::Variable { .. } | Expr::ArrayDimFetch { .. } | Expr::PropertyFetch { .. } => {
            Ok(Expr::Assign {
                var: Box::new(var),
                expr: Box::new(expr),
            })
        }
        other => Err(AstError::InvalidAssignTarget {
            node_type: other.node_type(),
        }),
    }
}

pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

pub fn not(expr: Expr) -> Expr {
    Expr::BooleanNot {
        expr: Box::new(expr),
    }
}

pub fn instance_of(expr: Expr, class: &str) -> Result<Expr> {
    Ok(Expr::Instanceof {
        expr: Box::new(expr),
        class: name(class)?,
    })
}

pub fn cast(kind: CastKind, expr: Expr) -> Expr {
    Expr::Cast {
        kind,
        expr: Box::new(expr),
    }
}

pub fn ternary(cond: Expr, if_true: Expr, if_false: Expr) -> Expr {
    Expr::Ternary {
        cond: Box::new(cond),
        if_true: Some(Box::new(if_true)),
        if_false: Box::new(if_false),
    }
}

pub fn isset(vars: Vec<Expr>) -> Expr {
    Expr::Isset { vars }
}

pub fn static_arrow_fn(params: Vec<Param>, expr: Expr) -> Expr {
    Expr::ArrowFunction {
        is_static: true,
        params,
        expr: Box::new(expr),
    }
}

pub fn match_expr(cond: Expr, arms: Vec<MatchArm>) -> Expr {
    Expr::Match {
        cond: Box::new(cond),
        arms,
    }
}

pub fn arm(conds: Vec<Expr>, body: Expr) -> MatchArm {
    MatchArm { conds, body }
}

pub fn param(value: &str) -> Result<Param> {
    let name = value.strip_prefix('$').unwrap_or(value);
    Ok(Param {
        name: identifier("parameter", name)?,
        type_hint: None,
        default: None,
    })
}

pub fn typed_param(ty: &str, value: &str) -> Result<Param> {
    let mut param = param(value)?;
    param.type_hint = Some(ty.to_string());
    Ok(param)
}

impl Param {
    pub fn default_value(mut self, value: Expr) -> Self {
        self.default = Some(value);
        self
    }
}

// Statements

pub fn expr_stmt(expr: Expr) -> Stmt {
    Stmt::Expression { expr }
}

/// `$var = expr;`
pub fn assign_stmt(var: &str, expr: Expr) -> Result<Stmt> {
    Ok(expr_stmt(assign(variable(var)?, expr)?))
}

pub fn ret(expr: Expr) -> Stmt {
    Stmt::Return { expr: Some(expr) }
}

pub fn if_(cond: Expr, stmts: Vec<Stmt>) -> Stmt {
    Stmt::If {
        cond,
        stmts,
        else_stmts: None,
    }
}

pub fn if_else(cond: Expr, stmts: Vec<Stmt>, else_stmts: Vec<Stmt>) -> Stmt {
    Stmt::If {
        cond,
        stmts,
        else_stmts: Some(else_stmts),
    }
}

pub fn foreach(expr: Expr, key_var: Option<Expr>, value_var: Expr, stmts: Vec<Stmt>) -> Stmt {
    Stmt::Foreach {
        expr,
        key_var,
        value_var,
        stmts,
    }
}

pub fn comment(text: impl Into<String>) -> Stmt {
    Stmt::Nop {
        comments: vec![text.into()],
    }
}

pub fn function(function: &str, params: Vec<Param>, stmts: Vec<Stmt>) -> Result<Stmt> {
    Ok(Stmt::Function {
        name: identifier("function", function)?,
        params,
        return_type: None,
        stmts,
        doc: None,
    })
}

// Class members

pub fn class(value: &str) -> Result<Class> {
    Ok(Class {
        name: identifier("class", value)?,
        is_final: false,
        is_abstract: false,
        extends: None,
        consts: Vec::new(),
        methods: Vec::new(),
        doc: None,
    })
}

pub fn method(value: &str) -> Result<ClassMethod> {
    Ok(ClassMethod {
        name: identifier("method", value)?,
        visibility: Visibility::Public,
        is_static: false,
        params: Vec::new(),
        return_type: None,
        stmts: Vec::new(),
        doc: None,
    })
}

pub fn constant_decl(value: &str, expr: Expr) -> Result<ClassConst> {
    Ok(ClassConst {
        name: identifier("constant", value)?,
        visibility: Visibility::Public,
        value: expr,
    })
}

pub fn doc<I, S>(lines: I) -> DocComment
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    DocComment::new(lines)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variable_strips_dollar() {
        assert_eq!(
            variable("$post_id").unwrap(),
            Expr::Variable {
                name: "post_id".into()
            }
        );
    }

    #[test]
    fn test_variable_rejects_invalid_names() {
        assert_eq!(
            variable("").unwrap_err(),
            AstError::Empty { what: "variable" }
        );
        assert!(matches!(
            variable("1st"),
            Err(AstError::InvalidIdentifier { what: "variable", .. })
        ));
        assert!(variable("post-id").is_err());
        assert!(variable("$").is_err());
    }

    #[test]
    fn test_name_splits_namespaces() {
        let parsed = name("\\Acme\\Jobs\\Policy").unwrap();
        assert_eq!(parsed.parts, vec!["Acme", "Jobs", "Policy"]);
        assert!(name("Acme\\\\Jobs").is_err());
        assert!(name("  ").is_err());
    }

    #[test]
    fn test_assign_rejects_non_lvalues() {
        let err = assign(string("x"), int(1)).unwrap_err();
        assert_eq!(
            err,
            AstError::InvalidAssignTarget {
                node_type: "Scalar_String".into()
            }
        );
        assert!(assign(dim(variable("args").unwrap(), string("paged")), int(1)).is_ok());
    }

    #[test]
    fn test_method_names_are_validated() {
        assert!(this_call("prepareJobResponse", vec![]).is_ok());
        assert!(this_call("prepare Job", vec![]).is_err());
        assert!(class("JobController").is_ok());
        assert!(class("Job-Controller").is_err());
    }
}
