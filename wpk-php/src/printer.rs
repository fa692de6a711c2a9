//! PHP pretty printer.
//!
//! Statements render through [`Renderable`] into a tab-indented
//! [`CodeBuilder`]; expressions render to strings. Output follows the
//! WordPress coding standards: spaces inside call and control-structure
//! parentheses, single-quoted strings and long-form `array( ... )`
//! literals. An array literal breaks onto one line per item when more than
//! one of its items is keyed or when an item spans several lines.

use wpkernel_codegen::builder::{CodeBuilder, CodeFragment, Renderable};

use crate::ast::{
    ArrayItem, BinaryOp, Class, ClassMethod, DocComment, Expr, Param, PhpFile, Printable, Stmt,
};

/// Renders AST nodes to PHP source.
#[derive(Debug, Clone, Copy, Default)]
pub struct Printer;

impl Printer {
    pub fn new() -> Self {
        Self
    }

    pub fn print_file(&self, file: &PhpFile) -> String {
        let mut builder = CodeBuilder::php();
        builder.emit(file);
        builder.build()
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        let mut builder = CodeBuilder::php();
        builder.emit(stmt);
        builder.build()
    }

    pub fn print_stmts(&self, stmts: &[Stmt]) -> String {
        let mut builder = CodeBuilder::php();
        builder.emit(&stmts);
        builder.build()
    }

    pub fn print_class(&self, class: &Class) -> String {
        let mut builder = CodeBuilder::php();
        builder.emit(class);
        builder.build()
    }

    pub fn print_expr(&self, expr: &Expr) -> String {
        expr_to_string(expr)
    }

    /// Pair a statement with its printed lines.
    pub fn printable(&self, stmt: Stmt) -> Printable<Stmt> {
        let lines = self
            .print_stmt(&stmt)
            .lines()
            .map(str::to_string)
            .collect();
        Printable::new(stmt, lines)
    }
}

// Binding strength, tighter binds higher.
const PREC_ASSIGN: u8 = 2;
const PREC_TERNARY: u8 = 3;
const PREC_NOT: u8 = 12;
const PREC_INSTANCEOF: u8 = 13;
const PREC_CAST: u8 = 14;
const PREC_ATOM: u8 = 20;

fn binary_precedence(op: BinaryOp) -> u8 {
    match op {
        BinaryOp::Coalesce => 4,
        BinaryOp::BooleanOr => 5,
        BinaryOp::BooleanAnd => 6,
        BinaryOp::Identical | BinaryOp::NotIdentical | BinaryOp::Equal | BinaryOp::NotEqual => 7,
        BinaryOp::Smaller
        | BinaryOp::SmallerOrEqual
        | BinaryOp::Greater
        | BinaryOp::GreaterOrEqual => 8,
        BinaryOp::Concat => 9,
        BinaryOp::Plus | BinaryOp::Minus => 10,
        BinaryOp::Mul | BinaryOp::Div => 11,
    }
}

fn precedence(expr: &Expr) -> u8 {
    match expr {
        Expr::Assign { .. } => PREC_ASSIGN,
        Expr::Ternary { .. } | Expr::ArrowFunction { .. } => PREC_TERNARY,
        Expr::BinaryOp { op, .. } => binary_precedence(*op),
        Expr::BooleanNot { .. } => PREC_NOT,
        Expr::Instanceof { .. } => PREC_INSTANCEOF,
        Expr::Cast { .. } => PREC_CAST,
        _ => PREC_ATOM,
    }
}

/// Print `expr`, parenthesised when it binds looser than `min`.
fn operand(expr: &Expr, min: u8) -> String {
    let text = expr_to_string(expr);
    if precedence(expr) < min {
        format!("( {text} )")
    } else {
        text
    }
}

/// Print the target of `->`, `::` or `[ ]`.
fn dereferenced(expr: &Expr) -> String {
    match expr {
        Expr::Variable { .. }
        | Expr::ClassConstFetch { .. }
        | Expr::ArrayDimFetch { .. }
        | Expr::PropertyFetch { .. }
        | Expr::MethodCall { .. }
        | Expr::StaticCall { .. }
        | Expr::FuncCall { .. } => expr_to_string(expr),
        _ => format!("( {} )", expr_to_string(expr)),
    }
}

/// Single-quoted PHP string literal.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        if c == '\\' || c == '\'' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

fn args_to_string(args: &[Expr]) -> String {
    if args.is_empty() {
        return "()".to_string();
    }
    let joined = args
        .iter()
        .map(|arg| operand(arg, PREC_ASSIGN + 1))
        .collect::<Vec<_>>()
        .join(", ");
    format!("( {joined} )")
}

fn params_to_string(params: &[Param]) -> String {
    if params.is_empty() {
        return "()".to_string();
    }
    let joined = params
        .iter()
        .map(param_to_string)
        .collect::<Vec<_>>()
        .join(", ");
    format!("( {joined} )")
}

fn param_to_string(param: &Param) -> String {
    let mut out = String::new();
    if let Some(ty) = &param.type_hint {
        out.push_str(ty);
        out.push(' ');
    }
    out.push('$');
    out.push_str(&param.name);
    if let Some(default) = &param.default {
        out.push_str(" = ");
        out.push_str(&expr_to_string(default));
    }
    out
}

fn array_item_to_string(item: &ArrayItem) -> String {
    let value = operand(&item.value, PREC_ASSIGN + 1);
    match &item.key {
        Some(key) => format!("{} => {value}", expr_to_string(key)),
        None => value,
    }
}

fn array_to_string(items: &[ArrayItem]) -> String {
    if items.is_empty() {
        return "array()".to_string();
    }

    let keyed = items.iter().filter(|item| item.key.is_some()).count();
    let printed: Vec<String> = items.iter().map(array_item_to_string).collect();
    if keyed <= 1 && !printed.iter().any(|item| item.contains('\n')) {
        return format!("array( {} )", printed.join(", "));
    }

    let mut out = String::from("array(\n");
    for item in &printed {
        for line in item.lines() {
            out.push('\t');
            out.push_str(line);
            out.push('\n');
        }
        // The comma follows the item's last line.
        out.pop();
        out.push_str(",\n");
    }
    out.push(')');
    out
}

fn expr_to_string(expr: &Expr) -> String {
    match expr {
        Expr::Variable { name } => format!("${name}"),
        Expr::String { value } => quote(value),
        Expr::Int { value } => value.to_string(),
        Expr::ConstFetch { name } => name.to_string(),
        Expr::ClassConstFetch { class, name } => format!("{class}::{name}"),
        Expr::Array { items } => array_to_string(items),
        Expr::ArrayDimFetch { var, dim } => {
            let base = dereferenced(var);
            match dim.as_deref() {
                None => format!("{base}[]"),
                Some(key @ (Expr::String { .. } | Expr::Int { .. })) => {
                    format!("{base}[{}]", expr_to_string(key))
                }
                Some(key) => format!("{base}[ {} ]", expr_to_string(key)),
            }
        }
        Expr::PropertyFetch { var, name } => format!("{}->{name}", dereferenced(var)),
        Expr::FuncCall { name, args } => format!("{name}{}", args_to_string(args)),
        Expr::MethodCall { var, name, args } => {
            format!("{}->{name}{}", dereferenced(var), args_to_string(args))
        }
        Expr::StaticCall { class, name, args } => {
            format!("{class}::{name}{}", args_to_string(args))
        }
        Expr::New { class, args } => format!("new {class}{}", args_to_string(args)),
        Expr::Assign { var, expr } => {
            format!("{} = {}", expr_to_string(var), operand(expr, PREC_ASSIGN))
        }
        Expr::BinaryOp { op, left, right } => {
            let prec = binary_precedence(*op);
            // `??` is right-associative, everything else associates left.
            let (left_min, right_min) = if *op == BinaryOp::Coalesce {
                (prec + 1, prec)
            } else {
                (prec, prec + 1)
            };
            format!(
                "{} {} {}",
                operand(left, left_min),
                op.symbol(),
                operand(right, right_min)
            )
        }
        Expr::BooleanNot { expr } => format!("! {}", operand(expr, PREC_NOT)),
        Expr::Instanceof { expr, class } => {
            format!("{} instanceof {class}", operand(expr, PREC_INSTANCEOF + 1))
        }
        Expr::Cast { kind, expr } => format!("({}) {}", kind.keyword(), operand(expr, PREC_CAST)),
        Expr::Ternary {
            cond,
            if_true,
            if_false,
        } => {
            let cond = operand(cond, PREC_TERNARY + 1);
            let if_false = operand(if_false, PREC_TERNARY + 1);
            match if_true {
                Some(if_true) => {
                    format!("{cond} ? {} : {if_false}", operand(if_true, PREC_TERNARY + 1))
                }
                None => format!("{cond} ?: {if_false}"),
            }
        }
        Expr::Isset { vars } => format!("isset{}", args_to_string(vars)),
        Expr::ArrowFunction {
            is_static,
            params,
            expr,
        } => {
            let prefix = if *is_static { "static " } else { "" };
            format!(
                "{prefix}fn{} => {}",
                params_to_string(params),
                expr_to_string(expr)
            )
        }
        Expr::Match { cond, arms } => {
            let arms = arms
                .iter()
                .map(|arm| {
                    let conds = if arm.conds.is_empty() {
                        "default".to_string()
                    } else {
                        arm.conds
                            .iter()
                            .map(expr_to_string)
                            .collect::<Vec<_>>()
                            .join(", ")
                    };
                    format!("{conds} => {}", expr_to_string(&arm.body))
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!("match ( {} ) {{ {arms} }}", expr_to_string(cond))
        }
    }
}

/// Split possibly multi-line text into line fragments.
fn text_lines(text: &str) -> Vec<CodeFragment> {
    text.lines().map(CodeFragment::line).collect()
}

/// A block whose header may span several lines.
fn block(header: String, body: Vec<CodeFragment>, close: Option<&str>) -> Vec<CodeFragment> {
    let mut lines: Vec<&str> = header.lines().collect();
    let last = lines.pop().unwrap_or_default().to_string();
    let mut fragments: Vec<CodeFragment> = lines.into_iter().map(CodeFragment::line).collect();
    fragments.push(CodeFragment::block(last, body, close.map(str::to_string)));
    fragments
}

fn docblock(doc: &Option<DocComment>) -> Vec<CodeFragment> {
    match doc {
        Some(doc) => vec![CodeFragment::DocBlock(doc.lines.clone())],
        None => Vec::new(),
    }
}

fn if_fragments(cond: &Expr, stmts: &[Stmt], else_stmts: &Option<Vec<Stmt>>, keyword: &str) -> Vec<CodeFragment> {
    let header = format!("{keyword} ( {} ) {{", expr_to_string(cond));
    let body = stmts.to_fragments();

    match else_stmts {
        None => block(header, body, Some("}")),
        Some(else_stmts) => {
            let mut fragments = block(header, body, None);
            match else_stmts.as_slice() {
                [
                    Stmt::If {
                        cond,
                        stmts,
                        else_stmts,
                    },
                ] => fragments.extend(if_fragments(cond, stmts, else_stmts, "} elseif")),
                _ => fragments.push(CodeFragment::block(
                    "} else {",
                    else_stmts.to_fragments(),
                    Some("}".to_string()),
                )),
            }
            fragments
        }
    }
}

impl Renderable for Stmt {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        match self {
            Stmt::Expression { expr } => text_lines(&format!("{};", expr_to_string(expr))),
            Stmt::Return { expr: None } => vec![CodeFragment::line("return;")],
            Stmt::Return { expr: Some(expr) } => {
                text_lines(&format!("return {};", expr_to_string(expr)))
            }
            Stmt::If {
                cond,
                stmts,
                else_stmts,
            } => if_fragments(cond, stmts, else_stmts, "if"),
            Stmt::Foreach {
                expr,
                key_var,
                value_var,
                stmts,
            } => {
                let binding = match key_var {
                    Some(key) => format!("{} => {}", expr_to_string(key), expr_to_string(value_var)),
                    None => expr_to_string(value_var),
                };
                block(
                    format!("foreach ( {} as {binding} ) {{", expr_to_string(expr)),
                    stmts.to_fragments(),
                    Some("}"),
                )
            }
            Stmt::Continue => vec![CodeFragment::line("continue;")],
            Stmt::Nop { comments } if comments.is_empty() => vec![CodeFragment::blank()],
            Stmt::Nop { comments } => comments.iter().map(CodeFragment::line).collect(),
            Stmt::Function {
                name,
                params,
                return_type,
                stmts,
                doc,
            } => {
                let mut fragments = docblock(doc);
                let returns = return_type
                    .as_deref()
                    .map(|ty| format!(": {ty}"))
                    .unwrap_or_default();
                fragments.extend(block(
                    format!("function {name}{}{returns} {{", params_to_string(params)),
                    stmts.to_fragments(),
                    Some("}"),
                ));
                fragments
            }
            Stmt::Class(class) => class.to_fragments(),
        }
    }
}

impl Renderable for ClassMethod {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut fragments = docblock(&self.doc);
        let modifiers = if self.is_static {
            format!("{} static", self.visibility.keyword())
        } else {
            self.visibility.keyword().to_string()
        };
        let returns = self
            .return_type
            .as_deref()
            .map(|ty| format!(": {ty}"))
            .unwrap_or_default();
        fragments.extend(block(
            format!(
                "{modifiers} function {}{}{returns} {{",
                self.name,
                params_to_string(&self.params)
            ),
            self.stmts.to_fragments(),
            Some("}"),
        ));
        fragments
    }
}

impl Renderable for Class {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut fragments = docblock(&self.doc);

        let mut header = String::new();
        if self.is_final {
            header.push_str("final ");
        }
        if self.is_abstract {
            header.push_str("abstract ");
        }
        header.push_str("class ");
        header.push_str(&self.name);
        if let Some(parent) = &self.extends {
            header.push_str(" extends ");
            header.push_str(&parent.to_string());
        }
        header.push_str(" {");

        let mut body = Vec::new();
        for constant in &self.consts {
            body.extend(text_lines(&format!(
                "{} const {} = {};",
                constant.visibility.keyword(),
                constant.name,
                expr_to_string(&constant.value)
            )));
        }
        for (index, method) in self.methods.iter().enumerate() {
            if index > 0 || !self.consts.is_empty() {
                body.push(CodeFragment::blank());
            }
            body.extend(method.to_fragments());
        }

        fragments.push(CodeFragment::block(header, body, Some("}".to_string())));
        fragments
    }
}

impl Renderable for PhpFile {
    fn to_fragments(&self) -> Vec<CodeFragment> {
        let mut fragments = vec![CodeFragment::line("<?php")];
        fragments.extend(docblock(&self.doc));
        if self.strict_types {
            fragments.push(CodeFragment::line("declare(strict_types=1);"));
        }
        if let Some(namespace) = &self.namespace {
            fragments.push(CodeFragment::blank());
            fragments.push(CodeFragment::line(format!("namespace {namespace};")));
        }
        if !self.uses.is_empty() {
            fragments.push(CodeFragment::blank());
            for name in &self.uses {
                fragments.push(CodeFragment::line(format!("use {name};")));
            }
        }
        if !self.stmts.is_empty() {
            fragments.push(CodeFragment::blank());
            fragments.extend(self.stmts.to_fragments());
        }
        fragments
    }
}
