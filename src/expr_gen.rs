//! The expression generator: a recursive, type-directed tree-walk over [`Expr`]
//! that renders a decoded request expression into SQL text.
//!
//! This replaces the upstream `generator` interface (one small struct per
//! variant, dispatched through a runtime type switch) with a single exhaustive
//! `match` on the `Expr` enum — the sum type already tells the compiler which
//! arms exist, so there's nothing left for a type switch to do.

use crate::error::{CrudError, CrudResult};
use crate::escaper;
use crate::list_joiner;
use crate::model::{ContentType, DocumentPathItem, Expr, GeneratorContext, Operator, Scalar};
use crate::query_builder::QueryBuilder;

/// Render `expr` into `qb`.
pub fn generate(qb: &mut QueryBuilder, expr: &Expr, ctx: &GeneratorContext) -> CrudResult<()> {
    match expr {
        Expr::Ident(col) => generate_ident(qb, col, ctx),
        Expr::Literal(scalar) => generate_scalar(qb, scalar),
        Expr::Variable(name) => {
            qb.raw(name);
            Ok(())
        }
        Expr::FuncCall { name, args } => generate_func_call(qb, name, args, ctx),
        Expr::Operator { op, args } => generate_operator(qb, *op, args, ctx),
        Expr::Placeholder(i) => {
            let scalar = ctx
                .args
                .get(*i)
                .ok_or_else(|| CrudError::ExprBadValue(format!("placeholder {i} out of range")))?;
            generate_scalar(qb, scalar)
        }
        Expr::Object(fields) => generate_object(qb, fields, ctx),
        Expr::Array(items) => generate_array(qb, items, ctx),
    }
}

/// Render a `ColumnIdent` reference, wrapping in `JSON_EXTRACT` when a document
/// path is present.
fn generate_ident(qb: &mut QueryBuilder, col: &crate::model::ColumnIdent, ctx: &GeneratorContext) -> CrudResult<()> {
    if col.schema_name.is_some() && col.table_name.is_none() {
        return Err(CrudError::ExprMissingArg(
            "schema name given without a table name".into(),
        ));
    }
    if ctx.relational && col.table_name.is_some() && col.name.is_none() && !col.document_path.is_empty() {
        return Err(CrudError::ExprMissingArg(
            "Column name required when a document path is given".into(),
        ));
    }

    let mut parts = Vec::with_capacity(3);
    if let Some(schema) = &col.schema_name {
        parts.push(schema.as_str());
    }
    if let Some(table) = &col.table_name {
        parts.push(table.as_str());
    }
    let col_name = col.name.as_deref().unwrap_or("doc");
    parts.push(col_name);
    let rendered: Vec<String> = parts.iter().map(|p| escaper::quote_identifier(p)).collect();
    let base = rendered.join(".");

    if col.document_path.is_empty() {
        qb.raw(&base);
    } else {
        let path = generate_document_path(&col.document_path)?;
        qb.raw("JSON_EXTRACT(").raw(&base).raw(",").raw(&path).raw(")");
    }
    Ok(())
}

/// Render a document path as a single-quoted JSONPath string literal.
///
/// A lone empty-valued `Member` (the root document itself) renders as the bare
/// `'$'`; anything else is `'$` followed by one segment per path item.
pub fn generate_document_path(path: &[DocumentPathItem]) -> CrudResult<String> {
    if let [DocumentPathItem::Member(v)] = path {
        if v.is_empty() {
            return Ok("'$'".to_string());
        }
    }

    let mut s = String::from("'$");
    for item in path {
        match item {
            DocumentPathItem::Member(name) => {
                if name.is_empty() {
                    return Err(CrudError::ExprBadTypeValue("empty member name in document path".into()));
                }
                s.push('.');
                s.push_str(&escaper::quote_identifier_if_needed(name));
            }
            DocumentPathItem::MemberAsterisk => s.push_str(".*"),
            DocumentPathItem::ArrayIndex(n) => {
                s.push('[');
                s.push_str(&n.to_string());
                s.push(']');
            }
            DocumentPathItem::ArrayIndexAsterisk => s.push_str("[*]"),
            DocumentPathItem::DoubleAsterisk => s.push_str("**"),
        }
    }
    s.push('\'');
    Ok(s)
}

fn generate_scalar(qb: &mut QueryBuilder, scalar: &Scalar) -> CrudResult<()> {
    match scalar {
        Scalar::UInt(n) => {
            qb.put(*n);
        }
        Scalar::SInt(n) => {
            qb.put(*n);
        }
        Scalar::Null => {
            qb.raw("NULL");
        }
        Scalar::Bool(b) => {
            qb.raw(if *b { "TRUE" } else { "FALSE" });
        }
        Scalar::Double(f) => {
            qb.put(*f);
        }
        Scalar::Float(f) => {
            qb.put(*f as f64);
        }
        Scalar::String(s) => {
            qb.quote_string(s);
        }
        Scalar::Octets { bytes, content_type } => {
            let text = String::from_utf8_lossy(bytes);
            match content_type {
                ContentType::Plain | ContentType::Xml => {
                    qb.quote_string(&text);
                }
                ContentType::Geometry => {
                    qb.raw("ST_GEOMETRYFROMWKB(");
                    qb.quote_string(&text);
                    qb.raw(")");
                }
                ContentType::Json => {
                    qb.raw("CAST(");
                    qb.quote_string(&text);
                    qb.raw(" AS JSON)");
                }
            }
        }
    }
    Ok(())
}

/// Known MySQL/JSON built-ins that should never be schema-qualified even when a
/// default schema is configured.
fn is_builtin_func(name: &str) -> bool {
    name.contains('.') || name.chars().all(|c| c.is_ascii_uppercase() || c == '_' || c.is_ascii_digit())
}

fn resolve_func_name(name: &str, ctx: &GeneratorContext) -> String {
    if is_builtin_func(name) {
        return name.to_string();
    }
    match ctx.default_schema {
        Some(schema) => format!("{schema}.{name}"),
        None => name.to_string(),
    }
}

fn generate_func_call(qb: &mut QueryBuilder, name: &str, args: &[Expr], ctx: &GeneratorContext) -> CrudResult<()> {
    let resolved = resolve_func_name(name, ctx);
    qb.raw(&resolved).raw("(");
    list_joiner::join(qb, args, ",", |qb, a| generate_func_arg(qb, a, ctx))?;
    qb.raw(")");
    Ok(())
}

/// A function argument whose own generation yields a `JSON_EXTRACT` is wrapped
/// in `JSON_UNQUOTE` so the un-typed JSON value compares/combines as a scalar.
fn generate_func_arg(qb: &mut QueryBuilder, expr: &Expr, ctx: &GeneratorContext) -> CrudResult<()> {
    if let Expr::Ident(col) = expr {
        if !col.document_path.is_empty() {
            qb.raw("JSON_UNQUOTE(");
            generate(qb, expr, ctx)?;
            qb.raw(")");
            return Ok(());
        }
    }
    generate(qb, expr, ctx)
}

/// Same `JSON_UNQUOTE` wrapping rule as `generate_func_arg`, applied to an
/// operand being compared directly against a scalar literal.
fn generate_comparable(qb: &mut QueryBuilder, expr: &Expr, ctx: &GeneratorContext, other_is_literal: bool) -> CrudResult<()> {
    if other_is_literal {
        if let Expr::Ident(col) = expr {
            if !col.document_path.is_empty() {
                qb.raw("JSON_UNQUOTE(");
                generate(qb, expr, ctx)?;
                qb.raw(")");
                return Ok(());
            }
        }
    }
    generate(qb, expr, ctx)
}

fn require_args(args: &[Expr], n: usize) -> CrudResult<()> {
    if args.len() != n {
        return Err(CrudError::ExprMissingArg(format!(
            "operator requires {n} argument(s), got {}",
            args.len()
        )));
    }
    Ok(())
}

fn op_symbol(op: Operator) -> &'static str {
    use Operator::*;
    match op {
        Eq => "=",
        Ne => "<>",
        Lt => "<",
        Lte => "<=",
        Gt => ">",
        Gte => ">=",
        Like => "LIKE",
        Regexp => "REGEXP",
        Is => "IS",
        IsNot => "IS NOT",
        Overlaps => "OVERLAPS",
        Add => "+",
        Sub => "-",
        Mul => "*",
        Div => "/",
        BitAnd => "&",
        BitOr => "|",
        BitXor => "^",
        ShiftLeft => "<<",
        ShiftRight => ">>",
        _ => unreachable!("op_symbol called for a non-infix operator"),
    }
}

fn cast_type_name(expr: &Expr) -> CrudResult<String> {
    match expr {
        Expr::Variable(name) => Ok(name.clone()),
        _ => Err(CrudError::ExprBadTypeValue(
            "CAST target type must be a bare type name".into(),
        )),
    }
}

fn generate_operator(qb: &mut QueryBuilder, op: Operator, args: &[Expr], ctx: &GeneratorContext) -> CrudResult<()> {
    use Operator::*;
    match op {
        Eq | Ne | Lt | Lte | Gt | Gte | Like | Regexp | Is | IsNot | Overlaps => {
            require_args(args, 2)?;
            qb.raw("(");
            generate_comparable(qb, &args[0], ctx, matches!(&args[1], Expr::Literal(_)))?;
            qb.raw(" ").raw(op_symbol(op)).raw(" ");
            generate_comparable(qb, &args[1], ctx, matches!(&args[0], Expr::Literal(_)))?;
            qb.raw(")");
        }
        And | Or => {
            if args.is_empty() {
                return Err(CrudError::ExprMissingArg("AND/OR requires at least one argument".into()));
            }
            let sep = if matches!(op, And) { " AND " } else { " OR " };
            qb.raw("(");
            list_joiner::join(qb, args, sep, |qb, a| generate(qb, a, ctx))?;
            qb.raw(")");
        }
        Not => {
            require_args(args, 1)?;
            qb.raw("NOT (");
            generate(qb, &args[0], ctx)?;
            qb.raw(")");
        }
        Between => {
            require_args(args, 3)?;
            qb.raw("(");
            generate(qb, &args[0], ctx)?;
            qb.raw(" BETWEEN ");
            generate(qb, &args[1], ctx)?;
            qb.raw(" AND ");
            generate(qb, &args[2], ctx)?;
            qb.raw(")");
        }
        In => {
            if args.is_empty() {
                return Err(CrudError::ExprMissingArg("IN requires a left-hand operand".into()));
            }
            generate(qb, &args[0], ctx)?;
            qb.raw(" IN (");
            list_joiner::join(qb, &args[1..], ",", |qb, a| generate(qb, a, ctx))?;
            qb.raw(")");
        }
        Add | Sub | Mul | Div => {
            require_args(args, 2)?;
            qb.raw("(");
            generate(qb, &args[0], ctx)?;
            qb.raw(" ").raw(op_symbol(op)).raw(" ");
            generate(qb, &args[1], ctx)?;
            qb.raw(")");
        }
        Mod => {
            require_args(args, 2)?;
            qb.raw("MOD(");
            generate(qb, &args[0], ctx)?;
            qb.raw(",");
            generate(qb, &args[1], ctx)?;
            qb.raw(")");
        }
        BitAnd | BitOr | BitXor | ShiftLeft | ShiftRight => {
            require_args(args, 2)?;
            qb.raw("(");
            generate(qb, &args[0], ctx)?;
            qb.raw(" ").raw(op_symbol(op)).raw(" ");
            generate(qb, &args[1], ctx)?;
            qb.raw(")");
        }
        BitNot => {
            require_args(args, 1)?;
            qb.raw("(~");
            generate(qb, &args[0], ctx)?;
            qb.raw(")");
        }
        Cast => {
            require_args(args, 2)?;
            qb.raw("CAST(");
            generate(qb, &args[0], ctx)?;
            qb.raw(" AS ");
            qb.raw(&cast_type_name(&args[1])?);
            qb.raw(")");
        }
    }
    Ok(())
}

fn generate_object(qb: &mut QueryBuilder, fields: &[(String, Expr)], ctx: &GeneratorContext) -> CrudResult<()> {
    qb.raw("JSON_OBJECT(");
    list_joiner::join(qb, fields, ",", |qb, (k, v)| {
        if k.is_empty() {
            return Err(CrudError::ExprBadValue("empty object key".into()));
        }
        qb.quote_string(k);
        qb.raw(",");
        generate(qb, v, ctx)
    })?;
    qb.raw(")");
    Ok(())
}

fn generate_array(qb: &mut QueryBuilder, items: &[Expr], ctx: &GeneratorContext) -> CrudResult<()> {
    qb.raw("JSON_ARRAY(");
    list_joiner::join(qb, items, ",", |qb, v| generate(qb, v, ctx))?;
    qb.raw(")");
    Ok(())
}
