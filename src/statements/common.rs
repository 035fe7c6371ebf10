//! `WHERE` / `ORDER BY` / `LIMIT` clause helpers shared by every statement
//! builder.

use crate::error::{CrudError, CrudResult};
use crate::expr_gen;
use crate::list_joiner;
use crate::model::{Expr, GeneratorContext, Limit, Order, SortDirection};
use crate::query_builder::QueryBuilder;

/// Append ` WHERE <expr>`, or nothing if `criteria` is absent.
pub fn add_filter(qb: &mut QueryBuilder, criteria: &Option<Expr>, ctx: &GeneratorContext) -> CrudResult<()> {
    let Some(expr) = criteria else { return Ok(()) };
    qb.raw(" WHERE ");
    expr_gen::generate(qb, expr, ctx)
}

/// Append ` ORDER BY ...`, or nothing if `order` is empty.
pub fn add_order(qb: &mut QueryBuilder, order: &[Order], ctx: &GeneratorContext) -> CrudResult<()> {
    if order.is_empty() {
        return Ok(());
    }
    qb.raw(" ORDER BY ");
    list_joiner::join(qb, order, ",", |qb, term| {
        expr_gen::generate(qb, &term.expr, ctx)?;
        qb.raw(match term.direction {
            SortDirection::Asc => " ASC",
            SortDirection::Desc => " DESC",
        });
        Ok(())
    })
}

/// Append ` LIMIT n [OFFSET m]`, or nothing if `limit` is absent.
///
/// `allow_offset = false` rejects a message that supplies an offset where the
/// calling statement kind doesn't support one.
pub fn add_limit(qb: &mut QueryBuilder, limit: &Option<Limit>, allow_offset: bool) -> CrudResult<()> {
    let Some(limit) = limit else { return Ok(()) };
    if limit.offset.is_some() && !allow_offset {
        return Err(CrudError::BadMessage("OFFSET is not supported for this statement".into()));
    }
    qb.raw(" LIMIT ");
    qb.put(limit.row_count);
    if let Some(offset) = limit.offset {
        qb.raw(" OFFSET ");
        qb.put(offset);
    }
    Ok(())
}
