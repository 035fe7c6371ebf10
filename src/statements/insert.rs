//! `INSERT` statement builder.

use crate::error::{CrudError, CrudResult};
use crate::escaper;
use crate::expr_gen;
use crate::list_joiner;
use crate::model::{DataModel, GeneratorContext, InsertMessage};
use crate::query_builder::QueryBuilder;

/// Build the SQL text for an `Insert` CRUD message.
pub fn build_insert(msg: &InsertMessage) -> CrudResult<String> {
    let relational = msg.data_model == DataModel::Table;
    let ctx = GeneratorContext::new(&msg.args, msg.collection.schema.as_deref(), relational);

    let mut qb = QueryBuilder::new();
    qb.raw("INSERT INTO ");
    add_collection(&mut qb, msg);
    add_projection(&mut qb, msg)?;
    qb.raw(" VALUES ");
    add_values(&mut qb, msg, &ctx)?;
    Ok(qb.into_sql())
}

fn add_collection(qb: &mut QueryBuilder, msg: &InsertMessage) {
    let mut parts = Vec::with_capacity(2);
    if let Some(schema) = &msg.collection.schema {
        parts.push(escaper::quote_identifier(schema));
    }
    parts.push(escaper::quote_identifier(&msg.collection.name));
    qb.raw(&parts.join("."));
}

fn add_projection(qb: &mut QueryBuilder, msg: &InsertMessage) -> CrudResult<()> {
    match msg.data_model {
        DataModel::Table => {
            if !msg.projection.is_empty() {
                qb.raw(" (");
                let cols: Vec<String> = msg
                    .projection
                    .iter()
                    .map(|c| escaper::quote_identifier_if_needed(c))
                    .collect();
                qb.raw(&cols.join(","));
                qb.raw(")");
            }
        }
        DataModel::Document => {
            if !msg.projection.is_empty() {
                return Err(CrudError::BadProjection("Invalid projection for document operation".into()));
            }
            qb.raw(" (doc)");
        }
    }
    Ok(())
}

fn projection_size(msg: &InsertMessage) -> usize {
    match msg.data_model {
        DataModel::Table => msg.projection.len().max(1),
        DataModel::Document => 1,
    }
}

fn add_values(qb: &mut QueryBuilder, msg: &InsertMessage, ctx: &GeneratorContext) -> CrudResult<()> {
    if msg.rows.is_empty() {
        return Err(CrudError::BadProjection("Missing row data for Insert".into()));
    }
    let size = projection_size(msg);
    list_joiner::join(qb, &msg.rows, ",", |qb, row| {
        if row.fields.len() != size {
            return Err(CrudError::BadInsertData(format!(
                "row has {} field(s), expected {size}",
                row.fields.len()
            )));
        }
        qb.raw("(");
        list_joiner::join(qb, &row.fields, ",", |qb, f| expr_gen::generate(qb, f, ctx))?;
        qb.raw(")");
        Ok(())
    })
}
