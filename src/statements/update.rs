//! `UPDATE` statement builder.
//!
//! Table mode groups maximal runs of consecutive operations that share both a
//! column name and an operation kind into a single SQL function call per run.
//! Document mode composes nested JSON function calls, one per run, outermost
//! first, around the literal `doc` column.

use crate::error::{CrudError, CrudResult};
use crate::escaper;
use crate::expr_gen;
use crate::list_joiner;
use crate::model::{ColumnIdent, DataModel, DocumentPathItem, GeneratorContext, UpdateMessage, UpdateOpKind, UpdateOperation};
use crate::query_builder::QueryBuilder;
use crate::statements::common;

/// Build the SQL text for an `Update` CRUD message.
pub fn build_update(msg: &UpdateMessage) -> CrudResult<String> {
    if msg.operations.is_empty() {
        return Err(CrudError::BadUpdateData("Update requires at least one operation".into()));
    }

    let relational = msg.data_model == DataModel::Table;
    let ctx = GeneratorContext::new(&msg.args, msg.collection.schema.as_deref(), relational);

    let mut qb = QueryBuilder::new();
    qb.raw("UPDATE ");
    add_collection(&mut qb, msg);
    qb.raw(" SET ");
    match msg.data_model {
        DataModel::Table => build_table_operations(&mut qb, &msg.operations, &ctx)?,
        DataModel::Document => {
            let frag = build_document_ops(&msg.operations, &ctx)?;
            qb.raw("doc=").raw(&frag);
        }
    }
    common::add_filter(&mut qb, &msg.criteria, &ctx)?;
    common::add_order(&mut qb, &msg.order, &ctx)?;
    common::add_limit(&mut qb, &msg.limit, true)?;
    Ok(qb.into_sql())
}

fn add_collection(qb: &mut QueryBuilder, msg: &UpdateMessage) {
    let mut parts = Vec::with_capacity(2);
    if let Some(schema) = &msg.collection.schema {
        parts.push(escaper::quote_identifier(schema));
    }
    parts.push(escaper::quote_identifier(&msg.collection.name));
    qb.raw(&parts.join("."));
}

/// Find the exclusive end index of the run starting at `start`: the first
/// index where either the column name or the operation kind differs from
/// `ops[start]`, or `ops.len()` if the run reaches the end of the slice.
fn find_run_end(ops: &[UpdateOperation], start: usize) -> usize {
    let mut end = start + 1;
    while end < ops.len() {
        if ops[end].source.name != ops[start].source.name || ops[end].op != ops[start].op {
            break;
        }
        end += 1;
    }
    end
}

fn validate_table_source(source: &ColumnIdent) -> CrudResult<&str> {
    if source.schema_name.is_some() || source.table_name.is_some() {
        return Err(CrudError::BadColumnToUpdate(
            "table-mode update operations must reference a bare column name".into(),
        ));
    }
    match source.name.as_deref() {
        Some(name) if !name.is_empty() => Ok(name),
        _ => Err(CrudError::BadColumnToUpdate("update operation is missing a column name".into())),
    }
}

fn build_table_operations(qb: &mut QueryBuilder, ops: &[UpdateOperation], ctx: &GeneratorContext) -> CrudResult<()> {
    let mut i = 0;
    let mut first = true;
    while i < ops.len() {
        let end = find_run_end(ops, i);
        if !first {
            qb.raw(",");
        }
        first = false;
        add_table_run(qb, &ops[i..end], ctx)?;
        i = end;
    }
    Ok(())
}

fn add_table_run(qb: &mut QueryBuilder, run: &[UpdateOperation], ctx: &GeneratorContext) -> CrudResult<()> {
    let col_name = validate_table_source(&run[0].source)?.to_string();
    let op = run[0].op;

    match op {
        UpdateOpKind::Set => list_joiner::join(qb, run, ",", |qb, item| {
            validate_table_source(&item.source)?;
            if !item.source.document_path.is_empty() {
                return Err(CrudError::BadTypeOfUpdate("SET does not accept a document_path".into()));
            }
            let name = item.source.name.as_deref().unwrap();
            qb.raw(&escaper::quote_identifier_if_needed(name));
            qb.raw("=");
            let value = item
                .value
                .as_ref()
                .ok_or_else(|| CrudError::BadUpdateData("SET requires a value".into()))?;
            expr_gen::generate(qb, value, ctx)
        }),
        UpdateOpKind::ItemRemove => {
            qb.raw(&escaper::quote_identifier(&col_name));
            qb.raw("=JSON_REMOVE(");
            qb.raw(&escaper::quote_identifier(&col_name));
            for item in run {
                validate_table_source(&item.source)?;
                if item.value.is_some() {
                    return Err(CrudError::BadUpdateData("ITEM_REMOVE does not accept a value".into()));
                }
                qb.raw(",");
                qb.raw(&expr_gen::generate_document_path(&item.source.document_path)?);
            }
            qb.raw(")");
            Ok(())
        }
        UpdateOpKind::ItemSet | UpdateOpKind::ItemReplace | UpdateOpKind::ArrayInsert | UpdateOpKind::ArrayAppend => {
            let func = json_func_name(op);
            qb.raw(&escaper::quote_identifier(&col_name));
            qb.raw("=").raw(func).raw("(");
            qb.raw(&escaper::quote_identifier(&col_name));
            for item in run {
                validate_table_source(&item.source)?;
                qb.raw(",");
                qb.raw(&expr_gen::generate_document_path(&item.source.document_path)?);
                qb.raw(",");
                let value = item
                    .value
                    .as_ref()
                    .ok_or_else(|| CrudError::BadUpdateData(format!("{func} requires a value")))?;
                expr_gen::generate(qb, value, ctx)?;
            }
            qb.raw(")");
            Ok(())
        }
        UpdateOpKind::ItemMerge => {
            qb.raw(&escaper::quote_identifier(&col_name));
            qb.raw("=JSON_MERGE(");
            qb.raw(&escaper::quote_identifier(&col_name));
            for item in run {
                validate_table_source(&item.source)?;
                qb.raw(",");
                let value = item
                    .value
                    .as_ref()
                    .ok_or_else(|| CrudError::BadUpdateData("ITEM_MERGE requires a value".into()))?;
                expr_gen::generate(qb, value, ctx)?;
            }
            qb.raw(")");
            Ok(())
        }
    }
}

fn json_func_name(op: UpdateOpKind) -> &'static str {
    match op {
        UpdateOpKind::ItemSet => "JSON_SET",
        UpdateOpKind::ItemReplace => "JSON_REPLACE",
        UpdateOpKind::ArrayInsert => "JSON_ARRAY_INSERT",
        UpdateOpKind::ArrayAppend => "JSON_ARRAY_APPEND",
        _ => unreachable!("json_func_name called for a non-path update op"),
    }
}

/// Validate a single document-mode operation item: no column reference, a
/// document_path beginning with a member (except ITEM_MERGE, which has none),
/// and a hard ban on targeting the root `_id` member.
fn validate_document_item(item: &UpdateOperation) -> CrudResult<()> {
    if item.source.schema_name.is_some() || item.source.table_name.is_some() || item.source.name.is_some() {
        return Err(CrudError::BadColumnToUpdate(
            "document update operations must not reference a column name".into(),
        ));
    }

    if item.op == UpdateOpKind::ItemMerge {
        return Ok(());
    }

    match item.source.document_path.first() {
        Some(DocumentPathItem::Member(_)) | Some(DocumentPathItem::MemberAsterisk) => {}
        _ => {
            return Err(CrudError::BadMemberToUpdate(
                "document_path must begin with a member".into(),
            ));
        }
    }

    if let [DocumentPathItem::Member(name)] = item.source.document_path.as_slice() {
        if name == "_id" {
            return Err(CrudError::BadColumnToUpdate(
                "Forbidden update operation on '$._id' member".into(),
            ));
        }
    }

    if item.op == UpdateOpKind::ItemRemove && item.value.is_some() {
        return Err(CrudError::BadUpdateData("ITEM_REMOVE does not accept a value".into()));
    }

    Ok(())
}

/// Recursively assemble the nested JSON expression, innermost run first in
/// recursion order but outermost in the resulting string.
fn build_document_ops(ops: &[UpdateOperation], ctx: &GeneratorContext) -> CrudResult<String> {
    if ops.is_empty() {
        return Ok("doc".to_string());
    }
    let end = find_run_end(ops, 0);
    let run = &ops[..end];
    let inner = build_document_ops(&ops[end..], ctx)?;
    apply_document_run(run, &inner, ctx)
}

fn apply_document_run(run: &[UpdateOperation], inner: &str, ctx: &GeneratorContext) -> CrudResult<String> {
    for item in run {
        validate_document_item(item)?;
    }
    let op = run[0].op;
    let mut qb = QueryBuilder::new();
    match op {
        UpdateOpKind::Set => {
            return Err(CrudError::BadTypeOfUpdate("SET is not valid for document mode".into()));
        }
        UpdateOpKind::ItemRemove => {
            qb.raw("JSON_REMOVE(").raw(inner);
            for item in run {
                qb.raw(",");
                qb.raw(&expr_gen::generate_document_path(&item.source.document_path)?);
            }
            qb.raw(")");
        }
        UpdateOpKind::ItemSet | UpdateOpKind::ItemReplace | UpdateOpKind::ArrayInsert | UpdateOpKind::ArrayAppend => {
            let func = json_func_name(op);
            qb.raw(func).raw("(").raw(inner);
            for item in run {
                qb.raw(",");
                qb.raw(&expr_gen::generate_document_path(&item.source.document_path)?);
                qb.raw(",");
                let value = item
                    .value
                    .as_ref()
                    .ok_or_else(|| CrudError::BadUpdateData(format!("{func} requires a value")))?;
                expr_gen::generate(&mut qb, value, ctx)?;
            }
            qb.raw(")");
        }
        UpdateOpKind::ItemMerge => {
            qb.raw("JSON_MERGE(").raw(inner);
            for item in run {
                let value = item
                    .value
                    .as_ref()
                    .ok_or_else(|| CrudError::BadUpdateData("ITEM_MERGE requires a value".into()))?;
                let mut value_qb = QueryBuilder::new();
                expr_gen::generate(&mut value_qb, value, ctx)?;
                let value_sql = value_qb.into_sql();
                qb.raw(",IF(JSON_TYPE(")
                    .raw(&value_sql)
                    .raw(")='OBJECT',JSON_REMOVE(")
                    .raw(&value_sql)
                    .raw(",'$._id'),'_ERROR_')");
            }
            qb.raw(")");
        }
    }
    Ok(qb.into_sql())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Collection, Expr, Operator, Scalar};
    use pretty_assertions::assert_eq;

    fn op(name: &str, kind: UpdateOpKind, value: Option<Expr>) -> UpdateOperation {
        UpdateOperation {
            source: ColumnIdent { name: Some(name.into()), ..Default::default() },
            op: kind,
            value,
        }
    }

    fn doc_op(path: Vec<DocumentPathItem>, kind: UpdateOpKind, value: Option<Expr>) -> UpdateOperation {
        UpdateOperation {
            source: ColumnIdent { document_path: path, ..Default::default() },
            op: kind,
            value,
        }
    }

    #[test]
    fn test_table_set_with_filter() {
        let msg = UpdateMessage {
            collection: Collection { schema: Some("db".into()), name: "t".into() },
            data_model: DataModel::Table,
            operations: vec![
                op("a", UpdateOpKind::Set, Some(Expr::Literal(Scalar::SInt(1)))),
                op("b", UpdateOpKind::Set, Some(Expr::Literal(Scalar::SInt(2)))),
            ],
            criteria: Some(Expr::Operator {
                op: Operator::Gt,
                args: vec![
                    Expr::Ident(ColumnIdent { name: Some("a".into()), ..Default::default() }),
                    Expr::Literal(Scalar::SInt(0)),
                ],
            }),
            order: vec![],
            limit: None,
            args: vec![],
        };
        assert_eq!(
            build_update(&msg).unwrap(),
            "UPDATE `db`.`t` SET a=1,b=2 WHERE (`a` > 0)"
        );
    }

    #[test]
    fn test_document_fused_json_set_run() {
        let msg = UpdateMessage {
            collection: Collection { schema: Some("db".into()), name: "c".into() },
            data_model: DataModel::Document,
            operations: vec![
                doc_op(vec![DocumentPathItem::Member("a".into())], UpdateOpKind::ItemSet, Some(Expr::Literal(Scalar::SInt(1)))),
                doc_op(vec![DocumentPathItem::Member("b".into())], UpdateOpKind::ItemSet, Some(Expr::Literal(Scalar::SInt(2)))),
            ],
            criteria: None,
            order: vec![],
            limit: None,
            args: vec![],
        };
        assert_eq!(
            build_update(&msg).unwrap(),
            "UPDATE `db`.`c` SET doc=JSON_SET(doc,'$.a',1,'$.b',2)"
        );
    }

    #[test]
    fn test_document_forbidden_id_update() {
        let msg = UpdateMessage {
            collection: Collection { schema: None, name: "c".into() },
            data_model: DataModel::Document,
            operations: vec![doc_op(vec![DocumentPathItem::Member("_id".into())], UpdateOpKind::ItemRemove, None)],
            criteria: None,
            order: vec![],
            limit: None,
            args: vec![],
        };
        let err = build_update(&msg).unwrap_err();
        assert_eq!(err.code(), "ER_X_BAD_COLUMN_TO_UPDATE");
    }

    #[test]
    fn test_empty_operations_rejected() {
        let msg = UpdateMessage {
            collection: Collection { schema: None, name: "t".into() },
            data_model: DataModel::Table,
            operations: vec![],
            criteria: None,
            order: vec![],
            limit: None,
            args: vec![],
        };
        let err = build_update(&msg).unwrap_err();
        assert_eq!(err.code(), "ER_X_BAD_UPDATE_DATA");
    }

    #[test]
    fn test_distinct_runs_not_fused() {
        let msg = UpdateMessage {
            collection: Collection { schema: None, name: "c".into() },
            data_model: DataModel::Document,
            operations: vec![
                doc_op(vec![DocumentPathItem::Member("a".into())], UpdateOpKind::ItemSet, Some(Expr::Literal(Scalar::SInt(1)))),
                doc_op(vec![DocumentPathItem::Member("b".into())], UpdateOpKind::ItemRemove, None),
            ],
            criteria: None,
            order: vec![],
            limit: None,
            args: vec![],
        };
        assert_eq!(
            build_update(&msg).unwrap(),
            "UPDATE `c` SET doc=JSON_SET(JSON_REMOVE(doc,'$.b'),'$.a',1)"
        );
    }

    #[test]
    fn test_document_item_merge_guards_id() {
        let msg = UpdateMessage {
            collection: Collection { schema: None, name: "c".into() },
            data_model: DataModel::Document,
            operations: vec![UpdateOperation {
                source: ColumnIdent::default(),
                op: UpdateOpKind::ItemMerge,
                value: Some(Expr::Object(vec![("x".into(), Expr::Literal(Scalar::SInt(1)))])),
            }],
            criteria: None,
            order: vec![],
            limit: None,
            args: vec![],
        };
        assert_eq!(
            build_update(&msg).unwrap(),
            "UPDATE `c` SET doc=JSON_MERGE(doc,IF(JSON_TYPE(JSON_OBJECT('x',1))='OBJECT',\
             JSON_REMOVE(JSON_OBJECT('x',1),'$._id'),'_ERROR_'))"
        );
    }
}
