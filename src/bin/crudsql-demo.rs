//! A small fixture CLI: builds the SQL for a canned Insert/Update message pair
//! against an in-memory session and prints what would have been sent, useful
//! for sanity-checking the generator without a live database.

use crudsql::prelude::*;
use crudsql::session::fake::FakeSession;

fn fixture_insert() -> CrudMessage {
    CrudMessage::Insert(InsertMessage {
        collection: Collection { schema: Some("db".into()), name: "t".into() },
        data_model: DataModel::Table,
        projection: vec!["a".into(), "b".into()],
        rows: vec![InsertRow {
            fields: vec![Expr::Literal(Scalar::SInt(1)), Expr::Literal(Scalar::String("x".into()))],
        }],
        args: vec![],
    })
}

fn fixture_update() -> CrudMessage {
    CrudMessage::Update(UpdateMessage {
        collection: Collection { schema: Some("db".into()), name: "c".into() },
        data_model: DataModel::Document,
        operations: vec![
            UpdateOperation {
                source: ColumnIdent { document_path: vec![DocumentPathItem::Member("a".into())], ..Default::default() },
                op: UpdateOpKind::ItemSet,
                value: Some(Expr::Literal(Scalar::SInt(1))),
            },
            UpdateOperation {
                source: ColumnIdent { document_path: vec![DocumentPathItem::Member("b".into())], ..Default::default() },
                op: UpdateOpKind::ItemSet,
                value: Some(Expr::Literal(Scalar::SInt(2))),
            },
        ],
        criteria: None,
        order: vec![],
        limit: None,
        args: vec![],
    })
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut session = FakeSession::new();
    for message in [fixture_insert(), fixture_update()] {
        match dispatch(&message, &mut session) {
            Ok(outcome) => println!(
                "ok: {} (rows_affected={})",
                session.executed.last().unwrap(),
                outcome.rows_affected
            ),
            Err(e) => eprintln!("error [{}]: {e}", e.code()),
        }
    }
}
