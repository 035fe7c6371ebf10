//! # crudsql
//!
//! Translates decoded CRUD wire messages (`Insert`, `Update`, and the
//! extension-point verbs `Find`/`Delete`/view management) into MySQL-flavored
//! SQL text, for an X-protocol-compatible document/relational front-end.
//!
//! The translation core is a recursive, type-directed tree-walk
//! ([`expr_gen`]) over a closed expression sum type ([`model`]), composed by
//! one statement builder per message kind ([`statements`]) and routed by a
//! small [`dispatcher`]. None of it executes or parses SQL itself — it emits
//! a string and hands it to whatever implements [`session::Session`].
//!
//! ```
//! use crudsql::model::*;
//! use crudsql::statements::build_insert;
//!
//! let msg = InsertMessage {
//!     collection: Collection { schema: Some("db".into()), name: "t".into() },
//!     data_model: DataModel::Table,
//!     projection: vec!["a".into()],
//!     rows: vec![InsertRow { fields: vec![Expr::Literal(Scalar::SInt(1))] }],
//!     args: vec![],
//! };
//! assert_eq!(build_insert(&msg).unwrap(), "INSERT INTO `db`.`t` (a) VALUES (1)");
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod escaper;
pub mod expr_gen;
pub mod list_joiner;
pub mod model;
pub mod query_builder;
pub mod recordset;
pub mod session;
pub mod statements;

pub mod prelude {
    pub use crate::config::CrudConfig;
    pub use crate::dispatcher::{dispatch, CrudMessage};
    pub use crate::error::{CrudError, CrudResult};
    pub use crate::model::*;
    pub use crate::session::Session;
    pub use crate::statements::{build_insert, build_update};
}
