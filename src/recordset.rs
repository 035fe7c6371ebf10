//! The record-set adapter: wraps a result iterator to expose the small
//! contract a CRUD reply needs (`fields`, `do_each`, `first_row`, `rows`).
//!
//! This is a separate, non-core module: the generator never constructs or
//! consumes a `RecordSet` itself, it only hands a SQL string to `Session`.

use crate::error::CrudResult;
use crate::session::FieldInfo;
use std::collections::HashMap;

/// One returned row, as a column-name-keyed map of JSON-ish values.
pub type Row = HashMap<String, serde_json::Value>;

/// A source of rows, decoupled from any particular driver's cursor type.
pub trait RowSource {
    fn fields(&self) -> Vec<FieldInfo>;
    /// Pull the next row, if any.
    fn next(&mut self) -> CrudResult<Option<Row>>;
}

/// Adapts a `RowSource` into the `fields / do_each / first_row / rows` contract.
pub struct RecordSet<S: RowSource> {
    source: S,
}

impl<S: RowSource> RecordSet<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn fields(&self) -> Vec<FieldInfo> {
        self.source.fields()
    }

    /// Iterate rows, calling `f(row)` for each. `f` returns `Ok(true)` to keep
    /// going; `Ok(false)` or an error stops iteration. The underlying source is
    /// exhausted (not just paused) on every exit path, mirroring the
    /// `defer Plan.Close()` guarantee this is grounded on.
    pub fn do_each(&mut self, mut f: impl FnMut(&Row) -> CrudResult<bool>) -> CrudResult<()> {
        loop {
            match self.source.next()? {
                None => return Ok(()),
                Some(row) => {
                    if !f(&row)? {
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Fetch the first row, if any, and stop.
    pub fn first_row(&mut self) -> CrudResult<Option<Row>> {
        let mut first = None;
        self.do_each(|row| {
            first = Some(row.clone());
            Ok(false)
        })?;
        Ok(first)
    }

    /// Skip `offset` rows, then collect up to `limit` (`limit < 0` = unbounded,
    /// `limit == 0` = none).
    pub fn rows(&mut self, limit: i64, offset: u64) -> CrudResult<Vec<Row>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut skipped = 0u64;
        let mut remaining = limit;
        let mut out = Vec::new();
        self.do_each(|row| {
            if skipped < offset {
                skipped += 1;
                return Ok(true);
            }
            out.push(row.clone());
            if remaining > 0 {
                remaining -= 1;
                Ok(remaining > 0 || limit < 0)
            } else {
                Ok(true)
            }
        })?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct VecSource {
        rows: std::vec::IntoIter<Row>,
    }

    impl VecSource {
        fn new(n: usize) -> Self {
            let rows = (0..n)
                .map(|i| {
                    let mut r = Row::new();
                    r.insert("i".to_string(), json!(i));
                    r
                })
                .collect::<Vec<_>>()
                .into_iter();
            Self { rows }
        }
    }

    impl RowSource for VecSource {
        fn fields(&self) -> Vec<FieldInfo> {
            vec![FieldInfo { name: "i".into() }]
        }
        fn next(&mut self) -> CrudResult<Option<Row>> {
            Ok(self.rows.next())
        }
    }

    #[test]
    fn test_first_row() {
        let mut rs = RecordSet::new(VecSource::new(3));
        let row = rs.first_row().unwrap().unwrap();
        assert_eq!(row["i"], json!(0));
    }

    #[test]
    fn test_rows_unbounded() {
        let mut rs = RecordSet::new(VecSource::new(5));
        let rows = rs.rows(-1, 0).unwrap();
        assert_eq!(rows.len(), 5);
    }

    #[test]
    fn test_rows_zero_limit() {
        let mut rs = RecordSet::new(VecSource::new(5));
        let rows = rs.rows(0, 0).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_rows_offset_then_limit() {
        let mut rs = RecordSet::new(VecSource::new(10));
        let rows = rs.rows(3, 5).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0]["i"], json!(5));
        assert_eq!(rows[2]["i"], json!(7));
    }
}
