//! Join a sequence of sub-generations with a separator, short-circuiting on the
//! first error. An empty input produces an empty fragment — not an error — since
//! an empty projection list or empty operand list is a legitimate, well-formed
//! SQL fragment in several of the call sites that use this.

use crate::error::CrudResult;
use crate::query_builder::QueryBuilder;

/// Call `f(qb, item)` for each item in `items`, writing `sep` between
/// consecutive calls. Stops and propagates the error from the first `f` call
/// that fails.
pub fn join<T>(
    qb: &mut QueryBuilder,
    items: &[T],
    sep: &str,
    mut f: impl FnMut(&mut QueryBuilder, &T) -> CrudResult<()>,
) -> CrudResult<()> {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            qb.raw(sep);
        }
        f(qb, item)?;
    }
    Ok(())
}
