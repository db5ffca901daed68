mod aggregate;
mod pivot;
mod transaction;

pub use aggregate::{AggregateCell, DateCells, PivotResult};
pub use pivot::PivotType;
pub use transaction::{Aggressor, RawTransactionRecord};
