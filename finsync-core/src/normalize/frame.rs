//! Conversions between pipeline scalars and a polars `DataFrame`.

use crate::domain::Scalar;
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;

/// `NaiveDate::num_days_from_ce` of 1970-01-01, the polars `Date` epoch.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Builds a typed column from loosely-typed cells.
///
/// Homogeneous cells keep their type (ints and floats widen to `Float64`);
/// anything mixed falls back to strings so no value is lost.
pub fn scalar_column(name: &str, cells: &[Scalar]) -> PolarsResult<Column> {
    let name = PlSmallStr::from(name);
    let mut kinds = CellKinds::default();
    for cell in cells {
        kinds.observe(cell);
    }

    let column = match kinds.single() {
        None => Column::full_null(name, cells.len(), &DataType::Null),
        Some(Kind::Bool) => Column::new(
            name,
            cells
                .iter()
                .map(|c| match c {
                    Scalar::Bool(b) => Some(*b),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        ),
        Some(Kind::Int) => Column::new(
            name,
            cells
                .iter()
                .map(|c| match c {
                    Scalar::Int(i) => Some(*i),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        ),
        Some(Kind::Float) => Column::new(
            name,
            cells
                .iter()
                .map(|c| match c {
                    Scalar::Int(i) => Some(*i as f64),
                    Scalar::Float(x) => Some(*x),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        ),
        Some(Kind::Date) => Column::new(
            name,
            cells
                .iter()
                .map(|c| match c {
                    Scalar::Date(d) => Some(d.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )
        .cast(&DataType::Date)?,
        Some(Kind::Text) => Column::new(
            name,
            cells
                .iter()
                .map(|c| (!c.is_null()).then(|| c.to_string()))
                .collect::<Vec<_>>(),
        ),
    };
    Ok(column)
}

/// Reads a polars cell back into a scalar.
pub fn any_to_scalar(value: AnyValue<'_>) -> Scalar {
    match value {
        AnyValue::Null => Scalar::Null,
        AnyValue::Boolean(b) => Scalar::Bool(b),
        AnyValue::Int32(i) => Scalar::Int(i64::from(i)),
        AnyValue::Int64(i) => Scalar::Int(i),
        AnyValue::Float64(x) => Scalar::Float(x),
        AnyValue::String(s) => Scalar::Text(s.to_string()),
        AnyValue::StringOwned(s) => Scalar::Text(s.to_string()),
        AnyValue::Date(days) => {
            NaiveDate::from_num_days_from_ce_opt(days + UNIX_EPOCH_DAYS_FROM_CE)
                .map(Scalar::Date)
                .unwrap_or(Scalar::Null)
        }
        other => Scalar::Text(other.to_string()),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Bool,
    Int,
    Float,
    Date,
    Text,
}

#[derive(Default)]
struct CellKinds {
    bool: bool,
    int: bool,
    float: bool,
    date: bool,
    text: bool,
}

impl CellKinds {
    fn observe(&mut self, cell: &Scalar) {
        match cell {
            Scalar::Null => {}
            Scalar::Bool(_) => self.bool = true,
            Scalar::Int(_) => self.int = true,
            Scalar::Float(_) => self.float = true,
            Scalar::Date(_) => self.date = true,
            Scalar::Text(_) => self.text = true,
        }
    }

    /// The one polars type that can hold every observed cell; `None` when all cells are null.
    fn single(&self) -> Option<Kind> {
        let numeric = self.int || self.float;
        let families = [self.bool, numeric, self.date, self.text]
            .iter()
            .filter(|seen| **seen)
            .count();
        match families {
            0 => None,
            1 if self.bool => Some(Kind::Bool),
            1 if self.float => Some(Kind::Float),
            1 if self.int => Some(Kind::Int),
            1 if self.date => Some(Kind::Date),
            _ => Some(Kind::Text),
        }
    }
}
