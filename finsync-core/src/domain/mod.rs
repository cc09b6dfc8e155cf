//! Domain types shared by every stage of the pipeline.

pub mod data_type;
pub mod payload;
pub mod row;
pub mod scalar;

pub use data_type::{table_name_for, DataType, Frequency, Statement, UnknownDataType};
pub use payload::{FlatRecord, RawPayload, RowTable, WideTable};
pub use row::{NaturalKey, NormalizedRow};
pub use scalar::Scalar;
