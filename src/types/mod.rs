//! # Value and Type System
//!
//! The scalar cell type shared by frames, parameters and pins, and the
//! inferred column type used when frames are materialized.
//!
//! ## Key Types
//!
//! | Type         | Purpose                                        |
//! |--------------|------------------------------------------------|
//! | `Value`      | One scalar: cell, parameter or scalar pin      |
//! | `ColumnType` | Common type of a column's non-null cells       |
//!
//! ## Usage
//!
//! ```ignore
//! use frameql::types::{ColumnType, Value};
//!
//! let cells = vec![Value::Int(1), Value::Float(0.5)];
//! assert_eq!(ColumnType::infer(&cells), ColumnType::Float);
//! ```

mod data_type;
mod value;

pub use data_type::ColumnType;
pub use value::Value;
