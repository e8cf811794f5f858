//! Typerighter Core
//!
//! Composable type descriptors that coerce, validate and filter dynamic data.
//!
//! # Core Concepts
//!
//! - [`Definition`]: shared blueprint of a type, composed from its parents
//! - [`Type`]: the contract every configured type instance implements
//! - [`TypeBuilder`]: resolves options into an instance
//! - [`Record`]: named fields, converted recursively with [`FieldPath`] filters
//! - [`View`]: read/write façade binding a record to data
//! - [`TypeRegistry`]: name-keyed store of definitions
//!
//! # Example
//!
//! ```rust,ignore
//! use typerighter_core::prelude::*;
//!
//! let song = Record::define("SongRecord")
//!     .field("name", StringType::builder().required(true).build()?)
//!     .field("track", IntegerType::builder().min(1).build()?)
//!     .build();
//!
//! let record = Record::builder(&song).build()?;
//! let data = Value::from(serde_json::json!({"name": "pride & joy", "track": "3"}));
//! record.validate(&data)?;
//! assert_eq!(record.to_native(&data)?.as_map().unwrap()["track"], Value::Int(3));
//! ```

#![warn(unreachable_pub)]

mod constraint;
mod declaration;
mod definition;
mod error;
mod path;
mod registry;
pub mod types;
mod value;
mod view;

pub use constraint::{Constraint, LengthConstraint, PatternConstraint, RangeConstraint};
pub use declaration::{Declaration, Schematic, SchematicPayload, Settings};
pub use definition::{Definition, DefinitionBuilder, FieldFunction, Validator};
pub use error::{Error, Result};
pub use path::{FieldFilter, FieldPath, PathError};
pub use registry::TypeRegistry;
pub use types::{
    AnyType, BooleanType, Configurable, Direction, FloatType, IntegerType, ItemPolicy, ListType,
    PrimitiveType, Record, StringType, SumType, Type, TypeBuilder, TypeCore, TypeOptions,
};
pub use value::{format_time, Map, Native, Timestamp, Value};
pub use view::{View, ViewMode};

/// Commonly used items
pub mod prelude {
    pub use crate::types::{
        AnyType, BooleanType, Configurable, FloatType, IntegerType, ItemPolicy, ListType,
        PrimitiveType, Record, StringType, SumType, Type, TypeBuilder,
    };
    pub use crate::{
        DefinitionBuilder, Error, FieldPath, Result, TypeRegistry, Value, View, ViewMode,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
