//! Typerighter Leaf Types
//!
//! Ready-made leaf types built on the core [`Type`](typerighter_core::Type)
//! contract: network addresses, locators, identifiers, paths, digests and
//! timestamps.
//!
//! Most are a [`PatternType`] over a [`PatternKind`]: a string type whose
//! `regex` option is preset to the kind's pattern. Identifiers and
//! timestamps have their own conversion.
//!
//! # Example
//!
//! ```rust,ignore
//! use typerighter_core::prelude::*;
//! use typerighter_leaf::{DateTimeType, UrlType};
//!
//! let website = UrlType::builder().build()?;
//! website.validate(&Value::from("http://word.com"))?;
//!
//! let created = DateTimeType::builder().build()?;
//! let native = created.to_native(&Value::from("2012-07-24T23:14:29-07:00"))?;
//! ```

#![warn(unreachable_pub)]

mod digest;
mod ids;
mod net;
mod paths;
mod pattern;
mod timekeeping;

use typerighter_core::{Configurable, Result, TypeRegistry};

pub use digest::{DigestKind, Md5, Md5Type, Sha1, Sha1Type};
pub use ids::UuidType;
pub use net::{
    Email, EmailType, IpAddress, IpAddressType, Ipv4, Ipv4Type, Ipv6, Ipv6Type, MacAddress,
    MacAddressType, Url, UrlType,
};
pub use paths::{UnixPath, UnixPathType};
pub use pattern::{pattern_definition, PatternKind, PatternType};
pub use timekeeping::{parse_datetime, parse_time, DateTimeType, TimeType};

/// Register every leaf definition
///
/// # Errors
/// Returns [`Error::Uncachable`](typerighter_core::Error::Uncachable) when
/// the registry's base is not the core `Type` definition
pub fn register_all(registry: &TypeRegistry) -> Result<()> {
    let definitions = [
        IpAddress::definition(),
        Ipv4::definition(),
        Ipv6::definition(),
        MacAddress::definition(),
        Url::definition(),
        Email::definition(),
        UnixPath::definition(),
        Md5::definition(),
        Sha1::definition(),
        UuidType::base_definition(),
        DateTimeType::base_definition(),
        TimeType::base_definition(),
    ];
    for definition in definitions {
        registry.register(std::sync::Arc::clone(definition))?;
    }
    tracing::debug!(count = definitions.len(), "registered leaf types");
    Ok(())
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
