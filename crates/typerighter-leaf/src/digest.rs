//! Hex-encoded message digests
//!
//! Each digest type carries a fixed-width hex pattern and a `digest`
//! validator that decodes the value and checks its byte length, including
//! when the `regex` option is overridden.

use std::sync::Arc;

use once_cell::sync::Lazy;
use typerighter_core::{Definition, Error, Result, Type, Value};

use crate::pattern::{pattern_definition, PatternKind, PatternType};

/// Digest algorithms and their output width
pub trait DigestKind: PatternKind {
    /// Digest length in bytes
    const BYTES: usize;
}

fn check_digest<K: DigestKind>(_: &dyn Type, value: &Value) -> Result<()> {
    let Value::Str(text) = value else {
        return Ok(());
    };
    if text.is_empty() {
        return Ok(());
    }
    let bytes = hex::decode(text)
        .map_err(|e| Error::validation(format!("{} is not valid hex: {e}", K::NAME)))?;
    if bytes.len() != K::BYTES {
        return Err(Error::validation(format!(
            "{} must be {} bytes, got {}",
            K::NAME,
            K::BYTES,
            bytes.len()
        )));
    }
    Ok(())
}

/// MD5 digest
#[derive(Debug, Clone, Copy)]
pub struct Md5;

impl DigestKind for Md5 {
    const BYTES: usize = 16;
}

impl PatternKind for Md5 {
    const NAME: &'static str = "MD5Type";

    fn pattern() -> &'static str {
        "(?i)^[0-9a-f]{32}$"
    }

    fn definition() -> &'static Arc<Definition> {
        static DEFINITION: Lazy<Arc<Definition>> = Lazy::new(|| {
            pattern_definition::<Md5>()
                .validator("digest", check_digest::<Md5>)
                .build()
        });
        &DEFINITION
    }
}

/// SHA-1 digest
#[derive(Debug, Clone, Copy)]
pub struct Sha1;

impl DigestKind for Sha1 {
    const BYTES: usize = 20;
}

impl PatternKind for Sha1 {
    const NAME: &'static str = "SHA1Type";

    fn pattern() -> &'static str {
        "(?i)^[0-9a-f]{40}$"
    }

    fn definition() -> &'static Arc<Definition> {
        static DEFINITION: Lazy<Arc<Definition>> = Lazy::new(|| {
            pattern_definition::<Sha1>()
                .validator("digest", check_digest::<Sha1>)
                .build()
        });
        &DEFINITION
    }
}

/// Hex MD5 digest
pub type Md5Type = PatternType<Md5>;
/// Hex SHA-1 digest
pub type Sha1Type = PatternType<Sha1>;
