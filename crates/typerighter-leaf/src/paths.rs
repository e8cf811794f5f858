//! File-system path types

use std::sync::Arc;

use once_cell::sync::Lazy;
use typerighter_core::Definition;

use crate::pattern::{pattern_definition, PatternKind, PatternType};

const UNIX_ABSPATH: &str = r"(?i)^(?:/[\w^ ]+)+/?[\w.]+[^.]$";

/// Absolute Unix path that does not end in a dot
#[derive(Debug, Clone, Copy)]
pub struct UnixPath;

impl PatternKind for UnixPath {
    const NAME: &'static str = "UnixPathType";

    fn pattern() -> &'static str {
        UNIX_ABSPATH
    }

    fn definition() -> &'static Arc<Definition> {
        static DEFINITION: Lazy<Arc<Definition>> =
            Lazy::new(|| pattern_definition::<UnixPath>().build());
        &DEFINITION
    }
}

/// Absolute Unix path
pub type UnixPathType = PatternType<UnixPath>;
