//! @ai:module:intent Decide whether a nullness change between two API versions breaks callers
//! @ai:module:layer domain
//! @ai:module:public_api Role, Regression, Verdict, compatible
//! @ai:module:stateless true
//!
//! Parameters are contravariant: accepting more (`@NonNull` → `@Nullable`) is
//! safe, accepting less is not. Returns are covariant: promising more is safe,
//! promising less is not. Dropping an explicit annotation is always a
//! regression; adding one where none existed never is.

use crate::model::Nullability;
use serde::{Deserialize, Serialize};

/// @ai:intent Position of a type in a declaration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Parameter,
    /// Method returns and fields.
    Return,
}

/// @ai:intent Why a nullness change is incompatible
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum Regression {
    RemovedNullable,
    RemovedNonNull,
    NarrowedParameter,
    WidenedReturn,
}

/// @ai:intent Outcome of comparing two nullness states
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Ok,
    Regressed(Regression),
}

impl Verdict {
    pub fn is_ok(&self) -> bool {
        matches!(self, Verdict::Ok)
    }
}

/// @ai:intent Compute the compatibility verdict for a nullness change
/// @ai:example (Nullable, NonNull, Parameter) -> Regressed(NarrowedParameter)
/// @ai:example (Nullable, NonNull, Return) -> Ok
/// @ai:example (Unspecified, Nullable, _) -> Ok
/// @ai:effects pure
pub fn compatible(old: Nullability, new: Nullability, role: Role) -> Verdict {
    use Nullability::*;

    match (old, new, role) {
        (Nullable, Unspecified, _) => Verdict::Regressed(Regression::RemovedNullable),
        (NonNull, Unspecified, _) => Verdict::Regressed(Regression::RemovedNonNull),
        (Nullable, NonNull, Role::Parameter) => Verdict::Regressed(Regression::NarrowedParameter),
        (NonNull, Nullable, Role::Return) => Verdict::Regressed(Regression::WidenedReturn),
        _ => Verdict::Ok,
    }
}
