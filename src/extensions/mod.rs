//! Optional checks layered on top of JSON Type Definition.
//!
//! Every extension here is breaking: a schema or instance that is fine under
//! plain JTD may be rejected once the extension is enabled.

mod disallow_empty_mappings;
mod disallow_leap_seconds;
pub mod x_checks;

use crate::extension::Extension;

/// Rejects discriminator schemas with an empty `mapping`, which no instance
/// could ever satisfy.
pub const DISALLOW_EMPTY_MAPPINGS: Extension =
    Extension::new("disallow-empty-mappings", disallow_empty_mappings::install);

/// Rejects `timestamp` values whose seconds are `60`.
pub const DISALLOW_LEAP_SECONDS: Extension =
    Extension::new("disallow-leap-seconds", disallow_leap_seconds::install);

/// Enables the `x:checks` schema property. See [`x_checks`].
pub const X_CHECKS: Extension = Extension::new("x:checks", x_checks::install);
