//! Error handling foundation for the copper-finch platform.
//!
//! Domain crates keep their own typed error enums; this module only
//! provides the `Result` alias that wraps them in a rootcause `Report`
//! at crate boundaries. Layers add context with `.context()` as errors
//! propagate upward, so a caller sees both the typed root cause and the
//! path it travelled.

use rootcause::Report;

/// Workspace-wide Result alias over a rootcause `Report`.
///
/// `C` is the typed domain error carried as the report's context. The
/// `?` operator lifts a bare domain error into a report, so boundary
/// functions can call typed-error APIs directly.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
