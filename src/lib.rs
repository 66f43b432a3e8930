// Copyright 2026 the Kerf Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Offset curves, stroke expansion and dashing for 2D vector paths.
//!
//! Kerf turns a path made of lines, quadratic and cubic Béziers into
//!
//! - a parallel path at a signed distance ([`offset`], [`offset_path`]),
//! - a closed outline which, filled with the nonzero winding rule, covers
//!   the area painted by a stroke of a given width, joins, caps and dash
//!   pattern ([`stroke`], [`stroke_path`]),
//! - the "on" pieces of a dash pattern ([`dash`], [`dash_path`]).
//!
//! Curves are offset by fitting cubic Béziers to the exact offset curve to
//! within a caller-supplied tolerance, after cusps and loops in the source
//! curve have been detected and nudged away.
//!
//! The public boundary ([`Path`], [`Shape`], [`Point32`]) uses single
//! precision; the engines and the geometry types they are built on
//! ([`BezPath`], [`CubicBez`], [`Point`] and friends) use double precision
//! and are public as well.
//!
//! # Examples
//!
//! Stroking a line:
//! ```
//! use kerf::{stroke, Cap, Join, Path, Stroke};
//!
//! let path = Path::from_svg("M0 0 L10 0").unwrap();
//! let style = Stroke::new(2.0).with_join(Join::Bevel).with_caps(Cap::Butt);
//! let outline = stroke(&path, &style, 0.1);
//! assert_eq!(outline.len(), 1);
//! assert_eq!(outline.contours()[0].to_svg(), "M0 -1 L10 -1 L10 1 L0 1 Z");
//! ```
//!
//! Offsetting a closed path inwards:
//! ```
//! use kerf::{offset, Join, Path};
//!
//! let square = Path::from_svg("M0 0 L10 0 L10 10 L0 10 Z").unwrap();
//! let inset = offset(&square, 1.0, Join::Miter, 4.0, 0.1, false);
//! assert_eq!(inset.to_svg(), "M1 1 L9 1 L9 9 L1 9 L1 1 Z");
//! ```
//!
//! # Feature Flags
//!
//! The following crate [feature flags](https://doc.rust-lang.org/cargo/reference/features.html#dependency-features) are available:
//!
//! - `std` (enabled by default): Get floating point functions from the standard library
//!   (likely using your target's libc).
//! - `libm`: Use floating point implementations from [libm][].
//!   This is useful for `no_std` environments.
//!   However, note that the `libm` crate is not as efficient as the standard library.
//! - `mint`: Enable `From`/`Into` conversion of Kerf and [mint][] types, enabling interoperability
//!   with other graphics libraries.
//! - `serde`: Implement `serde::Deserialize` and `serde::Serialize` on various types.
//! - `schemars`: Add best-effort support for using Kerf types in JSON schemas using [schemars][].
//!
//! At least one of `std` and `libm` is required; `std` overrides `libm`.
//! Note that Kerf requires that an allocator is available (i.e. it uses [alloc]).
//!
//! # Diagnostics
//!
//! The engines never fail: degenerate and non-finite input produces
//! degenerate output rather than an error. Where a fallback is taken, an
//! event is emitted through [tracing][]; the library installs no
//! subscriber.
//!
//! [libm]: https://docs.rs/libm
//! [mint]: https://docs.rs/mint
//! [schemars]: https://docs.rs/schemars
//! [tracing]: https://docs.rs/tracing

// LINEBENDER LINT SET - lib.rs - v1
// See https://linebender.org/wiki/canonical-lints/
// These lints aren't included in Cargo.toml because they
// shouldn't apply to examples and tests
#![warn(unused_crate_dependencies)]
#![warn(clippy::print_stdout, clippy::print_stderr)]
#![cfg_attr(target_pointer_width = "64", warn(clippy::trivially_copy_pass_by_ref))]
// END LINEBENDER LINT SET
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![allow(
    clippy::unreadable_literal,
    clippy::many_single_char_names,
    clippy::excessive_precision,
    clippy::bool_to_int_with_if
)]
// The following lints are part of the Linebender standard set,
// but resolving them has been deferred for now.
// Feel free to send a PR that solves one or more of these.
#![allow(
    missing_debug_implementations,
    elided_lifetimes_in_paths,
    single_use_lifetimes,
    trivial_numeric_casts,
    unnameable_types,
    clippy::use_self,
    clippy::return_self_not_must_use,
    clippy::cast_possible_truncation,
    clippy::wildcard_imports,
    clippy::shadow_unrelated,
    clippy::missing_assert_message,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::exhaustive_enums,
    clippy::match_same_arms,
    clippy::partial_pub_fields,
    clippy::unseparated_literal_suffix,
    clippy::duplicated_attributes,
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason
)]
#![cfg_attr(all(not(feature = "std"), not(test)), no_std)]

#[cfg(not(any(feature = "std", feature = "libm")))]
compile_error!("kerf requires either the `std` or `libm` feature");

// Suppress the unused_crate_dependencies lint when both std and libm are specified.
#[cfg(all(feature = "std", feature = "libm"))]
use libm as _;

// The benches use criterion.
#[cfg(test)]
use criterion as _;

extern crate alloc;

mod affine;
mod arc;
mod bezpath;
pub mod common;
mod cubicbez;
mod dash;
mod intersect;
mod line;
mod offset;
mod offset_path;
mod ops;
mod param_curve;
mod path;
mod point;
mod quadbez;
mod rect;
mod stroke;
mod svg;
mod vec2;

pub use crate::affine::*;
pub use crate::arc::*;
pub use crate::bezpath::*;
pub use crate::cubicbez::*;
pub use crate::dash::*;
pub use crate::intersect::*;
pub use crate::line::*;
pub use crate::offset::*;
pub use crate::offset_path::*;
pub use crate::ops::*;
pub use crate::param_curve::*;
pub use crate::path::*;
pub use crate::point::*;
pub use crate::quadbez::*;
pub use crate::rect::*;
pub use crate::stroke::*;
pub use crate::svg::*;
pub use crate::vec2::*;
