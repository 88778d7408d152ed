//! NaN-box Core: one-word values for dynamic language VMs
//!
//! Every runtime value (a double, an integer, a boolean, null, or an aligned
//! pointer to a heap object) is packed into a single 64-bit word by reusing
//! the unused bit patterns of the IEEE 754 NaN space.
//!
//! Key design principles:
//! - BoxedValue: the opaque word; the only place raw bits are reinterpreted
//! - Unboxed: the safe sum type the rest of a VM matches on
//! - Float and tagged words never alias: NaNs are canonicalized and
//!   ±Infinity lives in a reserved tag block
//!
//! # Modules
//!
//! - `layout`: bit masks and raw word helpers
//! - `tag`: the 4-bit type tag and the reference tags
//! - `error`: codec error taxonomy
//! - `value`: `BoxedValue` constructors and accessors
//! - `unboxed`: decoded sum type
//! - `registry`: consumer tag names, loadable from TOML
//! - `platform`: 48-bit address space checks
//! - `serialize`: serde support
//!
//! # Example
//!
//! ```rust
//! use nanbox_core::{BoxedValue, Unboxed};
//!
//! let n = BoxedValue::from_int(-1)?;
//! assert_eq!(n.as_int()?, -1);
//! assert!(!n.is_float());
//!
//! let inf = BoxedValue::from_float(f64::INFINITY);
//! assert!(inf.is_float());
//! assert_eq!(inf.unbox(), Unboxed::Float(f64::INFINITY));
//! # Ok::<(), nanbox_core::BoxError>(())
//! ```

pub mod error;
pub mod layout;
pub mod platform;
pub mod registry;
pub mod serialize;
pub mod tag;
pub mod unboxed;
pub mod value;

// Re-export key types
pub use error::{BoxError, BoxResult, Kind};
pub use platform::check_address_space;
pub use registry::{ConfigError, RegistryError, TagRegistry};
pub use tag::Tag;
pub use unboxed::Unboxed;
pub use value::{BoxedValue, MAX_ADDRESS, MAX_INT, MIN_INT};
