//! Platform assumptions
//!
//! Pointer payloads are 48 bits wide. That matches the x86-64 and ARM64
//! user-space address conventions, but the codec cannot prove it from the
//! types alone, so it is checked twice:
//!
//! - at compile time, the target must be 64-bit;
//! - at startup, [`check_address_space`] probes live heap, stack and static
//!   addresses and fails if any of them would not fit in a payload, or if
//!   the allocator hands out a heap block that is not 8-byte aligned.
//!
//! A VM should call [`check_address_space`] once before boxing its first
//! pointer. Later calls return the cached verdict.

use std::sync::OnceLock;

use static_assertions::{assert_eq_size, assert_impl_all, const_assert};
use tracing::{debug, error};

use crate::error::BoxError;
use crate::layout::{PAYLOAD_MASK, POINTER_ALIGN_MASK};
use crate::value::BoxedValue;

// 64-bit targets only
const_assert!(cfg!(target_pointer_width = "64"));
assert_eq_size!(usize, u64);
assert_eq_size!(*const (), u64);
assert_eq_size!(BoxedValue, u64);
assert_eq_size!(BoxedValue, f64);
assert_impl_all!(BoxedValue: Copy, Send, Sync);

static ADDRESS_SPACE: OnceLock<Result<(), BoxError>> = OnceLock::new();

/// `true` if `addr` fits in a pointer payload
#[inline(always)]
pub const fn fits_pointer(addr: usize) -> bool {
    (addr as u64) <= PAYLOAD_MASK
}

/// Verify that this process hands out aligned addresses inside the 48-bit range
///
/// Runs the probe on first use and caches the result.
pub fn check_address_space() -> Result<(), BoxError> {
    *ADDRESS_SPACE.get_or_init(probe)
}

fn probe() -> Result<(), BoxError> {
    let heap = Box::new(0u64);
    // 1-byte alignment requested, so only the allocator decides
    let byte = Box::new(0u8);
    let stack = 0u64;

    let byte_addr = &*byte as *const u8 as usize;
    if byte_addr as u64 & POINTER_ALIGN_MASK != 0 {
        error!(
            addr = format_args!("{:#x}", byte_addr),
            "heap allocation is not 8-byte aligned"
        );
        return Err(BoxError::MisalignedPointer(byte_addr as u64));
    }

    let samples = [
        ("heap", &*heap as *const u64 as usize),
        ("heap byte", byte_addr),
        ("stack", &stack as *const u64 as usize),
        ("static", &ADDRESS_SPACE as *const _ as usize),
    ];

    for (region, addr) in samples {
        if !fits_pointer(addr) {
            error!(
                region,
                addr = format_args!("{:#x}", addr),
                "address does not fit in a 48-bit pointer payload"
            );
            return Err(BoxError::AddressSpaceTooWide(addr));
        }
    }

    debug!("address space probe passed: heap pointers are aligned and fit in 48 bits");
    Ok(())
}
