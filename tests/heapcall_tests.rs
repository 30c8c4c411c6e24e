use heapcall::{
    alloc_narrow_string, alloc_wide_string, allocate_fixed, allocate_movable, free, lock_movable,
    ptr_to_string_narrow, ptr_to_string_wide, raw, unlock_movable, verify, BufferView,
    HeapcallError, Latin1, RawPointer, Utf8, WIDE_UNIT,
};
use proptest::prelude::*;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Allocate, write, read back, free.
#[test]
fn test_fixed_cycle() {
    init_logging();

    let block = verify::check_non_null(allocate_fixed(32)).expect("Failed to allocate memory");
    let buffer = unsafe { std::slice::from_raw_parts_mut(block.as_ptr(), 32) };

    // Verify memory is zeroed
    for &byte in buffer.iter() {
        assert_eq!(byte, 0, "allocated memory not zeroed");
    }

    for byte in buffer.iter_mut() {
        *byte = 1;
        assert_eq!(*byte, 1, "read back data different to what was written");
    }

    verify::check_null(unsafe { free(block) }).expect("Failed to free memory");
}

/// Pins the host's zero-size convention: a real, freeable block.
#[test]
fn test_fixed_zero_size() {
    init_logging();

    let block = allocate_fixed(0);
    assert!(!block.is_null(), "zero-byte fixed allocation should succeed");
    assert!(unsafe { free(block) }.is_null());
}

#[test]
fn test_fixed_failure_is_a_sentinel() {
    init_logging();

    let block = allocate_fixed(usize::MAX);
    assert!(block.is_null(), "impossible allocation should return null");

    match verify::check_non_null(block) {
        Err(HeapcallError::PlatformFailure(_)) => {}
        other => panic!("expected a platform failure, got {:?}", other),
    }
}

#[test]
fn test_movable_cycle() {
    init_logging();

    let handle = allocate_movable(16);
    assert!(!handle.is_null(), "movable allocation failed");

    let block = unsafe { lock_movable(handle) };
    assert!(!block.is_null(), "lock returned null for a live block");
    let bytes = unsafe { std::slice::from_raw_parts_mut(block.as_ptr(), 16) };
    assert!(bytes.iter().all(|&b| b == 0), "movable memory not zeroed");
    bytes[0] = 0x5A;

    // A second lock sees the same bytes.
    let again = unsafe { lock_movable(handle) };
    assert_eq!(unsafe { *again.as_ptr() }, 0x5A);

    assert!(unsafe { unlock_movable(handle) }, "one lock should remain");
    assert!(!unsafe { unlock_movable(handle) }, "block should be unlocked");
    assert!(!unsafe { unlock_movable(handle) }, "unlocking twice reports unlocked");

    verify::check_null(unsafe { free(handle) }).expect("Failed to free movable block");
}

#[test]
fn test_movable_zero_size_is_discarded() {
    init_logging();

    let handle = allocate_movable(0);
    assert!(!handle.is_null(), "zero-byte movable allocation should return a handle");
    assert!(unsafe { lock_movable(handle) }.is_null(), "discarded block has no address");
    assert!(unsafe { free(handle) }.is_null());
}

#[test]
fn test_free_null_is_noop() {
    assert!(unsafe { free(RawPointer::null()) }.is_null());
    assert!(unsafe { free(heapcall::MovableHandle::null()) }.is_null());
}

#[test]
fn test_decode_from_heap_block() {
    init_logging();

    let block = verify::check_non_null(allocate_fixed(8)).expect("Failed to allocate memory");
    let units = [u16::from(b'H'), u16::from(b'i'), 0];
    unsafe {
        std::ptr::copy_nonoverlapping(units.as_ptr().cast::<u8>(), block.as_ptr(), 6);
    }

    let decoded = unsafe { ptr_to_string_wide(block, 6, 0) }.expect("decode failed");
    assert_eq!(decoded, "Hi");

    // Stepping past 'H' with raw arithmetic, then decoding from there.
    let second = raw::add(block, WIDE_UNIT);
    let decoded = unsafe { ptr_to_string_wide(second, 4, 0) }.expect("decode failed");
    assert_eq!(decoded, "i");
    assert_eq!(raw::sub(second, WIDE_UNIT), block);

    // Without the terminator in range.
    assert!(matches!(
        unsafe { ptr_to_string_wide(block, 4, 0) },
        Err(HeapcallError::MissingTerminator { .. })
    ));

    verify::check_null(unsafe { free(block) }).expect("Failed to free memory");
}

#[test]
fn test_decode_null_base_is_out_of_range() {
    assert!(matches!(
        unsafe { ptr_to_string_narrow(RawPointer::null(), 16, 0, &Utf8) },
        Err(HeapcallError::OutOfRange { .. })
    ));
}

#[test]
fn test_wide_string_marshalling() {
    init_logging();

    let text = "Grüße, 世界";
    let block = alloc_wide_string(text).expect("Failed to marshal string");
    let size = (text.encode_utf16().count() + 1) * WIDE_UNIT;

    let decoded = unsafe { ptr_to_string_wide(block, size, 0) }.expect("decode failed");
    assert_eq!(decoded, text);

    assert!(unsafe { free(block) }.is_null());
}

#[test]
fn test_narrow_string_marshalling() {
    init_logging();

    let block = alloc_narrow_string("café", &Latin1).expect("Failed to marshal string");
    let decoded = unsafe { ptr_to_string_narrow(block, 5, 0, &Latin1) }.expect("decode failed");
    assert_eq!(decoded, "café");

    let view = unsafe { BufferView::from_raw(block, 5) }.with_start_offset(3);
    assert_eq!(
        heapcall::decode_narrow(&view, &Latin1).expect("decode failed"),
        "é"
    );
    assert!(unsafe { free(block) }.is_null());

    assert!(matches!(
        alloc_narrow_string("€", &Latin1),
        Err(HeapcallError::InvalidEncoding { .. })
    ));
}

proptest! {
    #[test]
    fn prop_alloc_then_free_succeeds(size in 0_usize..4096) {
        let block = allocate_fixed(size);
        prop_assert!(!block.is_null());
        let freed = unsafe { free(block) };
        prop_assert!(verify::check_null(freed).is_ok());
    }
}
