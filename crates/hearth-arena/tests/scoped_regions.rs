//! Integration tests: arena + scoped region lifecycles as the frame loop
//! uses them.

use hearth_arena::{Arena, ArenaConfig, ArenaError};
use hearth_core::ErrorKind;

#[test]
fn region_capacity_scenario() {
    let mut block = vec![0u8; 1024];
    let mut arena = Arena::new(&mut block);

    // Open a 256-byte region and allocate 100 bytes from it.
    let mut region = arena.open_region(256, true).unwrap();
    arena.region_alloc(&mut region, 100).unwrap();
    assert_eq!(region.used(), 100);

    // 200 more would exceed the 256-byte reservation.
    let err = arena.region_alloc(&mut region, 200).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Capacity);
    assert_eq!(region.used(), 100);

    // Closing returns the arena to empty.
    arena.close_region(&mut region).unwrap();
    assert_eq!(arena.used(), 0);

    // A larger region can now be opened and filled completely.
    let mut bigger = arena.open_region(300, true).unwrap();
    arena.region_alloc(&mut bigger, 300).unwrap();
    assert_eq!(bigger.used(), 300);
    arena.close_region(&mut bigger).unwrap();
    assert_eq!(arena.used(), 0);
}

#[test]
fn lifo_violation_then_correct_unwind() {
    let mut block = vec![0u8; 512];
    let mut arena = Arena::new(&mut block);
    arena.alloc(16).unwrap();

    let mut r1 = arena.open_region(100, false).unwrap();
    let after_r1 = arena.used();
    let mut r2 = arena.open_region(50, false).unwrap();
    assert_eq!(arena.used(), after_r1 + 50);

    let err = arena.close_region(&mut r1).unwrap_err();
    assert!(matches!(err, ArenaError::OutOfOrderClose { .. }));
    assert!(err.kind().is_usage_error());

    arena.close_region(&mut r2).unwrap();
    assert_eq!(arena.used(), after_r1);
    arena.close_region(&mut r1).unwrap();
    assert_eq!(arena.used(), 16);
}

#[test]
fn permanent_and_transient_arenas_are_independent() {
    let mut permanent_block = vec![0u8; 256];
    let mut transient_block = vec![0u8; 256];
    let mut permanent = Arena::new(&mut permanent_block);
    let mut transient = Arena::with_config(&mut transient_block, &ArenaConfig::uninitialised());

    let world = permanent.push_array::<u32>(8).unwrap();
    permanent.slice_mut(&world).unwrap().fill(7);

    for frame in 0..10u32 {
        let mut scratch = transient.open_region(128, true).unwrap();
        // Permanent allocations keep working while a transient region is open.
        let _ = permanent.alloc(1).unwrap();
        let tmp = transient.region_push_array::<u32>(&mut scratch, 16).unwrap();
        transient.slice_mut(&tmp).unwrap().fill(frame);
        transient.close_region(&mut scratch).unwrap();
        assert_eq!(transient.used(), 0);
    }

    assert_eq!(permanent.slice(&world).unwrap(), &[7; 8]);
    assert_eq!(transient.high_water(), 128);
}
