use battleship_server::{BitBoard, BitBoardError};

#[test]
fn test_try_new_sizes() {
    // A 10x10 grid fits in a u128
    let ok = BitBoard::<u128, 10>::try_new();
    assert!(ok.is_ok());

    // 12x12 needs 144 bits
    let err = BitBoard::<u128, 12>::try_new();
    assert!(matches!(err, Err(BitBoardError::SizeTooLarge { n: 12, capacity: 128 })));
}

#[test]
fn test_get_set() {
    let mut bb = BitBoard::<u16, 4>::new();
    assert!(bb.is_empty());

    bb.set(1, 1).unwrap();
    assert!(bb.get(1, 1).unwrap());
    assert!(!bb.get(2, 1).unwrap());

    bb.set(2, 3).unwrap();
    assert_eq!(bb.count_ones(), 2);
    assert_eq!(bb.get(4, 0), Err(BitBoardError::IndexOutOfBounds { x: 4, y: 0 }));
}

#[test]
fn test_from_cells_and_iter() {
    let bb = BitBoard::<u16, 4>::from_cells([(3, 3), (0, 1)]).unwrap();
    let bits: Vec<_> = bb.iter_set_bits().collect();
    // Row-major order: y first, then x.
    assert_eq!(bits, vec![(0, 1), (3, 3)]);

    let err = BitBoard::<u16, 4>::from_cells([(0, 0), (0, 4)]);
    assert_eq!(err, Err(BitBoardError::IndexOutOfBounds { x: 0, y: 4 }));
}

#[test]
fn test_not_stays_within_board() {
    let bb = BitBoard::<u128, 10>::from_cells([(0, 0)]).unwrap();
    let inverted = !bb;
    assert_eq!(inverted.count_ones(), 99);
    assert!(!inverted.intersects(&bb));
    assert_eq!((inverted | bb).count_ones(), 100);
}

#[test]
fn test_raw_masks_upper_bits() {
    let bb = BitBoard::<u16, 3>::from_raw(u16::MAX);
    assert_eq!(bb.count_ones(), 9);
    assert_eq!(bb.into_raw(), 0b1_1111_1111);
}
