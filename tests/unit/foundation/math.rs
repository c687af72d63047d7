use super::*;

#[test]
fn premul8_matches_rounded_division() {
    for c in 0..=255u32 {
        for a in 0..=255u32 {
            let expected = ((f64::from(c * a) / 255.0).round()) as u8;
            assert_eq!(premul8(c as u8, a as u8), expected, "c={c} a={a}");
        }
    }
}

#[test]
fn premul8_identity_and_zero() {
    for c in 0..=255u8 {
        assert_eq!(premul8(c, 255), c);
        assert_eq!(premul8(c, 0), 0);
    }
}

#[test]
fn mul_div255_rounds_to_nearest() {
    assert_eq!(mul_div255(255, 255), 255);
    assert_eq!(mul_div255(0, 255), 0);
    assert_eq!(mul_div255(128, 255), 128);
    assert_eq!(mul_div255(200, 128), 100);
    for x in 0..=255u16 {
        assert_eq!(mul_div255(x, 255), x as u8);
    }
}

#[test]
fn pack_bgra_is_little_endian_byte_order() {
    assert_eq!(pack_bgra(1, 2, 3, 4).to_le_bytes(), [1, 2, 3, 4]);
}

#[test]
fn mip_extent_rounds_up() {
    assert_eq!(mip_extent(5, 0), 5);
    assert_eq!(mip_extent(5, 1), 3);
    assert_eq!(mip_extent(5, 2), 2);
    assert_eq!(mip_extent(5, 3), 1);
    assert_eq!(mip_extent(5, 12), 1);
    assert_eq!(mip_extent(0, 3), 0);
    assert_eq!(mip_extent(u32::MAX, 40), 1);
}

#[test]
fn checked_buffer_len_detects_overflow() {
    assert_eq!(checked_buffer_len(4, 3, 4), Some(48));
    assert_eq!(checked_buffer_len(u32::MAX, u32::MAX, usize::MAX), None);
}
