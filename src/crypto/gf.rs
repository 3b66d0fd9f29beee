//! GF(2^8) arithmetic under the Rijndael polynomial x^8+x^4+x^3+x+1.
//!
//! Addition in the field is XOR. Multiplication by a constant coefficient is
//! split into doublings: `powers[k]` holds the state multiplied by 2^k, and a
//! product picks the powers that correspond to the set bits of the
//! coefficient.
//!
//! Nothing here branches on, or indexes a table by, a state byte. Every
//! selection goes through an all-ones / all-zeros mask built with
//! `0u8.wrapping_sub(bit)`.

use crate::block::Block;

/// Spread bit 0 of `bit` over the whole byte: `1 -> 0xFF`, `0 -> 0x00`.
#[inline(always)]
fn mask(bit: u8) -> u8 {
    0u8.wrapping_sub(bit & 1)
}

/// Multiply by x (i.e. by 2) in GF(2^8).
///
/// The reduction constant 0x1B is applied when the high bit shifts out.
#[inline(always)]
pub(crate) fn double(b: u8) -> u8 {
    (b << 1) ^ (0x1B & mask(b >> 7))
}

/// Double every byte of a block.
#[inline]
pub(crate) fn double_block(b: &Block) -> Block {
    Block(b.0.map(double))
}

/// Multiply the byte at (`row`, `col`) of the state by `coeff`.
///
/// `coeff` must fit in four bits; bit k selects `powers[k]`.
#[inline(always)]
fn mul(powers: &[Block; 4], row: usize, col: usize, coeff: u8) -> u8 {
    let i = 4 * col + row;
    (powers[0][i] & mask(coeff))
        ^ (powers[1][i] & mask(coeff >> 1))
        ^ (powers[2][i] & mask(coeff >> 2))
        ^ (powers[3][i] & mask(coeff >> 3))
}

/// Dot product of column `col` of the state with `coeffs`.
///
/// This is one output byte of MixColumns (coefficients are rotations of
/// `[2, 3, 1, 1]`) or InvMixColumns (rotations of `[14, 11, 13, 9]`).
#[inline(always)]
pub(crate) fn dot(powers: &[Block; 4], col: usize, coeffs: [u8; 4]) -> u8 {
    mul(powers, 0, col, coeffs[0])
        ^ mul(powers, 1, col, coeffs[1])
        ^ mul(powers, 2, col, coeffs[2])
        ^ mul(powers, 3, col, coeffs[3])
}

#[cfg(test)]
mod tests {
    use super::*;

    // Schoolbook multiply, only used as a reference.
    fn slow_mul(mut a: u8, mut b: u8) -> u8 {
        let mut p = 0u8;
        while b != 0 {
            if b & 1 != 0 {
                p ^= a;
            }
            let hi = a & 0x80 != 0;
            a <<= 1;
            if hi {
                a ^= 0x1B;
            }
            b >>= 1;
        }
        p
    }

    fn powers_of(state: Block) -> [Block; 4] {
        let p1 = double_block(&state);
        let p2 = double_block(&p1);
        let p3 = double_block(&p2);
        [state, p1, p2, p3]
    }

    #[test]
    fn double_reduces_on_overflow() {
        assert_eq!(double(0x57), 0xAE);
        assert_eq!(double(0xAE), 0x47);
        assert_eq!(double(0x80), 0x1B);
        assert_eq!(double(0x00), 0x00);
    }

    #[test]
    fn double_agrees_with_reference() {
        for b in 0..=255u8 {
            assert_eq!(double(b), slow_mul(b, 2));
        }
    }

    #[test]
    fn mul_agrees_with_reference_for_all_mix_coefficients() {
        for b in 0..=255u8 {
            let powers = powers_of(Block([b; 16]));
            for coeff in [1u8, 2, 3, 9, 11, 13, 14] {
                assert_eq!(mul(&powers, 0, 0, coeff), slow_mul(b, coeff));
            }
        }
    }

    #[test]
    fn dot_mixes_a_known_column() {
        // FIPS-197 MixColumns example: db 13 53 45 -> 8e 4d a1 bc
        let mut state = Block::ZERO;
        state.0[..4].copy_from_slice(&[0xDB, 0x13, 0x53, 0x45]);
        let powers = powers_of(state);
        assert_eq!(dot(&powers, 0, [2, 3, 1, 1]), 0x8E);
        assert_eq!(dot(&powers, 0, [1, 2, 3, 1]), 0x4D);
        assert_eq!(dot(&powers, 0, [1, 1, 2, 3]), 0xA1);
        assert_eq!(dot(&powers, 0, [3, 1, 1, 2]), 0xBC);
    }
}
