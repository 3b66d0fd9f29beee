//! Property tests: round trips, CTR streaming and CCM authenticity.

use aeskit::crypto::ccm::nonce_iv;
use aeskit::{Aes, CcmParams, Error, Mode};
use proptest::prelude::*;

fn raw_key() -> impl Strategy<Value = Vec<u8>> {
    prop_oneof![Just(16usize), Just(24), Just(32)].prop_flat_map(|n| prop::collection::vec(any::<u8>(), n))
}

fn aligned_data() -> impl Strategy<Value = Vec<u8>> {
    (1usize..6).prop_flat_map(|blocks| prop::collection::vec(any::<u8>(), blocks * 16))
}

fn context(mode: Mode, key: &[u8], iv: &[u8; 16]) -> Aes<'static> {
    Aes::init(mode, key.len() as u32 * 8, key, Some(iv)).unwrap()
}

// CCM context with a nonce taken from the right end of `iv`.
fn ccm<'a>(key: &[u8], iv: &[u8; 16], params: CcmParams, aad: &'a [u8]) -> Aes<'a> {
    let iv = nonce_iv(&iv[16 - params.nonce_len()..]).unwrap();
    let mut aes = Aes::init(Mode::Ccm, key.len() as u32 * 8, key, Some(&iv)).unwrap();
    aes.set_ccm_params(params).unwrap();
    aes.set_associated_data(aad).unwrap();
    aes
}

// Payloads drawn below stay under 256 bytes, so every L from 1 up fits.
fn ccm_params() -> impl Strategy<Value = CcmParams> {
    (1usize..=8, 2usize..=8).prop_map(|(l, half_tag)| CcmParams::new(l, half_tag * 2).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn block_modes_round_trip(key in raw_key(), iv in any::<[u8; 16]>(), data in aligned_data()) {
        for mode in [Mode::Ecb, Mode::Cbc] {
            let mut ct = vec![0u8; data.len()];
            context(mode, &key, &iv).encrypt(&mut ct, &data).unwrap();
            let mut pt = vec![0u8; data.len()];
            context(mode, &key, &iv).decrypt(&mut pt, &ct).unwrap();
            prop_assert_eq!(&pt, &data);
        }
    }

    #[test]
    fn ctr_round_trip_any_length(
        key in raw_key(),
        iv in any::<[u8; 16]>(),
        data in prop::collection::vec(any::<u8>(), 0..200),
    ) {
        let mut buf = data.clone();
        context(Mode::Ctr, &key, &iv).encrypt_in_place(&mut buf).unwrap();
        context(Mode::Ctr, &key, &iv).decrypt_in_place(&mut buf).unwrap();
        prop_assert_eq!(buf, data);
    }

    #[test]
    fn ctr_any_partition_matches_one_call(
        key in raw_key(),
        iv in any::<[u8; 16]>(),
        data in prop::collection::vec(any::<u8>(), 0..200),
        cuts in prop::collection::vec(0usize..40, 0..10),
    ) {
        let mut whole = data.clone();
        let mut one = context(Mode::Ctr, &key, &iv);
        one.encrypt_in_place(&mut whole).unwrap();

        let mut pieces = data.clone();
        let mut many = context(Mode::Ctr, &key, &iv);
        let mut rest = pieces.as_mut_slice();
        for cut in cuts {
            let n = cut.min(rest.len());
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(n);
            many.encrypt_in_place(head).unwrap();
            rest = tail;
        }
        many.encrypt_in_place(rest).unwrap();

        prop_assert_eq!(whole, pieces);
        prop_assert_eq!(one.iv(), many.iv());
    }

    #[test]
    fn ccm_round_trip(
        key in raw_key(),
        iv in any::<[u8; 16]>(),
        params in ccm_params(),
        aad in prop::collection::vec(any::<u8>(), 0..48),
        data in prop::collection::vec(any::<u8>(), 0..80),
    ) {
        let mut sealed = vec![0u8; data.len() + params.tag_len()];
        ccm(&key, &iv, params, &aad).encrypt(&mut sealed, &data).unwrap();
        let mut opened = vec![0u8; data.len()];
        ccm(&key, &iv, params, &aad).decrypt(&mut opened, &sealed).unwrap();
        prop_assert_eq!(opened, data);
    }

    #[test]
    fn ccm_detects_any_bit_flip(
        key in raw_key(),
        iv in any::<[u8; 16]>(),
        aad in prop::collection::vec(any::<u8>(), 0..32),
        data in prop::collection::vec(any::<u8>(), 0..48),
        flip in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let params = CcmParams::default();
        let mut sealed = vec![0u8; data.len() + params.tag_len()];
        ccm(&key, &iv, params, &aad).encrypt(&mut sealed, &data).unwrap();

        // One bit of ciphertext or tag.
        let mut bad = sealed.clone();
        bad[flip.index(sealed.len())] ^= 1 << bit;
        let mut opened = vec![0u8; data.len()];
        prop_assert_eq!(
            ccm(&key, &iv, params, &aad).decrypt(&mut opened, &bad),
            Err(Error::Mac)
        );

        // One bit of associated data.
        if !aad.is_empty() {
            let mut bad_aad = aad.clone();
            bad_aad[flip.index(aad.len())] ^= 1 << bit;
            prop_assert_eq!(
                ccm(&key, &iv, params, &bad_aad).decrypt(&mut opened, &sealed),
                Err(Error::Mac)
            );
        }
    }
}

#[test]
fn ccm_round_trip_across_aad_encoding_boundary() {
    let key = [0x77u8; 16];
    let iv = [0x01u8; 16];
    let params = CcmParams::default();
    let data = b"boundary payload";
    for aad_len in [0, 1, 14, 15, 0xFEFF, 0xFF00, 0xFF01, 0x10000] {
        let aad = vec![0xA5u8; aad_len];
        let mut sealed = vec![0u8; data.len() + params.tag_len()];
        ccm(&key, &iv, params, &aad).encrypt(&mut sealed, data).unwrap();
        let mut opened = vec![0u8; data.len()];
        ccm(&key, &iv, params, &aad).decrypt(&mut opened, &sealed).unwrap();
        assert_eq!(&opened, data, "aad length {aad_len}");
    }
}

#[test]
fn ccm_empty_payload_is_tag_only() {
    let key = [0u8; 16];
    let iv = [0u8; 16];
    let params = CcmParams::new(4, 8).unwrap();
    let mut sealed = [0u8; 8];
    ccm(&key, &iv, params, b"aad").encrypt(&mut sealed, &[]).unwrap();
    ccm(&key, &iv, params, b"aad").decrypt(&mut [], &sealed).unwrap();
}
