use std::env;

use aeskit::crypto::ccm::nonce_iv;
use aeskit::{Aes, CcmParams, Key, Mode, Result};

fn main() -> Result<()> {
    let key = Key::from_hex(&env::args().nth(1).unwrap_or_else(|| "404142434445464748494a4b4c4d4e4f".into()))?;
    let message = env::args().nth(2).unwrap_or_else(|| "hello, ccm".into());

    let nonce = [0x10, 0x11, 0x12, 0x13, 0x14, 0x15, 0x16, 0x17, 0x18, 0x19, 0x1a, 0x1b];
    let iv = nonce_iv(&nonce)?;
    let params = CcmParams::for_nonce(nonce.len(), 8)?;

    let mut sealer = Aes::new(Mode::Ccm, &key, Some(&iv))?;
    sealer.set_ccm_params(params)?;
    sealer.set_associated_data(b"demo header")?;
    let mut sealed = vec![0u8; message.len() + params.tag_len()];
    sealer.encrypt(&mut sealed, message.as_bytes())?;
    println!("sealed: {}", hex::encode(&sealed));

    let mut opener = Aes::new(Mode::Ccm, &key, Some(&iv))?;
    opener.set_ccm_params(params)?;
    opener.set_associated_data(b"demo header")?;
    let mut opened = vec![0u8; message.len()];
    opener.decrypt(&mut opened, &sealed)?;
    println!("opened: {}", String::from_utf8_lossy(&opened));

    Ok(())
}
