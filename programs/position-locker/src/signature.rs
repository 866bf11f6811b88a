//! secp256k1 signatures over fee overrides.
//!
//! Messages are hashed ABI-style (32 byte words) behind a domain prefix and
//! signed with the personal-message convention wallets use for `signMessage`,
//! so signers can keep producing overrides with ordinary Ethereum tooling.

use anchor_lang::prelude::*;
use solana_keccak_hasher as keccak;
use solana_secp256k1_recover::secp256k1_recover;
use crate::constants::PERSONAL_MESSAGE_PREFIX;
use crate::errors::LockerError;

/// 20 byte Ethereum-style address
pub type EthAddress = [u8; 20];

/// n / 2 for the secp256k1 group order. Larger `s` values are malleable twins.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// Big-endian 32 byte word
pub fn abi_word_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

pub fn abi_word_bool(value: bool) -> [u8; 32] {
    abi_word_u64(value as u64)
}

/// keccak256("\x19Ethereum Signed Message:\n32" ‖ hash)
pub fn personal_message_digest(message_hash: &[u8; 32]) -> [u8; 32] {
    keccak::hashv(&[PERSONAL_MESSAGE_PREFIX, &message_hash[..]]).to_bytes()
}

/// Address of an uncompressed public key (x ‖ y, no 0x04 tag)
pub fn eth_address(public_key: &[u8; 64]) -> EthAddress {
    let hash = keccak::hash(public_key).to_bytes();
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

/// Recover the signer of `digest` from an r ‖ s ‖ v signature
pub fn recover_signer(digest: &[u8; 32], signature: &[u8; 65]) -> Result<EthAddress> {
    let (rs, v) = signature.split_at(64);
    let recovery_id = match v[0] {
        0 | 1 => v[0],
        27 | 28 => v[0] - 27,
        _ => return err!(LockerError::InvalidSignature),
    };
    require!(rs[32..] <= SECP256K1_HALF_ORDER[..], LockerError::InvalidSignature);

    let public_key = secp256k1_recover(&digest[..], recovery_id, rs)
        .map_err(|_| error!(LockerError::InvalidSignature))?;
    Ok(eth_address(&public_key.to_bytes()))
}

/// True when `signature` is a personal-message signature of `message_hash` by `expected`
pub fn verify_signature(
    message_hash: &[u8; 32],
    signature: &[u8; 65],
    expected: &EthAddress,
) -> Result<bool> {
    let signer = recover_signer(&personal_message_digest(message_hash), signature)?;
    Ok(signer == *expected)
}

#[cfg(test)]
pub(crate) mod test_signer {
    use super::*;

    /// Deterministic secp256k1 key for tests
    pub struct TestSigner {
        secret: libsecp256k1::SecretKey,
    }

    impl TestSigner {
        pub fn new(seed: u8) -> Self {
            let secret = libsecp256k1::SecretKey::parse(&[seed; 32]).unwrap();
            Self { secret }
        }

        pub fn address(&self) -> EthAddress {
            let public = libsecp256k1::PublicKey::from_secret_key(&self.secret).serialize();
            let mut xy = [0u8; 64];
            xy.copy_from_slice(&public[1..]);
            eth_address(&xy)
        }

        /// Personal-message signature over a 32 byte hash, v in {27, 28}
        pub fn sign(&self, message_hash: &[u8; 32]) -> [u8; 65] {
            let digest = personal_message_digest(message_hash);
            let message = libsecp256k1::Message::parse(&digest);
            let (signature, recovery_id) = libsecp256k1::sign(&message, &self.secret);
            let mut out = [0u8; 65];
            out[..64].copy_from_slice(&signature.serialize());
            out[64] = recovery_id.serialize() + 27;
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_signer::TestSigner;
    use super::*;

    #[test]
    fn words_are_big_endian_and_left_padded() {
        let word = abi_word_u64(0x0102);
        assert_eq!(&word[..30], &[0u8; 30]);
        assert_eq!(&word[30..], &[0x01, 0x02]);
        assert_eq!(abi_word_bool(true)[31], 1);
        assert_eq!(abi_word_bool(false), [0u8; 32]);
    }

    #[test]
    fn recovers_the_signing_address() {
        let signer = TestSigner::new(7);
        let hash = keccak::hash(b"fee override").to_bytes();
        let signature = signer.sign(&hash);

        assert!(verify_signature(&hash, &signature, &signer.address()).unwrap());
        assert!(!verify_signature(&hash, &signature, &TestSigner::new(8).address()).unwrap());
    }

    #[test]
    fn raw_recovery_ids_are_accepted() {
        let signer = TestSigner::new(9);
        let hash = keccak::hash(b"raw v").to_bytes();
        let mut signature = signer.sign(&hash);
        signature[64] -= 27;
        assert!(verify_signature(&hash, &signature, &signer.address()).unwrap());
    }

    #[test]
    fn tampered_hash_recovers_someone_else() {
        let signer = TestSigner::new(7);
        let hash = keccak::hash(b"original").to_bytes();
        let signature = signer.sign(&hash);
        let other = keccak::hash(b"tampered").to_bytes();
        assert!(!verify_signature(&other, &signature, &signer.address()).unwrap());
    }

    #[test]
    fn bad_recovery_id_is_malformed() {
        let signer = TestSigner::new(7);
        let hash = keccak::hash(b"v").to_bytes();
        let mut signature = signer.sign(&hash);
        signature[64] = 5;
        assert_eq!(
            verify_signature(&hash, &signature, &signer.address()).unwrap_err(),
            LockerError::InvalidSignature.into()
        );
    }

    #[test]
    fn high_s_is_rejected() {
        let signer = TestSigner::new(7);
        let hash = keccak::hash(b"s").to_bytes();
        let mut signature = signer.sign(&hash);
        signature[32] = 0xff;
        assert_eq!(
            verify_signature(&hash, &signature, &signer.address()).unwrap_err(),
            LockerError::InvalidSignature.into()
        );
    }
}
