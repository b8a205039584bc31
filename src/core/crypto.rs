// Copyright 2026 BadCompany
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Identity crypto for signing deliver requests.
//!
//! This module provides the `SigningIdentity` which binds an ECDSA P-256
//! private key to the enrollment certificate of an MSP member, and the
//! helpers that derive nonces and transaction ids from it.

use p256::ecdsa::Signature;
use prost::Message;
use ring::rand::{SecureRandom, SystemRandom};
use ring::signature::{EcdsaKeyPair, KeyPair, ECDSA_P256_SHA256_ASN1_SIGNING};
use sha2::{Digest, Sha256};

use crate::core::constants::crypto;
use crate::core::errors::CryptoError;
use crate::protos::msp::SerializedIdentity;

pub struct SigningIdentity {
    msp_id: String,
    certificate_pem: Vec<u8>,
    key_pair: EcdsaKeyPair,
    private_key_pem: String,
    rng: SystemRandom,
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("msp_id", &self.msp_id)
            .field("ski", &self.ski())
            .finish_non_exhaustive()
    }
}

impl SigningIdentity {
    /// Build an identity from a PEM encoded PKCS#8 key and a PEM certificate.
    pub fn from_pem(
        msp_id: impl Into<String>,
        private_key_pem: &[u8],
        certificate_pem: &[u8],
    ) -> Result<Self, CryptoError> {
        let key = pem::parse(private_key_pem)
            .map_err(|e| CryptoError::KeyLoadError(e.to_string()))?;
        if key.tag() != crypto::PEM_TAG_PRIVATE_KEY {
            return Err(CryptoError::KeyLoadError(format!(
                "expected a PKCS#8 '{}' block, found '{}'",
                crypto::PEM_TAG_PRIVATE_KEY,
                key.tag()
            )));
        }

        let cert = pem::parse(certificate_pem)
            .map_err(|e| CryptoError::CertificateLoadError(e.to_string()))?;
        if cert.tag() != crypto::PEM_TAG_CERTIFICATE {
            return Err(CryptoError::CertificateLoadError(format!(
                "expected a '{}' block, found '{}'",
                crypto::PEM_TAG_CERTIFICATE,
                cert.tag()
            )));
        }

        let rng = SystemRandom::new();
        let key_pair =
            EcdsaKeyPair::from_pkcs8(&ECDSA_P256_SHA256_ASN1_SIGNING, key.contents(), &rng)
                .map_err(|e| CryptoError::KeyLoadError(e.to_string()))?;

        Ok(Self {
            msp_id: msp_id.into(),
            certificate_pem: certificate_pem.to_vec(),
            key_pair,
            private_key_pem: pem::encode(&key),
            rng,
        })
    }

    pub fn msp_id(&self) -> &str {
        &self.msp_id
    }

    pub fn certificate_pem(&self) -> &[u8] {
        &self.certificate_pem
    }

    pub(crate) fn private_key_pem(&self) -> &str {
        &self.private_key_pem
    }

    /// Uncompressed public point of the signing key.
    pub fn public_key(&self) -> &[u8] {
        self.key_pair.public_key().as_ref()
    }

    /// Subject key identifier: hex SHA-256 of the public point.
    pub fn ski(&self) -> String {
        hex::encode(Sha256::digest(self.public_key()))
    }

    /// Protobuf `SerializedIdentity` used as the creator of signed headers.
    pub fn serialize(&self) -> Vec<u8> {
        SerializedIdentity {
            mspid: self.msp_id.clone(),
            id_bytes: self.certificate_pem.clone(),
        }
        .encode_to_vec()
    }

    /// ECDSA P-256/SHA-256 signature, DER encoded and normalized to low-S.
    pub fn sign(&self, message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        let signature = self
            .key_pair
            .sign(&self.rng, message)
            .map_err(|e| CryptoError::SigningError(e.to_string()))?;
        normalize_low_s(signature.as_ref())
    }
}

/// Random nonce for a signature header.
pub fn generate_nonce() -> Result<Vec<u8>, CryptoError> {
    let mut nonce = vec![0u8; crypto::NONCE_LENGTH];
    SystemRandom::new()
        .fill(&mut nonce)
        .map_err(|_| CryptoError::RandomError)?;
    Ok(nonce)
}

/// Transaction id: hex SHA-256 over `nonce || creator`.
pub fn compute_tx_id(nonce: &[u8], creator: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(nonce);
    hasher.update(creator);
    hex::encode(hasher.finalize())
}

/// Rewrite a DER `SEQUENCE { r INTEGER, s INTEGER }` so that `s <= n/2`.
pub fn normalize_low_s(der: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let signature = Signature::from_der(der)
        .map_err(|e| CryptoError::SigningError(format!("malformed DER signature: {}", e)))?;
    let signature = signature.normalize_s().unwrap_or(signature);
    Ok(signature.to_der().as_bytes().to_vec())
}


#[cfg(test)]
mod tests {
    use super::test_support::{dummy_cert_pem, generate_key_pem};
    use super::*;
    use p256::elliptic_curve::scalar::IsHigh;
    use ring::signature::{UnparsedPublicKey, ECDSA_P256_SHA256_ASN1};

    fn identity() -> SigningIdentity {
        SigningIdentity::from_pem(
            "Org1MSP",
            generate_key_pem().as_bytes(),
            dummy_cert_pem().as_bytes(),
        )
        .unwrap()
    }

    fn is_high_s(der: &[u8]) -> bool {
        bool::from(Signature::from_der(der).unwrap().s().is_high())
    }

    #[test]
    fn test_signature_verifies_and_is_low_s() {
        let id = identity();
        for i in 0..32u8 {
            let msg = [i; 40];
            let sig = id.sign(&msg).unwrap();
            assert!(!is_high_s(&sig));
            UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, id.public_key())
                .verify(&msg, &sig)
                .expect("normalized signature must verify");
        }
    }

    #[test]
    fn test_high_s_is_flipped() {
        let id = identity();
        let msg = b"deliver seek envelope";
        let low = id.sign(msg).unwrap();
        let parsed = Signature::from_der(&low).unwrap();
        let high = Signature::from_scalars(parsed.r(), -parsed.s()).unwrap();
        let high_der = high.to_der().as_bytes().to_vec();
        assert!(is_high_s(&high_der));

        let normalized = normalize_low_s(&high_der).unwrap();
        assert_eq!(normalized, low);
        UnparsedPublicKey::new(&ECDSA_P256_SHA256_ASN1, id.public_key())
            .verify(msg, &normalized)
            .expect("flipped signature must verify");
        assert_eq!(normalize_low_s(&low).unwrap(), low);
    }

    #[test]
    fn test_malformed_signature_rejected() {
        assert!(normalize_low_s(&[0x30, 0x03, 0x02, 0x01]).is_err());
        assert!(normalize_low_s(&[]).is_err());
        assert!(normalize_low_s(&[0x30, 0x06, 0x02, 0x01, 0x01, 0x02, 0x01, 0x00]).is_err());
    }

    #[test]
    fn test_rejects_wrong_pem_tags() {
        let err = SigningIdentity::from_pem(
            "Org1MSP",
            dummy_cert_pem().as_bytes(),
            dummy_cert_pem().as_bytes(),
        )
        .unwrap_err();
        assert!(matches!(err, CryptoError::KeyLoadError(_)));

        let key = generate_key_pem();
        let err = SigningIdentity::from_pem("Org1MSP", key.as_bytes(), key.as_bytes()).unwrap_err();
        assert!(matches!(err, CryptoError::CertificateLoadError(_)));
    }

    #[test]
    fn test_serialized_identity_carries_msp_and_cert() {
        let id = identity();
        let decoded = SerializedIdentity::decode(id.serialize().as_slice()).unwrap();
        assert_eq!(decoded.mspid, "Org1MSP");
        assert_eq!(decoded.id_bytes, dummy_cert_pem().into_bytes());
        assert_eq!(id.ski().len(), 64);
    }

    #[test]
    fn test_tx_id_is_deterministic() {
        let a = compute_tx_id(b"nonce", b"creator");
        assert_eq!(a, compute_tx_id(b"nonce", b"creator"));
        assert_ne!(a, compute_tx_id(b"nonce2", b"creator"));
        assert_eq!(generate_nonce().unwrap().len(), crypto::NONCE_LENGTH);
    }
}
