//! CBOR encoding of records and content digests over it.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("decode failed: {0}")]
    Decode(String),
}

/// Encodes a value as CBOR.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    let mut bytes = Vec::new();
    ciborium::into_writer(value, &mut bytes).map_err(|e| CodecError::Encode(e.to_string()))?;
    Ok(bytes)
}

pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, CodecError> {
    ciborium::from_reader(bytes).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Blake3 hash of a value's CBOR encoding.
///
/// Two records with the same digest serialize to the same bytes, which makes
/// it a cheap way to compare whole documents after a rebuild.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Digest([u8; 32]);

impl Digest {
    pub fn from_data(data: &[u8]) -> Self {
        Digest(*blake3::hash(data).as_bytes())
    }

    pub fn of<T: Serialize + ?Sized>(value: &T) -> Result<Self, CodecError> {
        Ok(Self::from_data(&encode(value)?))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl Serialize for Digest {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_bytes(&self.0)
    }
}

impl<'de> Deserialize<'de> for Digest {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct DigestVisitor;

        impl serde::de::Visitor<'_> for DigestVisitor {
            type Value = Digest;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("32-byte digest")
            }

            fn visit_bytes<E>(self, v: &[u8]) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                let arr: [u8; 32] = v
                    .try_into()
                    .map_err(|_| E::invalid_length(v.len(), &"32 bytes"))?;
                Ok(Digest(arr))
            }
        }

        deserializer.deserialize_bytes(DigestVisitor)
    }
}

impl fmt::Debug for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Digest({})", self)
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{CvParamRecord, DocumentRecord, PeptideRecord};

    #[test]
    fn record_survives_cbor() {
        let record = DocumentRecord {
            id: Some("doc".into()),
            peptides: vec![PeptideRecord {
                id: Some("PEP_1".into()),
                peptide_sequence: Some("PEPTIDE".into()),
                cv_params: vec![CvParamRecord {
                    cv_ref: "MS".into(),
                    accession: "MS:1001088".into(),
                    name: "protein description".into(),
                    value: Some("x".into()),
                    ..Default::default()
                }],
                ..Default::default()
            }],
            ..Default::default()
        };
        let bytes = encode(&record).unwrap();
        let back: DocumentRecord = decode(&bytes).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn garbage_fails_to_decode() {
        let err = decode::<DocumentRecord>(&[0xff, 0x00, 0x13]).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn digest_tracks_content() {
        let a = Digest::of("hello").unwrap();
        let b = Digest::of("hello").unwrap();
        let c = Digest::of("world").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(format!("{}", a).len(), 64);
    }

    #[test]
    fn digest_encodes_as_bytes() {
        let digest = Digest::from_data(b"test");
        let bytes = encode(&digest).unwrap();
        // major type 2, one-byte length follows
        assert_eq!(bytes[0], 0x58);
        assert_eq!(bytes[1], 32);
        let back: Digest = decode(&bytes).unwrap();
        assert_eq!(back, digest);
    }
}
