//! Unit tests for the Redis store's pure helpers

use vc_core::domain::entities::ConsumeOutcome;
use vc_core::errors::StoreError;

use crate::cache::hash_code;
use crate::cache::redis_store::decode_consume_status;
use crate::InfrastructureError;

#[test]
fn test_hash_code_is_sha256_hex() {
    let digest = hash_code("123456");
    assert_eq!(digest.len(), 64);
    assert_eq!(
        digest,
        "8d969eef6ecad3c29a3a629280e686cf0c3f5d5a86aff3ca12020c923adc6c92"
    );
    assert_ne!(hash_code("123456"), hash_code("123457"));
}

#[test]
fn test_decode_consume_status() {
    assert_eq!(decode_consume_status(&[-1]).unwrap(), ConsumeOutcome::Absent);
    assert_eq!(decode_consume_status(&[1, 0]).unwrap(), ConsumeOutcome::Matched);
    assert_eq!(
        decode_consume_status(&[0, 2]).unwrap(),
        ConsumeOutcome::Mismatch { remaining: 2 }
    );
    assert_eq!(
        decode_consume_status(&[0, 0]).unwrap(),
        ConsumeOutcome::Mismatch { remaining: 0 }
    );
}

#[test]
fn test_decode_rejects_malformed_replies() {
    for reply in [&[-2][..], &[][..], &[0, -1][..], &[7][..], &[1, 0, 0][..]] {
        let err = decode_consume_status(reply).unwrap_err();
        assert!(
            matches!(err, StoreError::MalformedRecord { .. }),
            "reply {:?} should be malformed",
            reply
        );
    }
}

#[test]
fn test_infrastructure_error_to_store_error() {
    let io = redis::RedisError::from(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "Connection refused",
    ));
    let err: StoreError = InfrastructureError::Cache(io).into();
    assert!(matches!(err, StoreError::Unavailable { .. }));

    let wrong_type = redis::RedisError::from((redis::ErrorKind::TypeError, "bad reply"));
    let err: StoreError = InfrastructureError::Cache(wrong_type).into();
    assert!(matches!(err, StoreError::MalformedRecord { .. }));

    let err: StoreError = InfrastructureError::Config("bad url".to_string()).into();
    assert!(err.to_string().contains("bad url"));
}
