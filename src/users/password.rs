use sha2::{Digest, Sha256};

pub(crate) fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

pub(crate) fn matches(password: &str, digest: &str) -> bool {
    hash_password(password) == digest
}
