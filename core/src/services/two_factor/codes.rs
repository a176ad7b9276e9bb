//! Numeric code generation, hashing and constant-time matching.
//!
//! Backup codes and SMS one-time passwords are random decimal strings.
//! Only SHA-256 digests of them are ever stored; comparisons against
//! stored digests are constant-time.

use constant_time_eq::constant_time_eq;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Generate a random numeric code of `length` decimal digits
///
/// Drawn from the OS CSPRNG. The modulo introduces a bias too small to
/// matter at these code lengths.
pub fn generate_numeric_code(length: usize) -> String {
    let mut rng = OsRng;
    let mut bytes = [0u8; 8];
    rng.fill_bytes(&mut bytes);
    let modulus = 10u64.pow(length as u32);
    let code = u64::from_le_bytes(bytes) % modulus;
    format!("{:0width$}", code, width = length)
}

/// Generate a batch of single-use backup codes
pub fn generate_backup_codes(count: usize, length: usize) -> Vec<String> {
    (0..count).map(|_| generate_numeric_code(length)).collect()
}

/// SHA-256 hex digest used for stored codes
pub fn hash_code(code: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(code.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time check of a submitted code against one stored digest
pub fn code_matches(code: &str, stored_hash: &str) -> bool {
    let candidate = hash_code(code);
    constant_time_eq(candidate.as_bytes(), stored_hash.as_bytes())
}

/// Locate a submitted code in a digest list
///
/// Scans the whole list even after a match so timing does not reveal
/// the position of the hit.
pub fn find_matching_hash(code: &str, hashes: &[String]) -> Option<usize> {
    let candidate = hash_code(code);
    let mut found = None;
    for (index, hash) in hashes.iter().enumerate() {
        let matches = constant_time_eq(candidate.as_bytes(), hash.as_bytes());
        if matches && found.is_none() {
            found = Some(index);
        }
    }
    found
}
