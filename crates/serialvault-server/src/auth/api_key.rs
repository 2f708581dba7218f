//! API key verification using constant-time comparison.

use subtle::ConstantTimeEq;

/// Whether `presented` matches one of the configured keys.
///
/// Every configured key is compared so the timing does not reveal which
/// one matched. An empty key list accepts nothing.
pub fn check_api_key(keys: &[String], presented: Option<&str>) -> bool {
    let Some(presented) = presented.filter(|p| !p.is_empty()) else {
        return false;
    };
    keys.iter().fold(false, |matched, key| {
        let eq: bool = key.as_bytes().ct_eq(presented.as_bytes()).into();
        matched | eq
    })
}
