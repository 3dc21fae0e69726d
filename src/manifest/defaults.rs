use super::{CheckFields, DefaultRecord};

/// Copies every default field the check does not already set. Existing keys are never touched,
/// including keys explicitly set to null, so applying the same record again changes nothing.
///
/// Returns the number of fields that were filled in.
pub fn apply_defaults(check: &mut CheckFields, default: &DefaultRecord) -> usize {
    let mut filled = 0;
    for (key, value) in default.fields() {
        if !check.contains_key(key) {
            check.insert(key.clone(), value.clone());
            filled += 1;
        }
    }
    filled
}
