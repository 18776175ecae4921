//! Feature Layout - Centralized Feature Definition
//!
//! **CRITICAL: This file controls the feature schema**
//!
//! The order below is the order the scoring model was trained on.
//! Model artifacts declare their own ordering and are rejected at load
//! time when it differs from this one.
//!
//! ## Rules (NEVER break these):
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION

use crc32fast::Hasher;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current feature layout version
/// MUST be incremented when layout changes
pub const FEATURE_VERSION: u8 = 1;

// ============================================================================
// FEATURE LAYOUT (Authoritative source)
// ============================================================================

/// Feature names in exact order they appear in the vector
pub const FEATURE_LAYOUT: [&str; FEATURE_COUNT] = [
    // === Demographics / tenure (0-2) ===
    "age",                      // 0: Age in years
    "work_years",               // 1: Total years in employment
    "position_years",           // 2: Years in the current position

    // === Socio-economic (3) ===
    "income_level",             // 3: low / medium / high

    // === Workload (4) ===
    "weekly_work_hours",        // 4: Average working hours per week

    // === Lifestyle (5-6) ===
    "alcohol_units",            // 5: Standard drinks per week
    "moderate_exercise_hours",  // 6: Moderate-intensity exercise, hours/week

    // === Education (7) ===
    "education_level",          // 7: Highest completed education

    // === Schedule / sleep (8-10) ===
    "shift_work",               // 8: Works rotating shifts
    "night_shift",              // 9: Works night shifts
    "sleep_disorder",           // 10: Reports a sleep disorder

    // === Lifestyle (11) ===
    "vigorous_exercise_hours",  // 11: Vigorous exercise, hours/week

    // === Wellbeing (12-13) ===
    "life_satisfaction",        // 12: Self-rated, 1-10
    "fatigue_level",            // 13: none / mild / moderate / severe
];

/// Total number of features
pub const FEATURE_COUNT: usize = 14;

// ============================================================================
// LAYOUT HASH
// ============================================================================

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

/// Compute CRC32 hash of the feature layout
pub fn compute_layout_hash() -> u32 {
    hash_layout(FEATURE_VERSION, FEATURE_LAYOUT.iter().copied())
}

/// Hash an arbitrary (version, names) pair the same way the layout is hashed
pub fn hash_layout<'a, I>(version: u8, names: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Hasher::new();
    hasher.update(&[version]);

    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]); // Separator
    }

    hasher.finalize()
}

/// Get layout hash (cached)
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// LAYOUT INFO
// ============================================================================

/// Complete layout information for serialization/logging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_count: usize,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: FEATURE_VERSION,
            hash: layout_hash(),
            feature_count: FEATURE_COUNT,
            feature_names: FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Default for LayoutInfo {
    fn default() -> Self {
        Self::current()
    }
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a declared feature layout doesn't match the engine's
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutMismatchError {
    #[error("feature layout version mismatch: expected v{expected}, got v{actual}")]
    Version { expected: u8, actual: u8 },

    #[error("feature count mismatch: expected {expected}, got {actual}")]
    Count { expected: usize, actual: usize },

    #[error("feature order mismatch at position {index}: expected '{expected}', got '{actual}'")]
    Order {
        index: usize,
        expected: &'static str,
        actual: String,
    },

    #[error("feature layout hash mismatch: expected {expected:08x}, got {actual:08x}")]
    Hash { expected: u32, actual: u32 },
}

/// Validate a declared (version, hash) pair
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    if incoming_version != FEATURE_VERSION {
        return Err(LayoutMismatchError::Version {
            expected: FEATURE_VERSION,
            actual: incoming_version,
        });
    }

    let current_hash = layout_hash();
    if incoming_hash != current_hash {
        return Err(LayoutMismatchError::Hash {
            expected: current_hash,
            actual: incoming_hash,
        });
    }

    Ok(())
}

/// Validate a declared, ordered list of feature names against the layout
pub fn validate_feature_names<S: AsRef<str>>(names: &[S]) -> Result<(), LayoutMismatchError> {
    if names.len() != FEATURE_COUNT {
        return Err(LayoutMismatchError::Count {
            expected: FEATURE_COUNT,
            actual: names.len(),
        });
    }

    for (index, (expected, actual)) in FEATURE_LAYOUT.iter().copied().zip(names).enumerate() {
        if expected != actual.as_ref() {
            return Err(LayoutMismatchError::Order {
                index,
                expected,
                actual: actual.as_ref().to_string(),
            });
        }
    }

    Ok(())
}

/// Check if layout is compatible (same version, same hash)
pub fn is_layout_compatible(version: u8, hash: u32) -> bool {
    validate_layout(version, hash).is_ok()
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get feature index by name (O(n) but features are few)
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Get feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    FEATURE_LAYOUT.get(index).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_count() {
        assert_eq!(FEATURE_COUNT, 14);
        assert_eq!(FEATURE_LAYOUT.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_layout_names_unique() {
        for (i, name) in FEATURE_LAYOUT.iter().enumerate() {
            assert_eq!(feature_index(name), Some(i), "duplicate feature name {}", name);
        }
    }

    #[test]
    fn test_layout_hash_consistency() {
        assert_eq!(compute_layout_hash(), layout_hash());
        assert_ne!(layout_hash(), 0);
    }

    #[test]
    fn test_hash_depends_on_order() {
        let mut swapped = FEATURE_LAYOUT;
        swapped.swap(0, 1);
        assert_ne!(hash_layout(FEATURE_VERSION, swapped.iter().copied()), layout_hash());
    }

    #[test]
    fn test_validate_layout_success() {
        assert!(validate_layout(FEATURE_VERSION, layout_hash()).is_ok());
        assert!(is_layout_compatible(FEATURE_VERSION, layout_hash()));
    }

    #[test]
    fn test_validate_layout_version_mismatch() {
        let result = validate_layout(FEATURE_VERSION + 1, layout_hash());
        assert!(matches!(result, Err(LayoutMismatchError::Version { .. })));
    }

    #[test]
    fn test_validate_layout_hash_mismatch() {
        let result = validate_layout(FEATURE_VERSION, layout_hash().wrapping_add(1));
        assert!(matches!(result, Err(LayoutMismatchError::Hash { .. })));
    }

    #[test]
    fn test_validate_feature_names() {
        assert!(validate_feature_names(&FEATURE_LAYOUT).is_ok());

        let short = &FEATURE_LAYOUT[..13];
        assert_eq!(
            validate_feature_names(short),
            Err(LayoutMismatchError::Count { expected: 14, actual: 13 })
        );

        let mut reordered: Vec<String> = FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect();
        reordered.swap(4, 12);
        match validate_feature_names(&reordered) {
            Err(LayoutMismatchError::Order { index, expected, actual }) => {
                assert_eq!(index, 4);
                assert_eq!(expected, "weekly_work_hours");
                assert_eq!(actual, "life_satisfaction");
            }
            other => panic!("expected order mismatch, got {:?}", other),
        }
    }

    #[test]
    fn test_feature_index() {
        assert_eq!(feature_index("age"), Some(0));
        assert_eq!(feature_index("weekly_work_hours"), Some(4));
        assert_eq!(feature_index("fatigue_level"), Some(13));
        assert_eq!(feature_index("nonexistent"), None);
    }

    #[test]
    fn test_feature_name() {
        assert_eq!(feature_name(0), Some("age"));
        assert_eq!(feature_name(13), Some("fatigue_level"));
        assert_eq!(feature_name(100), None);
    }

    #[test]
    fn test_layout_info() {
        let info = LayoutInfo::current();
        assert_eq!(info.version, FEATURE_VERSION);
        assert_eq!(info.feature_count, FEATURE_COUNT);
        assert_eq!(info.feature_names.len(), FEATURE_COUNT);
    }
}
