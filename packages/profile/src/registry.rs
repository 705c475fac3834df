//! Profile registry. Loads every profile from the embedded TOML configs.
//!
//! Each `.toml` file in `packages/profile/profiles/` is baked into the
//! binary at compile time via [`include_str!`]. Adding a vendor means adding
//! a TOML file and an entry below.

use crate::{ProfileDefinition, ProfileError, parse_profile_toml};

/// TOML configs embedded at compile time.
const PROFILE_TOMLS: &[(&str, &str)] = &[
    // ── Table layouts ────────────────────────────────────────────────
    ("chevrolet", include_str!("../profiles/chevrolet.toml")),
    // ── Text layouts ─────────────────────────────────────────────────
    ("jeep", include_str!("../profiles/jeep.toml")),
];

#[cfg(test)]
const EXPECTED_PROFILE_COUNT: usize = 2;

/// Returns all embedded profile definitions.
///
/// # Panics
///
/// Panics if any TOML config is malformed (this is a compile-time guarantee
/// since the configs are embedded).
#[must_use]
pub fn all_profiles() -> Vec<ProfileDefinition> {
    PROFILE_TOMLS
        .iter()
        .map(|(name, toml)| {
            parse_profile_toml(toml).unwrap_or_else(|e| panic!("Failed to parse {name}.toml: {e}"))
        })
        .collect()
}

/// Returns the embedded profile with the given id.
///
/// # Errors
///
/// Returns [`ProfileError::Unknown`] if no profile has that id.
pub fn find_profile(id: &str) -> Result<ProfileDefinition, ProfileError> {
    all_profiles()
        .into_iter()
        .find(|p| p.id == id)
        .ok_or_else(|| ProfileError::Unknown(id.to_owned()))
}
