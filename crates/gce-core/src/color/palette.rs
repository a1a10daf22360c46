//! Categorical color allocation (§4.8): a fixed family of 4 palettes, with
//! deterministic hashing to pick both the palette and the slot on a cache
//! miss, so the same key always maps to the same color across builds.

const PALETTES: [&[&str]; 4] = [
    // warm
    &["#e63946", "#f4a261", "#e9c46a", "#f77f00", "#d62828"],
    // cool
    &["#1d3557", "#457b9d", "#2a9d8f", "#264653", "#1a759f"],
    // earthy
    &["#6b705c", "#a5a58d", "#b08968", "#7f5539", "#9c6644"],
    // vivid
    &["#7209b7", "#b5179e", "#f72585", "#4361ee", "#4cc9f0"],
];

fn fnv1a(key: &str) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in key.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

/// Deterministic color for an arbitrary string key: stable across runs,
/// spread across all 4 palettes so visually adjacent categories don't
/// collide as often as a single-palette scheme would.
pub fn palette_color(key: &str) -> String {
    let hash = fnv1a(key);
    let palette = &PALETTES[(hash % PALETTES.len() as u64) as usize];
    let slot = &palette[((hash / PALETTES.len() as u64) % palette.len() as u64) as usize];
    slot.to_string()
}

/// HSL-hashed color for a node-type `source` string that isn't in the SSOT
/// config's canonical table (§4.9). Unlike [`palette_color`], this returns
/// a CSS `hsl(...)` string directly from the hash rather than snapping to a
/// fixed swatch, since unknown types are meant to look visibly synthesized.
pub fn hsl_hashed_color(key: &str) -> String {
    let hash = fnv1a(key);
    let hue = hash % 360;
    format!("hsl({hue}, 65%, 55%)")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_always_maps_to_same_color() {
        assert_eq!(palette_color("agent:coder"), palette_color("agent:coder"));
    }

    #[test]
    fn different_keys_usually_differ() {
        assert_ne!(palette_color("agent:coder"), palette_color("agent:reviewer"));
    }

    #[test]
    fn hsl_hash_is_deterministic_and_well_formed() {
        let c = hsl_hashed_color("custom_type");
        assert_eq!(c, hsl_hashed_color("custom_type"));
        assert!(c.starts_with("hsl("));
    }
}
