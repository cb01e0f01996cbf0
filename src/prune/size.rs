/// Bytes in one gibibyte; `--cache-size` is expressed in these units.
pub const GIB: u64 = 1024 * 1024 * 1024;

/// Convert a quota given in whole gibibytes to bytes, saturating.
pub fn gib_to_bytes(gib: u64) -> u64 {
    gib.saturating_mul(GIB)
}

/// Format size in human-readable format
pub fn format_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB", "PiB"];
    let mut size = bytes as f64;
    let mut unit_idx = 0;

    while size >= 1024.0 && unit_idx < UNITS.len() - 1 {
        size /= 1024.0;
        unit_idx += 1;
    }

    if unit_idx == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", size, UNITS[unit_idx])
    }
}
