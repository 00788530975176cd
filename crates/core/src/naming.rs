// Output feature-class naming

use std::path::Path;

/// Characters that cannot appear in a feature class name.
const REPLACED: &str = " ~`!@#$%^&*()+-={}[]|\\:;<>?/.,\"";

/// Replace every reserved character in `stem` with `_`.
pub fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| if REPLACED.contains(c) { '_' } else { c })
        .collect()
}

/// Base name derived from the input workbook's file stem.
pub fn feature_base_name(input: &Path) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let base = sanitize_stem(&stem);
    if base.is_empty() {
        "selection".to_string()
    } else {
        base
    }
}

/// First `<base>_APN_<seq>` (seq from 1) for which `exists` is false.
pub fn next_feature_name(base: &str, mut exists: impl FnMut(&str) -> bool) -> String {
    let mut seq: u32 = 1;
    loop {
        let candidate = format!("{base}_APN_{seq}");
        if !exists(&candidate) {
            return candidate;
        }
        seq += 1;
    }
}
