// ABOUTME: Best-effort matching of existing icon files to records for filename normalization.
// ABOUTME: Tries exact-ish stem candidates first, then a loose word match within the source prefix.

use crate::image_utils::sanitize_label;

/// Splits a file name into stem and extension (extension without the dot).
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, ext),
        _ => (file_name, ""),
    }
}

/// Normalized icon file name for a record.
pub fn icon_file_name(source: &str, slug: &str, ext: &str) -> String {
    if ext.is_empty() {
        format!("{}_{}_icon", source, slug)
    } else {
        format!("{}_{}_icon.{}", source, slug, ext)
    }
}

/// Stems a record's icon is likely saved under, most specific first.
pub fn candidate_stems(source: &str, slug: &str, name: &str) -> Vec<String> {
    let sanitized = sanitize_label(name);
    let mut stems = vec![
        format!("{}_{}", source, slug),
        format!("{}_{}_i", source, slug),
        format!("{}_{}_i", source, sanitized),
        format!("{}_{}", source, sanitized),
    ];
    if name.contains("Aid") {
        stems.push(format!("{}_{}_s_aid_i", source, source));
    }
    stems
}

fn name_words(name: &str) -> Vec<String> {
    name.split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .flat_map(char::to_lowercase)
                .collect::<String>()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Whether `stem` is already a normalized icon name of some record.
fn is_normalized_stem(stem: &str) -> bool {
    stem.ends_with("_icon")
}

/// Picks the existing file that most likely holds a record's icon.
///
/// `files` is a directory listing; it is searched in sorted order so that
/// ambiguous matches resolve the same way on every run. Stems are compared
/// case-insensitively. Files already normalized for another record are
/// never matched; the record's own normalized file matches first.
pub fn match_icon_file<'a>(
    files: &'a [String],
    source: &str,
    slug: &str,
    name: &str,
) -> Option<&'a str> {
    let own = icon_file_name(source, slug, "").to_lowercase();
    let mut sorted: Vec<(&'a str, String)> = files
        .iter()
        .map(|file| (file.as_str(), split_file_name(file).0.to_lowercase()))
        .filter(|(_, stem)| !is_normalized_stem(stem) || *stem == own)
        .collect();
    sorted.sort_unstable();

    if let Some((file, _)) = sorted.iter().find(|(_, stem)| *stem == own) {
        return Some(*file);
    }

    for candidate in candidate_stems(source, slug, name) {
        let candidate = candidate.to_lowercase();
        let hit = sorted
            .iter()
            .find(|(_, stem)| *stem == candidate || stem.ends_with(&candidate));
        if let Some((file, _)) = hit {
            return Some(*file);
        }
    }

    let words = name_words(name);
    let prefix = source.to_lowercase();
    sorted
        .into_iter()
        .find(|(file, _)| {
            let lower = file.to_lowercase();
            lower.starts_with(&prefix) && words.iter().any(|word| lower.contains(word.as_str()))
        })
        .map(|(file, _)| file)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("zeus_bolt.100"), ("zeus_bolt", "100"));
        assert_eq!(split_file_name("noext"), ("noext", ""));
        assert_eq!(split_file_name(".hidden"), (".hidden", ""));
    }

    #[test]
    fn test_exact_stem_wins_over_loose_match() {
        let listing = files(&["zeus_lightning_strike_i.100", "zeus_lightning_rod.100"]);
        assert_eq!(
            match_icon_file(&listing, "zeus", "lightning_strike", "Lightning Strike"),
            Some("zeus_lightning_strike_i.100")
        );
    }

    #[test]
    fn test_sanitized_name_candidate() {
        let listing = files(&["artemis_hunter_s_flare.100"]);
        assert_eq!(
            match_icon_file(&listing, "artemis", "hunters_flare", "Hunter's Flare"),
            Some("artemis_hunter_s_flare.100")
        );
    }

    #[test]
    fn test_aid_candidate() {
        let listing = files(&["zeus_zeus_s_aid_i.100"]);
        assert_eq!(
            match_icon_file(&listing, "zeus", "zeus_aid", "Zeus' Aid"),
            Some("zeus_zeus_s_aid_i.100")
        );
    }

    #[test]
    fn test_loose_fallback_uses_sorted_order() {
        let listing = files(&["zeus_storm_b.png", "ares_storm.png", "zeus_storm_a.png"]);
        assert_eq!(
            match_icon_file(&listing, "zeus", "big_storm", "Big Storm"),
            Some("zeus_storm_a.png")
        );
        assert_eq!(match_icon_file(&listing, "hermes", "x", "Storm"), None);
    }

    #[test]
    fn test_stem_match_ignores_case() {
        let listing = files(&["Zeus_Lightning_Strike_I.100"]);
        assert_eq!(
            match_icon_file(&listing, "zeus", "lightning_strike", "Lightning Strike"),
            Some("Zeus_Lightning_Strike_I.100")
        );
    }

    #[test]
    fn test_other_records_normalized_icons_are_not_matched() {
        let listing = files(&["zeus_lightning_rod_icon.100"]);
        assert_eq!(
            match_icon_file(&listing, "zeus", "lightning_strike", "Lightning Strike"),
            None
        );
        assert_eq!(
            match_icon_file(&listing, "zeus", "lightning_rod", "Lightning Rod"),
            Some("zeus_lightning_rod_icon.100")
        );
    }

    #[test]
    fn test_icon_file_name() {
        assert_eq!(icon_file_name("zeus", "bolt", "100"), "zeus_bolt_icon.100");
    }
}
