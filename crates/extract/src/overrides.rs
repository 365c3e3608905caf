// ABOUTME: Data-driven image corrections for records whose icon lives under another record.
// ABOUTME: Holds the built-in duo and flare fallback table and JSON loading for custom tables.

use serde::{Deserialize, Serialize};

/// Borrow the icon of `(fallback_source, fallback_name)` for `(source, name)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageOverride {
    pub source: String,
    pub name: String,
    pub fallback_source: String,
    /// Defaults to `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_name: Option<String>,
}

impl ImageOverride {
    pub fn new(source: &str, name: &str, fallback_source: &str) -> Self {
        Self {
            source: source.to_string(),
            name: name.to_string(),
            fallback_source: fallback_source.to_string(),
            fallback_name: None,
        }
    }

    pub fn with_fallback_name(mut self, fallback_name: &str) -> Self {
        self.fallback_name = Some(fallback_name.to_string());
        self
    }

    /// Name of the record whose image is borrowed.
    pub fn fallback_name(&self) -> &str {
        self.fallback_name.as_deref().unwrap_or(&self.name)
    }
}

/// Duo boons are listed under both gods but the wiki only carries the icon
/// on one of the two pages: (god, boon, god with the icon).
const DUO_FALLBACKS: &[(&str, &str, &str)] = &[
    ("poseidon", "Mirage Shot", "artemis"),
    ("zeus", "Sea Storm", "poseidon"),
    ("zeus", "Lightning Rod", "artemis"),
    ("dionysus", "Splitting Headache", "artemis"),
    ("dionysus", "Exclusive Access", "poseidon"),
    ("dionysus", "Scintillating Feast", "zeus"),
    ("demeter", "Crystal Clarity", "artemis"),
    ("demeter", "Ice Wine", "dionysus"),
    ("demeter", "Blizzard Shot", "poseidon"),
    ("demeter", "Cold Fusion", "zeus"),
    ("aphrodite", "Heart Rend", "artemis"),
    ("aphrodite", "Cold Embrace", "demeter"),
    ("aphrodite", "Low Tolerance", "dionysus"),
    ("aphrodite", "Sweet Nectar", "poseidon"),
    ("aphrodite", "Smoldering Air", "zeus"),
    ("ares", "Curse of Longing", "aphrodite"),
    ("ares", "Hunting Blades", "artemis"),
    ("ares", "Freezing Vortex", "demeter"),
    ("ares", "Curse of Nausea", "dionysus"),
    ("ares", "Curse of Drowning", "poseidon"),
    ("ares", "Vengeful Mood", "zeus"),
    ("athena", "Parting Shot", "aphrodite"),
    ("athena", "Merciful End", "ares"),
    ("athena", "Deadly Reversal", "artemis"),
    ("athena", "Calculated Risk", "dionysus"),
    ("athena", "Unshakable Mettle", "poseidon"),
    ("athena", "Lightning Phalanx", "zeus"),
    ("athena", "Stubborn Roots", "demeter"),
];

/// Flare boons reuse the icon of the god's cast boon: (god, flare, cast).
const FLARE_FALLBACKS: &[(&str, &str, &str)] = &[
    ("artemis", "Hunter's Flare", "True Shot"),
    ("poseidon", "Flood Flare", "Flood Shot"),
    ("zeus", "Thunder Flare", "Electric Shot"),
    ("dionysus", "Trippy Flare", "Trippy Shot"),
    ("demeter", "Icy Flare", "Crystal Beam"),
    ("aphrodite", "Passion Flare", "Crush Shot"),
    ("ares", "Slicing Flare", "Slicing Shot"),
    ("athena", "Phalanx Flare", "Phalanx Shot"),
];

/// The built-in correction table.
pub fn builtin_overrides() -> Vec<ImageOverride> {
    let duos = DUO_FALLBACKS
        .iter()
        .map(|(source, name, fallback)| ImageOverride::new(source, name, fallback));
    let flares = FLARE_FALLBACKS.iter().map(|(source, name, cast)| {
        ImageOverride::new(source, name, source).with_fallback_name(cast)
    });
    duos.chain(flares).collect()
}

/// Parses a JSON array of overrides.
pub fn parse_overrides(json: &str) -> Result<Vec<ImageOverride>, serde_json::Error> {
    serde_json::from_str(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let table = builtin_overrides();
        assert_eq!(table.len(), 36);
        let flare = table.iter().find(|o| o.name == "Hunter's Flare").unwrap();
        assert_eq!(flare.fallback_source, "artemis");
        assert_eq!(flare.fallback_name(), "True Shot");
        let duo = table.iter().find(|o| o.name == "Sea Storm").unwrap();
        assert_eq!(duo.fallback_name(), "Sea Storm");
    }

    #[test]
    fn test_parse_overrides_defaults_fallback_name() {
        let json = r#"[{"source":"zeus","name":"A","fallback_source":"ares"},
                       {"source":"zeus","name":"B","fallback_source":"zeus","fallback_name":"C"}]"#;
        let parsed = parse_overrides(json).unwrap();
        assert_eq!(parsed[0].fallback_name(), "A");
        assert_eq!(parsed[1].fallback_name(), "C");
    }
}
