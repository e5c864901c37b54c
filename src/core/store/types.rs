use serde::{Deserialize, Serialize};

/// A wizard mission: one screen of the guided flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mission {
    pub id: String,
    pub title: String,
    pub kind: MissionKind,
    #[serde(default)]
    pub description: String,
    /// Free-form payload: prompt text, template id, script body.
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MissionKind {
    Text,
    Voice,
    Screen,
}

impl MissionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "TEXT",
            Self::Voice => "VOICE",
            Self::Screen => "SCREEN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "TEXT" => Some(Self::Text),
            "VOICE" => Some(Self::Voice),
            "SCREEN" => Some(Self::Screen),
            _ => None,
        }
    }
}

/// A generated-media cache entry (avatar, greeting voice, card video).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: String,
    pub mission_id: String,
    pub kind: String,
    pub url: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mission_kind_serializes_uppercase() {
        let json = serde_json::to_string(&MissionKind::Voice).unwrap();
        assert_eq!(json, "\"VOICE\"");
        let parsed: MissionKind = serde_json::from_str("\"SCREEN\"").unwrap();
        assert_eq!(parsed, MissionKind::Screen);
    }

    #[test]
    fn mission_kind_round_trips_as_str() {
        for kind in [MissionKind::Text, MissionKind::Voice, MissionKind::Screen] {
            assert_eq!(MissionKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(MissionKind::parse("VIDEO"), None);
    }
}
