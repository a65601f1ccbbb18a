use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Coarse taxonomy label assigned to every ranked repository.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
pub enum Category {
    #[serde(rename = "RAG-centric")]
    #[strum(serialize = "RAG-centric")]
    RagCentric,

    #[serde(rename = "Multi-Agent Coordination")]
    #[strum(serialize = "Multi-Agent Coordination")]
    MultiAgentCoordination,

    #[serde(rename = "DevTools")]
    #[strum(serialize = "DevTools")]
    DevTools,

    #[serde(rename = "Experimental")]
    #[strum(serialize = "Experimental")]
    Experimental,

    #[serde(rename = "Domain-Specific")]
    #[strum(serialize = "Domain-Specific")]
    DomainSpecific,

    #[serde(rename = "General-purpose")]
    #[strum(serialize = "General-purpose")]
    GeneralPurpose,
}

impl Category {
    /// All categories, in rendering order.
    pub const ALL: [Self; 6] = [
        Self::RagCentric,
        Self::MultiAgentCoordination,
        Self::DevTools,
        Self::Experimental,
        Self::DomainSpecific,
        Self::GeneralPurpose,
    ];

    /// File-name-safe identifier used for per-category output files.
    #[must_use]
    pub const fn slug(&self) -> &'static str {
        match self {
            Self::RagCentric => "rag-centric",
            Self::MultiAgentCoordination => "multi-agent-coordination",
            Self::DevTools => "devtools",
            Self::Experimental => "experimental",
            Self::DomainSpecific => "domain-specific",
            Self::GeneralPurpose => "general-purpose",
        }
    }
}

// Keyword rules evaluated in priority order. Categories are mutually
// exclusive because the first matching rule wins, not because the keyword
// sets are disjoint ("dev" also appears inside "development" descriptions
// that mention research, say). Order changes here are behavior changes.
const CATEGORY_RULES: &[(Category, &[&str])] = &[
    (Category::RagCentric, &["rag", "retrieval"]),
    (Category::MultiAgentCoordination, &["multi-agent", "multiagent", "crew", "team"]),
    (Category::DevTools, &["dev", "tool", "test"]),
    (Category::DomainSpecific, &["video", "game", "finance", "security"]),
    (Category::Experimental, &["experimental", "research"]),
];

/// Derive a category from free-text repository metadata.
///
/// Performs case-insensitive substring matching against the concatenated
/// description and topics; the first matching rule wins and the default is
/// [`Category::GeneralPurpose`].
#[must_use]
pub fn categorize(description: Option<&str>, topics: &[String]) -> Category {
    let mut haystack = description.unwrap_or_default().to_lowercase();
    for topic in topics {
        haystack.push(' ');
        haystack.push_str(&topic.to_lowercase());
    }

    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|kw| haystack.contains(kw)) {
            return *category;
        }
    }

    Category::GeneralPurpose
}
