// src/services/catalog.rs
use url::Url;

/// Example prompt offered on the start screen.
pub const DEFAULT_QUERY: &str = "i want to run Van-Westendrop analysis";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisTool {
    pub name: &'static str,
    pub description: &'static str,
    pub path: &'static str,
}

impl AnalysisTool {
    /// Message that asks the assistant for this analysis.
    pub fn query(&self) -> String {
        format!("i want to run {} analysis", self.name)
    }
}

pub const ANALYSIS_TOOLS: &[AnalysisTool] = &[
    AnalysisTool {
        name: "Gabor Granger",
        description: "Price sensitivity analysis to determine optimal pricing",
        path: "/analysis/gabor-granger",
    },
    AnalysisTool {
        name: "Driver Analysis",
        description: "Identify key factors driving customer satisfaction and loyalty",
        path: "/analysis/driver-analysis",
    },
    AnalysisTool {
        name: "Segmentation",
        description: "Cluster analysis to identify distinct customer segments",
        path: "/analysis/segmentation",
    },
    AnalysisTool {
        name: "Choice Based Conjoint",
        description: "Analyze feature preferences and willingness to pay",
        path: "/analysis/conjoint",
    },
];

/// Tool by 1-based position, as listed to the user.
pub fn tool(position: usize) -> Option<&'static AnalysisTool> {
    position.checked_sub(1).and_then(|i| ANALYSIS_TOOLS.get(i))
}

/// The `query` parameter of an analysis link, decoded. Empty values count as
/// absent.
pub fn query_from_link(link: &Url) -> Option<String> {
    link.query_pairs()
        .find(|(key, _)| key == "query")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}
