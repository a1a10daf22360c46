//! Edge record and its closed type set (§3.1).

use serde::{Deserialize, Serialize};
use std::fmt;

/// The closed set of edge types the synthesizer (or the store's own
/// `edges` table, via step 1) can produce. Unrecognized strings coming out
/// of stored `edges` rows are preserved verbatim via `Other` rather than
/// dropped — the store is allowed to carry relation names this pipeline
/// doesn't itself synthesize.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EdgeType {
    Explicit,
    HasState,
    HasAction,
    IsAgent,
    AgentHierarchy,
    TrajectoryMemory,
    TrajectorySequence,
    Sequence,
    SameStatePrefix,
    SameAction,
    SameAgent,
    SuccessCluster,
    FailureCluster,
    TrajectoryAction,
    TrajectoryAgent,
    TrajectoryNeural,
    AgentInstance,
    StateTypeBridge,
    MemoryAgent,
    MemoryContext,
    RoutesTo,
    EditedAfter,
    FileCoedit,
    ContentMatch,
    TypeMapping,
    Semantic,
    KnnFallback,
    Coedit,
    TrajectoryOutcome,
    /// A relation name read verbatim from the store that doesn't match any
    /// of the above (includes `semantic_bridge`, named in the grouping rule
    /// but never itself synthesized here).
    Other(String),
}

impl EdgeType {
    pub fn as_str(&self) -> &str {
        match self {
            EdgeType::Explicit => "explicit",
            EdgeType::HasState => "has_state",
            EdgeType::HasAction => "has_action",
            EdgeType::IsAgent => "is_agent",
            EdgeType::AgentHierarchy => "agent_hierarchy",
            EdgeType::TrajectoryMemory => "trajectory_memory",
            EdgeType::TrajectorySequence => "trajectory_sequence",
            EdgeType::Sequence => "sequence",
            EdgeType::SameStatePrefix => "same_state_prefix",
            EdgeType::SameAction => "same_action",
            EdgeType::SameAgent => "same_agent",
            EdgeType::SuccessCluster => "success_cluster",
            EdgeType::FailureCluster => "failure_cluster",
            EdgeType::TrajectoryAction => "trajectory_action",
            EdgeType::TrajectoryAgent => "trajectory_agent",
            EdgeType::TrajectoryNeural => "trajectory_neural",
            EdgeType::AgentInstance => "agent_instance",
            EdgeType::StateTypeBridge => "state_type_bridge",
            EdgeType::MemoryAgent => "memory_agent",
            EdgeType::MemoryContext => "memory_context",
            EdgeType::RoutesTo => "routes_to",
            EdgeType::EditedAfter => "edited_after",
            EdgeType::FileCoedit => "file_coedit",
            EdgeType::ContentMatch => "content_match",
            EdgeType::TypeMapping => "type_mapping",
            EdgeType::Semantic => "semantic",
            EdgeType::KnnFallback => "knn_fallback",
            EdgeType::Coedit => "coedit",
            EdgeType::TrajectoryOutcome => "trajectory_outcome",
            EdgeType::Other(s) => s,
        }
    }

    /// `group = semantic` iff `type ∈ {semantic, content_match, type_mapping,
    /// memory_context, semantic_bridge, knn_fallback}`, else `deterministic`
    /// (§4.4 `addEdge` contract).
    pub fn group(&self) -> EdgeGroup {
        let is_semantic = matches!(
            self,
            EdgeType::Semantic | EdgeType::ContentMatch | EdgeType::TypeMapping | EdgeType::MemoryContext | EdgeType::KnnFallback
        ) || matches!(self, EdgeType::Other(s) if s == "semantic_bridge");
        if is_semantic {
            EdgeGroup::Semantic
        } else {
            EdgeGroup::Deterministic
        }
    }
}

impl From<&str> for EdgeType {
    fn from(s: &str) -> Self {
        match s {
            "explicit" => EdgeType::Explicit,
            "has_state" => EdgeType::HasState,
            "has_action" => EdgeType::HasAction,
            "is_agent" => EdgeType::IsAgent,
            "agent_hierarchy" => EdgeType::AgentHierarchy,
            "trajectory_memory" => EdgeType::TrajectoryMemory,
            "trajectory_sequence" => EdgeType::TrajectorySequence,
            "sequence" => EdgeType::Sequence,
            "same_state_prefix" => EdgeType::SameStatePrefix,
            "same_action" => EdgeType::SameAction,
            "same_agent" => EdgeType::SameAgent,
            "success_cluster" => EdgeType::SuccessCluster,
            "failure_cluster" => EdgeType::FailureCluster,
            "trajectory_action" => EdgeType::TrajectoryAction,
            "trajectory_agent" => EdgeType::TrajectoryAgent,
            "trajectory_neural" => EdgeType::TrajectoryNeural,
            "agent_instance" => EdgeType::AgentInstance,
            "state_type_bridge" => EdgeType::StateTypeBridge,
            "memory_agent" => EdgeType::MemoryAgent,
            "memory_context" => EdgeType::MemoryContext,
            "routes_to" => EdgeType::RoutesTo,
            "edited_after" => EdgeType::EditedAfter,
            "file_coedit" => EdgeType::FileCoedit,
            "content_match" => EdgeType::ContentMatch,
            "type_mapping" => EdgeType::TypeMapping,
            "semantic" => EdgeType::Semantic,
            "knn_fallback" => EdgeType::KnnFallback,
            "coedit" => EdgeType::Coedit,
            "trajectory_outcome" => EdgeType::TrajectoryOutcome,
            other => EdgeType::Other(other.to_string()),
        }
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for EdgeType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for EdgeType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(EdgeType::from(s.as_str()))
    }
}

/// Derived classification fixed by the type's nature, not its origin
/// (§3.1 `Edge.group`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeGroup {
    Semantic,
    Deterministic,
}

impl EdgeGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeGroup::Semantic => "semantic",
            EdgeGroup::Deterministic => "deterministic",
        }
    }
}

/// Directed storage of a semantically-undirected relation, unless `type`
/// names a hierarchy (§3.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub source: usize,
    pub target: usize,
    pub weight: f32,
    #[serde(rename = "type")]
    pub edge_type: EdgeType,
    pub group: EdgeGroup,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semantic_group_membership_matches_closed_set() {
        assert_eq!(EdgeType::Semantic.group(), EdgeGroup::Semantic);
        assert_eq!(EdgeType::ContentMatch.group(), EdgeGroup::Semantic);
        assert_eq!(EdgeType::TypeMapping.group(), EdgeGroup::Semantic);
        assert_eq!(EdgeType::MemoryContext.group(), EdgeGroup::Semantic);
        assert_eq!(EdgeType::KnnFallback.group(), EdgeGroup::Semantic);
        assert_eq!(EdgeType::Other("semantic_bridge".into()).group(), EdgeGroup::Semantic);
        assert_eq!(EdgeType::HasState.group(), EdgeGroup::Deterministic);
        assert_eq!(EdgeType::RoutesTo.group(), EdgeGroup::Deterministic);
    }

    #[test]
    fn unrecognized_stored_type_round_trips_verbatim() {
        let t = EdgeType::from("custom_relation");
        assert_eq!(t.as_str(), "custom_relation");
    }

    #[test]
    fn known_types_round_trip_through_str() {
        for raw in ["has_state", "semantic", "routes_to", "knn_fallback"] {
            assert_eq!(EdgeType::from(raw).as_str(), raw);
        }
    }
}
