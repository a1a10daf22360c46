//! Color & Mode Resolver (§4.8): one RGB-ish color per node under a
//! selectable mode, plus a legend map driving the UI.

use std::collections::HashMap;

use crate::node::Node;

use super::palette::palette_color;

/// The ~25 selectable coloring modes (§4.8). Each is either categorical
/// (colors allocated from the fixed palette family, keyed by a string) or a
/// gradient (colors interpolated from a normalized numeric value).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorMode {
    Source,
    Namespace,
    Connectivity,
    Time,
    Recency,
    Length,
    ContentType,
    QValue,
    Visits,
    State,
    Action,
    Success,
    Quality,
    Agent,
    Model,
    TopologyRole,
    Foundation,
    Layer,
    Domain,
    Confidence,
    UsageCount,
    Reward,
    RewardSum,
    Effectiveness,
    RecallCount,
    AgentHealth,
}

impl ColorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColorMode::Source => "source",
            ColorMode::Namespace => "namespace",
            ColorMode::Connectivity => "connectivity",
            ColorMode::Time => "time",
            ColorMode::Recency => "recency",
            ColorMode::Length => "length",
            ColorMode::ContentType => "content_type",
            ColorMode::QValue => "q_value",
            ColorMode::Visits => "visits",
            ColorMode::State => "state",
            ColorMode::Action => "action",
            ColorMode::Success => "success",
            ColorMode::Quality => "quality",
            ColorMode::Agent => "agent",
            ColorMode::Model => "model",
            ColorMode::TopologyRole => "topology_role",
            ColorMode::Foundation => "foundation",
            ColorMode::Layer => "layer",
            ColorMode::Domain => "domain",
            ColorMode::Confidence => "confidence",
            ColorMode::UsageCount => "usage_count",
            ColorMode::Reward => "reward",
            ColorMode::RewardSum => "reward_sum",
            ColorMode::Effectiveness => "effectiveness",
            ColorMode::RecallCount => "recall_count",
            ColorMode::AgentHealth => "agent_health",
        }
    }

    pub fn all() -> &'static [ColorMode] {
        use ColorMode::*;
        &[
            Source, Namespace, Connectivity, Time, Recency, Length, ContentType, QValue, Visits, State, Action,
            Success, Quality, Agent, Model, TopologyRole, Foundation, Layer, Domain, Confidence, UsageCount, Reward,
            RewardSum, Effectiveness, RecallCount, AgentHealth,
        ]
    }

    fn categorical_key(&self, node: &Node) -> Option<String> {
        match self {
            ColorMode::Source => Some(node.source.as_str().to_string()),
            ColorMode::Namespace => node.namespace.clone(),
            ColorMode::ContentType => Some(format!("{:?}", node.content_type)),
            ColorMode::State => node.state.clone(),
            ColorMode::Action => node.action.clone(),
            ColorMode::Success => node.success.map(|s| if s { "success".to_string() } else { "failure".to_string() }),
            ColorMode::Agent => node.agent.clone(),
            ColorMode::Model => node.model.clone(),
            ColorMode::TopologyRole => node.topology_role.clone(),
            ColorMode::Foundation => node.is_foundation.map(|f| f.to_string()),
            ColorMode::Layer => node.layer.clone(),
            ColorMode::Domain => node.domain.clone(),
            _ => None,
        }
    }

    fn gradient_value(&self, node: &Node) -> Option<f64> {
        match self {
            ColorMode::Connectivity => Some(node.connection_count as f64),
            ColorMode::Time => node.timestamp.map(|t| t as f64),
            ColorMode::Recency => node.last_recalled.map(|t| t as f64).or(node.timestamp.map(|t| t as f64)),
            ColorMode::Length => Some(node.value_length as f64),
            ColorMode::QValue => node.q_value,
            ColorMode::Visits => node.visits.map(|v| v as f64),
            ColorMode::Quality => match (node.reward, node.effectiveness) {
                (Some(r), Some(e)) => Some((r + e) / 2.0),
                (Some(r), None) => Some(r),
                (None, Some(e)) => Some(e),
                (None, None) => None,
            },
            ColorMode::Confidence => node.confidence,
            ColorMode::UsageCount => node.usage_count.map(|v| v as f64),
            ColorMode::Reward => node.reward,
            ColorMode::RewardSum => node.reward_sum,
            ColorMode::Effectiveness => node.effectiveness,
            ColorMode::RecallCount => node.recall_count.map(|v| v as f64),
            ColorMode::AgentHealth => node.agent_health,
            _ => None,
        }
    }

    fn is_gradient(&self) -> bool {
        !matches!(
            self,
            ColorMode::Source
                | ColorMode::Namespace
                | ColorMode::ContentType
                | ColorMode::State
                | ColorMode::Action
                | ColorMode::Success
                | ColorMode::Agent
                | ColorMode::Model
                | ColorMode::TopologyRole
                | ColorMode::Foundation
                | ColorMode::Layer
                | ColorMode::Domain
        )
    }
}

/// Result of resolving a mode over a node set: one color per node (in input
/// order, `None` where the node has no value under this mode) plus a
/// `label → color` legend.
pub struct Resolved {
    pub colors: Vec<Option<String>>,
    pub legend: Vec<(String, String)>,
}

/// Linear blue→red gradient over `[0, 1]`.
fn gradient_color(t: f64) -> String {
    let t = t.clamp(0.0, 1.0);
    let r = (t * 255.0).round() as u8;
    let b = ((1.0 - t) * 255.0).round() as u8;
    format!("#{r:02x}00{b:02x}")
}

/// Resolve colors and a legend for `nodes` under `mode` (§4.8).
pub fn resolve(nodes: &[Node], mode: ColorMode) -> Resolved {
    if mode.is_gradient() {
        let values: Vec<Option<f64>> = nodes.iter().map(|n| mode.gradient_value(n)).collect();
        let (min, max) = values.iter().flatten().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let span = if (max - min).abs() < f64::EPSILON { 0.0 } else { max - min };
        let colors = values
            .iter()
            .map(|v| v.map(|v| gradient_color(if span == 0.0 { 0.0 } else { (v - min) / span })))
            .collect();
        let legend = vec![
            (format!("min ({min})"), gradient_color(0.0)),
            (format!("max ({max})"), gradient_color(1.0)),
        ];
        return Resolved { colors, legend };
    }

    let mut legend_map: HashMap<String, String> = HashMap::new();
    let mut legend_order = Vec::new();
    let colors = nodes
        .iter()
        .map(|n| {
            mode.categorical_key(n).map(|key| {
                let color = legend_map
                    .entry(key.clone())
                    .or_insert_with(|| palette_color(&format!("{}:{}", mode.as_str(), key)))
                    .clone();
                if !legend_order.contains(&key) {
                    legend_order.push(key.clone());
                }
                color
            })
        })
        .collect();
    let legend = legend_order.into_iter().map(|k| (k.clone(), legend_map[&k].clone())).collect();

    Resolved { colors, legend }
}
