//! Projection of a [`MetricSnapshot`] into the fixed row of metric cards.

use serde::Serialize;

use crate::types::{MetricSnapshot, TileValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeDirection {
    Increase,
    Decrease,
    Neutral,
}

/// A single summary statistic ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub id: &'static str,
    pub title: &'static str,
    pub value: String,
    pub change: f64,
    pub direction: ChangeDirection,
}

#[derive(Clone, Copy)]
enum Format {
    Count,
    Percent,
    Text,
}

struct CardDef {
    id: &'static str,
    title: &'static str,
    source: &'static str,
    format: Format,
    /// Volume cards always render as neutral.
    directional: bool,
}

const CARDS: &[CardDef] = &[
    CardDef {
        id: "impressions",
        title: "Impressions",
        source: "impressions",
        format: Format::Count,
        directional: false,
    },
    CardDef {
        id: "reactions",
        title: "Reactions",
        source: "reactions",
        format: Format::Count,
        directional: false,
    },
    CardDef {
        id: "comments",
        title: "Comments",
        source: "comments",
        format: Format::Count,
        directional: false,
    },
    CardDef {
        id: "click_through_rate",
        title: "Click-Through Rate",
        source: "clickThroughRate",
        format: Format::Percent,
        directional: true,
    },
    CardDef {
        id: "profile_views",
        title: "Profile Views",
        source: "profileViews",
        format: Format::Count,
        directional: true,
    },
    CardDef {
        id: "post_reach",
        title: "Post Reach",
        source: "postReach",
        format: Format::Count,
        directional: true,
    },
    CardDef {
        id: "post_likes",
        title: "Post Likes",
        source: "postLikes",
        format: Format::Count,
        directional: true,
    },
    CardDef {
        id: "engagement_rate",
        title: "Engagement Rate",
        source: "engagementRate",
        format: Format::Percent,
        directional: true,
    },
    CardDef {
        id: "top_performing_post",
        title: "Top Post",
        source: "topPerformingPost",
        format: Format::Text,
        directional: true,
    },
];

/// Builds the card row. Missing tiles render as zero (or an empty title)
/// with no change, so the row always has the same shape.
#[must_use]
pub fn metric_cards(snapshot: &MetricSnapshot) -> Vec<MetricCard> {
    CARDS
        .iter()
        .map(|def| {
            let tile = snapshot.get(def.source);
            let change = tile.map_or(0.0, |t| t.change);
            let value = match def.format {
                Format::Count => {
                    format_count(tile.and_then(|t| t.value.as_f64()).unwrap_or(0.0))
                }
                Format::Percent => {
                    format!("{:.2}%", tile.and_then(|t| t.value.as_f64()).unwrap_or(0.0))
                }
                Format::Text => match tile.map(|t| &t.value) {
                    Some(TileValue::Text(s)) => s.clone(),
                    Some(TileValue::Number(n)) => format_count(*n),
                    None => String::new(),
                },
            };
            let direction = if !def.directional {
                ChangeDirection::Neutral
            } else if change >= 0.0 {
                ChangeDirection::Increase
            } else {
                ChangeDirection::Decrease
            };
            MetricCard {
                id: def.id,
                title: def.title,
                value,
                change,
                direction,
            }
        })
        .collect()
}

/// Whole numbers print without a fractional part; anything else keeps two
/// decimals.
fn format_count(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        format!("{n:.2}")
    }
}
