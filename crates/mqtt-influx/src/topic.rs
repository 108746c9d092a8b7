// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topic decomposition into measurement and tags.

/// Tag holding the normalized topic.
pub const TOPIC_TAG: &str = "topic";

/// Prefix of per-segment tags (`tp0`, `tp1`, ...).
pub const SEGMENT_TAG_PREFIX: &str = "tp";

/// Measurement name and tags derived from a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTopic {
    /// First topic segment.
    pub measurement: String,
    /// `topic`, then `tp0..tpN-1`, in that order.
    pub tags: Vec<(String, String)>,
}

impl ParsedTopic {
    /// Decompose a topic string.
    ///
    /// Surrounding whitespace and one leading and one trailing `/` are
    /// stripped. Returns `None` when nothing is left, meaning the message
    /// should be skipped. Segment contents are not validated.
    pub fn parse(topic: &str) -> Option<Self> {
        let topic = topic.trim();
        let topic = topic.strip_prefix('/').unwrap_or(topic);
        let topic = topic.strip_suffix('/').unwrap_or(topic);

        if topic.is_empty() {
            return None;
        }

        let segments: Vec<&str> = topic.split('/').collect();
        let measurement = segments[0].to_string();

        let mut tags = Vec::with_capacity(segments.len() + 1);
        tags.push((TOPIC_TAG.to_string(), topic.to_string()));
        for (i, segment) in segments.iter().enumerate() {
            tags.push((format!("{}{}", SEGMENT_TAG_PREFIX, i), segment.to_string()));
        }

        Some(Self { measurement, tags })
    }

    /// Look up a tag value.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The normalized topic.
    pub fn topic(&self) -> &str {
        self.tag(TOPIC_TAG).unwrap_or_default()
    }
}
