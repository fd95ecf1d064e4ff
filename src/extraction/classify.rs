//! Delivery ticket classification and row selection.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::extraction::rows::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketCategory {
    /// Deliveries out of Wuling city.
    Wuling,
    /// Deliveries across the valley outposts.
    Valley,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: TicketCategory,
    /// Any of these in the row's first fragment selects the category.
    pub location_keywords: Vec<String>,
    /// Must appear in the detail fragment for the row to be taken.
    pub accept_keyword: String,
    /// Must not appear in the detail fragment. Needed when the accept keyword
    /// is a substring of a longer, unrelated phrase.
    #[serde(default)]
    pub reject_keyword: Option<String>,
}

impl CategoryRule {
    pub fn defaults() -> Vec<Self> {
        vec![
            Self {
                category: TicketCategory::Wuling,
                location_keywords: vec!["武陵城".into()],
                accept_keyword: "易损".into(),
                reject_keyword: Some("不易损".into()),
            },
            Self {
                category: TicketCategory::Valley,
                location_keywords: vec!["供能高地".into(), "矿脉源区".into(), "源石研究园".into()],
                accept_keyword: "极易损".into(),
                reject_keyword: None,
            },
        ]
    }

    pub fn matches_location(&self, text: &str) -> bool {
        self.location_keywords.iter().any(|k| text.contains(k.as_str()))
    }

    pub fn accepts(&self, detail: &str) -> bool {
        detail.contains(self.accept_keyword.as_str())
            && !self
                .reject_keyword
                .as_deref()
                .is_some_and(|reject| detail.contains(reject))
    }
}

pub struct RowClassifier<'a> {
    rules: &'a [CategoryRule],
    detail_index: usize,
}

impl<'a> RowClassifier<'a> {
    pub fn new(rules: &'a [CategoryRule], detail_index: usize) -> Self {
        Self {
            rules,
            detail_index,
        }
    }

    fn rule_for(&self, row: &Row) -> Option<&'a CategoryRule> {
        let first = row.first()?;
        self.rules.iter().find(|rule| rule.matches_location(&first.text))
    }

    /// First rule whose location keywords hit the row's first fragment.
    pub fn classify(&self, row: &Row) -> Option<TicketCategory> {
        self.rule_for(row).map(|rule| rule.category)
    }

    pub fn is_actionable(&self, row: &Row, enabled: &[TicketCategory]) -> bool {
        let Some(rule) = self.rule_for(row) else {
            return false;
        };
        if !enabled.contains(&rule.category) {
            return false;
        }
        row.get(self.detail_index)
            .is_some_and(|detail| rule.accepts(&detail.text))
    }

    pub fn select_actionable_row<'r>(
        &self,
        rows: &'r [Row],
        enabled: &[TicketCategory],
    ) -> Option<(&'r Row, TicketCategory)> {
        rows.iter().find_map(|row| {
            if self.is_actionable(row, enabled) {
                self.classify(row).map(|category| (row, category))
            } else {
                None
            }
        })
    }
}

/// Minimum spacing between clicks on the listing's refresh control.
#[derive(Debug, Clone, Copy)]
pub struct RefreshThrottle {
    cooldown: Duration,
    last: Option<Instant>,
}

impl RefreshThrottle {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last: None,
        }
    }

    /// Time still to wait at `now` before the next refresh is allowed.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => self.cooldown.saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    pub fn record(&mut self, at: Instant) {
        self.last = Some(at);
    }

    pub fn last_refresh(&self) -> Option<Instant> {
        self.last
    }
}
