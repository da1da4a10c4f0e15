//! Session - Per-client conversational context
//!
//! Sessions are created on the first query with an unseen identifier and
//! expire lazily: a record older than the inactivity window reads as fresh
//! on the next access. Nothing deletes session records synchronously.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// One search interaction inside a session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryEvent {
    /// Raw query text as submitted
    pub query: String,
    pub timestamp: DateTime<Utc>,
    /// Product ids returned for this query, in rank order
    #[serde(default)]
    pub returned_ids: Vec<i64>,
    /// Product the client later selected, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_id: Option<i64>,
}

/// Session - accumulated interaction history for one client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque identifier, client-supplied or server-generated
    pub id: String,
    /// Ordered query history, oldest first
    #[serde(default)]
    pub events: Vec<QueryEvent>,
    /// Products viewed through the recommendations endpoint
    #[serde(default)]
    pub viewed_products: Vec<i64>,
    /// Categories seen in this session's results, most recent last
    #[serde(default)]
    pub interested_categories: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

/// History kept per session. Older entries are dropped on write.
const MAX_EVENTS: usize = 20;
const MAX_VIEWED: usize = 50;
const MAX_CATEGORIES: usize = 10;

impl Session {
    /// Create a fresh session with no history
    pub fn new(id: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            events: Vec::new(),
            viewed_products: Vec::new(),
            interested_categories: Vec::new(),
            created_at: now,
            last_active_at: now,
        }
    }

    /// True when the session has been idle longer than `window`
    pub fn is_expired(&self, window: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_active_at > window
    }

    /// Append a query event, trimming history and bumping activity
    pub fn push_event(&mut self, event: QueryEvent) {
        self.last_active_at = event.timestamp;
        self.events.push(event);
        if self.events.len() > MAX_EVENTS {
            let drop = self.events.len() - MAX_EVENTS;
            self.events.drain(..drop);
        }
    }

    /// Record a viewed product, keeping the most recent entries
    pub fn push_viewed(&mut self, product_id: i64) {
        if !self.viewed_products.contains(&product_id) {
            self.viewed_products.push(product_id);
            if self.viewed_products.len() > MAX_VIEWED {
                let drop = self.viewed_products.len() - MAX_VIEWED;
                self.viewed_products.drain(..drop);
            }
        }
        self.last_active_at = Utc::now();
    }

    /// Track categories that appeared in results, most recent last
    pub fn push_categories<'a>(&mut self, categories: impl IntoIterator<Item = &'a str>) {
        for category in categories {
            if !self.interested_categories.iter().any(|c| c == category) {
                self.interested_categories.push(category.to_string());
            }
        }
        if self.interested_categories.len() > MAX_CATEGORIES {
            let drop = self.interested_categories.len() - MAX_CATEGORIES;
            self.interested_categories.drain(..drop);
        }
    }

    /// Mark the most recent event that returned `product_id` as selected
    pub fn mark_selected(&mut self, product_id: i64) {
        if let Some(event) = self
            .events
            .iter_mut()
            .rev()
            .find(|e| e.returned_ids.contains(&product_id))
        {
            event.selected_id = Some(product_id);
        }
        self.last_active_at = Utc::now();
    }

    /// Recent query texts, newest last, used for the preference embedding
    pub fn recent_queries(&self, n: usize) -> Vec<&str> {
        let start = self.events.len().saturating_sub(n);
        self.events[start..].iter().map(|e| e.query.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(query: &str, returned: &[i64]) -> QueryEvent {
        QueryEvent {
            query: query.to_string(),
            timestamp: Utc::now(),
            returned_ids: returned.to_vec(),
            selected_id: None,
        }
    }

    #[test]
    fn test_event_history_is_trimmed() {
        let mut session = Session::new("s1".to_string());
        for i in 0..30 {
            session.push_event(event(&format!("q{}", i), &[]));
        }
        assert_eq!(session.events.len(), MAX_EVENTS);
        assert_eq!(session.events[0].query, "q10");
    }

    #[test]
    fn test_expiry_window() {
        let mut session = Session::new("s1".to_string());
        let now = Utc::now();
        session.last_active_at = now - Duration::minutes(31);
        assert!(session.is_expired(Duration::minutes(30), now));
        session.last_active_at = now - Duration::minutes(29);
        assert!(!session.is_expired(Duration::minutes(30), now));
    }

    #[test]
    fn test_mark_selected_targets_latest_matching_event() {
        let mut session = Session::new("s1".to_string());
        session.push_event(event("first", &[1, 2]));
        session.push_event(event("second", &[2, 3]));
        session.mark_selected(2);
        assert_eq!(session.events[1].selected_id, Some(2));
        assert_eq!(session.events[0].selected_id, None);
    }
}
