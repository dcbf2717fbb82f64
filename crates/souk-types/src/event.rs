use serde::{Deserialize, Serialize};

use crate::item::Item;

/// Domain events published to the notification sink.
///
/// Delivery is fire-and-forget: a failed or unobserved publish never
/// fails or rolls back the operation that produced it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MarketEvent {
    UserCreated { username: String },
    ItemCreated { item: Item },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_tag() {
        let event = MarketEvent::UserCreated {
            username: "alice".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains(r#""event":"user_created""#));
        assert!(json.contains("alice"));
    }
}
