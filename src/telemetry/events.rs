use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
#[serde(tag = "event_type")]
pub enum BusinessEvent {
    CommentListViewed {
        user_id: i64,
        store_id: String,
        rows: usize,
        total: i64,
        cache_hit: bool,
    },
    CommentLookupServed {
        user_id: i64,
        lookup: &'static str,
        options: usize,
    },
    FilterStateReset {
        user_id: i64,
        screen: String,
    },
}

impl BusinessEvent {
    pub fn log(&self) {
        let event_json = serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self));
        info!(
            target: "business_events",
            event = %event_json,
            "Business event occurred"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_event_type_tag() {
        let event = BusinessEvent::CommentLookupServed {
            user_id: 3,
            lookup: "contexts",
            options: 2,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "CommentLookupServed");
        assert_eq!(json["lookup"], "contexts");
        assert_eq!(json["options"], 2);
    }

    #[test]
    fn list_event_carries_store_id() {
        let event = BusinessEvent::CommentListViewed {
            user_id: 1,
            store_id: "abc".to_string(),
            rows: 20,
            total: 45,
            cache_hit: false,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["store_id"], "abc");
        assert_eq!(json["cache_hit"], false);
    }
}
