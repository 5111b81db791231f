// src/infrastructure/pocket/model.rs
use serde::Deserialize;
use serde_json::Value;

/// Raw `/v3/get` payload. `list` is a mapping of item-id to record, except
/// that the API serializes an empty page as an empty array. `since` arrives
/// as a bare number; it is treated as an opaque token everywhere else.
#[derive(Debug, Deserialize)]
pub struct RetrievePayload {
    #[serde(default)]
    pub list: Value,
    #[serde(default)]
    pub since: Option<Value>,
}

impl RetrievePayload {
    pub fn items(&self) -> Vec<Value> {
        match &self.list {
            Value::Object(map) => map.values().cloned().collect(),
            _ => Vec::new(),
        }
    }

    pub fn cursor(&self) -> Option<String> {
        match &self.since {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}

/// Raw `/v3/stats` payload; only the list size is of interest, and only for
/// progress output.
#[derive(Debug, Deserialize)]
pub struct StatsPayload {
    pub count_list: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_object_list_when_parsed_then_records_extracted() {
        let payload: RetrievePayload = serde_json::from_value(json!({
            "list": {"1": {"item_id": "1"}, "2": {"item_id": "2"}},
            "since": 1348853312
        }))
        .unwrap();
        assert_eq!(payload.items().len(), 2);
        assert_eq!(payload.cursor().as_deref(), Some("1348853312"));
    }

    #[test]
    fn given_empty_array_list_when_parsed_then_no_records() {
        let payload: RetrievePayload =
            serde_json::from_value(json!({"list": [], "since": "1348853312"})).unwrap();
        assert!(payload.items().is_empty());
        assert_eq!(payload.cursor().as_deref(), Some("1348853312"));
    }

    #[test]
    fn given_missing_since_when_parsed_then_no_cursor() {
        let payload: RetrievePayload = serde_json::from_value(json!({"list": {}})).unwrap();
        assert_eq!(payload.cursor(), None);
    }
}
