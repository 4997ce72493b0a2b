use serde_json::{Map, Value};

/// Named bag of JSON values that demos update every frame.
///
/// There is exactly one panel per running world. It is moved in when the
/// world is built and handed back when the frame loop stops.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DebugPanel {
    title: String,
    values: Map<String, Value>,
    status: Option<String>,
}

impl DebugPanel {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            values: Map::new(),
            status: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Inserts or replaces `key`, returning the previous value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Last setup/tick failure shown alongside the values.
    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = Some(status.into());
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// The whole panel as one JSON object.
    pub fn snapshot(&self) -> Value {
        let mut root = Map::new();
        root.insert("title".into(), Value::from(self.title.clone()));
        root.insert("values".into(), Value::Object(self.values.clone()));
        if let Some(status) = &self.status {
            root.insert("status".into(), Value::from(status.clone()));
        }
        Value::Object(root)
    }

    pub fn to_json_string(&self) -> String {
        self.snapshot().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_and_returns_previous() {
        let mut panel = DebugPanel::new("demo");
        assert!(panel.set("elapsed", 1.5).is_none());
        assert_eq!(panel.set("elapsed", 2.0), Some(Value::from(1.5)));
        assert_eq!(panel.len(), 1);
    }

    #[test]
    fn snapshot_includes_status_only_when_set() {
        let mut panel = DebugPanel::new("demo");
        panel.set("count", 3);
        let json = panel.to_json_string();
        assert!(json.contains("\"count\":3"));
        assert!(!json.contains("status"));

        panel.set_status("setup failed");
        assert_eq!(panel.snapshot()["status"], "setup failed");
    }
}
