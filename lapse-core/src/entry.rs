use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

/// Represents a stored value with its expiration time
#[derive(Debug, Clone)]
pub struct Entry {
    value: Arc<Value>,
    expires_at: Instant,
}

impl Entry {
    /// Creates a new entry with the given value and expiration time
    pub fn new(value: Arc<Value>, expires_at: Instant) -> Self {
        Self { value, expires_at }
    }

    /// Returns a reference to the stored value
    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Returns a shared reference to the stored value (zero-cost clone)
    pub fn value_shared(&self) -> Arc<Value> {
        Arc::clone(&self.value)
    }

    /// Consumes the entry and returns the stored value, cloning only when
    /// other references to it are still alive
    pub fn into_value(self) -> Value {
        Arc::try_unwrap(self.value).unwrap_or_else(|shared| (*shared).clone())
    }

    /// Returns the expiration time
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Replaces the expiration time, leaving the value untouched
    pub(crate) fn set_expires_at(&mut self, expires_at: Instant) {
        self.expires_at = expires_at;
    }

    /// Checks if this entry has expired
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn value(text: &str) -> Arc<Value> {
        Arc::new(Value::String(text.to_string()))
    }

    #[test]
    fn test_entry_not_expired() {
        let entry = Entry::new(value("test_value"), Instant::now() + Duration::from_secs(60));

        assert_eq!(entry.value(), &Value::String("test_value".to_string()));
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expired() {
        let entry = Entry::new(value("test_value"), Instant::now() - Duration::from_secs(1));

        assert!(entry.is_expired());
    }

    #[test]
    fn test_value_shared_returns_arc() {
        let entry = Entry::new(value("shared_value"), Instant::now() + Duration::from_secs(60));

        let shared1 = entry.value_shared();
        let shared2 = entry.value_shared();
        // Both should point to the same allocation
        assert!(Arc::ptr_eq(&shared1, &shared2));
        assert_eq!(*shared1, Value::String("shared_value".to_string()));
    }

    #[test]
    fn test_set_expires_at_keeps_value() {
        let mut entry = Entry::new(value("kept"), Instant::now() - Duration::from_secs(1));
        assert!(entry.is_expired());

        entry.set_expires_at(Instant::now() + Duration::from_secs(60));
        assert!(!entry.is_expired());
        assert_eq!(entry.value(), &Value::String("kept".to_string()));
    }

    #[test]
    fn test_into_value_with_outstanding_reference() {
        let entry = Entry::new(value("owned"), Instant::now() + Duration::from_secs(60));
        let shared = entry.value_shared();

        let owned = entry.into_value();
        assert_eq!(owned, *shared);
    }
}
