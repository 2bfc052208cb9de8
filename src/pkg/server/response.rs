//! The uniform response envelope. Failures are shaped the same way by
//! the error type's `IntoResponse` impl.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Envelope {
            success: true,
            message: message.into(),
            data: Some(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_carries_data() {
        let envelope = Envelope::ok("Registration submitted", json!({"id": 42}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(
            value,
            json!({
                "success": true,
                "message": "Registration submitted",
                "data": {"id": 42}
            })
        );
    }

    #[test]
    fn data_field_is_omitted_when_absent() {
        let envelope = Envelope::<serde_json::Value> {
            success: true,
            message: "ok".into(),
            data: None,
        };
        let value = serde_json::to_value(&envelope).unwrap();
        assert!(value.get("data").is_none());
    }
}
