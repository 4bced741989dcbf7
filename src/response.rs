use serde::Serialize;

/// `{"status": "success", "data": ...}` body shared by every handler.
#[derive(Debug, Serialize)]
pub struct Success<T> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> Success<T> {
    pub fn with(data: T) -> Self {
        Self {
            status: "success",
            data: Some(data),
        }
    }
}

impl Success<()> {
    pub fn empty() -> Self {
        Self {
            status: "success",
            data: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_success_has_no_data_key() {
        let json = serde_json::to_value(Success::empty()).unwrap();
        assert_eq!(json, serde_json::json!({ "status": "success" }));
    }

    #[test]
    fn success_wraps_data() {
        let json = serde_json::to_value(Success::with(vec![1, 2])).unwrap();
        assert_eq!(json["data"], serde_json::json!([1, 2]));
    }
}
