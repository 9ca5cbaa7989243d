//! Transient UI notifications attached to API replies.

use serde::Serialize;

pub const SUCCESS_DISMISS_MS: u64 = 3000;
pub const ERROR_DISMISS_MS: u64 = 5000;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Info,
    Error,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Toast {
    pub kind: ToastKind,
    pub message: String,
    pub dismiss_after_ms: u64,
}

impl Toast {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Success, message: message.into(), dismiss_after_ms: SUCCESS_DISMISS_MS }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Info, message: message.into(), dismiss_after_ms: SUCCESS_DISMISS_MS }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: ToastKind::Error, message: message.into(), dismiss_after_ms: ERROR_DISMISS_MS }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toast_wire_format() {
        let json = serde_json::to_value(Toast::error("Failed to update stock")).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "error", "message": "Failed to update stock", "dismissAfterMs": 5000}));
        assert_eq!(Toast::success("Saved").dismiss_after_ms, 3000);
    }
}
