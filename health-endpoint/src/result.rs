use axum::http::StatusCode;
use serde::Serialize;
use std::borrow::Cow;
use std::fmt;

/// Name of a character encoding, rendered into the `charset=` parameter of a
/// `Content-Type` header.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Charset(Cow<'static, str>);

impl Charset {
    pub const UTF_8: Charset = Charset(Cow::Borrowed("utf-8"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of one health-check execution, translated verbatim into the
/// HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthCheckResult {
    status_code: StatusCode,
    body: Option<String>,
    content_type: Option<String>,
    content_encoding: Option<Charset>,
}

impl HealthCheckResult {
    pub fn new(status_code: StatusCode) -> Self {
        Self {
            status_code,
            body: None,
            content_type: None,
            content_encoding: None,
        }
    }

    pub fn healthy() -> Self {
        Self::new(StatusCode::OK)
    }

    pub fn unhealthy() -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE)
    }

    /// Plain-text result encoded as UTF-8.
    pub fn text(status_code: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status_code)
            .with_body(body)
            .with_content_type("text/plain")
            .with_content_encoding(Charset::UTF_8)
    }

    /// JSON result encoded as UTF-8.
    pub fn json<T: Serialize + ?Sized>(
        status_code: StatusCode,
        value: &T,
    ) -> Result<Self, serde_json::Error> {
        let body = serde_json::to_string(value)?;
        Ok(Self::new(status_code)
            .with_body(body)
            .with_content_type("application/json")
            .with_content_encoding(Charset::UTF_8))
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_content_encoding(mut self, charset: Charset) -> Self {
        self.content_encoding = Some(charset);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn content_encoding(&self) -> Option<&Charset> {
        self.content_encoding.as_ref()
    }

    pub(crate) fn into_body(self) -> Option<String> {
        self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_new_has_no_payload() {
        let result = HealthCheckResult::new(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(result.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(result.body().is_none());
        assert!(result.content_type().is_none());
        assert!(result.content_encoding().is_none());
    }

    #[test]
    fn test_text_result() {
        let result = HealthCheckResult::text(StatusCode::OK, "OK");
        assert_eq!(result.body(), Some("OK"));
        assert_eq!(result.content_type(), Some("text/plain"));
        assert_eq!(result.content_encoding(), Some(&Charset::UTF_8));
    }

    #[test]
    fn test_json_result() {
        let result = HealthCheckResult::json(StatusCode::OK, &json!({"status": "ok"})).unwrap();
        assert_eq!(result.body(), Some(r#"{"status":"ok"}"#));
        assert_eq!(result.content_type(), Some("application/json"));
    }

    #[test]
    fn test_charset_display() {
        assert_eq!(Charset::UTF_8.to_string(), "utf-8");
        assert_eq!(Charset::new("iso-8859-1").name(), "iso-8859-1");
    }
}
