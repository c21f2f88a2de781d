/// Per-call metadata reported by the store through its response headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseMetadata {
    /// Request units consumed by the call.
    pub request_charge: f64,
    /// Opaque token to pass on subsequent calls for read-your-writes consistency.
    pub session_token: Option<String>,
    /// Opaque cursor for the next page. `None` when the call did not page or was the last page.
    pub continuation: Option<String>,
}

impl ResponseMetadata {
    pub fn with_request_charge(mut self, request_charge: f64) -> Self {
        self.request_charge = request_charge;
        self
    }

    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }

    pub fn with_continuation(mut self, continuation: Option<String>) -> Self {
        self.continuation = continuation;
        self
    }
}
