use super::*;

// =============================================================================
// classify
// =============================================================================

#[test]
fn classify_not_found_by_code_or_reason() {
    assert_eq!(FailureKind::classify("404 Not Found"), FailureKind::NotFound);
    assert_eq!(FailureKind::classify("stream 404"), FailureKind::NotFound);
    assert_eq!(FailureKind::classify("Not Found"), FailureKind::NotFound);
}

#[test]
fn classify_priority_prefers_not_found() {
    // A body mentioning several codes resolves in priority order.
    assert_eq!(FailureKind::classify("403 after 404"), FailureKind::NotFound);
    assert_eq!(FailureKind::classify("500 then 403"), FailureKind::Forbidden);
}

#[test]
fn classify_forbidden_and_server_error() {
    assert_eq!(FailureKind::classify("403 Forbidden"), FailureKind::Forbidden);
    assert_eq!(FailureKind::classify("500 Internal Server Error"), FailureKind::ServerError);
}

#[test]
fn classify_everything_else_is_generic() {
    assert_eq!(FailureKind::classify("Connection lost"), FailureKind::Generic);
    assert_eq!(FailureKind::classify(""), FailureKind::Generic);
    assert_eq!(FailureKind::classify("not found"), FailureKind::Generic);
}

// =============================================================================
// ViewerError
// =============================================================================

#[test]
fn from_failure_picks_variant() {
    assert!(matches!(ViewerError::from_failure("404 Not Found"), ViewerError::NotFound(_)));
    assert!(matches!(ViewerError::from_failure("403 Forbidden"), ViewerError::Forbidden(_)));
    assert!(matches!(ViewerError::from_failure("500"), ViewerError::ServerError(_)));
    assert!(matches!(ViewerError::from_failure("timeout"), ViewerError::Connection(_)));
}

#[test]
fn error_codes_are_stable() {
    assert_eq!(ViewerError::Configuration("x".into()).error_code(), "E_CONFIGURATION");
    assert_eq!(ViewerError::UnknownLayer("m".into()).error_code(), "E_UNKNOWN_LAYER");
    assert_eq!(ViewerError::NotConnected.error_code(), "E_NOT_CONNECTED");
    assert_eq!(
        ViewerError::TransportDisconnected(TransportState::Failed).to_string(),
        "transport failed"
    );
}

#[test]
fn configuration_is_not_retryable() {
    assert!(!ViewerError::Configuration("x".into()).retryable());
    assert!(!ViewerError::UnknownLayer("x".into()).retryable());
    assert!(ViewerError::NotFound("404".into()).retryable());
    assert!(ViewerError::TransportDisconnected(TransportState::Disconnected).retryable());
}

#[test]
fn negotiation_status_renders_code_and_reason() {
    let err = NegotiationError::Status { status: 404, reason: "Not Found".into(), body: "no such stream".into() };
    assert_eq!(err.to_string(), "404 Not Found");
    assert_eq!(err.error_code(), "E_NEGOTIATION_STATUS");
    assert!(!err.retryable());
    let err = NegotiationError::Status { status: 503, reason: "Service Unavailable".into(), body: String::new() };
    assert!(err.retryable());
}
