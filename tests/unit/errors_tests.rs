/*!
 * Tests for error types
 */

use livesub::errors::{AppError, ReplayError, SessionError};

#[test]
fn test_replayError_display_shouldIncludeLine() {
    let err = ReplayError::Parse {
        line: 3,
        message: "expected value".to_string(),
    };
    assert_eq!(err.to_string(), "Line 3: expected value");
}

#[test]
fn test_appError_fromSessionError_shouldWrap() {
    let err: AppError = SessionError::Closed.into();
    assert!(matches!(err, AppError::Session(SessionError::Closed)));
    assert_eq!(err.to_string(), "Session error: Capture session is closed");
}

#[test]
fn test_appError_fromIoAndAnyhow_shouldConvert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    assert!(matches!(AppError::from(io), AppError::File(_)));

    let any = AppError::from(anyhow::anyhow!("boom"));
    assert_eq!(any.to_string(), "Unknown error: boom");
}
