//! Sensitive data marker for automatic redaction
//!
//! The management token used against the target store travels through the
//! configuration and client layers wrapped in `Sensitive<T>`, so it can never
//! end up in a log line or an error message.

use std::fmt;

/// Wrapper for sensitive data that redacts itself in Debug and Display
///
/// # Example
///
/// ```
/// use envsync_core_types::Sensitive;
///
/// let token = Sensitive::new("CFPAT-abc123");
/// assert_eq!(format!("{:?}", token), "***REDACTED***");
/// assert_eq!(token.expose(), &"CFPAT-abc123");
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Expose the underlying value
    ///
    /// Only call this where the raw value is sent over the wire (the
    /// `Authorization` header).
    pub fn expose(&self) -> &T {
        &self.0
    }

    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_debug_redaction() {
        let token = Sensitive::new("CFPAT-secret-token");
        let debug_str = format!("{:?}", token);
        assert_eq!(debug_str, "***REDACTED***");
        assert!(!debug_str.contains("CFPAT"));
    }

    #[test]
    fn test_token_display_redaction() {
        let token = Sensitive::new(String::from("CFPAT-secret-token"));
        assert_eq!(format!("{}", token), "***REDACTED***");
    }

    #[test]
    fn test_expose_and_into_inner() {
        let token = Sensitive::new(String::from("t0k3n"));
        assert_eq!(token.expose(), "t0k3n");
        assert_eq!(token.clone().into_inner(), "t0k3n");
    }

    #[test]
    fn test_redacted_inside_config_struct() {
        #[derive(Debug)]
        #[allow(dead_code)]
        struct TargetConfig {
            space_id: String,
            token: Sensitive<String>,
        }

        let cfg = TargetConfig {
            space_id: "space-1".to_string(),
            token: Sensitive::new("CFPAT-xyz".to_string()),
        };

        let debug_str = format!("{:?}", cfg);
        assert!(debug_str.contains("space-1"));
        assert!(debug_str.contains("***REDACTED***"));
        assert!(!debug_str.contains("CFPAT-xyz"));
    }
}
