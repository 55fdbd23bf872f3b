use envsync_core_types::RunId;
use std::time::Duration;
use thiserror::Error;

/// Result type alias using SyncError
pub type Result<T> = std::result::Result<T, SyncError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Every error that crosses a crate boundary is classified by one of these
/// kinds. Each kind maps to a stable code usable by callers, tests and the
/// CLI exit path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation (fatal, raised before any mutation)
    InvalidInput,
    InvalidSnapshot,
    EmptySelection,

    // Lookup
    NotFound,
    AlreadyExists,

    /// Target schema cannot accept the change without operator action
    StructuralConflict,
    /// Optimistic-concurrency version did not match the target's
    VersionMismatch,

    /// Target store throttled the call; retry after backoff
    RateLimited,
    ExternalService,
    Timeout,

    // Integration/IO
    Io,
    Serialization,

    // Auth
    Unauthorised,
    Forbidden,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidSnapshot => "ERR_INVALID_SNAPSHOT",
            ExErrorKind::EmptySelection => "ERR_EMPTY_SELECTION",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::AlreadyExists => "ERR_ALREADY_EXISTS",
            ExErrorKind::StructuralConflict => "ERR_STRUCTURAL_CONFLICT",
            ExErrorKind::VersionMismatch => "ERR_VERSION_MISMATCH",
            ExErrorKind::RateLimited => "ERR_RATE_LIMITED",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Unauthorised => "ERR_UNAUTHORISED",
            ExErrorKind::Forbidden => "ERR_FORBIDDEN",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether a caller may retry the same call after backing off
    pub fn is_retryable(&self) -> bool {
        matches!(self, ExErrorKind::RateLimited)
    }
}

/// Canonical structured error type
///
/// Carries a classification kind for programmatic handling plus the context
/// (operation, record id, message) an operator needs to act on it.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    run_id: Option<RunId>,
    message: String,
    retry_after: Option<Duration>,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            run_id: None,
            message: String::new(),
            retry_after: None,
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add the id of the offending record (entry, asset, content type, locale)
    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    /// Add run correlation
    pub fn with_run_id(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Server-suggested delay before retrying (rate limiting)
    pub fn with_retry_after(mut self, delay: Duration) -> Self {
        self.retry_after = Some(delay);
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn run_id(&self) -> Option<&RunId> {
        self.run_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for the pure engine (diff, resolve, filter, remap)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SyncError {
    // ===== Snapshot integrity =====
    /// Snapshot has no locale flagged as default
    #[error("Snapshot has no default locale")]
    MissingDefaultLocale,

    /// Snapshot flags more than one locale as default
    #[error("Snapshot has multiple default locales: {codes:?}")]
    MultipleDefaultLocales { codes: Vec<String> },

    /// Two records of the same kind share an id
    #[error("Duplicate {kind} id in snapshot: {id}")]
    DuplicateId { kind: String, id: String },

    // ===== Lookup =====
    #[error("Entry not found: {entry_id}")]
    EntryNotFound { entry_id: String },

    #[error("Content type not found: {content_type_id}")]
    ContentTypeNotFound { content_type_id: String },

    #[error("Locale not present in snapshot: {code}")]
    UnknownLocale { code: String },

    // ===== Selection =====
    /// Neither entries nor content types were selected
    #[error("Selection is empty: choose entries or content types to migrate")]
    EmptySelection,

    /// Source and target snapshots are identical
    #[error("Source and target snapshots are identical")]
    IdenticalSnapshots,

    /// Locale remap with identical from/to codes
    #[error("Cannot remap locale {code} onto itself")]
    RemapOntoItself { code: String },

    // ===== Structural conflicts =====
    /// Target content type has a field the source lacks; the store refuses
    /// deletion until the field has been omitted
    #[error("Content type {content_type_id}: field {field_id} must be omitted before it can be removed")]
    FieldRemovalBlocked {
        content_type_id: String,
        field_id: String,
    },

    /// A field keeps its id but changes type, which the store rejects
    #[error("Content type {content_type_id}: field {field_id} changes type from {from} to {to}")]
    FieldTypeChanged {
        content_type_id: String,
        field_id: String,
        from: String,
        to: String,
    },

    // ===== Generic Errors =====
    /// Serialization error (JSON encoding/decoding)
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// Generic internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Conversion from SyncError to ExError
///
/// Lets pure-engine errors flow through the orchestration layer with a
/// stable kind and the offending identifier preserved.
impl From<SyncError> for ExError {
    fn from(err: SyncError) -> Self {
        let message = err.to_string();
        match err {
            SyncError::MissingDefaultLocale | SyncError::MultipleDefaultLocales { .. } => {
                ExError::new(ExErrorKind::InvalidSnapshot).with_message(message)
            }
            SyncError::DuplicateId { id, .. } => ExError::new(ExErrorKind::InvalidSnapshot)
                .with_entity_id(id)
                .with_message(message),
            SyncError::EntryNotFound { entry_id } => ExError::new(ExErrorKind::NotFound)
                .with_entity_id(entry_id)
                .with_message(message),
            SyncError::ContentTypeNotFound { content_type_id } => {
                ExError::new(ExErrorKind::NotFound)
                    .with_entity_id(content_type_id)
                    .with_message(message)
            }
            SyncError::UnknownLocale { code } | SyncError::RemapOntoItself { code } => {
                ExError::new(ExErrorKind::InvalidInput)
                    .with_entity_id(code)
                    .with_message(message)
            }
            SyncError::EmptySelection => {
                ExError::new(ExErrorKind::EmptySelection).with_message(message)
            }
            SyncError::IdenticalSnapshots => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            SyncError::FieldRemovalBlocked {
                content_type_id, ..
            }
            | SyncError::FieldTypeChanged {
                content_type_id, ..
            } => ExError::new(ExErrorKind::StructuralConflict)
                .with_entity_id(content_type_id)
                .with_message(message),
            SyncError::Serialization { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
            SyncError::Internal { .. } => {
                ExError::new(ExErrorKind::Internal).with_message(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(ExErrorKind::RateLimited.code(), "ERR_RATE_LIMITED");
        assert_eq!(
            ExErrorKind::StructuralConflict.code(),
            "ERR_STRUCTURAL_CONFLICT"
        );
        assert_eq!(ExErrorKind::EmptySelection.code(), "ERR_EMPTY_SELECTION");
    }

    #[test]
    fn test_only_rate_limit_is_retryable() {
        assert!(ExErrorKind::RateLimited.is_retryable());
        assert!(!ExErrorKind::StructuralConflict.is_retryable());
        assert!(!ExErrorKind::ExternalService.is_retryable());
    }

    #[test]
    fn test_display_includes_context() {
        let err = ExError::new(ExErrorKind::NotFound)
            .with_op("get_entry")
            .with_entity_id("e1")
            .with_message("Entry not found");
        let s = err.to_string();
        assert!(s.contains("ERR_NOT_FOUND"));
        assert!(s.contains("get_entry"));
        assert!(s.contains("e1"));
    }

    #[test]
    fn test_structural_conflict_keeps_offending_id() {
        let err: ExError = SyncError::FieldRemovalBlocked {
            content_type_id: "post".to_string(),
            field_id: "subtitle".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ExErrorKind::StructuralConflict);
        assert_eq!(err.entity_id(), Some("post"));
        assert!(err.message().contains("subtitle"));
        assert!(err.message().contains("omitted"));
    }

    #[test]
    fn test_retry_after_roundtrip() {
        let err = ExError::new(ExErrorKind::RateLimited).with_retry_after(Duration::from_secs(2));
        assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_source_chain_exposed() {
        use std::error::Error as _;
        let inner = ExError::new(ExErrorKind::RateLimited).with_message("429");
        let outer = ExError::new(ExErrorKind::ExternalService).with_source(inner);
        assert!(outer.source().is_some());
        assert_eq!(
            outer.source_error().map(|e| e.kind()),
            Some(ExErrorKind::RateLimited)
        );
    }
}
