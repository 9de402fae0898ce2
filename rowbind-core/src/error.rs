use std::{
    error::Error as StdError,
    fmt::{self, Display, Formatter},
    io,
};

/// Result of every outward facing operation.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Result returned by the driver collaborator.
pub type DriverResult<T> = anyhow::Result<T>;

/// Classified reason carried by every [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required input is missing.
    ArgumentNull,
    /// An input is not among the accepted values.
    ArgumentBadValue,
    /// The instance is not in a state that allows the operation.
    InstanceIllegalState,
    /// A required instance attribute was never set (e.g. execute before prepare).
    InstanceAttributeNull,
    /// A value cannot be converted to the requested type.
    TypeMismatch,
    /// The filter tree violates the operand rules of its operator.
    SearchConditionInvalid,
    /// Insert affected no rows.
    ObjectNotCreated,
    /// Update affected no rows.
    ObjectNotModified,
    /// Delete affected no rows.
    ObjectNotDeleted,
    /// The database could not be reached after exhausting the retries.
    ConnectionError,
    /// Failure reported by the driver.
    Driver,
    /// Anything else.
    Unhandled,
}

impl ErrorKind {
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::ArgumentNull => "DBS-00001",
            ErrorKind::ArgumentBadValue => "DBS-00002",
            ErrorKind::InstanceIllegalState => "DBS-00011",
            ErrorKind::InstanceAttributeNull => "DBS-00012",
            ErrorKind::TypeMismatch => "DBS-00021",
            ErrorKind::SearchConditionInvalid => "DBS-00031",
            ErrorKind::ObjectNotCreated => "DBS-00041",
            ErrorKind::ObjectNotModified => "DBS-00042",
            ErrorKind::ObjectNotDeleted => "DBS-00043",
            ErrorKind::ConnectionError => "DBS-00051",
            ErrorKind::Driver => "DBS-00052",
            ErrorKind::Unhandled => "DBS-00099",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ErrorKind::ArgumentNull => "ArgumentNull",
            ErrorKind::ArgumentBadValue => "ArgumentBadValue",
            ErrorKind::InstanceIllegalState => "InstanceIllegalState",
            ErrorKind::InstanceAttributeNull => "InstanceAttributeNull",
            ErrorKind::TypeMismatch => "TypeMismatch",
            ErrorKind::SearchConditionInvalid => "SearchConditionInvalid",
            ErrorKind::ObjectNotCreated => "ObjectNotCreated",
            ErrorKind::ObjectNotModified => "ObjectNotModified",
            ErrorKind::ObjectNotDeleted => "ObjectNotDeleted",
            ErrorKind::ConnectionError => "ConnectionError",
            ErrorKind::Driver => "Driver",
            ErrorKind::Unhandled => "Unhandled",
        })
    }
}

/// The single error type surfaced to callers: a classified kind, a message and the original cause.
#[derive(Debug, thiserror::Error)]
#[error("[{}] {kind}: {message}", .kind.code())]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl Error {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl Into<Box<dyn StdError + Send + Sync + 'static>>,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn argument_null(argument: &str) -> Self {
        Self::new(
            ErrorKind::ArgumentNull,
            format!("Argument `{}` must not be empty", argument),
        )
    }

    pub fn argument_bad_value(argument: &str, value: impl Display) -> Self {
        Self::new(
            ErrorKind::ArgumentBadValue,
            format!("Argument `{}` has the unsupported value `{}`", argument, value),
        )
    }

    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InstanceIllegalState, message)
    }

    pub fn attribute_null(attribute: &str) -> Self {
        Self::new(
            ErrorKind::InstanceAttributeNull,
            format!("Attribute `{}` is not set", attribute),
        )
    }

    pub fn type_mismatch(value: impl fmt::Debug, target: &str) -> Self {
        Self::new(
            ErrorKind::TypeMismatch,
            format!("Cannot convert {:?} to {}", value, target),
        )
    }

    pub fn search_condition(condition: impl Display) -> Self {
        Self::new(
            ErrorKind::SearchConditionInvalid,
            format!("Invalid search condition `{}`", condition),
        )
    }

    /// Wrap a driver failure preserving its cause chain.
    pub fn driver(error: anyhow::Error) -> Self {
        let message = format!("{:#}", error);
        Self::with_source(ErrorKind::Driver, message, error)
    }

    /// Wrap a driver failure that happened while acquiring a connection, classifying the root cause.
    pub fn connection(error: anyhow::Error) -> Self {
        if is_network_failure(&error) {
            let message = format!("Cannot reach the database: {:#}", error);
            Self::with_source(ErrorKind::ConnectionError, message, error)
        } else {
            Self::driver(error)
        }
    }

    pub fn unhandled(error: anyhow::Error) -> Self {
        let message = format!("{:#}", error);
        Self::with_source(ErrorKind::Unhandled, message, error)
    }
}

/// Wrap a driver failure, logging it where it happened.
pub(crate) fn driver_error(error: anyhow::Error) -> Error {
    let error = Error::driver(error);
    log::error!("{:#}", error);
    error
}

/// Whether anything in the cause chain is a failed network connect.
pub fn is_network_failure(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.downcast_ref::<io::Error>().is_some_and(|e| {
            matches!(
                e.kind(),
                io::ErrorKind::ConnectionRefused
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
                    | io::ErrorKind::NotConnected
                    | io::ErrorKind::TimedOut
            )
        })
    })
}
