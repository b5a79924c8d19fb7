/// Fatal error categories.
///
/// Every variant aborts the current operation; recoverable conditions are
/// reported as [`crate::domain::Advisory`] values instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownRepresentation,
    UnknownAffineMap,
    UnknownFitType,
    UnknownParameterization,
    UnsupportedSampleUnits,
    PhaseAlignmentUnsupported,
    PsiRotationUnsupported,
    NegativeModeDirect,
    NegativeModeInList,
    OutsideTimeWindow,
    NoModes,
    InvalidModel,
    TimeGridMismatch,
    InvalidInput,
    Numerical,
    Io,
}

impl ErrorKind {
    /// Process exit code used by the `gws` binary.
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::UnknownRepresentation
            | ErrorKind::UnknownAffineMap
            | ErrorKind::UnknownFitType
            | ErrorKind::UnknownParameterization
            | ErrorKind::UnsupportedSampleUnits
            | ErrorKind::PhaseAlignmentUnsupported
            | ErrorKind::PsiRotationUnsupported
            | ErrorKind::InvalidInput => 2,
            ErrorKind::NoModes | ErrorKind::InvalidModel | ErrorKind::TimeGridMismatch => 3,
            ErrorKind::NegativeModeDirect
            | ErrorKind::NegativeModeInList
            | ErrorKind::OutsideTimeWindow
            | ErrorKind::Numerical => 4,
            ErrorKind::Io => 5,
        }
    }
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        self.kind.exit_code()
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("exit_code", &self.exit_code())
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
