// We follow the same approach as the rest of the family of crates: a single
// opaque `Error` type that wraps a private `ErrorKind` enum. The internal
// (no_std) crate keeps returning `&'static str`; those get wrapped by
// `Error::internal_legacy_adhoc`.
//
// Numeric edge-cases (the precision floors of the correlators & unphysical
// kinematics) are deliberately NOT errors. They are handled locally by
// clamping or by returning a status.

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The underlying internal error type
#[non_exhaustive]
#[derive(Clone, Debug)]
enum ErrorKind {
    /// An error that occurs when an archive can't be opened, read or
    /// written. It is fatal to the aggregation group that was being processed
    ArchiveIo(ArchiveIoError),
    /// An error that occurs when an axis or binned layout is ill-formed
    BinEdge(BinEdgeError),
    /// An error that occurs when parallel collections hold a different
    /// number of containers
    CollectionSize(CollectionSizeError),
    /// An error that occurs when a configuration value is invalid
    Configuration(ConfigurationError),
    /// An error that occurs when 2 containers don't have identical
    /// dimensionality & per-axis bin counts
    DimensionMismatch(DimensionMismatchError),
    /// An error that occurs when a sample is folded into an aggregate that
    /// was already finalized
    Finalized(FinalizedError),
    /// Wraps the stringly errors from `hicorr_nostd_internal`
    InternalLegacyAdHoc(InternalLegacyAdHocError),
    /// An error that occurs when a required operand is missing
    NullOperand(NullOperandError),
}

// define constructor methods for Error
impl Error {
    /// produce an error indicating that an archive (or an object within it)
    /// couldn't be accessed.
    ///
    /// This is public so that bindings implementing [`crate::Archive`] can
    /// report their failures.
    pub fn archive_io(archive: &str, object: Option<&str>, what: impl Into<String>) -> Self {
        Error {
            kind: ErrorKind::ArchiveIo(ArchiveIoError {
                archive: archive.to_owned(),
                object: object.map(str::to_owned),
                what: what.into(),
            }),
        }
    }

    /// produce an error indicating that a problematic axis was specified
    pub(crate) fn bin_edge(who: String, what: &'static str) -> Self {
        Error {
            kind: ErrorKind::BinEdge(BinEdgeError {
                who,
                what: what.to_owned(),
            }),
        }
    }

    /// produce an error indicating a problematic axis, with a custom message
    pub(crate) fn bin_edge_custom(who: String, what: String) -> Self {
        Error {
            kind: ErrorKind::BinEdge(BinEdgeError { who, what }),
        }
    }

    pub(crate) fn collection_size(expected: usize, actual: usize) -> Self {
        Error {
            kind: ErrorKind::CollectionSize(CollectionSizeError { expected, actual }),
        }
    }

    pub(crate) fn configuration(what: impl Into<String>) -> Self {
        Error {
            kind: ErrorKind::Configuration(ConfigurationError(what.into())),
        }
    }

    /// produce an error indicating that 2 containers have different shapes
    pub(crate) fn dimension_mismatch(
        operation: &'static str,
        left: &[usize],
        right: &[usize],
    ) -> Self {
        Error {
            kind: ErrorKind::DimensionMismatch(DimensionMismatchError {
                operation,
                left: left.to_vec(),
                right: right.to_vec(),
            }),
        }
    }

    pub(crate) fn finalized() -> Self {
        Error {
            kind: ErrorKind::Finalized(FinalizedError),
        }
    }

    /// wraps a legacy internal error string
    pub(crate) fn internal_legacy_adhoc(message: &'static str) -> Self {
        Error {
            kind: ErrorKind::InternalLegacyAdHoc(InternalLegacyAdHocError(message)),
        }
    }

    /// produce an error indicating that the `ordinal`-th (1-based) operand of
    /// `operation`, named `name`, is missing
    pub(crate) fn null_operand(operation: &'static str, ordinal: usize, name: &str) -> Self {
        Error {
            kind: ErrorKind::NullOperand(NullOperandError {
                operation,
                ordinal,
                name: name.to_owned(),
            }),
        }
    }
}

// inspection. We don't expose ErrorKind itself
impl Error {
    /// A short, stable name for the kind of error (handy for logging)
    pub fn kind_name(&self) -> &'static str {
        match self.kind {
            ErrorKind::ArchiveIo(_) => "ArchiveIo",
            ErrorKind::BinEdge(_) => "BinEdge",
            ErrorKind::CollectionSize(_) => "CollectionSize",
            ErrorKind::Configuration(_) => "Configuration",
            ErrorKind::DimensionMismatch(_) => "DimensionMismatch",
            ErrorKind::Finalized(_) => "Finalized",
            ErrorKind::InternalLegacyAdHoc(_) => "InternalLegacyAdHoc",
            ErrorKind::NullOperand(_) => "NullOperand",
        }
    }

    pub fn is_archive_io(&self) -> bool {
        matches!(self.kind, ErrorKind::ArchiveIo(_))
    }

    pub fn is_dimension_mismatch(&self) -> bool {
        matches!(self.kind, ErrorKind::DimensionMismatch(_))
    }

    pub fn is_collection_size(&self) -> bool {
        matches!(self.kind, ErrorKind::CollectionSize(_))
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self.kind, ErrorKind::Configuration(_))
    }

    pub fn is_finalized(&self) -> bool {
        matches!(self.kind, ErrorKind::Finalized(_))
    }

    /// The 1-based ordinal of the missing operand, if this is a NullOperand
    /// error
    pub fn null_operand_ordinal(&self) -> Option<usize> {
        match self.kind {
            ErrorKind::NullOperand(ref err) => Some(err.ordinal),
            _ => None,
        }
    }
}

impl std::error::Error for Error {}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for ErrorKind {}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::ArchiveIo(ref err) => err.fmt(f),
            ErrorKind::BinEdge(ref err) => err.fmt(f),
            ErrorKind::CollectionSize(ref err) => err.fmt(f),
            ErrorKind::Configuration(ref err) => err.fmt(f),
            ErrorKind::DimensionMismatch(ref err) => err.fmt(f),
            ErrorKind::Finalized(ref err) => err.fmt(f),
            ErrorKind::InternalLegacyAdHoc(ref msg) => msg.fmt(f),
            ErrorKind::NullOperand(ref err) => err.fmt(f),
        }
    }
}

#[derive(Clone, Debug)]
struct ArchiveIoError {
    archive: String,
    object: Option<String>,
    what: String,
}

impl std::error::Error for ArchiveIoError {}

impl core::fmt::Display for ArchiveIoError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match self.object {
            Some(ref object) => write!(
                f,
                "archive \"{}\", object \"{}\": {}",
                self.archive, object, self.what
            ),
            None => write!(f, "archive \"{}\": {}", self.archive, self.what),
        }
    }
}

/// An error that occurs when a problematic axis is specified
#[derive(Clone, Debug)]
struct BinEdgeError {
    who: String,
    what: String,
}

impl std::error::Error for BinEdgeError {}

impl core::fmt::Display for BinEdgeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let who = self.who.as_str();
        let what = self.what.as_str();
        write!(f, "problem with {who}: {what}")
    }
}

#[derive(Clone, Debug)]
struct CollectionSizeError {
    expected: usize,
    actual: usize,
}

impl std::error::Error for CollectionSizeError {}

impl core::fmt::Display for CollectionSizeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "collection holds {} containers. It should hold {}",
            self.actual, self.expected
        )
    }
}

#[derive(Clone, Debug)]
struct ConfigurationError(String);

impl std::error::Error for ConfigurationError {}

impl core::fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "invalid configuration: {}", self.0)
    }
}

/// An error that occurs when 2 containers have different shapes. The shapes
/// are the per-axis bin counts (their length is the dimensionality)
#[derive(Clone, Debug)]
struct DimensionMismatchError {
    operation: &'static str,
    left: Vec<usize>,
    right: Vec<usize>,
}

impl std::error::Error for DimensionMismatchError {}

impl core::fmt::Display for DimensionMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{}: incompatible shapes {:?} and {:?}",
            self.operation, self.left, self.right
        )
    }
}

#[derive(Clone, Debug)]
struct FinalizedError;

impl std::error::Error for FinalizedError {}

impl core::fmt::Display for FinalizedError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "can't fold a sample into an aggregate that was finalized")
    }
}

/// wraps the string errors from `hicorr_nostd_internal`
#[derive(Clone)]
struct InternalLegacyAdHocError(&'static str);

impl std::error::Error for InternalLegacyAdHocError {}

impl core::fmt::Display for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::fmt::Debug for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.0, f)
    }
}

#[derive(Clone, Debug)]
struct NullOperandError {
    operation: &'static str,
    ordinal: usize,
    name: String,
}

impl std::error::Error for NullOperandError {}

impl core::fmt::Display for NullOperandError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{}: argument {} (\"{}\") is missing",
            self.operation, self.ordinal, self.name
        )
    }
}
