use thiserror::Error;

macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// Most remapping operations are deliberately infallible: a missing mapping, a type whose
/// bytes cannot be fetched or a malformed mapping line all degrade to identity behaviour and
/// are reported through `tracing`. The variants below cover the operations that do have a
/// caller-visible failure mode, such as reading class files, loading mapping files and
/// building tables from conflicting records.
///
/// # Error Categories
///
/// ## Parsing Errors
/// - [`Error::Malformed`] - Corrupted or invalid class file structure
/// - [`Error::OutOfBounds`] - Attempted to read beyond the input boundaries
/// - [`Error::NotSupported`] - Class file version newer than the reader understands
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O Errors
/// - [`Error::FileError`] - Filesystem I/O errors
///
/// ## Mapping Errors
/// - [`Error::MappingConflict`] - Two records disagree about a type's name
/// - [`Error::RecursionLimit`] - Maximum hierarchy or nesting depth exceeded
///
/// ## Concurrency Errors
/// - [`Error::LockError`] - Thread synchronization failure
///
/// # Examples
///
/// ```rust
/// use jremap::{Error, mapping::MappingStage};
///
/// let lines = ["CL: a Foo", "CL: b Foo"];
/// match MappingStage::from_lines(lines) {
///     Err(Error::MappingConflict { from, existing, to }) => {
///         eprintln!("{from} maps to both {existing} and {to}");
///     }
///     Err(e) => eprintln!("Other error: {e}"),
///     Ok(_) => unreachable!(),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// The input is damaged and could not be parsed.
    ///
    /// The error includes the source location where the malformation was detected
    /// for debugging purposes.
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing the input.
    #[error("Out of Bound read would have occurred!")]
    OutOfBounds,

    /// The class file version is newer than the reader understands.
    #[error("This class file version is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// File I/O error.
    ///
    /// Wraps standard I/O errors that can occur during file operations
    /// such as reading mapping files or class files from disk.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Generic error for miscellaneous failures.
    #[error("{0}")]
    Error(String),

    /// A type table would stop being injective.
    ///
    /// Raised when the same source name is mapped to two different targets, or two
    /// different source names are mapped to the same target. Collisions are a configuration
    /// error and are never resolved silently.
    #[error("Conflicting type mapping for {from}: already mapped to {existing}, now {to}")]
    MappingConflict {
        /// The name on the side that collided
        from: String,
        /// The name it is already paired with
        existing: String,
        /// The name the rejected record wanted to pair it with
        to: String,
    },

    /// Recursion or nesting limit reached.
    ///
    /// Guards against pathological hierarchies and deeply nested type names.
    #[error("Reached the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    /// Failed to lock target.
    ///
    /// A lock was poisoned by a panicking thread.
    #[error("Failed to lock target")]
    LockError,
}
