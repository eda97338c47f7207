//  Errors from the library.

/// Errors returned by this library.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TableError {
    /// No memory could be allocated.
    #[error("memory exhausted")]
    AllocationFailure,
    /// The content is too long to be stored as a short string.
    #[error("content of {length} bytes exceeds the short string maximum of {max} bytes")]
    InvalidLength {
        /// Length of the rejected content.
        length: usize,
        /// Maximum length of a short string.
        max: usize,
    },
    /// The requested number of buckets is not a power of 2.
    #[error("bucket count {0} is not a power of 2")]
    PowerOfTwoViolation(usize),
    /// The requested number of buckets exceeds `MAX_BUCKETS`.
    #[error("bucket count {requested} exceeds the maximum of {max}")]
    BucketLimitExceeded {
        /// Number of buckets requested.
        requested: usize,
        /// Maximum number of buckets.
        max: usize,
    },
    /// The `StringHandle` is not from this instance of `StringTable`.
    #[error("handle belongs to another table")]
    IdMismatch,
    /// The `StringHandle` refers to an entry which has since been released.
    #[error("handle refers to a released entry")]
    StaleHandle,
    /// The entry could not be found in the bucket its hash designates.
    #[error("entry missing from bucket {bucket}")]
    EntryNotInBucket {
        /// Index of the bucket which was scanned.
        bucket: usize,
    },
    /// The content is not valid UTF-8.
    #[error("content is not valid UTF-8")]
    InvalidUtf8,
    /// The pool of table `Id` has been exhausted.
    #[error("table id pool exhausted")]
    IdPoolExhausted,
    /// The pool of entry slots has been exhausted.
    #[error("entry slots exhausted")]
    EntryPoolExhausted,
}
