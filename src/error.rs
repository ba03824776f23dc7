/// Errors produced by this crate.
///
/// Normal "need more data" and FHP/length disagreements are not errors --
/// see [`crate::Output`] and the reassembly precedence rules documented on
/// [`crate::reassembly::VirtualChannel`].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A [`crate::Config`] was built with inconsistent or undersized values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// An internal bookkeeping invariant was violated. This indicates a bug
    /// in this crate, not malformed input -- frame-level corruption is out
    /// of scope and assumed to be validated by the caller before bytes
    /// reach [`crate::Demuxer::consume`].
    #[error("internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, Error>;
