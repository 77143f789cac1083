pub type Result<T> = std::result::Result<T, Error>;
impl<T> From<Error> for Result<T> {
    fn from(e: Error) -> Self {
        Err(e)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Invalid data, which typically includes unexpected internal values.
    #[error("Invalid data: {0}")]
    InvalidData(String),
    /// Invalid user input, which typically includes rejected configuration.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// The caller broke the contract of an operation, e.g. removing a frame
    /// that is still pinned.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl Error {
    /// Returns true if this is an [`Error::InvalidOperation`].
    pub fn is_invalid_operation(&self) -> bool {
        matches!(self, Error::InvalidOperation(_))
    }
}
