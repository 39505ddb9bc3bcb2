use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("index out of bound: {0}")]
    IndexOutOfBound(String),
    #[error("capacity overflow({0})")]
    CapacityOverflow(usize),
    #[error("insufficient memory({0})")]
    InsufficientMemory(usize),
}

impl Error {
    #[inline]
    pub(crate) fn out_of_bound(op: &str, index: usize, lower: usize, upper: usize) -> Self {
        Error::IndexOutOfBound(format!(
            "{} position {} not in [{}, {})",
            op, index, lower, upper
        ))
    }
}
