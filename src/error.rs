use thiserror::Error;

/// Custom error type for chunk store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Codec error: {0}")]
    Codec(String),

    #[error("Lock acquisition failed: {0}")]
    LockError(String),

    #[error("Invalid chunk geometry: count={count}, length={length}")]
    InvalidConfig { count: u32, length: i64 },
}

// Implement conversion from lock poison errors for convenience
impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        StoreError::LockError(format!("Mutex poisoned: {}", err))
    }
}
