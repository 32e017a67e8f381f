use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    InvalidArgument,
    TooManyObjects,
    FrameTooShort,
    BufferTooSmall,
    InvalidCrc,
    UnexpectedLength { expected: usize, actual: usize },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidArgument => write!(f, "invalid argument"),
            Error::TooManyObjects => write!(f, "too many objects requested"),
            Error::FrameTooShort => write!(f, "frame is too short"),
            Error::BufferTooSmall => write!(f, "buffer is too small"),
            Error::InvalidCrc => write!(f, "crc mismatch"),
            Error::UnexpectedLength { expected, actual } => {
                write!(f, "unexpected reply length {} (expected {})", actual, expected)
            }
        }
    }
}

impl std::error::Error for Error {}
