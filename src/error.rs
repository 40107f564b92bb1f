use crate::resp::RespValue;

#[derive(Debug, thiserror::Error)]
pub enum ZedisError {
    #[error("ERR {0}")]
    Generic(String),

    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArgCount(String),

    #[error("ERR value is not an integer or out of range")]
    NotInteger,

    #[error("ERR value is not a valid float")]
    NotFloat,

    /// A score border could not be read as an infinity marker or a number.
    #[error("ERR min or max is not a float")]
    InvalidFormat,

    /// A rank window that does not fit inside the collection.
    #[error("ERR rank window [{start}, {stop}) is out of range for length {len}")]
    RangeError { start: i64, stop: i64, len: u64 },

    #[error("ERR syntax error")]
    SyntaxError,

    #[error("ERR unknown command '{0}', with args beginning with: {1}")]
    UnknownCommand(String, String),

    #[error("ERR Protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ZedisError {
    pub fn to_resp_error(&self) -> String {
        format!("{self}")
    }
}

impl From<ZedisError> for RespValue {
    fn from(err: ZedisError) -> Self {
        RespValue::error(err.to_resp_error())
    }
}

pub type ZedisResult<T> = Result<T, ZedisError>;
