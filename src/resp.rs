use crate::error::{ZedisError, ZedisResult};

/// A reply value, shaped after the RESP2 types.
#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    /// `None` is the nil reply.
    BulkString(Option<Vec<u8>>),
    Array(Vec<RespValue>),
}

impl RespValue {
    pub fn ok() -> Self {
        RespValue::SimpleString("OK".to_string())
    }

    pub fn error(s: impl Into<String>) -> Self {
        RespValue::Error(s.into())
    }

    pub fn integer(n: i64) -> Self {
        RespValue::Integer(n)
    }

    pub fn bulk_string(data: impl Into<Vec<u8>>) -> Self {
        RespValue::BulkString(Some(data.into()))
    }

    pub fn null_bulk_string() -> Self {
        RespValue::BulkString(None)
    }

    pub fn array(items: Vec<RespValue>) -> Self {
        RespValue::Array(items)
    }

    /// Try to interpret this value as a string (for command parsing).
    pub fn as_str(&self) -> Option<&[u8]> {
        match self {
            RespValue::BulkString(Some(data)) => Some(data),
            RespValue::SimpleString(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// Convert to a UTF-8 string, if possible.
    pub fn to_string_lossy(&self) -> Option<String> {
        self.as_str()
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }
}

/// Split an inline command into tokens, respecting double-quoted strings.
pub fn split_inline_command(line: &str) -> ZedisResult<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(ch) = chars.next() {
        if in_quotes {
            if ch == '"' {
                in_quotes = false;
            } else if ch == '\\' {
                if let Some(&next) = chars.peek() {
                    match next {
                        '"' | '\\' => {
                            current.push(next);
                            chars.next();
                        }
                        'n' => {
                            current.push('\n');
                            chars.next();
                        }
                        'r' => {
                            current.push('\r');
                            chars.next();
                        }
                        't' => {
                            current.push('\t');
                            chars.next();
                        }
                        _ => current.push(ch),
                    }
                }
            } else {
                current.push(ch);
            }
        } else if ch == '"' {
            in_quotes = true;
        } else if ch == '\'' {
            // Single quotes: no escape processing
            for ch in chars.by_ref() {
                if ch == '\'' {
                    break;
                }
                current.push(ch);
            }
        } else if ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else {
            current.push(ch);
        }
    }

    if in_quotes {
        return Err(ZedisError::Protocol("unbalanced quotes in request".into()));
    }

    if !current.is_empty() {
        tokens.push(current);
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_inline_quoted() {
        let parts = split_inline_command(r#"ZADD key 1 "hello world""#).unwrap();
        assert_eq!(parts, vec!["ZADD", "key", "1", "hello world"]);
    }

    #[test]
    fn test_split_inline_single_quotes_and_escapes() {
        let parts = split_inline_command(r#"SET 'a\n' "b\"c""#).unwrap();
        assert_eq!(parts, vec!["SET", "a\\n", "b\"c"]);
    }

    #[test]
    fn test_split_inline_unbalanced() {
        assert!(matches!(
            split_inline_command(r#"GET "oops"#),
            Err(ZedisError::Protocol(_))
        ));
    }
}
