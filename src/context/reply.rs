use crate::error::{Error, Result};
use axum::{
    Json,
    body::Bytes,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// A value written to the response body
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    Text(String),
    Json(serde_json::Value),
    Bytes(Bytes),
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        match self {
            Reply::Text(text) => text.into_response(),
            Reply::Json(value) => Json(value).into_response(),
            Reply::Bytes(bytes) => bytes.into_response(),
        }
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Reply {
    fn from(value: serde_json::Value) -> Self {
        Reply::Json(value)
    }
}

impl From<Bytes> for Reply {
    fn from(bytes: Bytes) -> Self {
        Reply::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Reply {
    fn from(bytes: Vec<u8>) -> Self {
        Reply::Bytes(bytes.into())
    }
}

/// Conversion of a controller method's return value
///
/// `Ok(None)` means the method produced no value and wrote the response
/// itself (or left it empty). An `Err` is propagated up the chain as is.
pub trait IntoReply {
    fn into_reply(self) -> Result<Option<Reply>>;
}

impl IntoReply for () {
    fn into_reply(self) -> Result<Option<Reply>> {
        Ok(None)
    }
}

impl IntoReply for Reply {
    fn into_reply(self) -> Result<Option<Reply>> {
        Ok(Some(self))
    }
}

impl IntoReply for String {
    fn into_reply(self) -> Result<Option<Reply>> {
        Ok(Some(Reply::Text(self)))
    }
}

impl IntoReply for &'static str {
    fn into_reply(self) -> Result<Option<Reply>> {
        Ok(Some(Reply::Text(self.to_string())))
    }
}

impl IntoReply for serde_json::Value {
    fn into_reply(self) -> Result<Option<Reply>> {
        Ok(Some(Reply::Json(self)))
    }
}

impl IntoReply for Bytes {
    fn into_reply(self) -> Result<Option<Reply>> {
        Ok(Some(Reply::Bytes(self)))
    }
}

impl<T: Serialize> IntoReply for Json<T> {
    fn into_reply(self) -> Result<Option<Reply>> {
        Ok(Some(Reply::Json(serde_json::to_value(self.0)?)))
    }
}

macro_rules! impl_into_reply_for_scalar {
    ($($ty:ty),*) => {
        $(
            impl IntoReply for $ty {
                fn into_reply(self) -> Result<Option<Reply>> {
                    Ok(Some(Reply::Json(serde_json::Value::from(self))))
                }
            }
        )*
    };
}

impl_into_reply_for_scalar!(bool, i32, i64, u32, u64, usize, f64);

impl<T: IntoReply> IntoReply for Option<T> {
    fn into_reply(self) -> Result<Option<Reply>> {
        match self {
            Some(value) => value.into_reply(),
            None => Ok(None),
        }
    }
}

impl<T, E> IntoReply for std::result::Result<T, E>
where
    T: IntoReply,
    E: Into<Error>,
{
    fn into_reply(self) -> Result<Option<Reply>> {
        self.map_err(Into::into)?.into_reply()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_value() {
        assert_eq!(().into_reply().unwrap(), None);
        assert_eq!(None::<String>.into_reply().unwrap(), None);
        assert_eq!(Ok::<(), Error>(()).into_reply().unwrap(), None);
    }

    #[test]
    fn test_values() {
        assert_eq!(
            "index".into_reply().unwrap(),
            Some(Reply::Text("index".to_string()))
        );
        assert_eq!(
            3usize.into_reply().unwrap(),
            Some(Reply::Json(serde_json::json!(3)))
        );
        assert_eq!(
            Json(vec![1, 2]).into_reply().unwrap(),
            Some(Reply::Json(serde_json::json!([1, 2])))
        );
    }

    #[test]
    fn test_error_passes_through() {
        let failed: std::result::Result<String, Error> = Err(Error::Internal("boom".into()));
        assert!(matches!(failed.into_reply(), Err(Error::Internal(message)) if message == "boom"));

        let failed: std::result::Result<String, anyhow::Error> = Err(anyhow::anyhow!("nope"));
        assert!(matches!(failed.into_reply(), Err(Error::Handler(_))));
    }
}
