//! Result envelope returned by every client operation.

use reqwest::StatusCode;

use crate::{Error, ErrorCode};

/// Outcome of a Resend API call.
///
/// Operations without a payload return `Response<()>` and produce either
/// [`Response::Empty`] or [`Response::Failure`]. Failures only show up here
/// when the client was built with `throw_errors(false)`; otherwise they are
/// returned as `Err`.
#[derive(Debug)]
#[must_use]
pub enum Response<T> {
    /// The call succeeded and returned a payload.
    Content(T),
    /// The call succeeded and the API returns nothing for it.
    Empty,
    /// The call failed.
    Failure(Error),
}

impl<T> Response<T> {
    /// Returns `true` for [`Response::Content`] and [`Response::Empty`].
    pub fn is_success(&self) -> bool {
        !matches!(self, Response::Failure(_))
    }

    pub fn content(&self) -> Option<&T> {
        match self {
            Response::Content(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_content(self) -> Option<T> {
        match self {
            Response::Content(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            Response::Failure(err) => Some(err),
            _ => None,
        }
    }

    /// HTTP status of a failed call, when the API answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        self.error().and_then(Error::status)
    }

    /// Distinguishing code of a failed call.
    pub fn code(&self) -> Option<ErrorCode> {
        self.error().and_then(Error::code)
    }

    /// Convert into a plain `Result`, turning a failure back into `Err`.
    ///
    /// ```
    /// use resend_client::Response;
    ///
    /// let ok: Response<u8> = Response::Content(7);
    /// assert_eq!(ok.into_result().unwrap(), Some(7));
    ///
    /// let empty: Response<u8> = Response::Empty;
    /// assert_eq!(empty.into_result().unwrap(), None);
    /// ```
    pub fn into_result(self) -> crate::Result<Option<T>> {
        match self {
            Response::Content(value) => Ok(Some(value)),
            Response::Empty => Ok(None),
            Response::Failure(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_state() {
        let resp = Response::Content("abc");
        assert!(resp.is_success());
        assert_eq!(resp.content(), Some(&"abc"));
        assert!(resp.error().is_none());
        assert_eq!(resp.status(), None);
        assert_eq!(resp.into_content(), Some("abc"));
    }

    #[test]
    fn empty_state() {
        let resp: Response<()> = Response::Empty;
        assert!(resp.is_success());
        assert!(resp.content().is_none());
        assert!(resp.error().is_none());
    }

    #[test]
    fn failure_state() {
        let resp: Response<String> = Response::Failure(Error::Status {
            status: StatusCode::NOT_FOUND,
            message: "Domain not found".into(),
        });
        assert!(!resp.is_success());
        assert!(resp.content().is_none());
        assert_eq!(resp.status(), Some(StatusCode::NOT_FOUND));
        assert_eq!(resp.code(), None);
        assert!(resp.into_result().is_err());

        let resp: Response<String> = Response::Failure(Error::NullPayload);
        assert_eq!(resp.code(), Some(ErrorCode::NullPayload));
        assert_eq!(resp.status(), None);
    }
}
