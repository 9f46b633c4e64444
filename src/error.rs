use std::fmt;

/// Custom error type for claude-query operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// A required setting is not configured
    MissingConfiguration(String)
  , /// A setting is present but unusable
    InvalidConfiguration(String)
  , /// Secret store could not produce the requested value
    SecretUnavailable(String)
  , /// Request body is not valid JSON
    MalformedJson(String)
  , /// Request body does not match the QueryRequest shape
    InvalidRequestShape(Vec<FieldError>)
  , /// HTTP transport error talking to the provider
    HttpError(String)
  , /// Provider answered with a non-success status
    ApiError
    {   status: u16
      , message: String
    }
  , /// Failed to parse provider response
    ParseError(String)
  , /// Provider response had no text in its first content block
    NoContentInResponse
  , /// Runtime event could not be decoded into an `InboundEvent`
    InvalidEvent(String)
}

/// One field that failed request validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError
{   pub field: String
  , pub message: String
}

impl FieldError
{   pub fn new(field: &str, message: &str) -> Self
    {   FieldError
        {   field: field.to_string()
          , message: message.to_string()
        }
    }
}

impl fmt::Display for FieldError
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   write!(f, "{}: {}", self.field, self.message)
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::MissingConfiguration(name) => {
              write!(f, "Missing configuration: {}", name)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::SecretUnavailable(msg) => {
              write!(f, "Secret unavailable: {}", msg)
            }
          , Error::MalformedJson(msg) => {
              write!(f, "Malformed JSON: {}", msg)
            }
          , Error::InvalidRequestShape(errors) => {
              write!(f,
                "{} validation error{} for QueryRequest: ",
                errors.len(),
                if errors.len() == 1 { "" } else { "s" }
              )?;
              for (i, e) in errors.iter().enumerate()
              {   if i > 0
                  {   write!(f, "; ")?;
                  }
                  write!(f, "{}", e)?;
              }
              Ok(())
            }
          , Error::HttpError(msg) => {
              write!(f, "HTTP error: {}", msg)
            }
          , Error::ApiError { status, message } => {
              write!(f, "API error ({}): {}", status, message)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoContentInResponse => {
              write!(f, "API response contained no text content")
            }
          , Error::InvalidEvent(msg) => {
              write!(f, "Invalid event: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

/// Caller-facing failure categories.
///
/// The handler tags a failure with its kind at the step where it
/// happened, so the same `Error` variant can land in different
/// categories depending on the step (a `ParseError` from the provider
/// call is `DownstreamApi`, anything after it is `Unexpected`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind
{   MalformedJson
  , InvalidRequestShape
  , DownstreamApi
  , Unexpected
}

impl FailureKind
{   /// HTTP status code reported for this kind
    pub fn status_code(&self) -> u16
    {   match self
        {   FailureKind::MalformedJson => 400
          , FailureKind::InvalidRequestShape => 400
          , FailureKind::DownstreamApi => 500
          , FailureKind::Unexpected => 500
        }
    }

    /// Fixed `error` label in the response body
    pub fn label(&self) -> &'static str
    {   match self
        {   FailureKind::MalformedJson => "Invalid JSON in request body"
          , FailureKind::InvalidRequestShape => "Invalid request format"
          , FailureKind::DownstreamApi => "Error calling Claude API"
          , FailureKind::Unexpected => "Internal server error"
        }
    }

    /// Whether the response body carries a `details` field
    pub fn has_details(&self) -> bool
    {   !matches!(self, FailureKind::MalformedJson)
    }
}

/// Outcome of one handler step: a value, or the first failure
/// tagged with the category it is reported under
pub type StepResult<T> = Result<T, (FailureKind, Error)>;
