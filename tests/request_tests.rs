use serde_json::json;
use tokio_test::{assert_err, assert_ok};

use claude_query::error::{Error, FailureKind, FieldError};
use claude_query::request::{
  InboundEvent, QueryRequest, ResponseEnvelope, SuccessBody, Usage,
  DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE
};

#[test]
fn explicit_nulls_take_defaults()
{   let query = assert_ok!(QueryRequest::from_value(&json!({
      "prompt": "hi",
      "max_tokens": null,
      "temperature": null,
      "model": null
    })));
    assert_eq!(query.max_tokens, DEFAULT_MAX_TOKENS);
    assert_eq!(query.temperature, DEFAULT_TEMPERATURE);
    assert_eq!(query.model, DEFAULT_MODEL);
}

#[test]
fn integral_numbers_are_accepted_for_max_tokens()
{   let query = assert_ok!(QueryRequest::from_value(&json!({
      "prompt": "hi",
      "max_tokens": 256.0,
      "temperature": 1
    })));
    assert_eq!(query.max_tokens, 256);
    assert_eq!(query.temperature, 1.0);
}

#[test]
fn bad_max_tokens_are_rejected()
{   for bad in [json!(0), json!(-1), json!(1.5), json!("10"), json!(5_000_000_000u64)]
    {   let errors = assert_err!(QueryRequest::from_value(&json!({
          "prompt": "hi",
          "max_tokens": bad
        })));
        assert_eq!(
          errors,
          vec![FieldError::new("max_tokens", "expected a positive integer")]
        );
    }
}

#[test]
fn empty_prompt_is_rejected()
{   let errors = assert_err!(QueryRequest::from_value(&json!({
      "prompt": ""
    })));
    assert_eq!(errors, vec![FieldError::new("prompt", "must not be empty")]);
}

#[test]
fn non_object_is_rejected()
{   let errors = assert_err!(QueryRequest::from_value(&json!([1, 2])));
    assert_eq!(errors[0].field, "body");
}

#[test]
fn malformed_body_reports_kind()
{   let (kind, error) = assert_err!(
      InboundEvent::with_body("{\"prompt\": ").parse_body()
    );
    assert_eq!(kind, FailureKind::MalformedJson);
    assert!(matches!(error, Error::MalformedJson(_)));
}

#[test]
fn shape_error_message_lists_fields()
{   let error = Error::InvalidRequestShape(vec![
      FieldError::new("prompt", "field required")
    , FieldError::new("model", "expected a string")
    ]);
    assert_eq!(
      error.to_string(),
      "2 validation errors for QueryRequest: prompt: field required; model: expected a string"
    );
}

#[test]
fn envelopes_decode_to_their_shape()
{   let success = ResponseEnvelope::Success(SuccessBody
    {   response: "hi".to_string()
      , usage: Usage { input_tokens: 5, output_tokens: 2 }
      , model: DEFAULT_MODEL.to_string()
    });
    let encoded = serde_json::to_string(&success).unwrap();
    assert_eq!(serde_json::from_str::<ResponseEnvelope>(&encoded).unwrap(), success);

    let failure = ResponseEnvelope::failure(
      FailureKind::MalformedJson,
      &Error::MalformedJson("eof".to_string())
    );
    assert_eq!(
      serde_json::to_value(&failure).unwrap(),
      json!({ "error": "Invalid JSON in request body" })
    );
}

#[test]
fn failure_kinds_map_to_status_codes()
{   assert_eq!(FailureKind::MalformedJson.status_code(), 400);
    assert_eq!(FailureKind::InvalidRequestShape.status_code(), 400);
    assert_eq!(FailureKind::DownstreamApi.status_code(), 500);
    assert_eq!(FailureKind::Unexpected.status_code(), 500);
}

#[test]
fn numeric_strings_are_rejected()
{   let errors = assert_err!(QueryRequest::from_value(&json!({
      "prompt": "hi",
      "max_tokens": "256",
      "temperature": "0.5"
    })));
    assert_eq!(
      errors,
      vec![
        FieldError::new("max_tokens", "expected a positive integer")
      , FieldError::new("temperature", "expected a number")
      ]
    );
}
