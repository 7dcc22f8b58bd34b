//! Request query and body rewriting

use std::{future::ready, pin::pin};

use actix_http::{
    Uri,
    uri::{PathAndQuery, Parts},
};
use actix_web::{
    Error as ActixError, HttpMessage,
    dev::{Decompress, Payload, ServiceRequest},
    error::PayloadError,
    http::header::{self, HeaderValue},
    mime,
    web::{Bytes, BytesMut},
};
use futures_core::Stream;
use futures_util::{StreamExt, stream};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::sanitizer::{LeafSanitizer, sanitize_map, sanitize_seq};

/// Decode url-encoded pairs into a mapping.
///
/// Keys keep their first-seen order, repeated keys collect their
/// values into an array.
pub(crate) fn decode_pairs(input: &[u8]) -> Option<Map<String, Value>> {
    let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(input)
        .inspect_err(|err| tracing::debug!("undecodable url-encoded data: {err}"))
        .ok()?;

    let mut map = Map::new();
    for (key, value) in pairs {
        let value = Value::String(value);
        match map.get_mut(&key) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key, value);
            }
        }
    }
    Some(map)
}

fn push_pairs(pairs: &mut Vec<(String, String)>, key: &str, value: &Value) {
    match value {
        Value::Null => {}
        Value::String(text) => pairs.push((key.to_owned(), text.clone())),
        Value::Array(items) => items
            .iter()
            .for_each(|item| push_pairs(pairs, key, item)),
        other => pairs.push((key.to_owned(), other.to_string())),
    }
}

/// Encode a mapping produced by [`decode_pairs`] back into url-encoded form.
pub(crate) fn encode_pairs(map: &Map<String, Value>) -> Result<String, Error> {
    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        push_pairs(&mut pairs, key, value);
    }
    Ok(serde_urlencoded::to_string(pairs)?)
}

fn with_query(uri: &Uri, query: &str) -> Result<Uri, Error> {
    let path_and_query = match query.is_empty() {
        true => uri.path().to_owned(),
        false => format!("{}?{query}", uri.path()),
    };
    let mut parts: Parts = uri.clone().into_parts();
    parts.path_and_query = Some(PathAndQuery::try_from(path_and_query)?);
    Ok(Uri::from_parts(parts)?)
}

/// Sanitize every top-level query parameter and rewrite the request uri.
pub(crate) fn sanitize_query<L>(req: &mut ServiceRequest, leaf: &L) -> Result<(), ActixError>
where
    L: LeafSanitizer + ?Sized,
{
    let decoded = match req.uri().query() {
        Some(query) if !query.is_empty() => decode_pairs(query.as_bytes()),
        _ => return Ok(()),
    };
    let Some(mut map) = decoded else {
        return Ok(());
    };

    let original = map.clone();
    sanitize_map(&mut map, leaf)?;
    if map == original {
        // re-encoding is lossy, keep the query exactly as sent
        return Ok(());
    }
    let query = encode_pairs(&map)?;
    let uri = with_query(req.uri(), &query)
        .inspect_err(|err| tracing::error!("query rewrite failed: {err:?}"))?;
    tracing::trace!(%uri, "sanitized query");
    req.head_mut().uri = uri;
    Ok(())
}

/// Request body encodings understood by the sanitizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BodyKind {
    Json,
    Form,
}

impl BodyKind {
    pub(crate) fn of(req: &ServiceRequest) -> Option<Self> {
        let content_type = req.mime_type().ok()??;
        if content_type.subtype() == mime::JSON || content_type.suffix() == Some(mime::JSON) {
            return Some(Self::Json);
        }
        if content_type.type_() == mime::APPLICATION
            && content_type.subtype() == mime::WWW_FORM_URLENCODED
        {
            return Some(Self::Form);
        }
        None
    }

    /// Sanitize an encoded body, or return `None` when it cannot be
    /// decoded or the sanitizer left it unchanged.
    fn sanitize<L>(&self, body: &[u8], leaf: &L) -> Result<Option<Bytes>, ActixError>
    where
        L: LeafSanitizer + ?Sized,
    {
        match self {
            Self::Json => {
                let Ok(original) = serde_json::from_slice::<Value>(body) else {
                    tracing::debug!("undecodable json body passed through");
                    return Ok(None);
                };
                let mut value = original.clone();
                match &mut value {
                    Value::Object(map) => sanitize_map(map, leaf)?,
                    Value::Array(items) => sanitize_seq(items, leaf)?,
                    _ => return Ok(None),
                }
                if value == original {
                    return Ok(None);
                }
                let encoded = serde_json::to_vec(&value).map_err(Error::from)?;
                Ok(Some(Bytes::from(encoded)))
            }
            Self::Form => {
                let Some(mut map) = decode_pairs(body) else {
                    return Ok(None);
                };
                let original = map.clone();
                sanitize_map(&mut map, leaf)?;
                if map == original {
                    return Ok(None);
                }
                Ok(Some(Bytes::from(encode_pairs(&map)?)))
            }
        }
    }
}

async fn read_body<S>(payload: S, limit: usize) -> Result<Bytes, Error>
where
    S: Stream<Item = Result<Bytes, PayloadError>>,
{
    let mut payload = pin!(payload);
    let mut body = BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk?;
        if body.len() + chunk.len() > limit {
            return Err(Error::BodyLimitExceeded { limit });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body.freeze())
}

/// Sanitize a json or url-encoded request body and replace the payload.
///
/// Compressed bodies are decoded first and replaced by their plain
/// form, `limit` applies to the decoded size. Bodies of any other
/// content type are never read.
pub(crate) async fn sanitize_body<L>(
    req: &mut ServiceRequest,
    leaf: &L,
    limit: usize,
) -> Result<(), ActixError>
where
    L: LeafSanitizer + ?Sized,
{
    let Some(kind) = BodyKind::of(req) else {
        return Ok(());
    };

    let payload = Decompress::from_headers(req.take_payload(), req.headers());
    let body = read_body(payload, limit)
        .await
        .inspect_err(|err| tracing::debug!("unable to buffer body: {err}"))?;
    let body = match kind.sanitize(&body, leaf)? {
        Some(clean) => clean,
        None => body,
    };
    tracing::trace!(?kind, size = body.len(), "sanitized body");

    let headers = req.headers_mut();
    headers.remove(header::CONTENT_ENCODING);
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
    req.set_payload(Payload::Stream {
        payload: Box::pin(stream::once(ready(Ok::<_, PayloadError>(body)))),
    });
    Ok(())
}
