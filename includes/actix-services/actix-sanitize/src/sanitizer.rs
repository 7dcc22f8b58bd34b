//! [`LeafSanitizer`] Implementation and Utilities
use actix_web::Error;
use serde_json::{Map, Value};

/// Sanitization rule applied to a single value.
///
/// `key` is the mapping key the value was found under (or the index
/// of a top-level array element).
pub trait LeafSanitizer {
    fn sanitize(&self, key: &str, value: Value) -> Result<Value, Error>;
}

impl<F> LeafSanitizer for F
where
    F: Fn(&str, Value) -> Result<Value, Error>,
{
    #[inline]
    fn sanitize(&self, key: &str, value: Value) -> Result<Value, Error> {
        self(key, value)
    }
}

/// Recursively sanitize a value, keeping its structure.
///
/// Strings are handed to `leaf`; objects are rebuilt in the same key
/// order passing each child's own key, arrays pass their parent's key
/// to every element. Other scalars are returned unchanged.
///
/// # Example
///
/// ```
/// use actix_sanitize::{MarkupSanitizer, sanitize};
/// use serde_json::json;
///
/// let value = json!({"name": "<script>x</script>Ann", "tags": ["<b>a</b>"], "age": 3});
/// let clean = sanitize("", value, &MarkupSanitizer::new()).unwrap();
/// assert_eq!(clean, json!({"name": "Ann", "tags": ["<b>a</b>"], "age": 3}));
/// ```
pub fn sanitize<L>(key: &str, value: Value, leaf: &L) -> Result<Value, Error>
where
    L: LeafSanitizer + ?Sized,
{
    match value {
        Value::String(_) => leaf.sanitize(key, value),
        Value::Object(map) => map
            .into_iter()
            .map(|(key, value)| {
                let value = sanitize(&key, value, leaf)?;
                Ok((key, value))
            })
            .collect::<Result<Map<_, _>, _>>()
            .map(Value::Object),
        Value::Array(items) => items
            .into_iter()
            .map(|value| sanitize(key, value, leaf))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        scalar => Ok(scalar),
    }
}

/// Apply `leaf` to every top-level entry of `source` in place.
pub fn sanitize_map<L>(source: &mut Map<String, Value>, leaf: &L) -> Result<(), Error>
where
    L: LeafSanitizer + ?Sized,
{
    for (key, value) in source.iter_mut() {
        *value = leaf.sanitize(key, value.take())?;
    }
    Ok(())
}

/// Apply `leaf` to every element of `source` in place, keyed by index.
pub fn sanitize_seq<L>(source: &mut [Value], leaf: &L) -> Result<(), Error>
where
    L: LeafSanitizer + ?Sized,
{
    for (index, value) in source.iter_mut().enumerate() {
        *value = leaf.sanitize(&index.to_string(), value.take())?;
    }
    Ok(())
}

/// Default [`LeafSanitizer`] stripping unsafe markup from every string.
///
/// Containers are walked with [`sanitize`], so nested strings are
/// cleaned as well. Uses [`ammonia::clean`] unless another cleaning
/// function is given with [`MarkupSanitizer::with`].
#[derive(Clone, Copy)]
pub struct MarkupSanitizer {
    clean: fn(&str) -> String,
}

impl MarkupSanitizer {
    #[inline]
    pub fn new() -> Self {
        Self::with(ammonia::clean)
    }

    /// Clean strings with a custom function instead.
    #[inline]
    pub fn with(clean: fn(&str) -> String) -> Self {
        Self { clean }
    }
}

impl Default for MarkupSanitizer {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl LeafSanitizer for MarkupSanitizer {
    fn sanitize(&self, key: &str, value: Value) -> Result<Value, Error> {
        match value {
            Value::String(text) => Ok(Value::String((self.clean)(&text))),
            Value::Object(_) | Value::Array(_) => sanitize(key, value, self),
            scalar => Ok(scalar),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use actix_web::error::ErrorBadRequest;
    use serde_json::json;

    use super::*;

    fn identity(_: &str, value: Value) -> Result<Value, Error> {
        Ok(value)
    }

    #[test]
    fn identity_returns_deep_copy() {
        let payloads = [
            json!("plain"),
            json!({"a": "1", "b": {"c": ["2", {"d": "3"}]}}),
            json!(["x", ["y", "z"], {"k": "v"}]),
            json!({}),
            json!([]),
        ];
        for payload in payloads {
            assert_eq!(sanitize("", payload.clone(), &identity).unwrap(), payload);
        }
    }

    #[test]
    fn leaves_visited_once_in_order() {
        let calls = RefCell::new(Vec::new());
        let leaf = |key: &str, value: Value| -> Result<Value, Error> {
            calls
                .borrow_mut()
                .push(format!("{key}={}", value.as_str().unwrap_or_default()));
            Ok(value)
        };

        let payload = json!({"a": "1", "b": {"c": ["2", "3"], "d": "4"}, "e": 5, "f": null});
        let result = sanitize("root", payload.clone(), &leaf).unwrap();
        assert_eq!(result, payload);
        assert_eq!(*calls.borrow(), vec!["a=1", "c=2", "c=3", "d=4"]);
    }

    #[test]
    fn array_elements_receive_parent_key() {
        let calls = RefCell::new(Vec::new());
        let leaf = |key: &str, value: Value| -> Result<Value, Error> {
            calls.borrow_mut().push(key.to_owned());
            Ok(value)
        };
        sanitize("list", json!(["a", ["b"]]), &leaf).unwrap();
        assert_eq!(*calls.borrow(), vec!["list", "list"]);
    }

    #[test]
    fn first_failure_aborts() {
        let calls = RefCell::new(0);
        let leaf = |_: &str, value: Value| -> Result<Value, Error> {
            *calls.borrow_mut() += 1;
            match value.as_str() {
                Some("bad") => Err(ErrorBadRequest("rejected")),
                _ => Ok(value),
            }
        };
        let err = sanitize("", json!(["ok", "bad", "never"]), &leaf).unwrap_err();
        assert_eq!(err.to_string(), "rejected");
        assert_eq!(*calls.borrow(), 2);
    }

    #[test]
    fn top_level_entries_include_scalars() {
        let calls = RefCell::new(Vec::new());
        let leaf = |key: &str, value: Value| -> Result<Value, Error> {
            calls.borrow_mut().push(key.to_owned());
            Ok(value)
        };

        let mut map = json!({"s": "x", "n": 1, "z": null})
            .as_object()
            .cloned()
            .unwrap();
        sanitize_map(&mut map, &leaf).unwrap();
        assert_eq!(*calls.borrow(), vec!["s", "n", "z"]);

        calls.borrow_mut().clear();
        let mut items = vec![json!("a"), json!(true)];
        sanitize_seq(&mut items, &leaf).unwrap();
        assert_eq!(*calls.borrow(), vec!["0", "1"]);
    }

    #[test]
    fn markup_is_stripped_recursively() {
        let mut map = json!({
            "title": "<script>alert(1)</script>Hello",
            "nested": {"tags": ["<i>ok</i>", "<img src=x onerror=alert(1)>"]},
            "count": 3,
            "flag": false,
        })
        .as_object()
        .cloned()
        .unwrap();
        sanitize_map(&mut map, &MarkupSanitizer::new()).unwrap();
        assert_eq!(
            Value::Object(map),
            json!({
                "title": "Hello",
                "nested": {"tags": ["<i>ok</i>", "<img src=\"x\">"]},
                "count": 3,
                "flag": false,
            })
        );
    }

    #[test]
    fn custom_clean_function() {
        let leaf = MarkupSanitizer::with(|text| text.to_uppercase());
        let clean = sanitize("", json!({"a": ["b", 1]}), &leaf).unwrap();
        assert_eq!(clean, json!({"a": ["B", 1]}));
    }
}
