//! Stock decorators
//!
//! Integer decorators read the inner result with `as_i64` and fail with
//! `Boom` when it is not an integer.

use crate::fixtures::Boom;
use adorn_core::{Arguments, CallError, CallResult, DecoratedCallable, DecoratorFactory, Value};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;

fn integer(value: &Value) -> Result<i64, CallError> {
    value
        .as_i64()
        .ok_or_else(|| Boom::new(format!("expected integer result, got {value}")).into())
}

fn map_result<F>(map: F) -> DecoratorFactory
where
    F: Fn(i64) -> i64 + Copy + Send + Sync + 'static,
{
    DecoratorFactory::wrapping(move |inner: DecoratedCallable| {
        move |args: Arguments| -> CallResult { Ok(json!(map(integer(&inner.invoke(args)?)?))) }
    })
}

/// Adds 1 to the inner result
pub fn add_one() -> DecoratorFactory {
    map_result(|value| value + 1)
}

/// Multiplies the inner result by `factor`
pub fn times(factor: i64) -> DecoratorFactory {
    map_result(move |value| value * factor)
}

/// Multiplies the inner result by 2
pub fn double() -> DecoratorFactory {
    times(2)
}

/// Negates the inner result
pub fn negate() -> DecoratorFactory {
    map_result(|value| -value)
}

/// Shared log of decorator entry and exit events
pub type CallLog = Arc<Mutex<Vec<String>>>;

/// Create an empty call log
pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Records `"{tag}:enter"` and `"{tag}:exit"` around the inner call
pub fn recording(tag: &str, log: CallLog) -> DecoratorFactory {
    let tag = tag.to_string();
    DecoratorFactory::wrapping(move |inner: DecoratedCallable| {
        let tag = tag.clone();
        let log = Arc::clone(&log);
        move |args: Arguments| -> CallResult {
            log.lock().push(format!("{tag}:enter"));
            let result = inner.invoke(args);
            log.lock().push(format!("{tag}:exit"));
            result
        }
    })
}

/// Calls the inner callable up to `attempts` times until it succeeds,
/// returning the last error otherwise
pub fn retry(attempts: usize) -> DecoratorFactory {
    DecoratorFactory::wrapping(move |inner: DecoratedCallable| {
        move |args: Arguments| -> CallResult {
            let mut last = None;
            for _ in 0..attempts.max(1) {
                match inner.invoke(args.clone()) {
                    Ok(value) => return Ok(value),
                    Err(err) => last = Some(err),
                }
            }
            Err(last.unwrap_or_else(|| Boom::new("retry without attempts").into()))
        }
    })
}

/// Never calls the inner callable; always returns `value`
pub fn short_circuit(value: Value) -> DecoratorFactory {
    DecoratorFactory::wrapping(move |_inner: DecoratedCallable| {
        let value = value.clone();
        move |_args: Arguments| -> CallResult { Ok(value.clone()) }
    })
}

/// Adds the integer annotation attribute `name` (default 0) to the result
pub fn offset_by_attribute(name: &str) -> DecoratorFactory {
    let name = name.to_string();
    DecoratorFactory::wrapping_with_context(move |inner: DecoratedCallable, context| {
        let offset = context
            .attribute(&name)
            .and_then(Value::as_i64)
            .unwrap_or_default();
        move |args: Arguments| -> CallResult { Ok(json!(integer(&inner.invoke(args)?)? + offset)) }
    })
}

/// Factory that fails while building the wrapper
pub fn failing_factory(message: &str) -> DecoratorFactory {
    let message = message.to_string();
    DecoratorFactory::plain(move |_inner| Err(Boom::new(message.clone()).into()))
}
