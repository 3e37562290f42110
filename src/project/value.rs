//! Helpers over [`plist::Value`]
//!
//! The OpenStep text form has no scalar types: a bare word such as `10`
//! decodes as an integer, but a quoted `"10"` stays a string, and Xcode writes
//! both spellings. Readers of numeric fields go through
//! [`ValueExt::as_integer`], which accepts either.

use plist::Value;

pub trait ValueExt {
    /// Integer value of an integer, or of a string holding one.
    fn as_integer(&self) -> Option<i64>;

    /// Short type name for error messages.
    fn kind(&self) -> &'static str;
}

impl ValueExt for Value {
    fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => n.as_signed(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Boolean(_) => "boolean",
            Value::Data(_) => "data",
            Value::Date(_) => "date",
            Value::Array(_) => "array",
            Value::Dictionary(_) => "dictionary",
            _ => "value",
        }
    }
}

/// Sort every dictionary in `value` by key, recursively.
pub fn sort_keys(value: &mut Value) {
    match value {
        Value::Dictionary(dict) => {
            dict.sort_keys();
            for (_, nested) in dict.iter_mut() {
                sort_keys(nested);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}
