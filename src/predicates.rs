//! Typed query predicates.
//!
//! Each builder is a pure function producing a [`Predicate`]: a tagged
//! literal `[operator, path, ...args]` that a [`crate::SearchForm`]
//! serializes into the query-language text sent as the `q` parameter.
//! Argument types make most malformed input unrepresentable; the few
//! dynamic checks fail eagerly with [`Error::InvalidPredicate`].

use crate::error::Error;
use chrono::{DateTime, Month, NaiveDate, Utc, Weekday};
use serde_json::Value;

/// A single query predicate: operator, optional fragment path, arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    operator: &'static str,
    path: Option<String>,
    args: Vec<Value>,
}

impl Predicate {
    fn new(operator: &'static str, path: &str, args: Vec<Value>) -> Self {
        Self {
            operator,
            path: Some(path.to_string()),
            args,
        }
    }

    /// The tagged literal form: `[operator, path, ...args]`.
    pub fn literal(&self) -> Value {
        let mut items = vec![Value::String(self.operator.to_string())];
        if let Some(path) = &self.path {
            items.push(Value::String(path.clone()));
        }
        items.extend(self.args.iter().cloned());
        Value::Array(items)
    }

    /// One bracketed term of the query language: `[op(path, arg1, ...)]`.
    ///
    /// The fragment path is bare; strings are quoted, numbers and booleans
    /// bare, arrays in bracket list syntax.
    pub fn to_query(&self) -> String {
        let mut parts = Vec::with_capacity(1 + self.args.len());
        if let Some(path) = &self.path {
            parts.push(path.clone());
        }
        parts.extend(self.args.iter().map(format_arg));
        format!("[{}({})]", self.operator, parts.join(", "))
    }
}

fn format_arg(value: &Value) -> String {
    match value {
        Value::String(s) => format!("\"{}\"", s.replace('"', "\\\"")),
        Value::Array(items) => {
            let inner: Vec<String> = items.iter().map(format_arg).collect();
            format!("[{}]", inner.join(", "))
        }
        other => other.to_string(),
    }
}

/// Serialize a predicate list to the full query text `[[...][...]]`.
pub(crate) fn serialize_query(predicates: &[Predicate]) -> String {
    let terms: Vec<String> = predicates.iter().map(Predicate::to_query).collect();
    format!("[{}]", terms.join(""))
}

/// Numeric argument accepted by the comparison predicates.
#[derive(Debug, Clone, Copy)]
pub enum NumberArg {
    Int(i64),
    Float(f64),
}

impl NumberArg {
    fn to_value(self) -> Value {
        match self {
            NumberArg::Int(n) => Value::from(n),
            NumberArg::Float(n) => Value::from(n),
        }
    }

    fn is_finite(self) -> bool {
        match self {
            NumberArg::Int(_) => true,
            NumberArg::Float(n) => n.is_finite(),
        }
    }

    fn as_f64(self) -> f64 {
        match self {
            NumberArg::Int(n) => n as f64,
            NumberArg::Float(n) => n,
        }
    }
}

impl From<i64> for NumberArg {
    fn from(n: i64) -> Self {
        NumberArg::Int(n)
    }
}

impl From<i32> for NumberArg {
    fn from(n: i32) -> Self {
        NumberArg::Int(n as i64)
    }
}

impl From<u32> for NumberArg {
    fn from(n: u32) -> Self {
        NumberArg::Int(n as i64)
    }
}

impl From<f64> for NumberArg {
    fn from(n: f64) -> Self {
        NumberArg::Float(n)
    }
}

/// Date or timestamp argument for the temporal predicates.
///
/// The wire format accepts epoch milliseconds or an ISO date string;
/// typed chrono values convert to those.
#[derive(Debug, Clone, Copy)]
pub enum DateArg {
    Millis(i64),
    Date(NaiveDate),
    Timestamp(DateTime<Utc>),
}

impl DateArg {
    fn to_value(self) -> Value {
        match self {
            DateArg::Millis(ms) => Value::from(ms),
            DateArg::Date(date) => Value::String(date.format("%Y-%m-%d").to_string()),
            DateArg::Timestamp(ts) => Value::from(ts.timestamp_millis()),
        }
    }
}

impl From<i64> for DateArg {
    fn from(ms: i64) -> Self {
        DateArg::Millis(ms)
    }
}

impl From<NaiveDate> for DateArg {
    fn from(date: NaiveDate) -> Self {
        DateArg::Date(date)
    }
}

impl From<DateTime<Utc>> for DateArg {
    fn from(ts: DateTime<Utc>) -> Self {
        DateArg::Timestamp(ts)
    }
}

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// Equality of a fragment to a value.
pub fn at(path: &str, value: impl Into<Value>) -> Predicate {
    Predicate::new("at", path, vec![value.into()])
}

/// Inequality of a fragment to a value.
pub fn not(path: &str, value: impl Into<Value>) -> Predicate {
    Predicate::new("not", path, vec![value.into()])
}

/// Equality of a fragment to any of the given values.
pub fn any<V: Into<Value>>(path: &str, values: Vec<V>) -> Predicate {
    let items: Vec<Value> = values.into_iter().map(Into::into).collect();
    Predicate::new("any", path, vec![Value::Array(items)])
}

/// Membership of a fragment in the given value list.
pub fn in_<V: Into<Value>>(path: &str, values: Vec<V>) -> Predicate {
    let items: Vec<Value> = values.into_iter().map(Into::into).collect();
    Predicate::new("in", path, vec![Value::Array(items)])
}

/// Fulltext search in a fragment.
pub fn fulltext(path: &str, text: &str) -> Predicate {
    Predicate::new("fulltext", path, vec![Value::from(text)])
}

/// Documents similar to the given document id.
pub fn similar(document_id: &str, max_results: u32) -> Result<Predicate, Error> {
    if document_id.is_empty() {
        return Err(Error::InvalidPredicate(
            "similar requires a non-empty document id".to_string(),
        ));
    }
    Ok(Predicate {
        operator: "similar",
        path: None,
        args: vec![Value::from(document_id), Value::from(max_results)],
    })
}

/// Numeric fragment greater than a value.
pub fn gt(path: &str, value: impl Into<NumberArg>) -> Predicate {
    Predicate::new("number.gt", path, vec![value.into().to_value()])
}

/// Numeric fragment lower than a value.
pub fn lt(path: &str, value: impl Into<NumberArg>) -> Predicate {
    Predicate::new("number.lt", path, vec![value.into().to_value()])
}

/// Numeric fragment within an inclusive range.
pub fn in_range(
    path: &str,
    low: impl Into<NumberArg>,
    high: impl Into<NumberArg>,
) -> Result<Predicate, Error> {
    let low = low.into();
    let high = high.into();
    if !low.is_finite() || !high.is_finite() {
        return Err(Error::InvalidPredicate(
            "inRange bounds must be finite numbers".to_string(),
        ));
    }
    if low.as_f64() > high.as_f64() {
        return Err(Error::InvalidPredicate(format!(
            "inRange bounds are inverted: {} > {}",
            low.as_f64(),
            high.as_f64()
        )));
    }
    Ok(Predicate::new(
        "number.inRange",
        path,
        vec![low.to_value(), high.to_value()],
    ))
}

/// Date or timestamp fragment strictly before a value.
pub fn date_before(path: &str, value: impl Into<DateArg>) -> Predicate {
    Predicate::new("date.before", path, vec![value.into().to_value()])
}

/// Date or timestamp fragment strictly after a value.
pub fn date_after(path: &str, value: impl Into<DateArg>) -> Predicate {
    Predicate::new("date.after", path, vec![value.into().to_value()])
}

/// Date or timestamp fragment between two values.
pub fn date_between(
    path: &str,
    start: impl Into<DateArg>,
    end: impl Into<DateArg>,
) -> Predicate {
    Predicate::new(
        "date.between",
        path,
        vec![start.into().to_value(), end.into().to_value()],
    )
}

pub fn day_of_month(path: &str, day: u32) -> Predicate {
    Predicate::new("date.day-of-month", path, vec![Value::from(day)])
}

pub fn day_of_month_before(path: &str, day: u32) -> Predicate {
    Predicate::new("date.day-of-month-before", path, vec![Value::from(day)])
}

pub fn day_of_month_after(path: &str, day: u32) -> Predicate {
    Predicate::new("date.day-of-month-after", path, vec![Value::from(day)])
}

pub fn day_of_week(path: &str, day: Weekday) -> Predicate {
    Predicate::new("date.day-of-week", path, vec![Value::from(weekday_name(day))])
}

pub fn day_of_week_before(path: &str, day: Weekday) -> Predicate {
    Predicate::new(
        "date.day-of-week-before",
        path,
        vec![Value::from(weekday_name(day))],
    )
}

pub fn day_of_week_after(path: &str, day: Weekday) -> Predicate {
    Predicate::new(
        "date.day-of-week-after",
        path,
        vec![Value::from(weekday_name(day))],
    )
}

pub fn month(path: &str, month: Month) -> Predicate {
    Predicate::new("date.month", path, vec![Value::from(month.name())])
}

pub fn month_before(path: &str, month: Month) -> Predicate {
    Predicate::new("date.month-before", path, vec![Value::from(month.name())])
}

pub fn month_after(path: &str, month: Month) -> Predicate {
    Predicate::new("date.month-after", path, vec![Value::from(month.name())])
}

pub fn year(path: &str, year: i32) -> Predicate {
    Predicate::new("date.year", path, vec![Value::from(year)])
}

pub fn hour(path: &str, hour: u32) -> Predicate {
    Predicate::new("date.hour", path, vec![Value::from(hour)])
}

pub fn hour_before(path: &str, hour: u32) -> Predicate {
    Predicate::new("date.hour-before", path, vec![Value::from(hour)])
}

pub fn hour_after(path: &str, hour: u32) -> Predicate {
    Predicate::new("date.hour-after", path, vec![Value::from(hour)])
}

/// GeoPoint fragment within `radius_km` of the given coordinates.
pub fn near(path: &str, latitude: f64, longitude: f64, radius_km: f64) -> Result<Predicate, Error> {
    if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
        return Err(Error::InvalidPredicate(format!(
            "near latitude out of range: {}",
            latitude
        )));
    }
    if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
        return Err(Error::InvalidPredicate(format!(
            "near longitude out of range: {}",
            longitude
        )));
    }
    if !radius_km.is_finite() || radius_km <= 0.0 {
        return Err(Error::InvalidPredicate(format!(
            "near radius must be a positive number of kilometers: {}",
            radius_km
        )));
    }
    Ok(Predicate::new(
        "geopoint.near",
        path,
        vec![
            Value::from(latitude),
            Value::from(longitude),
            Value::from(radius_km),
        ],
    ))
}
