// Value series domain models - raw and normalized (label, value) sequences
use serde_json::Value;

/// Untyped cell value as received from the client.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Number(f64),
    Text(String),
    Bool(bool),
    Missing,
    Unsupported,
}

impl From<&Value> for RawValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => RawValue::Missing,
            Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Unsupported),
            Value::String(s) => RawValue::Text(s.clone()),
            Value::Bool(b) => RawValue::Bool(*b),
            Value::Array(_) | Value::Object(_) => RawValue::Unsupported,
        }
    }
}

impl RawValue {
    /// Permissive numeric coercion. Anything that does not yield a finite
    /// number is rejected rather than defaulted.
    pub fn to_number(&self) -> Option<f64> {
        let number = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().ok()?,
            RawValue::Bool(b) => f64::from(u8::from(*b)),
            RawValue::Missing | RawValue::Unsupported => return None,
        };
        number.is_finite().then_some(number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesPoint {
    pub label: String,
    pub value: RawValue,
}

impl SeriesPoint {
    pub fn new(label: String, value: RawValue) -> Self {
        Self { label, value }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ValueSeries {
    points: Vec<SeriesPoint>,
}

impl ValueSeries {
    pub fn new(points: Vec<SeriesPoint>) -> Self {
        Self { points }
    }

    #[cfg(test)]
    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Coerce every value to a number, dropping the points that cannot be
    /// coerced. Order is preserved.
    pub fn normalize(&self) -> NumericSeries {
        let points = self
            .points
            .iter()
            .filter_map(|p| {
                p.value
                    .to_number()
                    .map(|value| NumericPoint::new(p.label.clone(), value))
            })
            .collect();
        NumericSeries { points }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NumericPoint {
    pub label: String,
    pub value: f64,
}

impl NumericPoint {
    pub fn new(label: String, value: f64) -> Self {
        Self { label, value }
    }
}

/// A series whose values are all finite. Only built by [`ValueSeries::normalize`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumericSeries {
    points: Vec<NumericPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Upward,
    Downward,
}

impl NumericSeries {
    pub fn points(&self) -> &[NumericPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn min(&self) -> Option<f64> {
        self.values().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.values().reduce(f64::max)
    }

    pub fn range(&self) -> Option<(f64, f64)> {
        Some((self.min()?, self.max()?))
    }

    /// Two-point slope sign: upward only when the last value is strictly
    /// greater than the first.
    pub fn trend(&self) -> Option<Trend> {
        let first = self.points.first()?.value;
        let last = self.points.last()?.value;
        Some(if last > first {
            Trend::Upward
        } else {
            Trend::Downward
        })
    }

    fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }
}
