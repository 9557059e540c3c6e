//! Per-block summary statistics

use indexmap::IndexMap;
use std::fmt;
use std::str::FromStr;

use crate::core::error::WiggleError;

/// A summary statistic over the values of one block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stat {
    Min,
    Max,
    Mean,
    /// Middle element(s) in ingestion order, not value order
    Median,
    Sum,
    Count,
    /// `count * span`
    Bp,
}

impl Stat {
    /// All statistics in report order
    pub const ALL: [Stat; 7] = [
        Stat::Min,
        Stat::Max,
        Stat::Mean,
        Stat::Median,
        Stat::Sum,
        Stat::Count,
        Stat::Bp,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stat::Min => "min",
            Stat::Max => "max",
            Stat::Mean => "mean",
            Stat::Median => "median",
            Stat::Sum => "sum",
            Stat::Count => "count",
            Stat::Bp => "bp",
        }
    }
}

impl FromStr for Stat {
    type Err = WiggleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stat::ALL
            .into_iter()
            .find(|stat| stat.as_str() == s)
            .ok_or_else(|| WiggleError::UnknownStatistic(s.to_string()))
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a statistic; counts stay integral
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatValue {
    Float(f64),
    Int(i64),
}

impl StatValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            StatValue::Float(v) => v,
            StatValue::Int(v) => v as f64,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            StatValue::Float(v) => f.write_str(&format_value(v)),
            StatValue::Int(v) => write!(f, "{}", v),
        }
    }
}

/// Compute the requested statistics, keyed in request order
///
/// `data` is taken in its stored order; the median is positional.
/// Min/max/mean/median of an empty slice are NaN.
pub fn summarize(data: &[f64], span: i64, stats: &[Stat]) -> IndexMap<Stat, StatValue> {
    let count = data.len();
    let mut result = IndexMap::with_capacity(stats.len());

    for &stat in stats {
        let value = match stat {
            Stat::Min => StatValue::Float(data.iter().copied().reduce(f64::min).unwrap_or(f64::NAN)),
            Stat::Max => StatValue::Float(data.iter().copied().reduce(f64::max).unwrap_or(f64::NAN)),
            Stat::Mean => StatValue::Float(data.iter().sum::<f64>() / count as f64),
            Stat::Median => StatValue::Float(positional_median(data)),
            Stat::Sum => StatValue::Float(data.iter().sum()),
            Stat::Count => StatValue::Int(count as i64),
            Stat::Bp => StatValue::Int(count as i64 * span),
        };
        result.insert(stat, value);
    }
    result
}

fn positional_median(data: &[f64]) -> f64 {
    let n = data.len();
    if n == 0 {
        f64::NAN
    } else if n % 2 == 1 {
        data[n / 2]
    } else {
        (data[n / 2 - 1] + data[n / 2]) / 2.0
    }
}

/// Render a value the way the wiggle tools have always printed them
///
/// Shortest round-trip digits with a fractional part (`1.0`, `0.55`);
/// scientific notation outside `[1e-4, 1e16)` with a signed two-digit
/// exponent (`1e-05`, `1e+16`).
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let repr = format!("{:?}", value);
    match repr.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => repr,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summarize_two_values() {
        let stats = summarize(&[5.0, 6.0], 1, &Stat::ALL);
        assert_eq!(stats[&Stat::Min], StatValue::Float(5.0));
        assert_eq!(stats[&Stat::Max], StatValue::Float(6.0));
        assert_eq!(stats[&Stat::Mean], StatValue::Float(5.5));
        assert_eq!(stats[&Stat::Median], StatValue::Float(5.5));
        assert_eq!(stats[&Stat::Sum], StatValue::Float(11.0));
        assert_eq!(stats[&Stat::Count], StatValue::Int(2));
        assert_eq!(stats[&Stat::Bp], StatValue::Int(2));
    }

    #[test]
    fn test_median_is_positional() {
        // sorted median would be 2.0
        let stats = summarize(&[3.0, 1.0, 2.0], 1, &[Stat::Median]);
        assert_eq!(stats[&Stat::Median], StatValue::Float(1.0));
    }

    #[test]
    fn test_request_order_preserved() {
        let stats = summarize(&[1.0], 10, &[Stat::Bp, Stat::Min]);
        let keys: Vec<_> = stats.keys().copied().collect();
        assert_eq!(keys, vec![Stat::Bp, Stat::Min]);
        assert_eq!(stats[&Stat::Bp], StatValue::Int(10));
    }

    #[test]
    fn test_empty_data() {
        let stats = summarize(&[], 1, &Stat::ALL);
        assert!(stats[&Stat::Min].as_f64().is_nan());
        assert!(stats[&Stat::Median].as_f64().is_nan());
        assert!(stats[&Stat::Mean].as_f64().is_nan());
        assert_eq!(stats[&Stat::Sum], StatValue::Float(0.0));
        assert_eq!(stats[&Stat::Count], StatValue::Int(0));
    }

    #[test]
    fn test_stat_parsing() {
        assert_eq!("median".parse::<Stat>().unwrap(), Stat::Median);
        assert!(matches!(
            "Median".parse::<Stat>(),
            Err(WiggleError::UnknownStatistic(_))
        ));
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(1.0), "1.0");
        assert_eq!(format_value(0.55), "0.55");
        assert_eq!(format_value(-2.5), "-2.5");
        assert_eq!(format_value(1e-5), "1e-05");
        assert_eq!(format_value(1.5e20), "1.5e+20");
        assert_eq!(format_value(1e16), "1e+16");
        assert_eq!(format_value(1e15), "1000000000000000.0");
        assert_eq!(format_value(f64::NAN), "nan");
        assert_eq!(StatValue::Int(3).to_string(), "3");
        assert_eq!(StatValue::Float(3.0).to_string(), "3.0");
    }
}
