use crate::error::{ZedisError, ZedisResult};
use std::cmp::Ordering;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Infinity {
    Negative,
    Positive,
}

/// One end of a score range, as written in `ZRANGEBYSCORE`-style arguments.
///
/// Accepted forms are `2.5` (inclusive), `(2.5` (exclusive), and the
/// infinity markers `-inf`, `+inf` / `inf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RangeBorder {
    inf: Option<Infinity>,
    value: f64,
    exclusive: bool,
}

impl RangeBorder {
    pub const POSITIVE_INFINITY: RangeBorder = RangeBorder {
        inf: Some(Infinity::Positive),
        value: i64::MAX as f64,
        exclusive: false,
    };

    pub const NEGATIVE_INFINITY: RangeBorder = RangeBorder {
        inf: Some(Infinity::Negative),
        value: i64::MIN as f64,
        exclusive: false,
    };

    pub fn inclusive(value: f64) -> Self {
        RangeBorder {
            inf: None,
            value,
            exclusive: false,
        }
    }

    pub fn exclusive(value: f64) -> Self {
        RangeBorder {
            inf: None,
            value,
            exclusive: true,
        }
    }

    pub fn parse(text: &str) -> ZedisResult<Self> {
        if let Some(border) = parse_infinity(text) {
            return Ok(border);
        }
        let (number, exclusive) = match text.strip_prefix('(') {
            Some(rest) => (rest, true),
            None => (text, false),
        };
        if let Some(border) = parse_infinity(number) {
            return Ok(border);
        }
        let value: f64 = number.parse().map_err(|_| ZedisError::InvalidFormat)?;
        if value.is_nan() {
            return Err(ZedisError::InvalidFormat);
        }
        if value.is_infinite() {
            return Ok(if value > 0.0 {
                RangeBorder::POSITIVE_INFINITY
            } else {
                RangeBorder::NEGATIVE_INFINITY
            });
        }
        Ok(RangeBorder {
            inf: None,
            value,
            exclusive,
        })
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn is_infinite(&self) -> bool {
        self.inf.is_some()
    }

    /// Used as the upper bound of a range: is `value` still inside it?
    pub fn admits_above(&self, value: f64) -> bool {
        match self.inf {
            Some(Infinity::Positive) => true,
            Some(Infinity::Negative) => false,
            None if self.exclusive => value < self.value,
            None => value <= self.value,
        }
    }

    /// Used as the lower bound of a range: is `value` still inside it?
    pub fn admits_below(&self, value: f64) -> bool {
        match self.inf {
            Some(Infinity::Negative) => true,
            Some(Infinity::Positive) => false,
            None if self.exclusive => value > self.value,
            None => value >= self.value,
        }
    }

    /// True when `[self, max]` cannot contain any score at all.
    pub fn excludes_everything_up_to(&self, max: &RangeBorder) -> bool {
        match self.extreme_cmp(max) {
            Ordering::Greater => true,
            Ordering::Equal => self.exclusive || max.exclusive || self.is_infinite(),
            Ordering::Less => false,
        }
    }

    /// Orders borders as points on the extended real line. Infinity markers
    /// decide before the sentinel numeric field is looked at.
    fn extreme_cmp(&self, other: &RangeBorder) -> Ordering {
        match (self.inf, other.inf) {
            (Some(a), Some(b)) if a == b => Ordering::Equal,
            (Some(Infinity::Negative), _) | (_, Some(Infinity::Positive)) => Ordering::Less,
            (Some(Infinity::Positive), _) | (_, Some(Infinity::Negative)) => Ordering::Greater,
            (None, None) => self
                .value
                .partial_cmp(&other.value)
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl FromStr for RangeBorder {
    type Err = ZedisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeBorder::parse(s)
    }
}

fn parse_infinity(text: &str) -> Option<RangeBorder> {
    if text.eq_ignore_ascii_case("inf") || text.eq_ignore_ascii_case("+inf") {
        Some(RangeBorder::POSITIVE_INFINITY)
    } else if text.eq_ignore_ascii_case("-inf") {
        Some(RangeBorder::NEGATIVE_INFINITY)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_infinity_markers() {
        assert_eq!(RangeBorder::parse("inf").unwrap(), RangeBorder::POSITIVE_INFINITY);
        assert_eq!(RangeBorder::parse("+inf").unwrap(), RangeBorder::POSITIVE_INFINITY);
        assert_eq!(RangeBorder::parse("-inf").unwrap(), RangeBorder::NEGATIVE_INFINITY);
        assert_eq!(RangeBorder::parse("(-inf").unwrap(), RangeBorder::NEGATIVE_INFINITY);
        assert_eq!(RangeBorder::parse("+INF").unwrap(), RangeBorder::POSITIVE_INFINITY);
    }

    #[test]
    fn test_parse_exclusive() {
        let border = RangeBorder::parse("(5").unwrap();
        assert!(border.is_exclusive());
        assert!(!border.is_infinite());
        assert_eq!(border.value(), 5.0);
        assert!(!border.admits_below(5.0));
        assert!(border.admits_below(5.0001));
    }

    #[test]
    fn test_parse_inclusive() {
        let border: RangeBorder = "-2.718".parse().unwrap();
        assert!(!border.is_exclusive());
        assert_eq!(border.value(), -2.718);
        assert!(border.admits_below(-2.718));
        assert!(border.admits_above(-2.718));
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(RangeBorder::parse("abc"), Err(ZedisError::InvalidFormat)));
        assert!(matches!(RangeBorder::parse("(abc"), Err(ZedisError::InvalidFormat)));
        assert!(matches!(RangeBorder::parse(""), Err(ZedisError::InvalidFormat)));
        assert!(matches!(RangeBorder::parse("("), Err(ZedisError::InvalidFormat)));
        assert!(matches!(RangeBorder::parse("nan"), Err(ZedisError::InvalidFormat)));
    }

    #[test]
    fn test_infinite_borders_admit() {
        let pos = RangeBorder::POSITIVE_INFINITY;
        let neg = RangeBorder::NEGATIVE_INFINITY;
        assert!(pos.admits_above(f64::MAX));
        assert!(!pos.admits_below(f64::MAX));
        assert!(neg.admits_below(f64::MIN));
        assert!(!neg.admits_above(f64::MIN));
    }

    #[test]
    fn test_exclusive_upper_bound() {
        let max = RangeBorder::exclusive(10.0);
        assert!(max.admits_above(9.999));
        assert!(!max.admits_above(10.0));
        let max = RangeBorder::inclusive(10.0);
        assert!(max.admits_above(10.0));
        assert!(!max.admits_above(10.001));
    }

    #[test]
    fn test_degenerate_ranges() {
        let neg = RangeBorder::NEGATIVE_INFINITY;
        let pos = RangeBorder::POSITIVE_INFINITY;
        assert!(!neg.excludes_everything_up_to(&pos));
        assert!(pos.excludes_everything_up_to(&neg));
        assert!(pos.excludes_everything_up_to(&pos));
        assert!(RangeBorder::inclusive(3.0).excludes_everything_up_to(&RangeBorder::inclusive(2.0)));
        assert!(!RangeBorder::inclusive(3.0).excludes_everything_up_to(&RangeBorder::inclusive(3.0)));
        assert!(RangeBorder::exclusive(3.0).excludes_everything_up_to(&RangeBorder::inclusive(3.0)));
        assert!(!RangeBorder::inclusive(1e300).excludes_everything_up_to(&pos));
        assert!(RangeBorder::inclusive(-1e300).excludes_everything_up_to(&neg));
    }
}
