/// Redis string type, stored as raw bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct RedisString {
    data: Vec<u8>,
}

impl RedisString {
    pub fn new(data: Vec<u8>) -> Self {
        RedisString { data }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Format a float like Redis does (`%.17g` with the shortest round-tripping
/// digits): `inf` and `-inf` for the infinities, no trailing `.0` on
/// integral values, and exponent form such as `1e+300` or `2.5e-07` once the
/// magnitude reaches 1e17 or drops below 1e-4.
pub fn format_float(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string();
    }
    if !n.is_finite() {
        return format!("{n}");
    }
    let magnitude = n.abs();
    if (1e-4..1e17).contains(&magnitude) {
        return format!("{n}");
    }

    // `{:e}` gives the shortest digits as `d.ddde-7`; widen the exponent
    // to a sign and at least two digits.
    let shortest = format!("{n:e}");
    match shortest.split_once('e') {
        Some((mantissa, exponent)) => {
            let (sign, digits) = match exponent.strip_prefix('-') {
                Some(digits) => ('-', digits),
                None => ('+', exponent),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => shortest,
    }
}
