use std::{cmp::Ordering, fmt};

/// The largest scale a `Decimal` can carry without overflowing `i64` powers
/// of ten.
const MAX_SCALE: u32 = 18;

/// Fixed-point number: `units / 10^scale`.
///
/// `Decimal::new(4550, 2)` is `Some(45.50)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decimal {
    units: i64,
    scale: u32,
}

impl Decimal {
    /// `None` when `scale` is above 18.
    pub fn new(units: i64, scale: u32) -> Option<Self> {
        if scale > MAX_SCALE {
            return None;
        }
        Some(Self { units, scale })
    }

    /// Parse a plain decimal literal such as `"67"`, `"-3.5"` or `"45.50"`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (negative, digits) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s.strip_prefix('+').unwrap_or(s)),
        };

        let (int_part, frac_part) = match digits.find('.') {
            Some(pos) => (&digits[..pos], &digits[pos + 1..]),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if frac_part.len() as u32 > MAX_SCALE {
            return None;
        }

        let mut units: i64 = 0;
        for c in int_part.chars().chain(frac_part.chars()) {
            let d = c.to_digit(10)? as i64;
            units = units.checked_mul(10)?.checked_add(d)?;
        }
        if negative {
            units = -units;
        }

        Self::new(units, frac_part.len() as u32)
    }

    pub fn units(&self) -> i64 {
        self.units
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    fn pow10(&self) -> i64 {
        10i64.pow(self.scale)
    }

    /// True if the value has no fractional part, e.g. `30.00`.
    pub fn is_integral(&self) -> bool {
        self.units % self.pow10() == 0
    }

    pub fn trunc(&self) -> i64 {
        self.units / self.pow10()
    }

    pub fn to_f64(&self) -> f64 {
        self.units as f64 / self.pow10() as f64
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.units);
        }

        let sign = if self.units < 0 { "-" } else { "" };
        let abs = self.units.unsigned_abs();
        let pow = self.pow10() as u64;
        write!(
            f,
            "{}{}.{:0width$}",
            sign,
            abs / pow,
            abs % pow,
            width = self.scale as usize
        )
    }
}

#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Int64(i64),
    Float64(f64),
    Decimal(Decimal),
    String(String),
}

impl Cell {
    /// Numeric view of the cell, `None` for null and text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Int64(v) => Some(*v as f64),
            Cell::Float64(v) => Some(*v),
            Cell::Decimal(v) => Some(v.to_f64()),
            Cell::Null | Cell::String(_) => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    // `units / 10^scale` of an integer or decimal cell
    fn exact(&self) -> Option<(i128, u32)> {
        match self {
            Cell::Int64(v) => Some((*v as i128, 0)),
            Cell::Decimal(d) => Some((d.units as i128, d.scale)),
            _ => None,
        }
    }

    // null < numbers < text
    fn rank(&self) -> u8 {
        match self {
            Cell::Null => 0,
            Cell::Int64(_) | Cell::Float64(_) | Cell::Decimal(_) => 1,
            Cell::String(_) => 2,
        }
    }
}

impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Cell {}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Cell::String(a), Cell::String(b)) => a.cmp(b),
            (Cell::Float64(a), Cell::Float64(b)) => cmp_float(*a, *b),
            (Cell::Float64(f), _) => match other.exact() {
                Some(e) => cmp_exact_float(e, *f).reverse(),
                None => self.rank().cmp(&other.rank()),
            },
            (_, Cell::Float64(f)) => match self.exact() {
                Some(e) => cmp_exact_float(e, *f),
                None => self.rank().cmp(&other.rank()),
            },
            _ => match (self.exact(), other.exact()) {
                (Some(a), Some(b)) => cmp_exact(a, b),
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }
}

// `-0.0 == 0.0`; NaN sorts by sign below or above every number.
fn cmp_float(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or_else(|| a.total_cmp(&b))
}

fn cmp_exact((a, scale_a): (i128, u32), (b, scale_b): (i128, u32)) -> Ordering {
    let scale = scale_a.max(scale_b);
    let a = a * 10i128.pow(scale - scale_a);
    let b = b * 10i128.pow(scale - scale_b);
    a.cmp(&b)
}

// Exact in the integer part; the fractions are compared as floats.
fn cmp_exact_float((units, scale): (i128, u32), f: f64) -> Ordering {
    if f.is_nan() {
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }

    // every exact value fits well inside +-2^100
    let bound = 2f64.powi(100);
    let floor = f.floor();
    if floor >= bound {
        return Ordering::Less;
    }
    if floor < -bound {
        return Ordering::Greater;
    }

    let pow = 10i128.pow(scale);
    match units.div_euclid(pow).cmp(&(floor as i128)) {
        Ordering::Equal => {
            let frac = units.rem_euclid(pow) as f64 / pow as f64;
            frac.partial_cmp(&(f - floor)).unwrap_or(Ordering::Equal)
        }
        unequal => unequal,
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Int64(v) => write!(f, "{}", v),
            Cell::Float64(v) => write!(f, "{}", v),
            Cell::Decimal(v) => write!(f, "{}", v),
            Cell::String(v) => write!(f, "'{}'", v),
        }
    }
}
