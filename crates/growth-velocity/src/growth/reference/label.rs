use serde::{Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// One end of an age window. The first month of the WHO tables is expressed in weeks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBound {
    Weeks(u32),
    Months(u32),
}

impl AgeBound {
    fn approx_days(self) -> u32 {
        match self {
            AgeBound::Weeks(weeks) => weeks * 7,
            AgeBound::Months(months) => months * 30 + months / 2,
        }
    }

    fn sort_key(self) -> (u32, u8, u32) {
        match self {
            AgeBound::Weeks(weeks) => (self.approx_days(), 0, weeks),
            AgeBound::Months(months) => (self.approx_days(), 1, months),
        }
    }

    fn same_unit(self, other: AgeBound) -> bool {
        matches!(
            (self, other),
            (AgeBound::Weeks(_), AgeBound::Weeks(_)) | (AgeBound::Months(_), AgeBound::Months(_))
        )
    }

    fn value(self) -> u32 {
        match self {
            AgeBound::Weeks(value) | AgeBound::Months(value) => value,
        }
    }

    fn suffix(self) -> &'static str {
        match self {
            AgeBound::Weeks(_) => "w",
            AgeBound::Months(_) => "mo",
        }
    }
}

/// Age range covered by one row of a velocity table.
///
/// Parsing accepts every spelling found in the source tables (`"6-7mo"`, `"6-7m"`,
/// `"6 - 7 mo"`, `"6mo-7mo"`); `Display` always produces the canonical form, e.g. `"6-7mo"`,
/// `"0-4w"` or `"4w-2mo"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AgeWindow {
    pub start: AgeBound,
    pub end: AgeBound,
}

impl AgeWindow {
    pub fn months(start: u32, end: u32) -> Self {
        Self {
            start: AgeBound::Months(start),
            end: AgeBound::Months(end),
        }
    }

    pub fn canonical(&self) -> String {
        self.to_string()
    }
}

impl Ord for AgeWindow {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start
            .sort_key()
            .cmp(&other.start.sort_key())
            .then_with(|| self.end.sort_key().cmp(&other.end.sort_key()))
    }
}

impl PartialOrd for AgeWindow {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for AgeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start.same_unit(self.end) {
            write!(f, "{}-{}{}", self.start.value(), self.end.value(), self.end.suffix())
        } else {
            write!(
                f,
                "{}{}-{}{}",
                self.start.value(),
                self.start.suffix(),
                self.end.value(),
                self.end.suffix()
            )
        }
    }
}

impl Serialize for AgeWindow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelError(pub String);

impl fmt::Display for LabelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized age window label '{}'", self.0)
    }
}

impl std::error::Error for LabelError {}

impl FromStr for AgeWindow {
    type Err = LabelError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || LabelError(value.to_string());
        let cleaned = normalize_label(value);
        let (left, right) = cleaned.split_once('-').ok_or_else(invalid)?;

        let (start_value, start_unit) = split_bound(left).ok_or_else(invalid)?;
        let (end_value, end_unit) = split_bound(right).ok_or_else(invalid)?;

        let end_unit = end_unit.unwrap_or(Unit::Months);
        let start_unit = start_unit.unwrap_or(end_unit);

        let window = AgeWindow {
            start: start_unit.bound(start_value),
            end: end_unit.bound(end_value),
        };

        if window.end.approx_days() <= window.start.approx_days() {
            return Err(invalid());
        }

        Ok(window)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Weeks,
    Months,
}

impl Unit {
    fn bound(self, value: u32) -> AgeBound {
        match self {
            Unit::Weeks => AgeBound::Weeks(value),
            Unit::Months => AgeBound::Months(value),
        }
    }
}

/// Lowercases and removes whitespace, byte-order marks, and dash variants.
pub(crate) fn normalize_label(value: &str) -> String {
    value
        .replace(['\u{feff}', '\u{200b}'], "")
        .replace(['\u{2013}', '\u{2014}'], "-")
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Bounds beyond five years cannot come from an infant velocity table.
const MAX_MONTHS: u32 = 60;
const MAX_WEEKS: u32 = 260;

fn split_bound(raw: &str) -> Option<(u32, Option<Unit>)> {
    let digits_end = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, suffix) = raw.split_at(digits_end);
    let value = digits.parse::<u32>().ok()?;

    let unit = match suffix {
        "" => None,
        "w" | "wk" | "wks" | "week" | "weeks" => Some(Unit::Weeks),
        "m" | "mo" | "mos" | "month" | "months" => Some(Unit::Months),
        _ => return None,
    };

    let limit = match unit {
        Some(Unit::Weeks) => MAX_WEEKS,
        Some(Unit::Months) | None => MAX_MONTHS,
    };
    if value > limit {
        return None;
    }

    Some((value, unit))
}
