use crate::error::{AppError, Result};
use serde::Serialize;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Step numbers selected with an expression such as `1-5,7,10`.
///
/// Members are kept as sorted, non-overlapping inclusive ranges, so `0-4000000000`
/// costs one entry rather than four billion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepSet {
    ranges: Vec<RangeInclusive<u32>>,
}

impl StepSet {
    pub fn contains(&self, step: u32) -> bool {
        self.ranges.iter().any(|range| range.contains(&step))
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Every member, ascending.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.ranges.iter().flat_map(|range| range.clone())
    }

    fn insert_range(&mut self, range: RangeInclusive<u32>) {
        self.ranges.push(range);
        self.ranges.sort_by_key(|r| *r.start());

        let mut merged: Vec<RangeInclusive<u32>> = Vec::with_capacity(self.ranges.len());
        for next in self.ranges.drain(..) {
            match merged.last_mut() {
                Some(last) if *next.start() <= last.end().saturating_add(1) => {
                    if next.end() > last.end() {
                        *last = *last.start()..=*next.end();
                    }
                }
                _ => merged.push(next),
            }
        }
        self.ranges = merged;
    }
}

impl FromStr for StepSet {
    type Err = AppError;

    fn from_str(expr: &str) -> Result<Self> {
        let mut set = StepSet::default();
        for part in expr.split(',') {
            let range = parse_part(part).map_err(|reason| {
                AppError::StepParse(format!(
                    "Invalid step selection '{}' (part '{}'): {}. Use a form like '1-5,7,10'.",
                    expr, part, reason
                ))
            })?;
            match range {
                Some(range) => {
                    log::trace!("Step selection part '{}' -> {:?}", part, range);
                    set.insert_range(range);
                }
                // Reversed ranges (e.g. '5-3') select nothing.
                None => log::debug!(
                    "Step selection part '{}' is a reversed range, selecting nothing",
                    part
                ),
            }
        }
        log::debug!("Parsed step selection '{}' into {}", expr, set);
        Ok(set)
    }
}

impl fmt::Display for StepSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .ranges
            .iter()
            .map(|range| {
                if range.start() == range.end() {
                    range.start().to_string()
                } else {
                    format!("{}-{}", range.start(), range.end())
                }
            })
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

impl Serialize for StepSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub fn parse_steps_expr(expr: &str) -> Result<StepSet> {
    expr.parse()
}

fn parse_part(part: &str) -> std::result::Result<Option<RangeInclusive<u32>>, String> {
    let mut bounds = part.split('-');
    let start = bounds.next().unwrap_or_default();
    match (bounds.next(), bounds.next()) {
        (None, _) => {
            let step = parse_step(start)?;
            Ok(Some(step..=step))
        }
        (Some(end), None) => {
            let start = parse_step(start)?;
            let end = parse_step(end)?;
            Ok((start <= end).then_some(start..=end))
        }
        (Some(_), Some(_)) => Err("a range takes exactly one '-'".to_string()),
    }
}

fn parse_step(token: &str) -> std::result::Result<u32, String> {
    if token.is_empty() {
        return Err("expected a step number, found nothing".to_string());
    }
    if !token.bytes().all(|b| b.is_ascii_digit()) {
        return Err(format!("'{}' is not a non-negative integer", token));
    }
    token
        .parse::<u32>()
        .map_err(|e| format!("'{}' is out of range: {}", token, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members(expr: &str) -> Vec<u32> {
        parse_steps_expr(expr).unwrap().iter().collect()
    }

    #[test]
    fn test_ranges_and_singles() {
        assert_eq!(members("1-3,5"), vec![1, 2, 3, 5]);
        assert_eq!(members("7"), vec![7]);
        assert_eq!(members("2-2"), vec![2]);
        assert_eq!(members("1-5,7,10"), vec![1, 2, 3, 4, 5, 7, 10]);
    }

    #[test]
    fn test_duplicates_and_overlaps_collapse() {
        assert_eq!(members("3,1-4,2,4-6,6"), vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(parse_steps_expr("1-2,3-4").unwrap().to_string(), "1-4");
        assert_eq!(parse_steps_expr("5,1").unwrap().to_string(), "1,5");
    }

    #[test]
    fn test_leading_zeros_and_zero() {
        assert_eq!(members("00-02,07"), vec![0, 1, 2, 7]);
    }

    #[test]
    fn test_reversed_range_selects_nothing() {
        let set = parse_steps_expr("5-3").unwrap();
        assert!(set.is_empty());
        assert!(!set.contains(4));
        assert_eq!(set.to_string(), "");

        assert_eq!(members("1,5-3,7"), vec![1, 7]);
        assert!(!parse_steps_expr("1,5-3").unwrap().is_empty());
    }

    #[test]
    fn test_contains() {
        let set = parse_steps_expr("1-3,10").unwrap();
        assert!(set.contains(1));
        assert!(set.contains(3));
        assert!(set.contains(10));
        assert!(!set.contains(0));
        assert!(!set.contains(4));
    }

    #[test]
    fn test_wide_range_is_not_materialised() {
        let set = parse_steps_expr("0-4294967295").unwrap();
        assert!(set.contains(u32::MAX));
        assert_eq!(set.to_string(), "0-4294967295");
    }

    #[test]
    fn test_malformed_expressions_fail() {
        for expr in [
            "a-b", "", "1,", ",1", "1,,2", "1-", "-3", "1-2-3", " 1", "1 ", "1, 2", "+1", "-1",
            "99999999999", "1.5",
        ] {
            let err = parse_steps_expr(expr).unwrap_err();
            assert!(
                matches!(err, AppError::StepParse(_)),
                "expected StepParse for {:?}, got {:?}",
                expr,
                err
            );
        }
    }

    #[test]
    fn test_serializes_as_canonical_expression() {
        let set = parse_steps_expr("4,1-2").unwrap();
        assert_eq!(serde_json::to_string(&set).unwrap(), "\"1-2,4\"");
    }
}
