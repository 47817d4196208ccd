//! Positional slices with Python semantics

use crate::errors::{TableError, TableResult};

/// Positions selected by `[start:stop:step]` over `len` rows.
///
/// Bounds are clamped, negative bounds count from the end, and a negative
/// step walks backwards. A zero step is rejected.
pub(crate) fn slice_positions(
    len: usize,
    start: Option<i64>,
    stop: Option<i64>,
    step: Option<i64>,
) -> TableResult<Vec<usize>> {
    let step = step.unwrap_or(1);
    if step == 0 {
        return Err(TableError::parse("0", "slice step cannot be zero"));
    }

    let n = len as i64;
    let (lower, upper) = if step > 0 { (0, n) } else { (-1, n - 1) };
    let adjust = |bound: Option<i64>, default: i64| match bound {
        None => default,
        Some(b) => {
            let b = if b < 0 { b.saturating_add(n) } else { b };
            b.clamp(lower, upper)
        }
    };

    let (mut i, stop) = if step > 0 {
        (adjust(start, lower), adjust(stop, upper))
    } else {
        (adjust(start, upper), adjust(stop, lower))
    };

    let mut out = Vec::new();
    while (step > 0 && i < stop) || (step < 0 && i > stop) {
        out.push(i as usize);
        i = match i.checked_add(step) {
            Some(next) => next,
            None => break,
        };
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(start: Option<i64>, stop: Option<i64>, step: Option<i64>) -> Vec<usize> {
        slice_positions(5, start, stop, step).unwrap()
    }

    #[test]
    fn test_full_slice() {
        assert_eq!(s(None, None, None), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_stepped_slice() {
        assert_eq!(s(Some(1), Some(4), Some(3)), vec![1]);
        assert_eq!(s(None, None, Some(2)), vec![0, 2, 4]);
    }

    #[test]
    fn test_negative_bounds() {
        assert_eq!(s(Some(-2), None, None), vec![3, 4]);
        assert_eq!(s(None, Some(-3), None), vec![0, 1]);
    }

    #[test]
    fn test_reverse() {
        assert_eq!(s(None, None, Some(-1)), vec![4, 3, 2, 1, 0]);
        assert_eq!(s(Some(3), Some(0), Some(-2)), vec![3, 1]);
    }

    #[test]
    fn test_out_of_range_bounds_clamp() {
        assert_eq!(s(Some(3), Some(100), None), vec![3, 4]);
        assert_eq!(s(Some(-100), Some(2), None), vec![0, 1]);
        assert!(s(Some(10), None, None).is_empty());
    }

    #[test]
    fn test_zero_step() {
        assert_eq!(slice_positions(5, None, None, Some(0)).unwrap_err().code(), "TABLE_PARSE");
    }

    #[test]
    fn test_empty_table() {
        assert!(slice_positions(0, None, None, Some(-1)).unwrap().is_empty());
    }
}
