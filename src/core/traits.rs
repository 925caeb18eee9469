//! Shared traits for ordered records.
//!
//! Lists, items and images all carry a display order that must stay
//! contiguous (`0..n`) within its owner.

/// A record with a display position.
pub trait Ordered {
    /// Current display position.
    fn order_number(&self) -> i64;

    /// Overwrite the display position.
    fn set_order_number(&mut self, order: i64);
}

/// Sort by current order and renumber to `0..n`.
///
/// Returns the indices (in the sorted slice) whose order number changed, so
/// callers only persist what moved.
pub fn normalize_order<T: Ordered>(records: &mut [T]) -> Vec<usize> {
    records.sort_by_key(Ordered::order_number);

    let mut changed = Vec::new();
    for (index, record) in records.iter_mut().enumerate() {
        let expected = i64::try_from(index).unwrap_or(i64::MAX);
        if record.order_number() != expected {
            record.set_order_number(expected);
            changed.push(index);
        }
    }
    changed
}

/// Move the record at `from` to `to` (clamped) and renumber everything.
///
/// The slice must already be in display order.
pub fn move_to_position<T: Ordered>(records: &mut Vec<T>, from: usize, to: usize) {
    if from >= records.len() {
        return;
    }
    let record = records.remove(from);
    let to = to.min(records.len());
    records.insert(to, record);

    for (index, record) in records.iter_mut().enumerate() {
        record.set_order_number(i64::try_from(index).unwrap_or(i64::MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Row {
        name: &'static str,
        order: i64,
    }

    impl Ordered for Row {
        fn order_number(&self) -> i64 {
            self.order
        }

        fn set_order_number(&mut self, order: i64) {
            self.order = order;
        }
    }

    fn rows(pairs: &[(&'static str, i64)]) -> Vec<Row> {
        pairs
            .iter()
            .map(|(name, order)| Row { name, order: *order })
            .collect()
    }

    fn names(rows: &[Row]) -> Vec<&'static str> {
        rows.iter().map(|r| r.name).collect()
    }

    #[test]
    fn test_normalize_fills_gaps() {
        let mut records = rows(&[("c", 7), ("a", 0), ("b", 3)]);
        let changed = normalize_order(&mut records);

        assert_eq!(names(&records), vec!["a", "b", "c"]);
        assert_eq!(records.iter().map(|r| r.order).collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(changed, vec![1, 2]);
    }

    #[test]
    fn test_normalize_already_contiguous() {
        let mut records = rows(&[("a", 0), ("b", 1)]);
        assert!(normalize_order(&mut records).is_empty());
    }

    #[test]
    fn test_move_forward_and_back() {
        let mut records = rows(&[("a", 0), ("b", 1), ("c", 2), ("d", 3)]);

        move_to_position(&mut records, 0, 2);
        assert_eq!(names(&records), vec!["b", "c", "a", "d"]);

        move_to_position(&mut records, 3, 0);
        assert_eq!(names(&records), vec!["d", "b", "c", "a"]);
        assert_eq!(records.iter().map(|r| r.order).collect::<Vec<_>>(), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_move_clamps_target() {
        let mut records = rows(&[("a", 0), ("b", 1), ("c", 2)]);
        move_to_position(&mut records, 0, 99);
        assert_eq!(names(&records), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_move_out_of_range_is_noop() {
        let mut records = rows(&[("a", 0), ("b", 1)]);
        move_to_position(&mut records, 5, 0);
        assert_eq!(names(&records), vec!["a", "b"]);
    }
}
