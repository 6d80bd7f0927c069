/// Splits `from_block..=to_block` into inclusive spans of at most `max_range` blocks.
pub fn block_ranges(from_block: u64, to_block: u64, max_range: u64) -> Vec<(u64, u64)> {
    let max_range = max_range.max(1);
    let mut ranges = Vec::new();
    let mut start = from_block;
    while start <= to_block {
        let end = start.saturating_add(max_range - 1).min(to_block);
        ranges.push((start, end));
        if end == u64::MAX {
            break;
        }
        start = end + 1;
    }
    ranges
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_block_ranges() {
        assert_eq!(block_ranges(0, 9, 5), vec![(0, 4), (5, 9)]);
        assert_eq!(block_ranges(10, 12, 100), vec![(10, 12)]);
        assert_eq!(block_ranges(7, 7, 3), vec![(7, 7)]);
        assert_eq!(block_ranges(5, 4, 3), vec![]);
        assert_eq!(block_ranges(0, 2, 0), vec![(0, 0), (1, 1), (2, 2)]);
    }
}
