/// Current-page pointer over a fixed page count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageIndex {
    current: usize,
    total: usize,
}

impl PageIndex {
    pub fn new(total: usize) -> Self {
        Self { current: 0, total }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn contains(&self, index: usize) -> bool {
        index < self.total
    }

    pub fn set(&mut self, index: usize) -> bool {
        if !self.contains(index) {
            return false;
        }

        self.current = index;
        true
    }

    pub fn next_index(&self) -> Option<usize> {
        let next = self.current + 1;
        self.contains(next).then_some(next)
    }

    pub fn previous_index(&self) -> Option<usize> {
        self.current.checked_sub(1)
    }

    /// 1-based page number shown to the user.
    pub fn page_number(&self) -> usize {
        self.current + 1
    }

    pub fn counter_text(&self) -> String {
        format!("{}/{}", self.page_number(), self.total)
    }
}

/// Reads a leading integer the way a lenient form field does: skips leading
/// whitespace, accepts a sign, then takes the longest digit run and ignores
/// whatever follows. `"12abc"` is 12; `"abc"` is nothing.
pub fn parse_page_number(input: &str) -> Option<i64> {
    let trimmed = input.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let value: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -value } else { value })
}

/// Validates user-entered page text against `total` and returns the 0-based
/// index it names.
pub fn page_input_to_index(input: &str, total: usize) -> Option<usize> {
    let page = parse_page_number(input)?;
    if page <= 0 {
        return None;
    }

    let page = usize::try_from(page).ok()?;
    (page <= total).then(|| page - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stepping_is_bounded_at_both_ends() {
        let mut index = PageIndex::new(3);

        assert_eq!(index.previous_index(), None);
        assert!(index.set(2));
        assert_eq!(index.next_index(), None);
        assert_eq!(index.previous_index(), Some(1));
        assert!(!index.set(3));
        assert_eq!(index.current(), 2);
    }

    #[test]
    fn counter_uses_one_based_numbers() {
        let mut index = PageIndex::new(5);
        index.set(2);

        assert_eq!(index.counter_text(), "3/5");
    }

    #[test]
    fn leading_integer_is_parsed() {
        assert_eq!(parse_page_number("3"), Some(3));
        assert_eq!(parse_page_number("  12abc"), Some(12));
        assert_eq!(parse_page_number("+4"), Some(4));
        assert_eq!(parse_page_number("-2"), Some(-2));
        assert_eq!(parse_page_number("abc"), None);
        assert_eq!(parse_page_number(""), None);
        assert_eq!(parse_page_number("-"), None);
    }

    #[test]
    fn page_input_rejects_out_of_range_values() {
        assert_eq!(page_input_to_index("3", 5), Some(2));
        assert_eq!(page_input_to_index("5", 5), Some(4));
        assert_eq!(page_input_to_index("6", 5), None);
        assert_eq!(page_input_to_index("0", 5), None);
        assert_eq!(page_input_to_index("-1", 5), None);
        assert_eq!(page_input_to_index("x", 5), None);
        assert_eq!(page_input_to_index("99999999999999999999999", 5), None);
    }
}
