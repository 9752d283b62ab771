use std::collections::BTreeMap;

/// Corrections for the year's leading digit.
///
/// Tooltip dates are rendered in a font where tesseract regularly reads the
/// leading `2` of the year as `9` ("9024/03/15"). The table maps each known
/// misread to the digit that was actually drawn. Only the first digit of the
/// year is ever rewritten.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct YearDigitCorrection {
    table: BTreeMap<char, char>,
}

impl YearDigitCorrection {
    pub fn new(table: BTreeMap<char, char>) -> Self {
        Self { table }
    }

    /// Returns `year` with its leading digit corrected, if the table has an entry.
    pub fn apply(&self, year: &str) -> String {
        let mut chars = year.chars();
        match chars.next() {
            Some(first) => {
                let fixed = self.table.get(&first).copied().unwrap_or(first);
                std::iter::once(fixed).chain(chars).collect()
            }
            None => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn default_table() -> YearDigitCorrection {
        YearDigitCorrection::new(BTreeMap::from([('9', '2')]))
    }

    #[test]
    fn test_misread_leading_digit_corrected() {
        assert_eq!(default_table().apply("9024"), "2024");
    }

    #[test]
    fn test_correct_year_untouched() {
        assert_eq!(default_table().apply("2024"), "2024");
    }

    #[test]
    fn test_only_leading_digit_rewritten() {
        assert_eq!(default_table().apply("9099"), "2099");
    }

    #[test]
    fn test_empty_table_is_identity() {
        assert_eq!(YearDigitCorrection::default().apply("9024"), "9024");
        assert_eq!(YearDigitCorrection::default().apply(""), "");
    }
}
