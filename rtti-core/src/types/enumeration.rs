use alloc::vec::Vec;

use crate::Type;

/// Names and values of a fieldless enum.
#[derive(Debug)]
pub struct EnumInfo {
    names: &'static str,
    values: Vec<i64>,
    underlying: fn() -> &'static Type,
}

impl EnumInfo {
    /// Builds the table from a comma separated list of variant names and
    /// their discriminants, in declaration order.
    ///
    /// # Panics
    /// Panics if the number of names and values differ.
    pub fn new(names: &'static str, values: Vec<i64>, underlying: fn() -> &'static Type) -> Self {
        let count = split_names(names).count();
        crate::rtti_assert!(
            count == values.len(),
            "enum has {count} names but {} values",
            values.len()
        );
        Self {
            names,
            values,
            underlying,
        }
    }

    /// Number of variants.
    #[inline]
    pub fn count(&self) -> usize {
        self.values.len()
    }

    /// Variant names in declaration order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        split_names(self.names)
    }

    /// Discriminants in declaration order.
    #[inline]
    pub fn values(&self) -> &[i64] {
        &self.values
    }

    /// Name of the `index`-th variant.
    pub fn name_at(&self, index: usize) -> Option<&'static str> {
        self.names().nth(index)
    }

    /// Discriminant of the variant called `name`.
    pub fn value_of(&self, name: &str) -> Option<i64> {
        self.names()
            .position(|candidate| candidate == name)
            .map(|index| self.values[index])
    }

    /// Name of the first variant whose discriminant is `value`.
    pub fn name_of(&self, value: i64) -> Option<&'static str> {
        let index = self.values.iter().position(|&v| v == value)?;
        self.name_at(index)
    }

    /// The integer type backing the enum.
    #[inline]
    pub fn underlying(&self) -> &'static Type {
        (self.underlying)()
    }
}

fn split_names(names: &'static str) -> impl Iterator<Item = &'static str> {
    names
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reflect;

    fn colors() -> EnumInfo {
        EnumInfo::new("Red, Green,Blue", vec![0, 5, 6], <u8 as Reflect>::type_of)
    }

    #[rtti_testhelpers::test]
    fn names_are_trimmed_and_ordered() {
        let info = colors();
        assert_eq!(info.count(), 3);
        assert_eq!(info.names().collect::<Vec<_>>(), ["Red", "Green", "Blue"]);
        assert_eq!(info.name_at(1), Some("Green"));
        assert_eq!(info.name_at(3), None);
    }

    #[rtti_testhelpers::test]
    fn lookup_both_ways() {
        let info = colors();
        assert_eq!(info.value_of("Blue"), Some(6));
        assert_eq!(info.value_of("Purple"), None);
        assert_eq!(info.name_of(5), Some("Green"));
        assert_eq!(info.name_of(1), None);
        assert_eq!(info.underlying().name(), "u8");
    }

    #[rtti_testhelpers::test]
    #[should_panic(expected = "enum has 2 names but 1 values")]
    fn mismatched_table_is_rejected() {
        EnumInfo::new("A, B", vec![0], <u8 as Reflect>::type_of);
    }
}
