//! Fixed-capacity parameter table
//!
//! Holds the parameters seeded at boot. Lookups of absent names yield the
//! store's not-found value, which is configurable so boards can match the
//! convention of whatever they load parameters from.

use heapless::FnvIndexMap;
use preflight_core::traits::{ParamName, ParamStore};

/// Maximum number of parameters (power of two)
pub const PARAM_CAPACITY: usize = 128;

/// Errors when inserting a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParamError {
    /// Name longer than the name buffer
    NameTooLong,
    /// Table is full
    Full,
}

/// In-memory parameter store
#[derive(Debug, Clone, Default)]
pub struct ParamTable {
    values: FnvIndexMap<ParamName, f32, PARAM_CAPACITY>,
    not_found: f32,
}

fn to_name(name: &str) -> Result<ParamName, ParamError> {
    let mut key = ParamName::new();
    key.push_str(name).map_err(|_| ParamError::NameTooLong)?;
    Ok(key)
}

impl ParamTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different value for lookups of absent names
    pub fn with_not_found_value(mut self, value: f32) -> Self {
        self.not_found = value;
        self
    }

    /// Insert or overwrite a parameter
    pub fn set(&mut self, name: &str, value: f32) -> Result<(), ParamError> {
        let key = to_name(name)?;
        self.values
            .insert(key, value)
            .map(|_| ())
            .map_err(|_| ParamError::Full)
    }

    pub fn remove(&mut self, name: &str) -> Option<f32> {
        let key = to_name(name).ok()?;
        self.values.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f32)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl ParamStore for ParamTable {
    fn get(&self, name: &str) -> Option<f32> {
        let key = to_name(name).ok()?;
        self.values.get(&key).copied()
    }

    fn not_found_value(&self) -> f32 {
        self.not_found
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let mut table = ParamTable::new();
        table.set("RC1_MIN", 1000.0).unwrap();
        table.set("RC1_MIN", 1010.0).unwrap();

        assert_eq!(table.get("RC1_MIN"), Some(1010.0));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("RC1_MAX"), None);
    }

    #[test]
    fn test_not_found_value() {
        let table = ParamTable::new();
        assert_eq!(table.get_or_default("RC5_TRIM"), 0.0);

        let table = ParamTable::new().with_not_found_value(-1.0);
        assert_eq!(table.get_or_default("RC5_TRIM"), -1.0);
    }

    #[test]
    fn test_name_too_long() {
        let mut table = ParamTable::new();
        assert_eq!(
            table.set("A_VERY_LONG_PARAMETER_NAME", 1.0),
            Err(ParamError::NameTooLong)
        );
        assert_eq!(table.get("A_VERY_LONG_PARAMETER_NAME"), None);
    }

    #[test]
    fn test_capacity() {
        let mut table = ParamTable::new();
        for i in 0..PARAM_CAPACITY {
            let mut name = ParamName::new();
            core::fmt::write(&mut name, format_args!("P{}", i)).unwrap();
            table.set(&name, i as f32).unwrap();
        }
        assert_eq!(table.set("ONE_MORE", 1.0), Err(ParamError::Full));
        // Overwriting still works when full
        assert_eq!(table.set("P0", 5.0), Ok(()));
    }

    #[test]
    fn test_remove() {
        let mut table = ParamTable::new();
        table.set("RC2_DZ", 10.0).unwrap();
        assert_eq!(table.remove("RC2_DZ"), Some(10.0));
        assert!(table.is_empty());
    }
}
