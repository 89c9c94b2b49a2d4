//! Parameter store access

use heapless::String;

/// Longest parameter name (`RC18_TRIM` fits comfortably)
pub const MAX_PARAM_NAME_LEN: usize = 16;

/// Owned parameter name
pub type ParamName = String<MAX_PARAM_NAME_LEN>;

/// Read-only view of the parameter store
///
/// The store owns the values; the gate reads them fresh on every run and
/// never writes back.
pub trait ParamStore {
    /// Look up a parameter by name
    fn get(&self, name: &str) -> Option<f32>;

    /// Value a lookup yields when the parameter does not exist
    fn not_found_value(&self) -> f32 {
        0.0
    }

    /// Look up a parameter, falling back to the store's not-found value
    fn get_or_default(&self, name: &str) -> f32 {
        self.get(name).unwrap_or_else(|| self.not_found_value())
    }
}
