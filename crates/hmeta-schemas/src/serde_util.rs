use serde::{Deserialize, Deserializer};

/// `deserialize_with` helper: an explicit JSON `null` decodes as
/// `T::default()`. Pair with `#[serde(default)]` to cover missing keys too.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
