// src/common/patch.rs

use serde::{Deserialize, Deserializer};

/// Distingue chave ausente (`None`, via `#[serde(default)]`) de `null`
/// explícito (`Some(None)`). Usado nos patches que precisam limpar campos.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
