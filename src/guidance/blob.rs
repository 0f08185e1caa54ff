//! Typed configuration payloads handed to guidance modes.

use super::mode::ModeError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Prefix of the type URLs produced by [`ConfigBlob::pack`].
pub const TYPE_URL_PREFIX: &str = "type.sortie.dev/";

/// A configuration message a mode knows how to unpack.
pub trait ConfigType: Serialize + DeserializeOwned {
    /// Fully qualified message name, the last segment of the type URL.
    const TYPE_NAME: &'static str;
}

/// Opaque configuration with a type discriminator.
///
/// The scheduler passes blobs through untouched. Modes check the
/// discriminator before interpreting the value.
///
/// # Example
///
/// ```rust
/// use sortie::guidance::{ConfigBlob, ConfigType};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct LookDown { pitch_deg: f64 }
///
/// impl ConfigType for LookDown {
///     const TYPE_NAME: &'static str = "Guidance.LookDown.Config";
/// }
///
/// let blob = ConfigBlob::pack(&LookDown { pitch_deg: -90.0 }).unwrap();
/// assert!(blob.is::<LookDown>());
/// assert_eq!(blob.unpack::<LookDown>().unwrap().pitch_deg, -90.0);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigBlob {
    type_url: String,
    value: Value,
}

impl ConfigBlob {
    pub fn new(type_url: impl Into<String>, value: Value) -> Self {
        Self {
            type_url: type_url.into(),
            value,
        }
    }

    /// Serialize `config` under its type URL.
    pub fn pack<T: ConfigType>(config: &T) -> Result<Self, ModeError> {
        let value = serde_json::to_value(config).map_err(|e| ModeError::MalformedConfig {
            type_url: type_url_of::<T>(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(type_url_of::<T>(), value))
    }

    pub fn type_url(&self) -> &str {
        &self.type_url
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Check whether the type URL names `type_name` (`…/<type_name>`).
    pub fn is_type(&self, type_name: &str) -> bool {
        match self.type_url.rsplit_once('/') {
            Some((_, name)) => name == type_name,
            None => self.type_url == type_name,
        }
    }

    pub fn is<T: ConfigType>(&self) -> bool {
        self.is_type(T::TYPE_NAME)
    }

    /// Decode the value after checking the discriminator.
    pub fn unpack<T: ConfigType>(&self) -> Result<T, ModeError> {
        if !self.is::<T>() {
            return Err(ModeError::UnexpectedConfig {
                expected: T::TYPE_NAME.to_string(),
                found: self.type_url.clone(),
            });
        }
        serde_json::from_value(self.value.clone()).map_err(|e| ModeError::MalformedConfig {
            type_url: self.type_url.clone(),
            reason: e.to_string(),
        })
    }
}

fn type_url_of<T: ConfigType>() -> String {
    format!("{TYPE_URL_PREFIX}{}", T::TYPE_NAME)
}
