//! Composite identity of an outstanding verification code.

use std::fmt;

use vc_shared::mask_target;

use crate::errors::ValidationError;

/// Maximum size of a single key component in bytes
pub const MAX_COMPONENT_BYTES: usize = 128;

/// Separator used when rendering the backend key
const SEPARATOR: char = ':';

/// Identity of a verification code: `(namespace, biz_type, target)`
///
/// Equal keys always refer to the same stored record and distinct keys never
/// share one. `namespace` and `biz_type` may not contain `:`, which keeps the
/// rendered storage key unambiguous even when the target itself contains `:`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct VerificationKey {
    namespace: String,
    biz_type: String,
    target: String,
}

impl VerificationKey {
    /// Build a key from its three components
    ///
    /// Components are trimmed. Each must be non-empty and at most
    /// [`MAX_COMPONENT_BYTES`] long.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` naming the offending field.
    pub fn new(
        namespace: impl AsRef<str>,
        biz_type: impl AsRef<str>,
        target: impl AsRef<str>,
    ) -> Result<Self, ValidationError> {
        let namespace = Self::component("namespace", namespace.as_ref(), false)?;
        let biz_type = Self::component("biz_type", biz_type.as_ref(), false)?;
        let target = Self::component("target", target.as_ref(), true)?;

        Ok(Self {
            namespace,
            biz_type,
            target,
        })
    }

    fn component(field: &str, value: &str, allow_separator: bool) -> Result<String, ValidationError> {
        let value = value.trim();

        if value.is_empty() {
            return Err(ValidationError::RequiredField {
                field: field.to_string(),
            });
        }

        if value.len() > MAX_COMPONENT_BYTES {
            return Err(ValidationError::InvalidLength {
                field: field.to_string(),
                max: MAX_COMPONENT_BYTES,
                actual: value.len(),
            });
        }

        if !allow_separator && value.contains(SEPARATOR) {
            return Err(ValidationError::InvalidFormat {
                field: field.to_string(),
                reason: format!("must not contain '{}'", SEPARATOR),
            });
        }

        Ok(value.to_string())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn biz_type(&self) -> &str {
        &self.biz_type
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Target in a form safe for logs
    pub fn masked_target(&self) -> String {
        mask_target(&self.target)
    }

    /// Render the backend key: `prefix:namespace:biz_type:target`
    ///
    /// An empty prefix is omitted.
    pub fn storage_key(&self, prefix: &str) -> String {
        let base = format!(
            "{}{sep}{}{sep}{}",
            self.namespace,
            self.biz_type,
            self.target,
            sep = SEPARATOR
        );

        if prefix.is_empty() {
            base
        } else {
            format!("{}{}{}", prefix, SEPARATOR, base)
        }
    }
}

// Targets are personal data; never print them in full.
impl fmt::Debug for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationKey")
            .field("namespace", &self.namespace)
            .field("biz_type", &self.biz_type)
            .field("target", &self.masked_target())
            .finish()
    }
}

impl fmt::Display for VerificationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.namespace,
            self.biz_type,
            self.masked_target()
        )
    }
}
