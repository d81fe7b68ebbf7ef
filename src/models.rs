use serde::Serialize;

/// A registry entry, serialized as `{id, name, origin}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct License {
    pub id: String,
    pub name: String,
    pub origin: LicenseOrigin,
    #[serde(skip)]
    pub kind: LicenseKind,
    #[serde(skip)]
    pub deprecated: bool,
}

impl License {
    pub fn custom(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            origin: LicenseOrigin::Custom,
            kind: LicenseKind::License,
            deprecated: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LicenseOrigin {
    #[serde(rename = "SPDX")]
    Spdx,
    Custom,
}

impl std::fmt::Display for LicenseOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseOrigin::Spdx => write!(f, "SPDX"),
            LicenseOrigin::Custom => write!(f, "Custom"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LicenseKind {
    #[default]
    License,
    Exception,
}

impl std::fmt::Display for LicenseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LicenseKind::License => write!(f, "license"),
            LicenseKind::Exception => write!(f, "exception"),
        }
    }
}

/// Outcome of validating one expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    pub unknown_tokens: Vec<String>,
    pub error: Option<String>,
    /// Canonical rendering of the parsed expression.
    pub normalized: Option<String>,
}

impl ValidationResult {
    pub fn status_code(&self) -> u16 {
        if self.valid {
            200
        } else {
            400
        }
    }
}

/// Response body of the validate endpoint: `{"unknown_tokens": [...]}` or `{"error": "..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ValidationBody {
    Accepted { unknown_tokens: Vec<String> },
    Rejected { error: String },
}

impl From<ValidationResult> for ValidationBody {
    fn from(result: ValidationResult) -> Self {
        match result.error {
            Some(error) => ValidationBody::Rejected { error },
            None => ValidationBody::Accepted {
                unknown_tokens: result.unknown_tokens,
            },
        }
    }
}
