//! DashScope model ids

use std::fmt;
use std::str::FromStr;

use crate::error::LlmError;

/// Well-known Qwen models served by DashScope.
///
/// Any other id can still be passed as a plain string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DashScopeModel {
    #[default]
    QwenTurbo,
    QwenPlus,
    QwenMax,
    QwenMaxLongContext,
    /// Vision-language
    QwenVlPlus,
    QwenVlMax,
}

impl DashScopeModel {
    pub const ALL: [Self; 6] = [
        Self::QwenTurbo,
        Self::QwenPlus,
        Self::QwenMax,
        Self::QwenMaxLongContext,
        Self::QwenVlPlus,
        Self::QwenVlMax,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::QwenTurbo => "qwen-turbo",
            Self::QwenPlus => "qwen-plus",
            Self::QwenMax => "qwen-max",
            Self::QwenMaxLongContext => "qwen-max-longcontext",
            Self::QwenVlPlus => "qwen-vl-plus",
            Self::QwenVlMax => "qwen-vl-max",
        }
    }

    /// Whether the model accepts image parts
    pub const fn supports_vision(&self) -> bool {
        matches!(self, Self::QwenVlPlus | Self::QwenVlMax)
    }
}

impl fmt::Display for DashScopeModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashScopeModel {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| LlmError::InvalidParameter(format!("Unknown DashScope model: {s}")))
    }
}

impl From<DashScopeModel> for String {
    fn from(model: DashScopeModel) -> Self {
        model.as_str().to_string()
    }
}
