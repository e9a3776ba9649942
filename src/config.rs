//! Configuration for a conversion pipeline.
//!
//! Every knob lives in [`ConversionConfig`], built via its
//! [`ConversionConfigBuilder`]. Keeping them in one struct makes it trivial
//! to share a config across requests and to diff two runs when their outputs
//! differ.

use crate::error::Scan2DocError;

/// Configuration shared by every conversion processed by a
/// [`crate::convert::Converter`].
///
/// Built via [`ConversionConfig::builder()`] or
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use scan2doc::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(300)
///     .concurrency(8)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Rasterisation DPI for PDF pages. Range: 72–400. Default: 200.
    ///
    /// 200 DPI is the OCR sweet spot: small print stays legible to the text
    /// detector while page images stay well under API upload limits.
    pub dpi: u32,

    /// Maximum rendered page dimension (width or height) in pixels.
    /// Default: 4000.
    ///
    /// A safety cap independent of DPI. A 200-DPI render of an A0 poster
    /// would otherwise produce a ~9400 × 13000 px image and exhaust memory.
    pub max_rendered_pixels: u32,

    /// Concurrent OCR + structure-extraction calls per request. Default: 4.
    ///
    /// Both collaborators are network-bound; modest fan-out cuts wall-clock
    /// time on multi-page uploads. Results are reassembled in original unit
    /// order before merging, so raising this never changes output.
    pub concurrency: usize,

    /// Model used for structure extraction. Default: claude-3-haiku-20240307.
    pub model: String,

    /// Maximum tokens the structure-extraction model may generate per unit.
    /// Default: 4096.
    pub max_tokens: u32,

    /// Per-request timeout for collaborator HTTP calls, in seconds.
    /// Default: 120.
    pub request_timeout_secs: u64,

    /// Custom structure-extraction system prompt. If None, the built-in
    /// contract prompt in [`crate::prompts`] is used.
    pub system_prompt: Option<String>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            max_rendered_pixels: 4000,
            concurrency: 4,
            model: "claude-3-haiku-20240307".to_string(),
            max_tokens: 4096,
            request_timeout_secs: 120,
            system_prompt: None,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(256);
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = model.into();
        self
    }

    pub fn max_tokens(mut self, n: u32) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = Some(prompt.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Scan2DocError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 400 {
            return Err(Scan2DocError::InvalidConfig(format!(
                "DPI must be 72–400, got {}",
                c.dpi
            )));
        }
        if c.concurrency == 0 {
            return Err(Scan2DocError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.model.is_empty() {
            return Err(Scan2DocError::InvalidConfig(
                "Model name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ConversionConfig::default();
        assert_eq!(c.dpi, 200);
        assert_eq!(c.concurrency, 4);
        assert_eq!(c.model, "claude-3-haiku-20240307");
        assert_eq!(c.max_tokens, 4096);
    }

    #[test]
    fn builder_clamps_out_of_range_values() {
        let c = ConversionConfig::builder()
            .dpi(10_000)
            .concurrency(0)
            .max_rendered_pixels(1)
            .build()
            .unwrap();
        assert_eq!(c.dpi, 400);
        assert_eq!(c.concurrency, 1);
        assert_eq!(c.max_rendered_pixels, 256);
    }

    #[test]
    fn build_rejects_empty_model() {
        let err = ConversionConfig::builder().model("").build().unwrap_err();
        assert!(matches!(err, Scan2DocError::InvalidConfig(_)));
    }
}
