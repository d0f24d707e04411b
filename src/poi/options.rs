use std::time::Duration;

/// Pixels of a handle left on screen while it rests.
pub const DEFAULT_PEAK_PIXELS: f64 = 20.0;
/// Delay before a group hide runs after the pointer leaves a handle.
pub const DEFAULT_DELAY_MILLIS: u64 = 2000;
/// Duration of the show/hide slide.
pub const DEFAULT_ANIMATION_MILLIS: u64 = 250;
/// Class name applied to generated handles.
pub const DEFAULT_CSS_CLASS: &str = "sidelegend";
/// Deepest heading level that gets a POI.
pub const DEFAULT_MAX_LEVEL: u8 = 2;

/// Registry-wide defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct PoiConfig {
    pub peak_pixels: f64,
    pub delay_millis: u64,
    pub animation_millis: u64,
    pub css_class: String,
    /// Headings deeper than this are ignored by [`super::Registry::scan`]
    pub max_level: u8,
}

impl Default for PoiConfig {
    fn default() -> Self {
        Self {
            peak_pixels: DEFAULT_PEAK_PIXELS,
            delay_millis: DEFAULT_DELAY_MILLIS,
            animation_millis: DEFAULT_ANIMATION_MILLIS,
            css_class: DEFAULT_CSS_CLASS.to_string(),
            max_level: DEFAULT_MAX_LEVEL,
        }
    }
}

/// Per-POI overrides. Unset fields fall back to [`PoiConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoiOptions {
    pub peak_pixels: Option<f64>,
    pub delay_millis: Option<u64>,
    pub animation_millis: Option<u64>,
    pub css_class: Option<String>,
}

impl PoiOptions {
    #[must_use]
    pub const fn with_peak_pixels(mut self, px: f64) -> Self {
        self.peak_pixels = Some(px);
        self
    }

    #[must_use]
    pub const fn with_delay_millis(mut self, ms: u64) -> Self {
        self.delay_millis = Some(ms);
        self
    }

    #[must_use]
    pub const fn with_animation_millis(mut self, ms: u64) -> Self {
        self.animation_millis = Some(ms);
        self
    }

    #[must_use]
    pub fn with_css_class(mut self, class: impl Into<String>) -> Self {
        self.css_class = Some(class.into());
        self
    }

    pub(super) fn resolve(&self, config: &PoiConfig) -> ResolvedOptions {
        ResolvedOptions {
            peak_pixels: self.peak_pixels.unwrap_or(config.peak_pixels).max(0.0),
            delay: Duration::from_millis(self.delay_millis.unwrap_or(config.delay_millis)),
            animation: Duration::from_millis(
                self.animation_millis.unwrap_or(config.animation_millis),
            ),
            css_class: self
                .css_class
                .clone()
                .unwrap_or_else(|| config.css_class.clone()),
        }
    }
}

#[derive(Debug, Clone)]
pub(super) struct ResolvedOptions {
    pub peak_pixels: f64,
    pub delay: Duration,
    pub animation: Duration,
    pub css_class: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_win_over_config() {
        let config = PoiConfig::default();
        let resolved = PoiOptions::default()
            .with_peak_pixels(5.0)
            .with_delay_millis(10)
            .resolve(&config);
        assert!((resolved.peak_pixels - 5.0).abs() < f64::EPSILON);
        assert_eq!(resolved.delay, Duration::from_millis(10));
        assert_eq!(resolved.animation, Duration::from_millis(250));
        assert_eq!(resolved.css_class, "sidelegend");
    }

    #[test]
    fn test_animation_override() {
        let resolved = PoiOptions::default()
            .with_animation_millis(0)
            .with_css_class("toc")
            .resolve(&PoiConfig::default());
        assert_eq!(resolved.animation, Duration::ZERO);
        assert_eq!(resolved.css_class, "toc");
        assert_eq!(resolved.delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_negative_peak_is_clamped() {
        let resolved = PoiOptions::default()
            .with_peak_pixels(-4.0)
            .resolve(&PoiConfig::default());
        assert!(resolved.peak_pixels.abs() < f64::EPSILON);
    }
}
