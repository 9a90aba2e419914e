use unicode_width::UnicodeWidthStr;

use super::shape::{ContentShape, Shape};

/// Chrome (padding, title) assumed around every card in the gallery layout.
pub const DEFAULT_BASE_OFFSET: f64 = 180.0;
/// Base offset used by the compact list variant.
pub const COMPACT_BASE_OFFSET: f64 = 40.0;
/// Height units contributed by one unit of text.
pub const DEFAULT_TEXT_FACTOR: f64 = 0.35;

/// How the length of a text fragment is counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextMetric {
    /// Unicode scalar values.
    #[default]
    Chars,
    /// UTF-16 code units, as browser string lengths count them. Characters
    /// outside the basic plane count twice.
    Utf16,
    /// Terminal display columns (wide glyphs count twice).
    DisplayWidth,
}

impl TextMetric {
    pub fn measure(self, text: &str) -> usize {
        match self {
            TextMetric::Chars => text.chars().count(),
            TextMetric::Utf16 => text.encode_utf16().count(),
            TextMetric::DisplayWidth => UnicodeWidthStr::width(text),
        }
    }
}

/// Recursive content size of an item.
///
/// Text contributes its length, sequences and keyed records the sum of their
/// children, anything else zero.
pub fn content_size<I>(item: &I, metric: TextMetric) -> usize
where
    I: ContentShape + ?Sized,
{
    shape_size(item.shape(), metric)
}

fn shape_size(shape: Shape<'_>, metric: TextMetric) -> usize {
    match shape {
        Shape::Text(text) => metric.measure(text),
        Shape::Sequence(children) | Shape::Keyed(children) => children
            .map(|child| shape_size(child.shape(), metric))
            .fold(0usize, usize::saturating_add),
        Shape::Other => 0,
    }
}

/// Clamp caller supplied numbers into a usable height.
pub(crate) fn sanitize_height(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

/// Content-based height heuristic used when no better height is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightEstimator {
    base_offset: f64,
    text_factor: f64,
    media_height: f64,
    metric: TextMetric,
}

impl Default for HeightEstimator {
    fn default() -> Self {
        Self {
            base_offset: DEFAULT_BASE_OFFSET,
            text_factor: DEFAULT_TEXT_FACTOR,
            media_height: 0.0,
            metric: TextMetric::Chars,
        }
    }
}

impl HeightEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn compact() -> Self {
        Self::default().with_base_offset(COMPACT_BASE_OFFSET)
    }

    pub fn with_base_offset(mut self, base_offset: f64) -> Self {
        self.base_offset = sanitize_height(base_offset);
        self
    }

    pub fn with_text_factor(mut self, text_factor: f64) -> Self {
        self.text_factor = sanitize_height(text_factor);
        self
    }

    /// Fixed media block (image, embed) added to every estimate.
    pub fn with_media_height(mut self, media_height: f64) -> Self {
        self.media_height = sanitize_height(media_height);
        self
    }

    pub fn with_metric(mut self, metric: TextMetric) -> Self {
        self.metric = metric;
        self
    }

    pub fn base_offset(&self) -> f64 {
        self.base_offset
    }

    pub fn text_factor(&self) -> f64 {
        self.text_factor
    }

    pub fn media_height(&self) -> f64 {
        self.media_height
    }

    pub fn metric(&self) -> TextMetric {
        self.metric
    }

    /// Estimate using the configured media height.
    pub fn estimate<I>(&self, item: &I) -> f64
    where
        I: ContentShape + ?Sized,
    {
        self.estimate_with_media(item, Some(self.media_height))
    }

    /// Estimate with an explicit media addend. Never fails: the result is
    /// always finite and non-negative.
    pub fn estimate_with_media<I>(&self, item: &I, media_height: Option<f64>) -> f64
    where
        I: ContentShape + ?Sized,
    {
        let size = content_size(item, self.metric) as f64;
        let base = self.base_offset + size * self.text_factor;
        let media = media_height.map(sanitize_height).unwrap_or(0.0);
        sanitize_height(base + media)
    }
}

/// A fragment of a hand-assembled height: text measured by length, or a fixed
/// number of height units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeightPart<'a> {
    Text(&'a str),
    Fixed(f64),
}

impl<'a> From<&'a str> for HeightPart<'a> {
    fn from(text: &'a str) -> Self {
        HeightPart::Text(text)
    }
}

impl From<f64> for HeightPart<'_> {
    fn from(value: f64) -> Self {
        HeightPart::Fixed(value)
    }
}

/// Sum a flat list of parts, for use inside estimation callbacks.
///
/// Text adds `len × 0.35`; fixed parts add themselves. No base offset is
/// applied.
pub fn sum_parts<'a, I>(parts: I) -> f64
where
    I: IntoIterator<Item = HeightPart<'a>>,
{
    parts
        .into_iter()
        .map(|part| match part {
            HeightPart::Text(text) => TextMetric::Chars.measure(text) as f64 * DEFAULT_TEXT_FACTOR,
            HeightPart::Fixed(value) => {
                if value.is_finite() {
                    value
                } else {
                    0.0
                }
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn content_size_sums_nested_values_but_not_keys() {
        let item = json!({
            "title": "hello",
            "tags": ["ab", "cde"],
            "meta": {"author": "zed", "likes": 12, "draft": false},
            "cover": null
        });
        assert_eq!(content_size(&item, TextMetric::Chars), 5 + 2 + 3 + 3);
    }

    #[test]
    fn unsupported_values_contribute_zero() {
        assert_eq!(content_size(&json!(3.5), TextMetric::Chars), 0);
        assert_eq!(content_size(&true, TextMetric::Chars), 0);
        assert_eq!(content_size(&None::<String>, TextMetric::Chars), 0);
    }

    #[test]
    fn typed_collections_match_json() {
        let mut map = BTreeMap::new();
        map.insert("k", vec!["abc".to_string(), "de".to_string()]);
        assert_eq!(content_size(&map, TextMetric::Chars), 5);
        assert_eq!(content_size("héllo", TextMetric::Chars), 5);
    }

    #[test]
    fn display_width_counts_wide_glyphs() {
        assert_eq!(content_size("日本", TextMetric::Chars), 2);
        assert_eq!(content_size("日本", TextMetric::DisplayWidth), 4);
    }

    #[test]
    fn astral_characters_differ_between_chars_and_utf16() {
        let item = json!({"body": "ok 🎉"});
        assert_eq!(content_size(&item, TextMetric::Chars), 4);
        assert_eq!(content_size(&item, TextMetric::Utf16), 5);
        assert_eq!(content_size("日本", TextMetric::Utf16), 2);

        let chars = HeightEstimator::new().estimate(&item);
        let utf16 = HeightEstimator::new()
            .with_metric(TextMetric::Utf16)
            .estimate(&item);
        assert!(close(utf16 - chars, DEFAULT_TEXT_FACTOR));
    }

    #[test]
    fn estimate_applies_offset_factor_and_media() {
        let item = json!({"body": "x".repeat(100)});
        let estimator = HeightEstimator::new();
        assert!(close(estimator.estimate(&item), 180.0 + 35.0));

        let compact = HeightEstimator::compact().with_media_height(60.0);
        assert!(close(compact.estimate(&item), 40.0 + 35.0 + 60.0));
        assert!(close(compact.estimate_with_media(&item, None), 75.0));
    }

    #[test]
    fn estimate_is_finite_and_non_negative_for_bad_parameters() {
        let estimator = HeightEstimator::new()
            .with_base_offset(f64::NAN)
            .with_media_height(-20.0);
        let height = estimator.estimate_with_media(&json!("abc"), Some(f64::INFINITY));
        assert!(height.is_finite());
        assert!(close(height, 3.0 * 0.35));
        assert_eq!(estimator.estimate(&json!(null)), 0.0);
    }

    #[test]
    fn estimate_is_pure() {
        let item = json!(["one", {"two": "three"}]);
        let estimator = HeightEstimator::compact();
        assert_eq!(estimator.estimate(&item), estimator.estimate(&item));
    }

    #[test]
    fn sum_parts_adds_text_and_numbers() {
        let total = sum_parts([
            HeightPart::from("abcdefghij"),
            HeightPart::from(12.0),
            HeightPart::Fixed(f64::NAN),
        ]);
        assert!(close(total, 3.5 + 12.0));
        assert_eq!(sum_parts(Vec::new()), 0.0);
    }
}
