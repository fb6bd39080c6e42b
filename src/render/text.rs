use crate::assets::fonts::{BOLD_THRESHOLD, FontFace, FontSet};
use crate::foundation::core::Rgba8;
use crate::foundation::error::{ThumbnailError, ThumbnailResult};

pub const ELLIPSIS: char = '…';

/// One laid-out line of text.
#[derive(Clone, Debug, PartialEq)]
pub struct ShapedLine {
    pub text: String,
    /// Baseline offset from the top of the text block.
    pub baseline: f32,
    pub width: f32,
}

/// Line-broken text block.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapedText {
    pub lines: Vec<ShapedLine>,
    pub width: f32,
    pub height: f32,
}

#[derive(Clone, Debug)]
struct RegisteredFace {
    family: String,
    weight: u16,
}

/// Stateful helper for breaking text into lines with the card's font set.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    regular: RegisteredFace,
    bold: RegisteredFace,
}

impl TextLayoutEngine {
    /// Construct an engine with both faces of `fonts` registered.
    pub fn new(fonts: &FontSet) -> ThumbnailResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let regular = register(&mut font_ctx, fonts.regular())?;
        let bold = register(&mut font_ctx, fonts.bold())?;
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            regular,
            bold,
        })
    }

    fn face(&self, weight: u16) -> &RegisteredFace {
        if weight >= BOLD_THRESHOLD {
            &self.bold
        } else {
            &self.regular
        }
    }

    fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        weight: u16,
        max_width_px: Option<f32>,
    ) -> ThumbnailResult<parley::Layout<Rgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(ThumbnailError::render("text size_px must be finite and > 0"));
        }
        let face = self.face(weight).clone();

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(face.family)),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(face.weight as f32),
        ));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(max_width_px);
        Ok(layout)
    }

    /// Width of `text` on a single unbroken line.
    pub fn measure_line(
        &mut self,
        text: &str,
        size_px: f32,
        weight: u16,
    ) -> ThumbnailResult<f32> {
        let layout = self.layout(text, size_px, weight, None)?;
        Ok(layout
            .lines()
            .map(|l| l.metrics().advance - l.metrics().trailing_whitespace)
            .fold(0.0, f32::max))
    }

    /// Break `text` into lines no wider than `max_width_px`, keeping at most `max_lines`.
    ///
    /// When lines are dropped the last kept line ends with [`ELLIPSIS`], shortened until it fits.
    pub fn shape(
        &mut self,
        text: &str,
        size_px: f32,
        weight: u16,
        max_width_px: Option<f32>,
        max_lines: Option<usize>,
    ) -> ThumbnailResult<ShapedText> {
        if text.trim().is_empty() {
            return Ok(ShapedText::default());
        }

        let layout = self.layout(text, size_px, weight, max_width_px)?;
        let mut lines = Vec::new();
        let mut heights = Vec::new();
        for line in layout.lines() {
            let m = line.metrics();
            let range = line.text_range();
            lines.push(ShapedLine {
                text: text.get(range).unwrap_or_default().trim_end().to_owned(),
                baseline: m.baseline,
                width: (m.advance - m.trailing_whitespace).max(0.0),
            });
            heights.push(m.line_height);
        }

        let limit = max_lines.unwrap_or(usize::MAX).max(1);
        if lines.len() > limit {
            lines.truncate(limit);
            heights.truncate(limit);
            if let Some(last) = lines.last_mut() {
                let (text, width) =
                    self.fit_with_ellipsis(&last.text, size_px, weight, max_width_px)?;
                last.text = text;
                last.width = width;
            }
        }

        Ok(ShapedText {
            width: lines.iter().map(|l| l.width).fold(0.0, f32::max),
            height: heights.iter().sum(),
            lines,
        })
    }

    fn fit_with_ellipsis(
        &mut self,
        line: &str,
        size_px: f32,
        weight: u16,
        max_width_px: Option<f32>,
    ) -> ThumbnailResult<(String, f32)> {
        let mut chars: Vec<char> = line.trim_end().chars().collect();
        loop {
            let mut candidate: String = chars.iter().collect::<String>().trim_end().to_owned();
            candidate.push(ELLIPSIS);
            let width = self.measure_line(&candidate, size_px, weight)?;
            let fits = max_width_px.is_none_or(|max| width <= max);
            if fits || chars.is_empty() {
                return Ok((candidate, width));
            }
            chars.pop();
        }
    }
}

fn register(font_ctx: &mut parley::FontContext, face: &FontFace) -> ThumbnailResult<RegisteredFace> {
    let families = font_ctx
        .collection
        .register_fonts(parley::fontique::Blob::from(face.bytes.to_vec()), None);
    let family_id = families
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| ThumbnailError::render("no font families registered from font bytes"))?;
    let family = font_ctx
        .collection
        .family_name(family_id)
        .ok_or_else(|| ThumbnailError::render("registered font family has no name"))?
        .to_string();
    Ok(RegisteredFace {
        family,
        weight: face.weight,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
