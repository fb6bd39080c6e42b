//! Card layout and SVG emission.
//!
//! Layout runs in two passes over a [`taffy`] tree: flexbox sizing, with text leaves measured by
//! [`TextLayoutEngine`], then a paint walk that turns absolute boxes into [`Paint`] primitives.
//! Text is emitted pre-broken, one `<text>` element per line, naming the exact family and weight
//! it was measured with so the rasterizer resolves the same face.

use taffy::prelude::{AvailableSpace, NodeId, Rect, Size};
use taffy::style::{
    AlignItems, Dimension, Display, FlexDirection, JustifyContent, LengthPercentage,
    LengthPercentageAuto,
};

use crate::assets::fonts::FontSet;
use crate::card::tree::{Align, CardTree, Direction, Justify, Length, Node, NodeKind, Style};
use crate::foundation::core::{Canvas, Rgba8};
use crate::foundation::error::{ThumbnailError, ThumbnailResult};
use crate::render::text::TextLayoutEngine;

/// Serialized vector document plus its intrinsic size.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SvgDocument {
    pub width: u32,
    pub height: u32,
    pub markup: String,
}

/// Positioned drawing primitive, in canvas pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    Rect {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        fill: Rgba8,
    },
    /// Image scaled to cover its box and clipped to the (rounded) box.
    Image {
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        radius: f32,
        href: String,
    },
    /// One line of text; `baseline` is the y coordinate of the alphabetic baseline.
    Text {
        x: f32,
        baseline: f32,
        family: String,
        weight: u16,
        size: f32,
        fill: Rgba8,
        text: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct TextStyle {
    color: Rgba8,
    size: f32,
    weight: u16,
}

impl TextStyle {
    const ROOT: TextStyle = TextStyle {
        color: Rgba8::BLACK,
        size: 16.0,
        weight: 500,
    };

    fn inherit(self, style: &Style) -> Self {
        Self {
            color: style.color.unwrap_or(self.color),
            size: style.font_size.unwrap_or(self.size),
            weight: style.font_weight.unwrap_or(self.weight),
        }
    }
}

struct FlatNode<'a> {
    node: &'a Node,
    text: TextStyle,
    taffy: NodeId,
    children: Vec<usize>,
}

#[derive(Clone, Copy, Debug)]
struct MeasureCtx {
    flat: usize,
}

/// Lay out `card` on `canvas` and serialize it.
#[tracing::instrument(level = "debug", skip_all, fields(width = canvas.width, height = canvas.height))]
pub fn compose_svg(
    card: &CardTree,
    canvas: Canvas,
    fonts: &FontSet,
) -> ThumbnailResult<SvgDocument> {
    let paints = layout_paints(card, canvas, fonts)?;
    tracing::debug!(paints = paints.len(), "card laid out");
    Ok(emit_svg(canvas, &paints))
}

/// Lay out `card` and return its paint list in painter's order.
pub fn layout_paints(
    card: &CardTree,
    canvas: Canvas,
    fonts: &FontSet,
) -> ThumbnailResult<Vec<Paint>> {
    let mut engine = TextLayoutEngine::new(fonts)?;
    let mut taffy = taffy::TaffyTree::<MeasureCtx>::new();
    let mut flat = Vec::new();
    let root = build(&mut taffy, &mut flat, &card.root, TextStyle::ROOT).map_err(taffy_err)?;

    // The root always covers the whole canvas, whatever its own size says.
    let root_id = flat[root].taffy;
    let mut root_style = taffy.style(root_id).map_err(taffy_err)?.clone();
    root_style.size = Size {
        width: Dimension::length(canvas.width as f32),
        height: Dimension::length(canvas.height as f32),
    };
    taffy.set_style(root_id, root_style).map_err(taffy_err)?;

    let available = Size {
        width: AvailableSpace::Definite(canvas.width as f32),
        height: AvailableSpace::Definite(canvas.height as f32),
    };
    let mut measure_err: Option<ThumbnailError> = None;
    taffy
        .compute_layout_with_measure(
            root_id,
            available,
            |known, available_space, _node_id, node_context, _style| {
                if let Size {
                    width: Some(width),
                    height: Some(height),
                } = known
                {
                    return Size { width, height };
                }
                let Some(ctx) = node_context else {
                    return known.unwrap_or(Size::ZERO);
                };
                let f = &flat[ctx.flat];
                let NodeKind::Text(text) = &f.node.kind else {
                    return known.unwrap_or(Size::ZERO);
                };
                let max_width = known.width.or(match available_space.width {
                    AvailableSpace::Definite(w) => Some(w),
                    AvailableSpace::MinContent => Some(0.0),
                    AvailableSpace::MaxContent => None,
                });
                match engine.shape(
                    text,
                    f.text.size,
                    f.text.weight,
                    max_width,
                    f.node.style.max_lines,
                ) {
                    Ok(shaped) => Size {
                        width: known.width.unwrap_or(shaped.width),
                        height: known.height.unwrap_or(shaped.height),
                    },
                    Err(e) => {
                        measure_err.get_or_insert(e);
                        Size::ZERO
                    }
                }
            },
        )
        .map_err(taffy_err)?;
    if let Some(e) = measure_err {
        return Err(e);
    }

    let mut out = Vec::new();
    let mut painter = Painter {
        taffy: &taffy,
        flat: &flat,
        engine: &mut engine,
        fonts,
        out: &mut out,
    };
    painter.paint(root, 0.0, 0.0)?;
    Ok(out)
}

fn build<'a>(
    taffy: &mut taffy::TaffyTree<MeasureCtx>,
    flat: &mut Vec<FlatNode<'a>>,
    node: &'a Node,
    inherited: TextStyle,
) -> Result<usize, taffy::TaffyError> {
    let text = inherited.inherit(&node.style);
    let idx = flat.len();
    let style = taffy_style(&node.style);

    let (id, children) = match &node.kind {
        NodeKind::Container(nodes) => {
            // Reserve the slot so parents precede children in `flat`.
            let placeholder = taffy.new_leaf(taffy::style::Style::default())?;
            flat.push(FlatNode {
                node,
                text,
                taffy: placeholder,
                children: Vec::new(),
            });
            let mut children = Vec::with_capacity(nodes.len());
            for child in nodes {
                children.push(build(taffy, flat, child, text)?);
            }
            let child_ids: Vec<NodeId> = children.iter().map(|&c| flat[c].taffy).collect();
            taffy.set_style(placeholder, style)?;
            taffy.set_children(placeholder, &child_ids)?;
            (placeholder, children)
        }
        NodeKind::Text(_) => {
            let id = taffy.new_leaf_with_context(style, MeasureCtx { flat: idx })?;
            flat.push(FlatNode {
                node,
                text,
                taffy: id,
                children: Vec::new(),
            });
            (id, Vec::new())
        }
        NodeKind::Image { .. } => {
            let id = taffy.new_leaf(style)?;
            flat.push(FlatNode {
                node,
                text,
                taffy: id,
                children: Vec::new(),
            });
            (id, Vec::new())
        }
    };

    flat[idx].taffy = id;
    flat[idx].children = children;
    Ok(idx)
}

fn taffy_style(style: &Style) -> taffy::style::Style {
    let flex_direction = match style.direction {
        Direction::Row => FlexDirection::Row,
        Direction::Column => FlexDirection::Column,
    };
    let justify_content = match style.justify {
        Justify::Start => JustifyContent::Start,
        Justify::Center => JustifyContent::Center,
        Justify::End => JustifyContent::End,
        Justify::SpaceBetween => JustifyContent::SpaceBetween,
    };
    let align_items = match style.align {
        Align::Start => AlignItems::Start,
        Align::Center => AlignItems::Center,
        Align::End => AlignItems::End,
        Align::Stretch => AlignItems::Stretch,
    };
    let gap = LengthPercentage::length(style.gap.max(0.0));

    taffy::style::Style {
        display: Display::Flex,
        flex_direction,
        justify_content: Some(justify_content),
        align_items: Some(align_items),
        gap: Size {
            width: gap,
            height: gap,
        },
        padding: Rect {
            left: LengthPercentage::length(style.padding.left.max(0.0)),
            right: LengthPercentage::length(style.padding.right.max(0.0)),
            top: LengthPercentage::length(style.padding.top.max(0.0)),
            bottom: LengthPercentage::length(style.padding.bottom.max(0.0)),
        },
        margin: Rect {
            left: LengthPercentageAuto::length(style.margin.left),
            right: LengthPercentageAuto::length(style.margin.right),
            top: LengthPercentageAuto::length(style.margin.top),
            bottom: LengthPercentageAuto::length(style.margin.bottom),
        },
        size: Size {
            width: dimension(style.width),
            height: dimension(style.height),
        },
        max_size: Size {
            width: dimension(style.max_width),
            height: Dimension::auto(),
        },
        flex_grow: style.flex_grow.max(0.0),
        flex_shrink: style.flex_shrink.max(0.0),
        ..taffy::style::Style::default()
    }
}

fn dimension(len: Length) -> Dimension {
    match len {
        Length::Auto => Dimension::auto(),
        Length::Px(v) => Dimension::length(v.max(0.0)),
        Length::Percent(p) => Dimension::percent(p.max(0.0)),
    }
}

fn taffy_err(e: taffy::TaffyError) -> ThumbnailError {
    ThumbnailError::render(format!("layout failed: {e}"))
}

struct Painter<'a, 'n> {
    taffy: &'a taffy::TaffyTree<MeasureCtx>,
    flat: &'a [FlatNode<'n>],
    engine: &'a mut TextLayoutEngine,
    fonts: &'a FontSet,
    out: &'a mut Vec<Paint>,
}

impl Painter<'_, '_> {
    fn paint(&mut self, idx: usize, origin_x: f32, origin_y: f32) -> ThumbnailResult<()> {
        let flat = self.flat;
        let f = &flat[idx];
        let layout = self.taffy.layout(f.taffy).map_err(taffy_err)?;
        let x = origin_x + layout.location.x;
        let y = origin_y + layout.location.y;
        let (w, h) = (layout.size.width, layout.size.height);
        let style = &f.node.style;

        if let Some(fill) = style.background {
            self.out.push(Paint::Rect {
                x,
                y,
                w,
                h,
                radius: style.corner_radius,
                fill,
            });
        }

        match &f.node.kind {
            NodeKind::Container(_) => {
                for &child in &f.children {
                    self.paint(child, x, y)?;
                }
            }
            NodeKind::Image { href } => self.out.push(Paint::Image {
                x,
                y,
                w,
                h,
                radius: style.corner_radius,
                href: href.clone(),
            }),
            NodeKind::Text(text) => {
                let pad = &style.padding;
                let content_w = (w - pad.left - pad.right).max(0.0);
                // Slack keeps float rounding from re-wrapping a line that measured exactly.
                let shaped = self.engine.shape(
                    text,
                    f.text.size,
                    f.text.weight,
                    Some(content_w + 0.5),
                    style.max_lines,
                )?;
                let face = self.fonts.face_for_weight(f.text.weight);
                for line in shaped.lines {
                    self.out.push(Paint::Text {
                        x: x + pad.left,
                        baseline: y + pad.top + line.baseline,
                        family: face.family.clone(),
                        weight: face.weight,
                        size: f.text.size,
                        fill: f.text.color,
                        text: line.text,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Serialize paints into a standalone SVG document sized to `canvas`.
pub fn emit_svg(canvas: Canvas, paints: &[Paint]) -> SvgDocument {
    let (width, height) = (canvas.width, canvas.height);
    let mut out = String::with_capacity(4096);
    out.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{width}" height="{height}" viewBox="0 0 {width} {height}">"#
    ));

    let mut clips = 0usize;
    for paint in paints {
        match paint {
            Paint::Rect {
                x,
                y,
                w,
                h,
                radius,
                fill,
            } => {
                out.push_str(&rect_tag(*x, *y, *w, *h, *radius));
                out.push_str(&fill_attrs(*fill));
                out.push_str("/>");
            }
            Paint::Image {
                x,
                y,
                w,
                h,
                radius,
                href,
            } => {
                let clip = format!("clip{clips}");
                clips += 1;
                out.push_str(&format!(r#"<clipPath id="{clip}">"#));
                out.push_str(&rect_tag(*x, *y, *w, *h, *radius));
                out.push_str("/></clipPath>");
                out.push_str(&format!(
                    r#"<image x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid slice" clip-path="url(#{clip})" xlink:href="{}"/>"#,
                    num(*x),
                    num(*y),
                    num(*w),
                    num(*h),
                    escape_xml(href)
                ));
            }
            Paint::Text {
                x,
                baseline,
                family,
                weight,
                size,
                fill,
                text,
            } => {
                let family: String = family.chars().filter(|c| !matches!(c, '\'' | '"')).collect();
                out.push_str(&format!(
                    r#"<text x="{}" y="{}" font-family="'{}'" font-size="{}" font-weight="{weight}" xml:space="preserve""#,
                    num(*x),
                    num(*baseline),
                    escape_xml(&family),
                    num(*size)
                ));
                out.push_str(&fill_attrs(*fill));
                out.push('>');
                out.push_str(&escape_xml(text));
                out.push_str("</text>");
            }
        }
    }

    out.push_str("</svg>");
    SvgDocument {
        width,
        height,
        markup: out,
    }
}

fn rect_tag(x: f32, y: f32, w: f32, h: f32, radius: f32) -> String {
    let w = w.max(0.0);
    let h = h.max(0.0);
    let mut tag = format!(
        r#"<rect x="{}" y="{}" width="{}" height="{}""#,
        num(x),
        num(y),
        num(w),
        num(h)
    );
    let r = radius.min(w / 2.0).min(h / 2.0);
    if r > 0.0 {
        tag.push_str(&format!(r#" rx="{0}" ry="{0}""#, num(r)));
    }
    tag
}

fn fill_attrs(fill: Rgba8) -> String {
    if fill.a == 255 {
        format!(r#" fill="{}""#, fill.to_hex_rgb())
    } else {
        format!(
            r#" fill="{}" fill-opacity="{}""#,
            fill.to_hex_rgb(),
            num(fill.opacity())
        )
    }
}

/// Fixed two-decimal formatting with trailing zeros trimmed.
fn num(v: f32) -> String {
    let s = format!("{:.2}", v);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_owned() } else { s.to_owned() }
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c if is_xml_char(c) => out.push(c),
            _ => {}
        }
    }
    out
}

/// The XML 1.0 `Char` production; `char` already excludes surrogates.
fn is_xml_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\r') || (c >= '\u{20}' && !matches!(c, '\u{FFFE}' | '\u{FFFF}'))
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
