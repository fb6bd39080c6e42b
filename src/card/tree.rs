//! Styled node tree produced by the card template and consumed by the compositor.
//!
//! The style model is a small flexbox subset. Text properties (`color`, `font_size`,
//! `font_weight`) are optional and inherit from the nearest ancestor that sets them.

use crate::foundation::core::Rgba8;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    Row,
    #[default]
    Column,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Align {
    Start,
    Center,
    End,
    #[default]
    Stretch,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Length {
    #[default]
    Auto,
    Px(f32),
    /// Fraction of the parent's size; `1.0` is 100%.
    Percent(f32),
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Edges {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Edges {
    pub const ZERO: Edges = Edges::all(0.0);

    pub const fn all(v: f32) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub const fn xy(x: f32, y: f32) -> Self {
        Self {
            top: y,
            right: x,
            bottom: y,
            left: x,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Style {
    pub direction: Direction,
    pub justify: Justify,
    pub align: Align,
    pub gap: f32,
    pub padding: Edges,
    pub margin: Edges,
    pub width: Length,
    pub height: Length,
    pub max_width: Length,
    pub flex_grow: f32,
    pub flex_shrink: f32,
    pub background: Option<Rgba8>,
    /// Corner radius in pixels; values at or above half the box size give a circle.
    pub corner_radius: f32,
    pub color: Option<Rgba8>,
    pub font_size: Option<f32>,
    pub font_weight: Option<u16>,
    /// Line clamp for text nodes.
    pub max_lines: Option<usize>,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            justify: Justify::default(),
            align: Align::default(),
            gap: 0.0,
            padding: Edges::ZERO,
            margin: Edges::ZERO,
            width: Length::Auto,
            height: Length::Auto,
            max_width: Length::Auto,
            flex_grow: 0.0,
            flex_shrink: 1.0,
            background: None,
            corner_radius: 0.0,
            color: None,
            font_size: None,
            font_weight: None,
            max_lines: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Container(Vec<Node>),
    Text(String),
    /// `href` is any URL the rasterizer can resolve; cards only use `data:` URLs.
    Image { href: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    pub style: Style,
    pub kind: NodeKind,
}

impl Node {
    pub fn container(style: Style, children: Vec<Node>) -> Self {
        Self {
            style,
            kind: NodeKind::Container(children),
        }
    }

    pub fn text(style: Style, text: impl Into<String>) -> Self {
        Self {
            style,
            kind: NodeKind::Text(text.into()),
        }
    }

    pub fn image(style: Style, href: impl Into<String>) -> Self {
        Self {
            style,
            kind: NodeKind::Image { href: href.into() },
        }
    }

    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Container(c) => c,
            NodeKind::Text(_) | NodeKind::Image { .. } => &[],
        }
    }

    /// All text content in document order.
    pub fn texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        match &self.kind {
            NodeKind::Text(t) => out.push(t),
            NodeKind::Image { .. } => {}
            NodeKind::Container(children) => {
                for c in children {
                    c.collect_texts(out);
                }
            }
        }
    }

    pub fn image_count(&self) -> usize {
        match &self.kind {
            NodeKind::Image { .. } => 1,
            NodeKind::Text(_) => 0,
            NodeKind::Container(children) => children.iter().map(Node::image_count).sum(),
        }
    }
}

/// A complete card. The root fills the canvas it is composed against.
#[derive(Clone, Debug, PartialEq)]
pub struct CardTree {
    pub root: Node,
}
