//! Assistant card template: a pure mapping from assistant data to a styled node tree.

pub mod theme;
pub mod tree;

pub use theme::{TextSize, Theme};
pub use tree::{Align, CardTree, Direction, Edges, Justify, Length, Node, NodeKind, Style};

/// Names shorter than this (in characters) use the large title size.
pub const NAME_SHORT_LIMIT: usize = 38;
/// Descriptions are cut to this many characters before layout.
pub const DESCRIPTION_LIMIT: usize = 160;

pub const AVATAR_PX: f32 = 256.0;
pub const KICKER: &str = "AI assistant";

const CONTENT_MAX_WIDTH: f32 = 1040.0;

/// Everything a card shows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CardProps<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub created_by_name: &'a str,
    /// Inline image URL for the avatar; empty or `None` means no avatar.
    pub avatar: Option<&'a str>,
}

/// Build the card tree. Deterministic: equal inputs give equal trees.
pub fn render_card(props: &CardProps<'_>, theme: &Theme) -> CardTree {
    let name = props.name.trim();
    let created_by = props.created_by_name.trim();
    let avatar = props.avatar.filter(|a| !a.is_empty());

    let title_size = if name.chars().count() < NAME_SHORT_LIMIT {
        TextSize::X5l
    } else {
        TextSize::X4l
    };

    let mut text_column = vec![
        Node::text(
            Style {
                font_size: Some(TextSize::X3l.px()),
                color: Some(theme.muted),
                margin: Edges {
                    bottom: 8.0,
                    ..Edges::ZERO
                },
                ..Style::default()
            },
            KICKER,
        ),
        Node::text(
            Style {
                font_size: Some(title_size.px()),
                font_weight: Some(800),
                max_lines: Some(2),
                ..Style::default()
            },
            name,
        ),
        Node::text(
            Style {
                font_size: Some(TextSize::X2l.px()),
                margin: Edges {
                    top: 8.0,
                    bottom: 32.0,
                    ..Edges::ZERO
                },
                max_lines: Some(4),
                ..Style::default()
            },
            truncate_description(props.description),
        ),
    ];
    if !created_by.is_empty() {
        text_column.push(Node::container(
            Style {
                direction: Direction::Row,
                background: Some(theme.primary),
                corner_radius: 9999.0,
                padding: Edges::xy(16.0, 8.0),
                font_weight: Some(600),
                ..Style::default()
            },
            vec![Node::text(
                Style {
                    font_size: Some(TextSize::X2l.px()),
                    ..Style::default()
                },
                format!("Created by {created_by}"),
            )],
        ));
    }

    let mut content = Vec::new();
    if let Some(href) = avatar {
        content.push(Node::image(
            Style {
                width: Length::Px(AVATAR_PX),
                height: Length::Px(AVATAR_PX),
                corner_radius: AVATAR_PX / 2.0,
                flex_shrink: 0.0,
                ..Style::default()
            },
            href,
        ));
    }
    content.push(Node::container(
        Style {
            direction: Direction::Column,
            align: Align::Start,
            flex_grow: 1.0,
            margin: Edges {
                left: if avatar.is_some() { 40.0 } else { 0.0 },
                ..Edges::ZERO
            },
            ..Style::default()
        },
        text_column,
    ));

    let mut root_children = vec![Node::container(
        Style {
            direction: Direction::Row,
            justify: Justify::Center,
            align: Align::Center,
            width: Length::Percent(1.0),
            max_width: Length::Px(CONTENT_MAX_WIDTH),
            ..Style::default()
        },
        content,
    )];
    if let Some(brand) = theme.brand.as_deref().filter(|b| !b.trim().is_empty()) {
        root_children.push(Node::text(
            Style {
                font_size: Some(TextSize::X2l.px()),
                color: Some(theme.muted),
                margin: Edges {
                    top: 48.0,
                    ..Edges::ZERO
                },
                ..Style::default()
            },
            format!("Powered by {}", brand.trim()),
        ));
    }

    CardTree {
        root: Node::container(
            Style {
                direction: Direction::Column,
                justify: Justify::Center,
                align: Align::Center,
                width: Length::Percent(1.0),
                height: Length::Percent(1.0),
                padding: Edges::all(32.0),
                background: Some(theme.background),
                color: Some(theme.foreground),
                font_size: Some(TextSize::Base.px()),
                font_weight: Some(500),
                ..Style::default()
            },
            root_children,
        ),
    }
}

/// Cut to [`DESCRIPTION_LIMIT`] characters, marking the cut with `...`.
pub fn truncate_description(description: &str) -> String {
    let description = description.trim();
    if description.chars().count() <= DESCRIPTION_LIMIT {
        return description.to_owned();
    }
    let mut out: String = description.chars().take(DESCRIPTION_LIMIT).collect();
    out.push_str("...");
    out
}

#[cfg(test)]
#[path = "../tests/unit/card/template.rs"]
mod tests;
