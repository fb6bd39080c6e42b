use std::fmt;
use std::str::FromStr;

use crate::foundation::error::{ThumbnailError, ThumbnailResult};

/// Output canvas size in device-independent pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Open Graph card size used for assistant thumbnails.
    pub const THUMBNAIL: Canvas = Canvas {
        width: 1200,
        height: 648,
    };
}

impl Default for Canvas {
    fn default() -> Self {
        Self::THUMBNAIL
    }
}

/// Assistant identity in the document store's native key format: a 12-byte object id.
///
/// Accepts 24 hexadecimal characters (any case). Displays as lowercase hex, which is also the
/// filename key of the assistant's avatar blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AssistantId([u8; 12]);

impl AssistantId {
    /// Wrap raw object-id bytes.
    pub fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    /// Raw object-id bytes.
    pub fn bytes(&self) -> [u8; 12] {
        self.0
    }

    /// Parse a 24-character hex id. Anything else is [`ThumbnailError::NotFound`], since no
    /// record can exist under it.
    pub fn parse(s: &str) -> ThumbnailResult<Self> {
        if s.len() != 24 {
            return Err(ThumbnailError::not_found(format!(
                "assistant id must be 24 hex characters, got {} characters",
                s.len()
            )));
        }
        let mut out = [0u8; 12];
        hex::decode_to_slice(s, &mut out)
            .map_err(|e| ThumbnailError::not_found(format!("assistant id \"{s}\": {e}")))?;
        Ok(Self(out))
    }
}

impl FromStr for AssistantId {
    type Err = ThumbnailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for AssistantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}

/// Straight (non-premultiplied) RGBA8 color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const BLACK: Rgba8 = Rgba8::rgb(0, 0, 0);
    pub const WHITE: Rgba8 = Rgba8::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (leading `#` optional, case-insensitive).
    pub fn parse_hex(s: &str) -> ThumbnailResult<Self> {
        let s = s.trim();
        let s = s.strip_prefix('#').unwrap_or(s);

        fn hex_byte(pair: &str) -> ThumbnailResult<u8> {
            u8::from_str_radix(pair, 16)
                .map_err(|_| ThumbnailError::config(format!("invalid hex byte \"{pair}\"")))
        }

        if !s.is_ascii() {
            return Err(ThumbnailError::config("hex color must be ASCII"));
        }
        match s.len() {
            6 => Ok(Self::rgb(
                hex_byte(&s[0..2])?,
                hex_byte(&s[2..4])?,
                hex_byte(&s[4..6])?,
            )),
            8 => Ok(Self {
                r: hex_byte(&s[0..2])?,
                g: hex_byte(&s[2..4])?,
                b: hex_byte(&s[4..6])?,
                a: hex_byte(&s[6..8])?,
            }),
            _ => Err(ThumbnailError::config(
                "hex color must be #RRGGBB or #RRGGBBAA (case-insensitive)",
            )),
        }
    }

    /// `#rrggbb`, ignoring alpha. Pair with [`Rgba8::opacity`] in SVG attributes.
    pub fn to_hex_rgb(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn opacity(self) -> f32 {
        self.a as f32 / 255.0
    }
}

impl serde::Serialize for Rgba8 {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.a == 255 {
            serializer.serialize_str(&self.to_hex_rgb())
        } else {
            serializer.serialize_str(&format!("{}{:02x}", self.to_hex_rgb(), self.a))
        }
    }
}

impl<'de> serde::Deserialize<'de> for Rgba8 {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
