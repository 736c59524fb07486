//! Overlay colors and stroke widths.

use image::Rgba;
use serde::{Deserialize, Serialize};

use crate::model::{Classification, Granularity};

/// How annotation regions are painted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderStyle {
    /// RGB for deleted content
    pub delete_color: [u8; 3],

    /// RGB for inserted content
    pub insert_color: [u8; 3],

    /// RGB for modified content
    pub modify_color: [u8; 3],

    /// Fill opacity of line regions (0-255)
    pub line_alpha: u8,

    /// Fill opacity of word regions (0-255)
    pub word_alpha: u8,

    /// Border width of line regions in pixels
    pub line_border: u32,

    /// Border width of word regions in pixels
    pub word_border: u32,
}

impl RenderStyle {
    /// Create a style with the default palette.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fill opacity of line regions.
    pub fn with_line_alpha(mut self, alpha: u8) -> Self {
        self.line_alpha = alpha;
        self
    }

    /// Set the fill opacity of word regions.
    pub fn with_word_alpha(mut self, alpha: u8) -> Self {
        self.word_alpha = alpha;
        self
    }

    /// Set border widths for line and word regions.
    pub fn with_borders(mut self, line: u32, word: u32) -> Self {
        self.line_border = line;
        self.word_border = word;
        self
    }

    /// Set the color of one classification.
    pub fn with_color(mut self, classification: Classification, rgb: [u8; 3]) -> Self {
        match classification {
            Classification::Delete => self.delete_color = rgb,
            Classification::Insert => self.insert_color = rgb,
            Classification::Modify => self.modify_color = rgb,
        }
        self
    }

    pub fn color(&self, classification: Classification) -> [u8; 3] {
        match classification {
            Classification::Delete => self.delete_color,
            Classification::Insert => self.insert_color,
            Classification::Modify => self.modify_color,
        }
    }

    /// Translucent fill for a region.
    pub fn fill(&self, classification: Classification, granularity: Granularity) -> Rgba<u8> {
        let [r, g, b] = self.color(classification);
        let alpha = match granularity {
            Granularity::Line => self.line_alpha,
            Granularity::Word => self.word_alpha,
        };
        Rgba([r, g, b, alpha])
    }

    /// Opaque border color for a region.
    pub fn stroke(&self, classification: Classification) -> Rgba<u8> {
        let [r, g, b] = self.color(classification);
        Rgba([r, g, b, 255])
    }

    pub fn border_width(&self, granularity: Granularity) -> u32 {
        match granularity {
            Granularity::Line => self.line_border,
            Granularity::Word => self.word_border,
        }
    }
}

impl Default for RenderStyle {
    fn default() -> Self {
        Self {
            delete_color: [255, 0, 0],
            insert_color: [0, 200, 0],
            modify_color: [255, 165, 0],
            line_alpha: 80,
            word_alpha: 120,
            line_border: 3,
            word_border: 2,
        }
    }
}
