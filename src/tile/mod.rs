//! # Tile compositor
//!
//! Renders blocks of text in a newspaper-style layout for console output.
//!
//! A [`Tile`] holds its own text lines, a [`Layout`], a [`Margin`], and an
//! ordered list of positioned child tiles. Children render horizontally as
//! a row, vertically as a column, or at explicit coordinates, according to
//! the layout. Tiles nest to any depth; [`Tile::render`] flattens the tree
//! into one multi-line string, compositing children in insertion order so
//! later children draw over earlier ones.
//!
//! Attaching a child *moves* it into its parent, so a tile can never end
//! up in two trees and the tree stays acyclic.

mod overlay;

pub use overlay::overlay;

use std::fmt;

use crate::ansi::visible_len;
use overlay::{overlay_rows, split_lines};

/// How a tile positions its children.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layout {
    /// Children pack left to right, each starting where the previous
    /// child's bounding box ends. Added with [`Tile::append`].
    Row,
    /// Children pack top to bottom. Added with [`Tile::append`].
    Column,
    /// Children are placed at explicit signed offsets with [`Tile::add`].
    Manual,
}

impl Layout {
    /// The offset the next appended child gets, or `None` when this layout
    /// does not support `append`.
    fn next_offset(self, parent: &Tile) -> Option<(i32, i32)> {
        match self {
            Layout::Row => Some((parent.child_width(), 0)),
            Layout::Column => Some((0, parent.child_height())),
            Layout::Manual => None,
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layout::Row => "Row",
            Layout::Column => "Column",
            Layout::Manual => "Manual",
        };
        write!(f, "{name}")
    }
}

/// Four-sided padding applied once around a tile's composited content.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Margin {
    pub top: usize,
    pub left: usize,
    pub bottom: usize,
    pub right: usize,
}

impl Margin {
    pub const EMPTY: Margin = Margin {
        top: 0,
        left: 0,
        bottom: 0,
        right: 0,
    };

    pub fn new(top: usize, left: usize, bottom: usize, right: usize) -> Margin {
        Margin {
            top,
            left,
            bottom,
            right,
        }
    }

    fn is_empty(&self) -> bool {
        *self == Margin::EMPTY
    }
}

/// A mutation was attempted that the tile's layout does not allow.
/// Always a caller error; never triggered by content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvalidLayoutOperation {
    /// `append` on a `Manual` tile.
    Append { layout: Layout },
    /// `add` with coordinates on a `Row`/`Column` tile.
    AddAt { layout: Layout },
}

impl fmt::Display for InvalidLayoutOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidLayoutOperation::Append { layout } => write!(
                f,
                "append not allowed in '{layout}' layout, \
                 use x,y coordinates with add(), or use a different layout"
            ),
            InvalidLayoutOperation::AddAt { layout } => write!(
                f,
                "x,y positioning not allowed in '{layout}' layout, \
                 use append() instead, or use a different layout"
            ),
        }
    }
}

impl std::error::Error for InvalidLayoutOperation {}

/// A child tile and its offset within the parent's canvas.
#[derive(Debug)]
struct Placed {
    x: i32,
    y: i32,
    tile: Tile,
}

/// A node in the compositing tree. See the module docs.
#[derive(Debug, Default)]
pub struct Tile {
    lines: Vec<String>,
    layout: Layout,
    margin: Margin,
    children: Vec<Placed>,
}

impl Default for Layout {
    fn default() -> Layout {
        Layout::Manual
    }
}

impl From<&str> for Tile {
    fn from(content: &str) -> Tile {
        Tile::text(content)
    }
}

impl From<String> for Tile {
    fn from(content: String) -> Tile {
        Tile::text(&content)
    }
}

impl Tile {
    /// Full constructor. Content is split on any newline convention;
    /// layout and margin are fixed for the tile's lifetime.
    pub fn new(content: &str, layout: Layout, margin: Margin) -> Tile {
        Tile {
            lines: split_lines(content),
            layout,
            margin,
            children: Vec::new(),
        }
    }

    /// A `Manual` leaf with the given content and no margin.
    pub fn text(content: &str) -> Tile {
        Tile::new(content, Layout::Manual, Margin::EMPTY)
    }

    /// An empty container with the given layout and margin.
    pub fn container(layout: Layout, margin: Margin) -> Tile {
        Tile::new("", layout, margin)
    }

    /// Appends a child to a `Row` or `Column` tile; the child's offset is
    /// computed from the children already present.
    ///
    /// Returns [`InvalidLayoutOperation`] on a `Manual` tile.
    pub fn append(&mut self, child: impl Into<Tile>) -> Result<(), InvalidLayoutOperation> {
        let Some((x, y)) = self.layout.next_offset(self) else {
            return Err(InvalidLayoutOperation::Append {
                layout: self.layout,
            });
        };
        self.attach(x, y, child.into());
        Ok(())
    }

    /// [`Tile::append`] for raw text, wrapped as a `Manual` leaf with the
    /// given margin.
    pub fn append_with_margin(
        &mut self,
        content: &str,
        margin: Margin,
    ) -> Result<(), InvalidLayoutOperation> {
        self.append(Tile::new(content, Layout::Manual, margin))
    }

    /// Places a child at a signed offset within a `Manual` tile. Negative
    /// offsets are allowed; off-canvas content is clipped at render time.
    ///
    /// Returns [`InvalidLayoutOperation`] on a `Row`/`Column` tile.
    pub fn add(
        &mut self,
        x: i32,
        y: i32,
        child: impl Into<Tile>,
    ) -> Result<(), InvalidLayoutOperation> {
        if self.layout != Layout::Manual {
            return Err(InvalidLayoutOperation::AddAt {
                layout: self.layout,
            });
        }
        self.attach(x, y, child.into());
        Ok(())
    }

    /// [`Tile::add`] for raw text, wrapped as a `Manual` leaf with the
    /// given margin.
    pub fn add_with_margin(
        &mut self,
        x: i32,
        y: i32,
        content: &str,
        margin: Margin,
    ) -> Result<(), InvalidLayoutOperation> {
        self.add(x, y, Tile::new(content, Layout::Manual, margin))
    }

    fn attach(&mut self, x: i32, y: i32, tile: Tile) {
        self.children.push(Placed { x, y, tile });
    }

    /// Flattens the tree into a single string: own content first, then each
    /// child composited over it in insertion order, then this tile's margin.
    /// Lines are joined by `\n` with no trailing newline.
    pub fn render(&self) -> String {
        let mut canvas = overlay_rows("", &self.lines, 0, 0);
        for child in &self.children {
            canvas = overlay(&canvas, &child.tile.render(), child.x, child.y);
        }
        self.include_margin(canvas)
    }

    /// Total visible width: margins plus the wider of own content and the
    /// children's horizontal extent.
    pub fn width(&self) -> usize {
        let content = self
            .lines
            .iter()
            .map(|l| visible_len(l))
            .max()
            .unwrap_or(0);
        let inner = self.child_width().max(content as i32).max(0) as usize;
        self.margin.left + inner + self.margin.right
    }

    /// Total height in rows: margins plus the taller of own content and
    /// the children's vertical extent.
    pub fn height(&self) -> usize {
        let content = self.lines.len();
        let inner = self.child_height().max(content as i32).max(0) as usize;
        self.margin.top + inner + self.margin.bottom
    }

    /// Horizontal extent of the children: max of `x + width` across them,
    /// 0 when there are none. A negative offset can shrink a child's
    /// contribution; only the max matters.
    fn child_width(&self) -> i32 {
        self.children
            .iter()
            .map(|c| c.x + c.tile.width() as i32)
            .max()
            .unwrap_or(0)
    }

    fn child_height(&self) -> i32 {
        self.children
            .iter()
            .map(|c| c.y + c.tile.height() as i32)
            .max()
            .unwrap_or(0)
    }

    /// Pads the composited canvas with this tile's margin: blank rows above
    /// and below, sized to the widest visible line plus the left/right
    /// margin. The left/right margin is reserved in that width only; it is
    /// not inserted into the content lines (pending a border feature).
    fn include_margin(&self, canvas: String) -> String {
        let mut lines = split_lines(&canvas);
        if lines.is_empty() || self.margin.is_empty() {
            return canvas;
        }
        let max_len = lines.iter().map(|l| visible_len(l)).max().unwrap_or(0)
            + self.margin.left
            + self.margin.right;
        let blank = " ".repeat(max_len);
        for _ in 0..self.margin.top {
            lines.insert(0, blank.clone());
        }
        for _ in 0..self.margin.bottom {
            lines.push(blank.clone());
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi::{RED, RESET};

    fn row_count(rendered: &str) -> usize {
        if rendered.is_empty() {
            0
        } else {
            rendered.split('\n').count()
        }
    }

    // -- manual layout -------------------------------------------------------

    #[test]
    fn manual_child_beside_content() {
        let mut p = Tile::text("a\nb\nc");
        p.add(3, 0, "1\n2\n3").unwrap();
        assert_eq!(p.render(), "a  1\nb  2\nc  3");
    }

    #[test]
    fn manual_child_shorter_than_content() {
        let mut p = Tile::text("a\nb\nc");
        p.add(3, 0, "1\n2").unwrap();
        assert_eq!(p.render(), "a  1\nb  2\nc");
    }

    #[test]
    fn manual_child_taller_than_content() {
        let mut p = Tile::text("a\nb");
        p.add(3, 0, "1\n2\n3").unwrap();
        assert_eq!(p.render(), "a  1\nb  2\n   3");
    }

    #[test]
    fn manual_child_offset_down_one_row() {
        let mut p = Tile::text("a\nb\nc\n");
        p.add(3, 1, "1\n2\n3").unwrap();
        assert_eq!(p.render(), "a\nb  1\nc  2\n   3");
    }

    #[test]
    fn manual_child_below_content_pads_blank_row() {
        let mut p = Tile::text("a\nb\nc");
        p.add(3, 4, "1\n2\n3").unwrap();
        assert_eq!(p.render(), "a\nb\nc\n\n   1\n   2\n   3");
    }

    #[test]
    fn manual_child_overwrites_middle_of_line() {
        let mut p = Tile::text("a\nboyhowdy\nc");
        p.add(3, 0, "1\n2\n3").unwrap();
        assert_eq!(p.render(), "a  1\nboy2owdy\nc  3");
    }

    #[test]
    fn manual_two_children_on_empty_tile() {
        let mut p = Tile::new("", Layout::Manual, Margin::EMPTY);
        p.add(2, 2, "a\nb\nc").unwrap();
        p.add(3, 4, "1\n2\n3").unwrap();
        assert_eq!(p.render(), "\n\n  a\n  b\n  c1\n   2\n   3");
    }

    #[test]
    fn manual_later_child_draws_over_earlier() {
        let mut p = Tile::new("", Layout::Manual, Margin::EMPTY);
        p.add(3, 2, "a\nb\nc").unwrap();
        p.add(3, 4, "1\n2\n3").unwrap();
        assert_eq!(p.render(), "\n\n   a\n   b\n   1\n   2\n   3");
    }

    #[test]
    fn manual_negative_x_child_clips_left() {
        let mut p = Tile::text("zzz");
        p.add(4, 3, "a\nb\nc").unwrap();
        p.add(3, 4, "1\n2\n3").unwrap();
        p.add(-2, 4, "qwerty").unwrap();
        assert_eq!(p.render(), "zzz\n\n\n    a\nertyb\n   2c\n   3");
    }

    #[test]
    fn manual_rejects_append() {
        let mut p = Tile::text("a");
        let err = p.append("b").unwrap_err();
        assert_eq!(
            err,
            InvalidLayoutOperation::Append {
                layout: Layout::Manual
            }
        );
    }

    // -- row / column layout ---------------------------------------------

    #[test]
    fn row_packs_children_left_to_right() {
        let mut p = Tile::container(Layout::Row, Margin::EMPTY);
        p.append("x").unwrap();
        p.append("yz").unwrap();
        assert_eq!(p.render(), "xyz");
    }

    #[test]
    fn row_second_child_starts_after_first_block() {
        let mut p = Tile::container(Layout::Row, Margin::EMPTY);
        p.append("aa\nbb").unwrap();
        p.append("1\n2\n3").unwrap();
        assert_eq!(p.render(), "aa1\nbb2\n  3");
    }

    #[test]
    fn column_packs_children_top_to_bottom() {
        let mut p = Tile::container(Layout::Column, Margin::EMPTY);
        p.append("aa").unwrap();
        p.append("b").unwrap();
        assert_eq!(p.render(), "aa\nb");
    }

    #[test]
    fn row_child_margin_separates_blocks() {
        let mut p = Tile::container(Layout::Row, Margin::EMPTY);
        p.append_with_margin("a", Margin::new(0, 0, 0, 2)).unwrap();
        p.append("b").unwrap();
        // First child is 3 wide (1 content + 2 right margin), so the
        // second starts at column 3.
        assert_eq!(p.render(), "a  b");
    }

    #[test]
    fn row_rejects_coordinate_add() {
        let mut p = Tile::container(Layout::Row, Margin::EMPTY);
        let err = p.add(1, 1, "x").unwrap_err();
        assert_eq!(
            err,
            InvalidLayoutOperation::AddAt {
                layout: Layout::Row
            }
        );
        assert!(err.to_string().contains("Row"));
    }

    #[test]
    fn column_rejects_coordinate_add() {
        let mut p = Tile::container(Layout::Column, Margin::EMPTY);
        assert!(p.add(0, 0, "x").is_err());
    }

    // -- size queries ------------------------------------------------------

    #[test]
    fn width_is_max_of_content_and_children() {
        let mut p = Tile::text("abc");
        p.add(2, 0, "xyz").unwrap();
        assert_eq!(p.width(), 5);
    }

    #[test]
    fn width_ignores_color_escapes() {
        let p = Tile::text(&format!("{RED}abc{RESET}"));
        assert_eq!(p.width(), 3);
    }

    #[test]
    fn width_includes_margins() {
        let p = Tile::new("ab", Layout::Manual, Margin::new(0, 1, 0, 2));
        assert_eq!(p.width(), 5);
    }

    #[test]
    fn height_counts_children_below_content() {
        let mut p = Tile::text("a\nb\nc");
        p.add(3, 4, "1\n2\n3").unwrap();
        assert_eq!(p.height(), 7);
    }

    #[test]
    fn negative_offset_child_does_not_widen_parent() {
        let mut p = Tile::text("abcdef");
        p.add(-2, 0, "xy").unwrap();
        // Child extent is -2 + 2 = 0; content wins.
        assert_eq!(p.width(), 6);
    }

    #[test]
    fn empty_tile_renders_empty_with_zero_size() {
        let p = Tile::default();
        assert_eq!(p.render(), "");
        assert_eq!(p.width(), 0);
        assert_eq!(p.height(), 0);
    }

    // -- render/size consistency -------------------------------------------

    #[test]
    fn render_has_height_rows_and_lines_fit_width() {
        let mut p = Tile::new("a\nboyhowdy", Layout::Manual, Margin::new(1, 0, 2, 0));
        p.add(3, 1, "1\n2\n3").unwrap();
        p.add(7, 0, "Q").unwrap();

        let rendered = p.render();
        assert_eq!(row_count(&rendered), p.height());
        for line in rendered.split('\n') {
            assert!(visible_len(line) <= p.width());
        }
    }

    #[test]
    fn nested_row_of_columns_renders_consistently() {
        let mut left = Tile::container(Layout::Column, Margin::EMPTY);
        left.append("one\ntwo").unwrap();
        left.append("three").unwrap();
        let mut right = Tile::container(Layout::Column, Margin::EMPTY);
        right.append("1").unwrap();

        let mut root = Tile::container(Layout::Row, Margin::EMPTY);
        root.append_with_margin("", Margin::EMPTY).unwrap();
        root.append(left).unwrap();
        root.append(right).unwrap();

        let rendered = root.render();
        assert_eq!(rendered, "one  1\ntwo\nthree");
        assert_eq!(row_count(&rendered), root.height());
    }

    // -- margins -----------------------------------------------------------

    #[test]
    fn margin_adds_blank_rows_above_and_below() {
        let p = Tile::new("ab", Layout::Manual, Margin::new(1, 0, 2, 0));
        assert_eq!(p.render(), "  \nab\n  \n  ");
    }

    #[test]
    fn margin_left_right_reserved_in_width_not_rendered() {
        // Left/right margin widens the blank rows but is not inserted as
        // spaces around content lines.
        let p = Tile::new("ab", Layout::Manual, Margin::new(1, 2, 0, 1));
        assert_eq!(p.render(), "     \nab");
        assert_eq!(p.width(), 5);
    }

    #[test]
    fn empty_margin_is_a_noop() {
        let p = Tile::new("ab", Layout::Manual, Margin::EMPTY);
        assert_eq!(p.render(), "ab");
    }

    #[test]
    fn margin_on_empty_content_is_a_noop() {
        let p = Tile::new("", Layout::Manual, Margin::new(2, 2, 2, 2));
        assert_eq!(p.render(), "");
    }
}
