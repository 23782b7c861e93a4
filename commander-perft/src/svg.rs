//! SVG board diagrams.

use commander_core::terrain::{is_bridge_square, is_land_passable, is_navy_passable};
use commander_core::{Board, Color, Piece, Square};
use commander_core::square::{FILES, RANKS};

// ============================================================================
// Layout and palette
// ============================================================================

const CELL_SIZE: f32 = 48.0;
const BOARD_PADDING: f32 = 28.0;
const PIECE_RADIUS: f32 = 18.0;
const CARRIED_RADIUS: f32 = 8.0;

const BG_COLOR: &str = "#1a1a1a";
const WATER: &str = "#2f5d8a";
const COAST: &str = "#4f7f78";
const LAND: &str = "#6b8f4e";
const BRIDGE: &str = "#8a6d3b";
const GRID: &str = "rgba(0,0,0,0.35)";
const LABEL: &str = "#cccccc";
const RED_FILL: &str = "#c0392b";
const BLUE_FILL: &str = "#2980b9";
const HEROIC_STROKE: &str = "#f1c40f";
const HIGHLIGHT: &str = "#f39c12";

#[derive(Clone, Debug)]
pub struct RenderOptions {
    pub scale: f32,
    pub highlight: Vec<Square>,
    pub coordinates: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            highlight: Vec::new(),
            coordinates: true,
        }
    }
}

/// Fill for a square by terrain.
pub fn terrain_fill(sq: Square) -> &'static str {
    match (is_navy_passable(sq), is_land_passable(sq)) {
        _ if is_bridge_square(sq) => BRIDGE,
        (true, true) => COAST,
        (true, false) => WATER,
        _ => LAND,
    }
}

fn color_fill(color: Color) -> &'static str {
    match color {
        Color::Red => RED_FILL,
        Color::Blue => BLUE_FILL,
    }
}

fn piece_svg(piece: &Piece, cx: f32, cy: f32) -> String {
    let mut out = String::new();
    let stroke = if piece.heroic { HEROIC_STROKE } else { "rgba(0,0,0,0.4)" };
    out.push_str(&format!(
        r#"  <circle cx="{cx}" cy="{cy}" r="{PIECE_RADIUS}" fill="{}" stroke="{stroke}" stroke-width="2"/>"#,
        color_fill(piece.color)
    ));
    out.push('\n');
    out.push_str(&format!(
        r#"  <text x="{cx}" y="{}" font-family="sans-serif" font-size="16" font-weight="bold" fill="white" text-anchor="middle">{}</text>"#,
        cy + 6.0,
        piece.role.letter().to_ascii_uppercase()
    ));
    out.push('\n');

    // Carried units sit as small badges along the bottom edge.
    for (i, unit) in piece.carrying.iter().enumerate() {
        let bx = cx - PIECE_RADIUS + CARRIED_RADIUS + i as f32 * (2.0 * CARRIED_RADIUS + 4.0);
        let by = cy + PIECE_RADIUS - 2.0;
        let stroke = if unit.heroic { HEROIC_STROKE } else { "white" };
        out.push_str(&format!(
            r#"  <circle cx="{bx}" cy="{by}" r="{CARRIED_RADIUS}" fill="{}" stroke="{stroke}" stroke-width="1"/>"#,
            color_fill(unit.color)
        ));
        out.push('\n');
        out.push_str(&format!(
            r#"  <text x="{bx}" y="{}" font-family="sans-serif" font-size="10" fill="white" text-anchor="middle">{}</text>"#,
            by + 3.5,
            unit.role.letter().to_ascii_uppercase()
        ));
        out.push('\n');
    }
    out
}

/// Render `board` as a standalone SVG document.
pub fn render_svg(board: &Board, opts: &RenderOptions) -> String {
    let width = FILES as f32 * CELL_SIZE + 2.0 * BOARD_PADDING;
    let height = RANKS as f32 * CELL_SIZE + 2.0 * BOARD_PADDING;

    let mut svg = String::new();
    svg.push_str(&format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}" viewBox="0 0 {width} {height}">"#,
        width * opts.scale,
        height * opts.scale
    ));
    svg.push('\n');
    svg.push_str(&format!(
        r#"  <rect width="{width}" height="{height}" fill="{BG_COLOR}"/>"#
    ));
    svg.push('\n');

    for sq in Square::all() {
        let x = BOARD_PADDING + sq.file() as f32 * CELL_SIZE;
        let y = BOARD_PADDING + sq.rank() as f32 * CELL_SIZE;
        let (stroke, stroke_width) = if opts.highlight.contains(&sq) {
            (HIGHLIGHT, 3.0)
        } else {
            (GRID, 1.0)
        };
        svg.push_str(&format!(
            r#"  <rect x="{x}" y="{y}" width="{CELL_SIZE}" height="{CELL_SIZE}" fill="{}" stroke="{stroke}" stroke-width="{stroke_width}"/>"#,
            terrain_fill(sq)
        ));
        svg.push('\n');
    }

    if opts.coordinates {
        for file in 0..FILES {
            let x = BOARD_PADDING + (file as f32 + 0.5) * CELL_SIZE;
            svg.push_str(&format!(
                r#"  <text x="{x}" y="{}" font-family="sans-serif" font-size="12" fill="{LABEL}" text-anchor="middle">{}</text>"#,
                height - BOARD_PADDING / 2.0 + 4.0,
                (b'a' + file) as char
            ));
            svg.push('\n');
        }
        for rank in 0..RANKS {
            let y = BOARD_PADDING + (rank as f32 + 0.5) * CELL_SIZE + 4.0;
            svg.push_str(&format!(
                r#"  <text x="{}" y="{y}" font-family="sans-serif" font-size="12" fill="{LABEL}" text-anchor="middle">{}</text>"#,
                BOARD_PADDING / 2.0,
                RANKS - rank
            ));
            svg.push('\n');
        }
    }

    for color in Color::both() {
        for (sq, piece) in board.pieces(color) {
            let cx = BOARD_PADDING + (sq.file() as f32 + 0.5) * CELL_SIZE;
            let cy = BOARD_PADDING + (sq.rank() as f32 + 0.5) * CELL_SIZE;
            svg.push_str(&piece_svg(piece, cx, cy));
        }
    }

    svg.push_str("</svg>\n");
    svg
}

#[cfg(test)]
mod tests {
    use super::*;
    use commander_core::fen::parse_board;

    fn sq(s: &str) -> Square {
        Square::parse(s).unwrap()
    }

    #[test]
    fn test_terrain_shading() {
        assert_eq!(terrain_fill(sq("a1")), WATER);
        assert_eq!(terrain_fill(sq("c1")), COAST);
        assert_eq!(terrain_fill(sq("k12")), LAND);
        assert_eq!(terrain_fill(sq("f6")), BRIDGE);
    }

    #[test]
    fn test_render_counts_pieces() {
        let board = parse_board("6c4/11/11/11/11/11/11/11/5(TM*)5/11/11/5C5").unwrap();
        let svg = render_svg(&board, &RenderOptions::default());
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert_eq!(svg.matches("<rect").count(), 1 + 11 * 12);
        // Three pieces, one of them a badge.
        assert_eq!(svg.matches("<circle").count(), 4);
        assert!(svg.contains(HEROIC_STROKE));
    }
}
