//! A plotters backend that draws straight into a printpdf page layer.
//!
//! Backend coordinates are PDF points with the origin in the top left
//! corner, so one backend pixel is 1/72 inch on paper. Everything is kept
//! as vector paths and text.
use std::convert::Infallible;
use plotters_backend::{
    text_anchor::{HPos, Pos, VPos},
    BackendColor,
    BackendCoord,
    BackendStyle,
    BackendTextStyle,
    DrawingBackend,
    DrawingErrorKind,
    FontFamily,
    FontStyle,
    FontTransform,
};
use printpdf::{
    BuiltinFont,
    Color,
    IndirectFontRef,
    Line,
    Mm,
    PdfDocumentReference,
    PdfLayerReference,
    Point,
    Polygon,
    Pt,
    Rgb,
    TextMatrix,
};
use printpdf::path::{PaintMode, WindingOrder};
use crate::error::Result;

/// Segments used to approximate a circle
const CIRCLE_SEGMENTS: usize = 16;

/// Average advance of a Helvetica glyph, relative to the font size
const SANS_ADVANCE: f64 = 0.52;
/// Courier is monospaced
const MONO_ADVANCE: f64 = 0.6;

type DrawResult = std::result::Result<(), DrawingErrorKind<Infallible>>;

pub fn pt_to_mm(pt: f64) -> Mm {
    Mm((pt * 25.4 / 72.0) as f32)
}

/// The base-14 fonts used by the report.
#[derive(Clone)]
pub struct PdfFonts {
    pub regular: IndirectFontRef,
    pub bold: IndirectFontRef,
    pub mono: IndirectFontRef,
}

impl PdfFonts {
    pub fn builtin(doc: &PdfDocumentReference) -> Result<PdfFonts> {
        Ok(PdfFonts {
            regular: doc.add_builtin_font(BuiltinFont::Helvetica)?,
            bold: doc.add_builtin_font(BuiltinFont::HelveticaBold)?,
            mono: doc.add_builtin_font(BuiltinFont::Courier)?,
        })
    }

    fn pick(&self, family: FontFamily, style: FontStyle) -> (&IndirectFontRef, f64) {
        match (family, style) {
            (FontFamily::Monospace, _) => (&self.mono, MONO_ADVANCE),
            (_, FontStyle::Bold) => (&self.bold, SANS_ADVANCE),
            _ => (&self.regular, SANS_ADVANCE),
        }
    }
}

pub struct PdfBackend {
    layer: PdfLayerReference,
    fonts: PdfFonts,
    size: (u32, u32),
}

impl PdfBackend {
    pub fn new(layer: PdfLayerReference, fonts: PdfFonts, size: (u32, u32)) -> PdfBackend {
        PdfBackend { layer, fonts, size }
    }

    fn point(&self, coord: BackendCoord) -> Point {
        let (x, y) = to_page(coord, self.size.1);
        Point::new(pt_to_mm(x), pt_to_mm(y))
    }

    fn points<I: IntoIterator<Item = BackendCoord>>(&self, coords: I) -> Vec<(Point, bool)> {
        coords.into_iter().map(|c| (self.point(c), false)).collect()
    }

    fn stroke(&self, points: Vec<(Point, bool)>, closed: bool, color: BackendColor, width: u32) {
        if points.len() < 2 || color.alpha <= 0.0 || width == 0 {
            return;
        }
        self.layer.set_outline_color(blend(color));
        self.layer.set_outline_thickness(width as f32);
        self.layer.add_line(Line {
            points,
            is_closed: closed,
        });
    }

    fn fill(&self, points: Vec<(Point, bool)>, color: BackendColor) {
        if points.len() < 3 || color.alpha <= 0.0 {
            return;
        }
        self.layer.set_fill_color(blend(color));
        self.layer.add_polygon(Polygon {
            rings: vec![points],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });
    }
}

impl DrawingBackend for PdfBackend {
    type ErrorType = Infallible;

    fn get_size(&self) -> (u32, u32) {
        self.size
    }

    fn ensure_prepared(&mut self) -> DrawResult {
        Ok(())
    }

    fn present(&mut self) -> DrawResult {
        Ok(())
    }

    fn draw_pixel(&mut self, point: BackendCoord, color: BackendColor) -> DrawResult {
        let (x, y) = point;
        self.fill(self.points([(x, y), (x + 1, y), (x + 1, y + 1), (x, y + 1)]), color);
        Ok(())
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> DrawResult {
        self.stroke(self.points([from, to]), false, style.color(), style.stroke_width());
        Ok(())
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> DrawResult {
        let (x0, y0) = upper_left;
        let (x1, y1) = bottom_right;
        let corners = self.points([(x0, y0), (x1, y0), (x1, y1), (x0, y1)]);
        if fill {
            self.fill(corners, style.color());
        } else {
            self.stroke(corners, true, style.color(), style.stroke_width());
        }
        Ok(())
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> DrawResult {
        self.stroke(self.points(path), false, style.color(), style.stroke_width());
        Ok(())
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> DrawResult {
        let outline = self.points(circle_points(center, radius));
        if fill {
            self.fill(outline, style.color());
        } else {
            self.stroke(outline, true, style.color(), style.stroke_width());
        }
        Ok(())
    }

    fn fill_polygon<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        vert: I,
        style: &S,
    ) -> DrawResult {
        self.fill(self.points(vert), style.color());
        Ok(())
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> DrawResult {
        let color = style.color();
        if text.is_empty() || color.alpha <= 0.0 {
            return Ok(());
        }
        let size = style.size();
        let (font, advance) = self.fonts.pick(style.family(), style.style());
        let width = text_width(text, size, advance);
        let (x, y, angle) = baseline_origin(pos, style.anchor(), style.transform(), width, size);
        let (x, y) = (x, self.size.1 as f64 - y);

        self.layer.set_fill_color(blend(color));
        self.layer.begin_text_section();
        self.layer.set_font(font, size as f32);
        self.layer.set_text_matrix(TextMatrix::TranslateRotate(Pt(x as f32), Pt(y as f32), angle));
        self.layer.write_text(text, font);
        self.layer.end_text_section();
        Ok(())
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> std::result::Result<(u32, u32), DrawingErrorKind<Infallible>> {
        let size = style.size();
        let (_, advance) = self.fonts.pick(style.family(), style.style());
        Ok((text_width(text, size, advance).ceil() as u32, size.ceil() as u32))
    }
}

/// Flip a top-left based coordinate into PDF user space (bottom-left).
fn to_page((x, y): BackendCoord, height: u32) -> (f64, f64) {
    (x as f64, height as f64 - y as f64)
}

fn text_width(text: &str, size: f64, advance: f64) -> f64 {
    text.chars().count() as f64 * size * advance
}

/// Blend a translucent color against the white page.
fn blend(color: BackendColor) -> Color {
    let (r, g, b) = color.rgb;
    Color::Rgb(Rgb::new(
        blend_channel(r, color.alpha),
        blend_channel(g, color.alpha),
        blend_channel(b, color.alpha),
        None,
    ))
}

fn blend_channel(c: u8, alpha: f64) -> f32 {
    let alpha = alpha.clamp(0.0, 1.0);
    (1.0 - alpha * (1.0 - c as f64 / 255.0)) as f32
}

fn circle_points((cx, cy): BackendCoord, radius: u32) -> Vec<BackendCoord> {
    let r = radius as f64;
    (0..CIRCLE_SEGMENTS)
        .map(|i| {
            let t = i as f64 * std::f64::consts::TAU / CIRCLE_SEGMENTS as f64;
            (cx + (r * t.cos()).round() as i32, cy + (r * t.sin()).round() as i32)
        })
        .collect()
}

/// Where the text baseline starts, in backend coordinates, and the PDF
/// rotation angle in degrees (counter-clockwise).
fn baseline_origin(
    pos: BackendCoord,
    anchor: Pos,
    transform: FontTransform,
    width: f64,
    size: f64,
) -> (f64, f64, f32) {
    let along = match anchor.h_pos {
        HPos::Left => 0.0,
        HPos::Center => -width / 2.0,
        HPos::Right => -width,
    };
    // Distance from the anchor down to the baseline
    let down = match anchor.v_pos {
        VPos::Top => 0.75 * size,
        VPos::Center => 0.35 * size,
        VPos::Bottom => 0.0,
    };
    // Reading direction and glyph "down" direction on screen
    let ((ux, uy), (vx, vy), angle) = match transform {
        FontTransform::None => ((1.0, 0.0), (0.0, 1.0), 0.0),
        FontTransform::Rotate90 => ((0.0, 1.0), (-1.0, 0.0), 270.0),
        FontTransform::Rotate180 => ((-1.0, 0.0), (0.0, -1.0), 180.0),
        FontTransform::Rotate270 => ((0.0, -1.0), (1.0, 0.0), 90.0),
    };
    let x = pos.0 as f64 + along * ux + down * vx;
    let y = pos.1 as f64 + along * uy + down * vy;
    (x, y, angle)
}

#[cfg(test)]
mod tests {
    use std::io::BufWriter;
    use printpdf::PdfDocument;
    use super::*;

    #[test]
    fn page_coordinates_flip_y() {
        assert_eq!(to_page((0, 0), 792), (0.0, 792.0));
        assert_eq!(to_page((100, 792), 792), (100.0, 0.0));
    }

    #[test]
    fn points_to_millimeters() {
        assert!((pt_to_mm(72.0).0 - 25.4).abs() < 1e-4);
        assert!((pt_to_mm(612.0).0 - 215.9).abs() < 1e-3);
    }

    #[test]
    fn alpha_blends_towards_white() {
        assert_eq!(blend_channel(0, 1.0), 0.0);
        assert_eq!(blend_channel(0, 0.0), 1.0);
        assert!((blend_channel(0, 0.3) - 0.7).abs() < 1e-6);
        assert_eq!(blend_channel(255, 0.5), 1.0);
    }

    #[test]
    fn circle_is_centered() {
        let pts = circle_points((10, 20), 5);
        assert_eq!(pts.len(), CIRCLE_SEGMENTS);
        assert_eq!(pts[0], (15, 20));
        for (x, y) in pts {
            let d = (((x - 10).pow(2) + (y - 20).pow(2)) as f64).sqrt();
            assert!((d - 5.0).abs() <= 1.0);
        }
    }

    #[test]
    fn centered_text_is_shifted_left() {
        let anchor = Pos::new(HPos::Center, VPos::Bottom);
        let (x, y, angle) = baseline_origin((100, 50), anchor, FontTransform::None, 40.0, 10.0);
        assert_eq!((x, y, angle), (80.0, 50.0, 0.0));
    }

    #[test]
    fn vertical_text_reads_upwards() {
        let anchor = Pos::new(HPos::Center, VPos::Top);
        let (x, y, angle) =
            baseline_origin((30, 200), anchor, FontTransform::Rotate270, 40.0, 10.0);
        assert_eq!(angle, 90.0);
        // Centered along the vertical axis, pushed right by the ascent
        assert_eq!((x, y), (37.5, 220.0));
    }

    #[test]
    fn shapes_are_painted_on_the_layer() {
        let side = pt_to_mm(100.0);
        let (doc, page, layer) = PdfDocument::new("shapes", side, side, "Layer");
        let fonts = PdfFonts::builtin(&doc).unwrap();
        let mut backend = PdfBackend::new(doc.get_page(page).get_layer(layer), fonts, (100, 100));
        let blue = BackendColor { alpha: 1.0, rgb: (0, 0, 255) };
        backend.fill_polygon(vec![(10, 10), (90, 10), (50, 90)], &blue).unwrap();
        backend.draw_line((0, 0), (100, 100), &blue).unwrap();

        let mut buf = BufWriter::new(Vec::new());
        doc.save(&mut buf).unwrap();
        let pdf = lopdf::Document::load_mem(&buf.into_inner().unwrap()).unwrap();
        let page_id = *pdf.get_pages().values().next().unwrap();
        let ops: Vec<String> = pdf
            .get_and_decode_page_content(page_id)
            .unwrap()
            .operations
            .into_iter()
            .map(|op| op.operator)
            .collect();
        assert!(ops.iter().any(|op| op == "f"));
        assert!(ops.iter().any(|op| op == "S"));
    }

    #[test]
    fn width_depends_on_font() {
        assert_eq!(text_width("abcd", 10.0, MONO_ADVANCE), 24.0);
        assert!(text_width("abcd", 10.0, SANS_ADVANCE) < 24.0);
    }
}
