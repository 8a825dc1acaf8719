use crate::RenderError;
use ab_glyph::{Font, FontRef, FontVec, Glyph, PxScale, ScaleFont, point};
use bytemuck::{cast_slice, cast_slice_mut};
use std::path::{Path, PathBuf};
use tiny_skia::Pixmap;
use tracing::{debug, warn};

/// Places looked at when no font is configured.
const SYSTEM_FONTS: &[&str] = &[
    "assets/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A font file that has been read and checked to parse.
#[derive(Debug, Clone)]
pub struct FontData {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

fn read_font_data(path: &Path) -> Result<FontData, RenderError> {
    let bytes = std::fs::read(path).map_err(|source| RenderError::FontIo {
        path: path.to_path_buf(),
        source,
    })?;
    FontRef::try_from_slice(&bytes).map_err(|source| RenderError::FontParse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(FontData {
        path: path.to_path_buf(),
        bytes,
    })
}

/// Reads the configured font, or the first usable system font.
///
/// A configured path that cannot be read is an error. Without one, a
/// missing font only disables text drawing.
pub fn load_font_data(configured: Option<&Path>) -> Result<Option<FontData>, RenderError> {
    if let Some(path) = configured {
        return read_font_data(path).map(Some);
    }
    for candidate in SYSTEM_FONTS.iter().map(PathBuf::from) {
        if !candidate.is_file() {
            continue;
        }
        match read_font_data(&candidate) {
            Ok(data) => {
                debug!(path = %candidate.display(), "found font");
                return Ok(Some(data));
            }
            Err(e) => warn!("skipping font: {e}"),
        }
    }
    warn!("no usable font found, text will not be drawn");
    Ok(None)
}

pub fn load_font(configured: Option<&Path>) -> Result<Option<FontVec>, RenderError> {
    let Some(FontData { path, bytes }) = load_font_data(configured)? else {
        return Ok(None);
    };
    FontVec::try_from_vec(bytes)
        .map(Some)
        .map_err(|source| RenderError::FontParse { path, source })
}

/// Rasterizes one line of text into a tight, transparent pixmap.
///
/// Returns `None` for text without any visible glyph.
pub fn render_text_pixmap<F: Font>(
    text: &str,
    font_size: f32,
    font: &F,
    color: [u8; 4],
) -> Option<Pixmap> {
    let scale = PxScale::from(font_size);
    let sf = font.as_scaled(scale);

    // baseline at ascent
    let mut pen_x = 0.0f32;
    let mut glyphs = Vec::<Glyph>::new();
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = glyphs.last() {
            pen_x += sf.kern(prev.id, id);
        }
        glyphs.push(Glyph {
            id,
            scale,
            position: point(pen_x, sf.ascent()),
        });
        pen_x += sf.h_advance(id);
    }

    let outlines: Vec<_> = glyphs
        .into_iter()
        .filter_map(|g| font.outline_glyph(g))
        .collect();
    if outlines.is_empty() {
        return None;
    }

    let mut min_x = f32::INFINITY;
    let mut min_y = f32::INFINITY;
    let mut max_x = f32::NEG_INFINITY;
    let mut max_y = f32::NEG_INFINITY;
    for out in &outlines {
        let b = out.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }

    let w = (max_x.ceil() - min_x.floor()).max(1.0) as u32;
    let h = (max_y.ceil() - min_y.floor()).max(1.0) as u32;
    let mut pm = Pixmap::new(w, h)?;
    let dst: &mut [[u8; 4]] = cast_slice_mut(pm.data_mut());
    let stride = w as usize;

    for out in &outlines {
        let b = out.px_bounds();
        out.draw(|x, y, cov| {
            if cov <= f32::EPSILON {
                return;
            }
            let ix = (x as f32 + b.min.x - min_x).floor() as i32;
            let iy = (y as f32 + b.min.y - min_y).floor() as i32;
            if ix < 0 || iy < 0 || ix >= w as i32 || iy >= h as i32 {
                return;
            }
            let px = &mut dst[iy as usize * stride + ix as usize];

            // premultiplied source over whatever overlapping glyph is there
            let a = (cov * color[3] as f32 / 255.0).clamp(0.0, 1.0);
            let src = [
                color[0] as f32 * a,
                color[1] as f32 * a,
                color[2] as f32 * a,
                a * 255.0,
            ];
            let inv = 1.0 - a;
            for c in 0..4 {
                px[c] = (src[c] + px[c] as f32 * inv).min(255.0) as u8;
            }
        });
    }
    Some(pm)
}

/// Draws `src` centered on `pos`, clipped to `dst`.
///
/// Both pixmaps are premultiplied; opaque sources are copied row by row.
pub fn blit_pixmap(dst: &mut Pixmap, src: &Pixmap, pos: (f32, f32)) {
    let (w, h) = (src.width() as i32, src.height() as i32);
    let (cw, ch) = (dst.width() as i32, dst.height() as i32);

    let x = (pos.0 - w as f32 * 0.5).round() as i32;
    let y = (pos.1 - h as f32 * 0.5).round() as i32;
    if x + w <= 0 || y + h <= 0 || x >= cw || y >= ch {
        return;
    }

    let dst_x = x.max(0) as usize;
    let dst_y = y.max(0) as usize;
    let src_x = (-x).max(0) as usize;
    let src_y = (-y).max(0) as usize;
    let copy_w = (w as usize - src_x).min(cw as usize - dst_x);
    let copy_h = (h as usize - src_y).min(ch as usize - dst_y);

    let src_px: &[[u8; 4]] = cast_slice(src.data());
    let dst_px: &mut [[u8; 4]] = cast_slice_mut(dst.data_mut());
    let src_stride = w as usize;
    let dst_stride = cw as usize;

    let fully_opaque = (0..copy_h).all(|row| {
        let start = (src_y + row) * src_stride + src_x;
        src_px[start..start + copy_w].iter().all(|p| p[3] == 255)
    });

    for row in 0..copy_h {
        let s = (src_y + row) * src_stride + src_x;
        let d = (dst_y + row) * dst_stride + dst_x;
        let src_row = &src_px[s..s + copy_w];
        let dst_row = &mut dst_px[d..d + copy_w];
        if fully_opaque {
            dst_row.copy_from_slice(src_row);
            continue;
        }
        for (dp, sp) in dst_row.iter_mut().zip(src_row) {
            let inv = 255 - sp[3] as u32;
            if inv == 255 {
                continue;
            }
            for c in 0..4 {
                dp[c] = (sp[c] as u32 + (dp[c] as u32 * inv + 127) / 255).min(255) as u8;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> Pixmap {
        let mut pm = Pixmap::new(w, h).unwrap();
        pm.fill(tiny_skia::Color::from_rgba8(rgba[0], rgba[1], rgba[2], rgba[3]));
        pm
    }

    #[test]
    fn blit_centers_and_clips() {
        let mut canvas = solid(10, 10, [0, 0, 0, 255]);
        let stamp = solid(4, 4, [255, 255, 255, 255]);

        blit_pixmap(&mut canvas, &stamp, (5.0, 5.0));
        let px = canvas.pixel(5, 5).unwrap();
        assert_eq!((px.red(), px.alpha()), (255, 255));
        assert_eq!(canvas.pixel(2, 2).unwrap().red(), 0);

        // partly off the top-left corner
        blit_pixmap(&mut canvas, &stamp, (0.0, 0.0));
        assert_eq!(canvas.pixel(0, 0).unwrap().red(), 255);
        assert_eq!(canvas.pixel(2, 2).unwrap().red(), 0);

        // entirely off screen is a no-op
        blit_pixmap(&mut canvas, &stamp, (-50.0, 80.0));
    }

    #[test]
    fn transparent_pixels_keep_the_background() {
        let mut canvas = solid(4, 4, [0, 0, 255, 255]);
        let clear = Pixmap::new(4, 4).unwrap();
        blit_pixmap(&mut canvas, &clear, (2.0, 2.0));
        let px = canvas.pixel(1, 1).unwrap();
        assert_eq!((px.red(), px.blue(), px.alpha()), (0, 255, 255));
    }

    #[test]
    fn missing_configured_font_is_an_error() {
        let err = load_font(Some(Path::new("/definitely/not/here.ttf"))).unwrap_err();
        assert!(matches!(err, RenderError::FontIo { .. }));
    }

    #[test]
    fn configured_file_must_parse_as_a_font() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.ttf");
        std::fs::write(&path, b"not a font").unwrap();
        let err = load_font_data(Some(&path)).unwrap_err();
        assert!(matches!(err, RenderError::FontParse { .. }));
    }
}
