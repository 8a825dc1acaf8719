mod render;
pub mod text;

pub use render::{
    CYAN, Captions, FrameStats, GRAY, LIME, ORANGE, PhaseRenderer, RED, RenderError, Renderer,
    Scene, SkiaRenderer, Style, WHITE, YELLOW, icon_rgba,
};
pub use text::{FontData, blit_pixmap, load_font, load_font_data, render_text_pixmap};
