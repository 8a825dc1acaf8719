use crate::text::{blit_pixmap, render_text_pixmap};
use ab_glyph::FontVec;
use rdmx_cache::{AtomCache, get_text, intern_text, text_count};
use rdmx_core::{Angle, Dot, Feedback, Layout, Phase, RtBand, Target, TrialState};
use rdmx_timing::Timer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tiny_skia::{Color, FillRule, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

pub const WHITE: [u8; 4] = [255, 255, 255, 255];
pub const YELLOW: [u8; 4] = [255, 255, 0, 255];
pub const LIME: [u8; 4] = [0, 255, 0, 255];
pub const RED: [u8; 4] = [255, 0, 0, 255];
pub const CYAN: [u8; 4] = [0, 255, 255, 255];
pub const ORANGE: [u8; 4] = [255, 165, 0, 255];
pub const GRAY: [u8; 4] = [128, 128, 128, 255];

/// Progress caption position, relative to the screen center (y up).
const PROGRESS_OFFSET: (f32, f32) = (0.0, 380.0);
const PROGRESS_SIZE: f32 = 24.0;
const RT_SIZE: f32 = 32.0;
const SCREEN_TEXT_SIZE: f32 = 24.0;
const RING_WIDTH: f32 = 2.0;
const HIGHLIGHT_WIDTH: f32 = 4.0;
const TEXT_CACHE_CAPACITY: usize = 256;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },
    #[error("frame buffer holds {got} bytes, expected {expected}")]
    FrameSize { expected: usize, got: usize },
    #[error("failed to read font {path}")]
    FontIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{path} is not a usable font")]
    FontParse {
        path: PathBuf,
        #[source]
        source: ab_glyph::InvalidFont,
    },
}

#[repr(usize)]
#[derive(Debug, Clone, Copy)]
enum CacheIndex {
    FixationCross = 0,
}

impl CacheIndex {
    const STATIC_COUNT: usize = 1;
}

#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    pub clear: Duration,
    pub phase: Duration,
    pub copy: Duration,
    pub total: Duration,
}

/// Sizes that do not change during a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub ring_radius: f32,
    pub text_height: f32,
    pub dot_size: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            ring_radius: 35.0,
            text_height: 22.0,
            dot_size: 6.0,
        }
    }
}

/// Screen texts and block lengths shown in the progress caption.
#[derive(Debug, Clone, PartialEq)]
pub struct Captions {
    pub welcome: Vec<String>,
    pub practice_done: Vec<String>,
    pub debrief: Vec<String>,
    pub correct_answer: String,
    pub practice_total: usize,
    pub main_total: usize,
}

impl Captions {
    pub fn standard(practice_total: usize, main_total: usize) -> Self {
        Self {
            welcome: vec![
                "Welcome to the experiment".to_string(),
                String::new(),
                format!("Practice block ({practice_total} trials)"),
                "Answer with the key printed next to each circle".to_string(),
                String::new(),
                "Left hand: Q W E A D Z X C".to_string(),
                "Right hand: numpad 7 9 4 6 1 3".to_string(),
                String::new(),
                "Press SPACE to start".to_string(),
            ],
            practice_done: vec![
                "Practice finished!".to_string(),
                "Press SPACE to start the main experiment".to_string(),
            ],
            debrief: vec![
                "All blocks finished".to_string(),
                "Thank you for taking part!".to_string(),
            ],
            correct_answer: "Correct answer!".to_string(),
            practice_total,
            main_total,
        }
    }

    fn progress_label(practice: bool, current: usize, total: usize) -> String {
        if practice {
            format!("Practice: {current} / {total}")
        } else {
            format!("Trial: {current} / {total}")
        }
    }
}

/// Everything a frame shows, borrowed from the running session.
pub struct Scene<'a, P: Phase> {
    pub phase: &'a P,
    pub trial_state: Option<TrialState>,
    pub dots: &'a [Dot],
    pub feedback: Option<&'a Feedback>,
    /// 1-based trial number and block length.
    pub progress: Option<(usize, usize)>,
}

pub trait Renderer {
    fn blit_cached(&mut self, index: usize, pos: (f32, f32));
    fn blit_text_by_intern_id(
        &mut self,
        intern_id: usize,
        pos: (f32, f32),
        size: f32,
        color: [u8; 4],
    );
}

pub trait PhaseRenderer<P: Phase>: Renderer {
    fn render_phase(&mut self, scene: &Scene<'_, P>) -> Result<(), RenderError>;
}

type TextVariant = ([u8; 4], u32);

pub struct SkiaRenderer {
    width: u32,
    height: u32,
    center: (f32, f32),

    font: Option<FontVec>,
    style: Style,
    captions: Captions,
    targets: Vec<Target>,

    static_cache: Vec<Pixmap>,
    text_cache: AtomCache<TextVariant, Option<Arc<Pixmap>>>,
    // [practice, main][trial number]
    progress_text_interns: [Vec<usize>; 2],

    canvas: Pixmap,
    clear_buffer: Vec<u8>,
    // black background with target rings and labels baked in
    backdrop_buffer: Vec<u8>,
}

fn new_pixmap(width: u32, height: u32) -> Result<Pixmap, RenderError> {
    Pixmap::new(width, height).ok_or(RenderError::Pixmap { width, height })
}

fn paint(color: [u8; 4]) -> Paint<'static> {
    let mut p = Paint::default();
    p.set_color(Color::from_rgba8(color[0], color[1], color[2], color[3]));
    p.anti_alias = true;
    p
}

fn stroke_ring(canvas: &mut Pixmap, pos: (f32, f32), radius: f32, width: f32, color: [u8; 4]) {
    if let Some(path) = PathBuilder::from_circle(pos.0, pos.1, radius) {
        let stroke = Stroke {
            width,
            ..Stroke::default()
        };
        canvas.stroke_path(&path, &paint(color), &stroke, Transform::identity(), None);
    }
}

impl SkiaRenderer {
    pub fn new(
        width: u32,
        height: u32,
        layout: &Layout,
        style: Style,
        captions: Captions,
        font: Option<FontVec>,
    ) -> Result<Self, RenderError> {
        let mut renderer = SkiaRenderer {
            width,
            height,
            center: (width as f32 / 2.0, height as f32 / 2.0),
            font,
            style,
            captions,
            targets: layout.targets().to_vec(),
            static_cache: Vec::with_capacity(CacheIndex::STATIC_COUNT),
            text_cache: AtomCache::new(TEXT_CACHE_CAPACITY),
            progress_text_interns: [Vec::new(), Vec::new()],
            canvas: new_pixmap(width, height)?,
            clear_buffer: Vec::new(),
            backdrop_buffer: Vec::new(),
        };
        renderer.init_cache()?;
        Ok(renderer)
    }

    pub fn resize(&mut self, new_width: u32, new_height: u32) -> Result<(), RenderError> {
        self.width = new_width;
        self.height = new_height;
        self.center = (new_width as f32 / 2.0, new_height as f32 / 2.0);
        self.canvas = new_pixmap(new_width, new_height)?;
        self.build_backgrounds()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    fn init_cache(&mut self) -> Result<(), RenderError> {
        self.static_cache.clear();
        self.cache_fixation()?;
        self.precompute_progress_interns();
        self.build_backgrounds()
    }

    fn cache_fixation(&mut self) -> Result<(), RenderError> {
        let size = 40u32; // full extent of cross
        let mut pm = new_pixmap(size, size)?;

        let mut p = paint(WHITE);
        p.anti_alias = false;
        let bar = 3.0;
        let half = (size as f32 - bar) * 0.5;
        for rect in [
            Rect::from_xywh(0.0, half, size as f32, bar),
            Rect::from_xywh(half, 0.0, bar, size as f32),
        ]
        .into_iter()
        .flatten()
        {
            pm.fill_rect(rect, &p, Transform::identity(), None);
        }

        self.static_cache.push(pm);
        Ok(())
    }

    fn precompute_progress_interns(&mut self) {
        let totals = [self.captions.practice_total, self.captions.main_total];
        for (slot, total) in totals.into_iter().enumerate() {
            self.progress_text_interns[slot] = (0..=total)
                .map(|current| intern_text(&Captions::progress_label(slot == 0, current, total)))
                .collect();
        }
    }

    fn build_backgrounds(&mut self) -> Result<(), RenderError> {
        let mut bg = new_pixmap(self.width, self.height)?;
        bg.fill(Color::BLACK);
        self.clear_buffer = bg.data().to_vec();

        for target in &self.targets {
            let pos = to_screen(self.center, target.position);
            stroke_ring(&mut bg, pos, self.style.ring_radius, RING_WIDTH, WHITE);
            if let Some(font) = &self.font {
                if let Some(label) =
                    render_text_pixmap(&target.label, self.style.text_height, font, YELLOW)
                {
                    blit_pixmap(&mut bg, &label, pos);
                }
            }
        }
        self.backdrop_buffer = bg.data().to_vec();
        Ok(())
    }

    fn text(&mut self, text: &str, size: f32, color: [u8; 4]) -> Option<Arc<Pixmap>> {
        let font = self.font.as_ref()?;
        self.text_cache
            .get_or_insert_with(text, (color, size.to_bits()), || {
                render_text_pixmap(text, size, font, color).map(Arc::new)
            })
    }

    fn draw_text(&mut self, text: &str, pos: (f32, f32), size: f32, color: [u8; 4]) {
        if let Some(pm) = self.text(text, size, color) {
            blit_pixmap(&mut self.canvas, &pm, pos);
        }
    }

    /// Centered block of lines.
    fn draw_lines(&mut self, lines: &[String], color: [u8; 4]) {
        let line_height = SCREEN_TEXT_SIZE * 1.5;
        let top = self.center.1 - line_height * (lines.len() as f32 - 1.0) * 0.5;
        for (i, line) in lines.iter().enumerate() {
            if line.is_empty() {
                continue;
            }
            let pos = (self.center.0, top + i as f32 * line_height);
            self.draw_text(line, pos, SCREEN_TEXT_SIZE, color);
        }
    }

    fn draw_dots(&mut self, dots: &[Dot]) {
        let radius = self.style.dot_size * 0.5;
        let mut pb = PathBuilder::new();
        for dot in dots {
            let (x, y) = to_screen(self.center, (dot.x, dot.y));
            pb.push_circle(x, y, radius);
        }
        if let Some(path) = pb.finish() {
            self.canvas.fill_path(
                &path,
                &paint(WHITE),
                FillRule::Winding,
                Transform::identity(),
                None,
            );
        }
    }

    fn target_screen_pos(&self, target: Angle) -> Option<(f32, f32)> {
        self.targets
            .iter()
            .find(|t| t.angle == target)
            .map(|t| to_screen(self.center, t.position))
    }

    fn draw_feedback(&mut self, feedback: &Feedback) {
        let ring = self.style.ring_radius;
        let chosen_color = if feedback.correct { LIME } else { RED };
        if let Some(pos) = self.target_screen_pos(feedback.chosen) {
            stroke_ring(&mut self.canvas, pos, ring, HIGHLIGHT_WIDTH, chosen_color);
        }
        if !feedback.correct {
            if let Some(t) = self.targets.iter().find(|t| t.angle == feedback.target) {
                let (x, y) = t.position;
                let ring_pos = to_screen(self.center, (x, y));
                let text_pos = to_screen(self.center, (x * 1.2, y * 1.2));
                stroke_ring(&mut self.canvas, ring_pos, ring, HIGHLIGHT_WIDTH, LIME);
                let label = self.captions.correct_answer.clone();
                self.draw_text(&label, text_pos, self.style.text_height * 0.9, LIME);
            }
        }

        let color = match feedback.rt_band() {
            RtBand::Fast => CYAN,
            RtBand::Normal => WHITE,
            RtBand::Slow => ORANGE,
        };
        let rt = format!("{:.3} s", feedback.rt);
        self.draw_text(&rt, self.center, RT_SIZE, color);
    }

    fn draw_progress(&mut self, practice: bool, current: usize, total: usize) {
        let slot = if practice { 0 } else { 1 };
        let pos = to_screen(self.center, PROGRESS_OFFSET);
        let interns = &self.progress_text_interns[slot];
        let id = interns
            .get(current)
            .copied()
            .filter(|_| interns.len() == total + 1);
        match id {
            Some(id) => self.blit_text_by_intern_id(id, pos, PROGRESS_SIZE, GRAY),
            // block length differs from the one announced at startup
            None => {
                let label = Captions::progress_label(practice, current, total);
                self.draw_text(&label, pos, PROGRESS_SIZE, GRAY);
            }
        }
    }

    pub fn render_frame<P, T>(
        &mut self,
        scene: &Scene<'_, P>,
        frame_buffer: &mut [u8],
        timer: &mut T,
    ) -> Result<FrameStats, RenderError>
    where
        P: Phase,
        T: Timer,
    {
        let expected = self.canvas.data().len();
        if frame_buffer.len() != expected {
            return Err(RenderError::FrameSize {
                expected,
                got: frame_buffer.len(),
            });
        }

        let t_clear = {
            let t = timer.now();
            let background = if scene.phase.runs_trials() {
                &self.backdrop_buffer
            } else {
                &self.clear_buffer
            };
            self.canvas.data_mut().copy_from_slice(background);
            timer.elapsed(t)
        };

        let t_phase = {
            let t = timer.now();
            self.render_phase(scene)?;
            timer.elapsed(t)
        };

        let t_copy = {
            let t = timer.now();
            frame_buffer.copy_from_slice(self.canvas.data());
            timer.elapsed(t)
        };

        let total = t_clear + t_phase + t_copy;
        timer.record_frame(total);

        Ok(FrameStats {
            clear: t_clear,
            phase: t_phase,
            copy: t_copy,
            total,
        })
    }

    /// The last rendered frame.
    pub fn canvas(&self) -> &Pixmap {
        &self.canvas
    }
}

/// Maps a center-relative, y-up point to pixel coordinates.
fn to_screen(center: (f32, f32), p: (f32, f32)) -> (f32, f32) {
    (center.0 + p.0, center.1 - p.1)
}

impl Renderer for SkiaRenderer {
    fn blit_cached(&mut self, index: usize, pos: (f32, f32)) {
        if let Some(pm) = self.static_cache.get(index) {
            blit_pixmap(&mut self.canvas, pm, pos);
        }
    }

    fn blit_text_by_intern_id(
        &mut self,
        intern_id: usize,
        pos: (f32, f32),
        size: f32,
        color: [u8; 4],
    ) {
        if intern_id >= text_count() {
            return;
        }
        if let Some(atom) = get_text(intern_id) {
            self.draw_text(&atom, pos, size, color);
        }
    }
}

impl<P> PhaseRenderer<P> for SkiaRenderer
where
    P: Phase,
{
    fn render_phase(&mut self, scene: &Scene<'_, P>) -> Result<(), RenderError> {
        match scene.phase {
            p if p.is_welcome() => {
                let lines = self.captions.welcome.clone();
                self.draw_lines(&lines, WHITE);
            }
            p if p.runs_trials() => {
                match scene.trial_state {
                    Some(TrialState::Fixation) => {
                        self.blit_cached(CacheIndex::FixationCross as usize, self.center);
                    }
                    Some(TrialState::Stimulus) => self.draw_dots(scene.dots),
                    Some(TrialState::Feedback) => {
                        self.draw_dots(scene.dots);
                        if let Some(feedback) = scene.feedback {
                            self.draw_feedback(feedback);
                        }
                    }
                    Some(TrialState::Complete) | None => {}
                }
                if let Some((current, total)) = scene.progress {
                    self.draw_progress(p.is_practice(), current, total);
                }
            }
            p if p.is_debrief() => {
                let lines = self.captions.debrief.clone();
                self.draw_lines(&lines, WHITE);
            }
            p if p.awaits_continue() => {
                let lines = self.captions.practice_done.clone();
                self.draw_lines(&lines, CYAN);
            }
            _ => {}
        }
        Ok(())
    }
}

/// Window icon: six rings around a dot, straight RGBA.
pub fn icon_rgba(size: u32) -> Result<Vec<u8>, RenderError> {
    let mut pm = new_pixmap(size, size)?;
    pm.fill(Color::BLACK);
    let c = size as f32 / 2.0;
    let orbit = size as f32 * 0.34;
    let ring = size as f32 * 0.1;
    for k in 0..6 {
        let a = (k as f32 * 60.0).to_radians();
        let pos = (c + orbit * a.cos(), c - orbit * a.sin());
        let color = if k == 1 { LIME } else { WHITE };
        stroke_ring(&mut pm, pos, ring, (size as f32 / 32.0).max(1.0), color);
    }
    if let Some(path) = PathBuilder::from_circle(c, c, ring * 0.5) {
        pm.fill_path(&path, &paint(WHITE), FillRule::Winding, Transform::identity(), None);
    }
    Ok(pm
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rdmx_core::{TaskPhase, layout::DEFAULT_RADIUS};
    use rdmx_timing::ManualTimer;

    fn renderer() -> SkiaRenderer {
        let layout = Layout::standard(DEFAULT_RADIUS).unwrap();
        SkiaRenderer::new(800, 800, &layout, Style::default(), Captions::standard(5, 54), None)
            .unwrap()
    }

    fn rgb_at(r: &SkiaRenderer, x: u32, y: u32) -> (u8, u8, u8) {
        let px = r.canvas().pixel(x, y).unwrap();
        (px.red(), px.green(), px.blue())
    }

    fn render(r: &mut SkiaRenderer, scene: &Scene<'_, TaskPhase>) -> Vec<u8> {
        let (w, h) = r.size();
        let mut fb = vec![0u8; (w * h * 4) as usize];
        let mut timer = ManualTimer::new();
        r.render_frame(scene, &mut fb, &mut timer).unwrap();
        fb
    }

    fn scene<'a>(
        phase: &'a TaskPhase,
        state: Option<TrialState>,
        dots: &'a [Dot],
        feedback: Option<&'a Feedback>,
    ) -> Scene<'a, TaskPhase> {
        Scene {
            phase,
            trial_state: state,
            dots,
            feedback,
            progress: Some((1, 54)),
        }
    }

    #[test]
    fn rejects_wrong_frame_buffer_size() {
        let mut r = renderer();
        let phase = TaskPhase::Welcome;
        let mut fb = vec![0u8; 16];
        let err = r
            .render_frame(&scene(&phase, None, &[], None), &mut fb, &mut ManualTimer::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::FrameSize { got: 16, .. }));
    }

    #[test]
    fn trial_frames_show_the_target_rings() {
        let mut r = renderer();
        let phase = TaskPhase::Experiment;
        let fb = render(&mut r, &scene(&phase, Some(TrialState::Fixation), &[], None));
        // ring at 0° sits 250 px right of the center
        let x = 400 + 250 + 35;
        let idx = ((400 * 800 + x) * 4) as usize;
        assert!(fb[idx] > 0);
        // fixation cross at the center
        assert_eq!(rgb_at(&r, 400, 400), (255, 255, 255));
    }

    #[test]
    fn feedback_colors_the_rings() {
        let mut r = renderer();
        let phase = TaskPhase::Practice;
        let feedback = Feedback {
            target: Angle::new(0).unwrap(),
            chosen: Angle::new(180).unwrap(),
            correct: false,
            rt: 0.4,
        };
        render(
            &mut r,
            &scene(&phase, Some(TrialState::Feedback), &[], Some(&feedback)),
        );
        // chosen ring (180°) red, correct ring (0°) lime
        let (red, green, _) = rgb_at(&r, 400 - 250 - 35, 400);
        assert!(red > 200 && green < 50);
        let (red, green, _) = rgb_at(&r, 400 + 250 + 35, 400);
        assert!(green > 200 && red < 50);
    }

    #[test]
    fn dots_are_drawn_in_y_up_coordinates() {
        let mut r = renderer();
        let phase = TaskPhase::Experiment;
        let mut rng = rand::rng();
        let mut field = rdmx_core::DotField::new(
            rdmx_core::DotFieldParams {
                n_dots: 1,
                ..Default::default()
            },
            &mut rng,
        );
        field.set_motion(Angle::new(0).unwrap(), 1.0, &mut rng);
        let dot = field.dots()[0];
        render(&mut r, &scene(&phase, Some(TrialState::Stimulus), field.dots(), None));
        let x = (400.0 + dot.x).round() as u32;
        let y = (400.0 - dot.y).round() as u32;
        assert!(rgb_at(&r, x, y).0 > 100);
    }

    #[test]
    fn instruction_screens_have_no_backdrop() {
        let mut r = renderer();
        let phase = TaskPhase::PracticeDone;
        render(&mut r, &scene(&phase, None, &[], None));
        assert_eq!(rgb_at(&r, 400 + 250 + 35, 400), (0, 0, 0));
    }

    #[test]
    fn icon_is_square_rgba() {
        assert_eq!(icon_rgba(32).unwrap().len(), 32 * 32 * 4);
    }
}
