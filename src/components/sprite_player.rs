use image::DynamicImage;
use ratatui::{buffer::Buffer, layout::Rect, widgets::StatefulWidget};
use ratatui_image::{StatefulImage, picker::Picker, protocol::StatefulProtocol};
use std::sync::Arc;

use crate::config::Config;
use crate::model::frames::{CropRect, FrameGridSpec, FrameStepper, fit_scale, square_side};
use crate::widgets::common::centered;

/// Plays one sprite sheet: a `FrameStepper` driving a cropped view of the
/// sheet. Without a sheet it ticks but draws nothing.
pub struct SpritePlayer {
    stepper: FrameStepper,
    base_width: u32,
    base_height: u32,
    sheet: Option<Arc<DynamicImage>>,
    shown: Option<CropRect>,
    // Crops already found outside the current sheet.
    skipped: Vec<CropRect>,
    protocol: Option<StatefulProtocol>,
    picker: Picker,
}

impl SpritePlayer {
    pub fn new(
        picker: Picker,
        grid: FrameGridSpec,
        stagger_frame: u32,
        base_width: u32,
        base_height: u32,
    ) -> Self {
        Self {
            stepper: FrameStepper::new(grid, stagger_frame),
            base_width,
            base_height,
            sheet: None,
            shown: None,
            skipped: Vec::new(),
            protocol: None,
            picker,
        }
    }

    pub fn from_config(picker: Picker, config: &Config) -> Self {
        Self::new(
            picker,
            config.grid,
            config.stagger_frame,
            config.sprite_width,
            config.sprite_height,
        )
    }

    pub fn set_sheet(&mut self, sheet: Option<Arc<DynamicImage>>) {
        self.sheet = sheet;
        self.shown = None;
        self.skipped.clear();
        self.protocol = None;
        if let Some(crop) = self.stepper.current_crop() {
            self.show(crop);
        }
    }

    pub fn has_sheet(&self) -> bool {
        self.sheet.is_some()
    }

    /// Restarts from the first frame.
    pub fn start(&mut self) {
        self.stepper.start();
        self.shown = None;
        if let Some(crop) = self.stepper.current_crop() {
            self.show(crop);
        }
    }

    pub fn stop(&mut self) {
        self.stepper.stop();
        self.shown = None;
        self.protocol = None;
    }

    pub fn is_running(&self) -> bool {
        self.stepper.is_running()
    }

    pub fn tick(&mut self) {
        if let Some(crop) = self.stepper.tick() {
            if self.shown != Some(crop) {
                self.show(crop);
            }
        }
    }

    pub fn current_crop(&self) -> Option<CropRect> {
        self.shown
    }

    pub fn has_frame(&self) -> bool {
        self.protocol.is_some()
    }

    fn show(&mut self, crop: CropRect) {
        let Some(sheet) = self.sheet.as_ref() else {
            return;
        };
        self.shown = Some(crop);
        if self.skipped.contains(&crop) {
            self.protocol = None;
            return;
        }
        let frame = crop_frame(sheet, crop);
        if frame.width() == 0 || frame.height() == 0 {
            log::warn!(
                "Frame {:?} is outside the {}x{} sheet",
                crop,
                sheet.width(),
                sheet.height()
            );
            self.skipped.push(crop);
            self.protocol = None;
            return;
        }
        self.protocol = Some(self.picker.new_resize_protocol(frame));
    }

    /// Square box the frame is drawn into, scaled to fit `container`.
    pub fn frame_area(&self, container: Rect) -> Rect {
        square_area(&self.picker, (self.base_width, self.base_height), container)
    }

    pub fn render(&mut self, area: Rect, buf: &mut Buffer) {
        let target = self.frame_area(area);
        if let Some(protocol) = self.protocol.as_mut() {
            StatefulWidget::render(StatefulImage::default(), target, buf, protocol);
        }
    }
}

/// Centered box for an image of `base` pixels, square in pixels and scaled to
/// fit `container`.
pub fn square_area(picker: &Picker, base: (u32, u32), container: Rect) -> Rect {
    let (font_w, font_h) = picker.font_size();
    let (font_w, font_h) = (f64::from(font_w.max(1)), f64::from(font_h.max(1)));

    let scale = fit_scale(
        (
            f64::from(container.width) * font_w,
            f64::from(container.height) * font_h,
        ),
        (f64::from(base.0), f64::from(base.1)),
    );
    let side = f64::from(square_side(base.0, base.1)) * scale;

    let cols = (side / font_w).floor().min(f64::from(u16::MAX)) as u16;
    let rows = (side / font_h).floor().min(f64::from(u16::MAX)) as u16;
    centered(container, cols, rows)
}

pub fn crop_frame(sheet: &DynamicImage, crop: CropRect) -> DynamicImage {
    sheet.crop_imm(crop.x, crop.y, crop.width, crop.height)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::AppMsg;
    use crate::logging::ChannelLogger;
    use crate::model::frames::DEFAULT_STAGGER_FRAME;
    use image::{Rgba, RgbaImage};

    const TOP_LEFT: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const TOP_RIGHT: Rgba<u8> = Rgba([0, 255, 0, 255]);
    const BOTTOM_RIGHT: Rgba<u8> = Rgba([0, 0, 255, 255]);
    const BOTTOM_LEFT: Rgba<u8> = Rgba([255, 255, 0, 255]);

    fn quadrant_sheet(size: u32) -> DynamicImage {
        let half = size / 2;
        let img = RgbaImage::from_fn(size, size, |x, y| match (x >= half, y >= half) {
            (false, false) => TOP_LEFT,
            (true, false) => TOP_RIGHT,
            (true, true) => BOTTOM_RIGHT,
            (false, true) => BOTTOM_LEFT,
        });
        DynamicImage::ImageRgba8(img)
    }

    fn player(stagger: u32) -> SpritePlayer {
        SpritePlayer::new(
            Picker::from_fontsize((8, 16)),
            FrameGridSpec::default(),
            stagger,
            100,
            100,
        )
    }

    #[test]
    fn test_crop_frame_picks_quadrant() {
        let sheet = quadrant_sheet(1024);
        let grid = FrameGridSpec::default();

        let frame = crop_frame(&sheet, grid.crop_for(1, 0)).to_rgba8();
        assert_eq!(frame.dimensions(), (512, 512));
        assert_eq!(*frame.get_pixel(0, 0), TOP_RIGHT);

        let frame = crop_frame(&sheet, grid.crop_for(0, 1)).to_rgba8();
        assert_eq!(*frame.get_pixel(511, 511), BOTTOM_LEFT);
    }

    #[test]
    fn test_player_follows_walk_cycle() {
        let mut player = player(1);
        player.set_sheet(Some(Arc::new(quadrant_sheet(1024))));
        assert!(!player.has_frame());

        player.start();
        assert!(player.has_frame());
        assert_eq!(player.current_crop().map(|c| (c.x, c.y)), Some((0, 0)));

        player.tick();
        assert_eq!(player.current_crop().map(|c| (c.x, c.y)), Some((512, 0)));
        player.tick();
        assert_eq!(player.current_crop().map(|c| (c.x, c.y)), Some((512, 512)));
    }

    #[test]
    fn test_missing_sheet_draws_nothing() {
        let mut player = player(1);
        player.start();
        for _ in 0..10 {
            player.tick();
        }
        assert!(player.is_running());
        assert!(!player.has_frame());

        let area = Rect::new(0, 0, 20, 10);
        let mut buf = Buffer::empty(area);
        player.render(area, &mut buf);
        assert_eq!(buf, Buffer::empty(area));
    }

    #[test]
    fn test_sheet_smaller_than_grid_is_skipped() {
        let mut player = player(1);
        player.start();
        player.tick();
        player.set_sheet(Some(Arc::new(quadrant_sheet(16))));
        assert!(!player.has_frame());
    }

    #[test]
    fn test_frame_outside_sheet_warns_once() {
        let (tx, rx) = crossbeam_channel::unbounded();
        ChannelLogger::init(tx, log::LevelFilter::Warn).unwrap();

        let mut player = player(DEFAULT_STAGGER_FRAME);
        player.set_sheet(Some(Arc::new(quadrant_sheet(256))));
        player.start();
        assert!(player.has_frame());
        for _ in 0..600 {
            player.tick();
        }

        // Other tests may log through the same global logger.
        let warnings = rx
            .try_iter()
            .filter(|msg| matches!(msg, AppMsg::LogMessage(s) if s.contains("256x256 sheet")))
            .count();
        assert_eq!(warnings, 3);
        assert!(player.is_running());
    }

    #[test]
    fn test_stop_releases_frame() {
        let mut player = player(30);
        player.set_sheet(Some(Arc::new(quadrant_sheet(1024))));
        player.start();
        player.stop();
        player.stop();
        assert!(!player.is_running());
        assert!(!player.has_frame());
        assert!(player.current_crop().is_none());
    }

    #[test]
    fn test_frame_area_is_square_in_pixels() {
        let player = player(30);

        let full = player.frame_area(Rect::new(0, 0, 40, 20));
        assert_eq!(full, Rect::new(0, 0, 40, 20));

        let wide = player.frame_area(Rect::new(0, 0, 40, 10));
        assert_eq!(wide, Rect::new(10, 0, 20, 10));
    }
}
