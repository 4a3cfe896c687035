use serde::{Deserialize, Serialize};

pub const DEFAULT_STAGGER_FRAME: u32 = 30;

/// Walk order through a 2x2 sheet, as (col, row).
pub const WALK_CYCLE: [(u32, u32); 4] = [(0, 0), (1, 0), (1, 1), (0, 1)];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameGridSpec {
    pub sheet_size: u32,
    pub cols: u32,
    pub rows: u32,
}

impl Default for FrameGridSpec {
    fn default() -> Self {
        Self {
            sheet_size: 1024,
            cols: 2,
            rows: 2,
        }
    }
}

impl FrameGridSpec {
    pub fn cell_size(&self) -> (u32, u32) {
        (
            self.sheet_size / self.cols.max(1),
            self.sheet_size / self.rows.max(1),
        )
    }

    pub fn crop_for(&self, col: u32, row: u32) -> CropRect {
        let (width, height) = self.cell_size();
        CropRect {
            x: col * width,
            y: row * height,
            width,
            height,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameCursor {
    pub col: u32,
    pub row: u32,
    pub tick_count: u64,
}

impl FrameCursor {
    fn advance(&mut self) {
        let phase = WALK_CYCLE
            .iter()
            .position(|&pos| pos == (self.col, self.row))
            .unwrap_or(WALK_CYCLE.len() - 1);
        let (col, row) = WALK_CYCLE[(phase + 1) % WALK_CYCLE.len()];
        self.col = col;
        self.row = row;
    }
}

/// Steps a cursor through a sprite sheet, one call to [`FrameStepper::tick`]
/// per host frame. The cursor only exists while the stepper is running.
#[derive(Clone, Debug)]
pub struct FrameStepper {
    grid: FrameGridSpec,
    stagger_frame: u32,
    cursor: Option<FrameCursor>,
}

impl FrameStepper {
    pub fn new(grid: FrameGridSpec, stagger_frame: u32) -> Self {
        Self {
            grid,
            stagger_frame: stagger_frame.max(1),
            cursor: None,
        }
    }

    pub fn start(&mut self) {
        self.cursor = Some(FrameCursor::default());
    }

    /// Safe to call on a stepper that was never started.
    pub fn stop(&mut self) {
        self.cursor = None;
    }

    pub fn is_running(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn cursor(&self) -> Option<FrameCursor> {
        self.cursor
    }

    pub fn tick(&mut self) -> Option<CropRect> {
        let cursor = self.cursor.as_mut()?;
        cursor.tick_count += 1;
        if cursor.tick_count % u64::from(self.stagger_frame) == 0 {
            cursor.advance();
        }
        self.current_crop()
    }

    pub fn current_crop(&self) -> Option<CropRect> {
        self.cursor.map(|c| self.grid.crop_for(c.col, c.row))
    }
}

/// Side of the square box a frame is drawn into.
pub fn square_side(base_width: u32, base_height: u32) -> u32 {
    base_width.max(base_height)
}

/// Largest uniform scale that fits `base` into `container`, or 1 when either
/// size is degenerate.
pub fn fit_scale(container: (f64, f64), base: (f64, f64)) -> f64 {
    let scale = (container.0 / base.0).min(container.1 / base.1);
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}
