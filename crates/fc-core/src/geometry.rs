//! Viewport transform: world ↔ screen under pan and zoom.
//!
//! `screen = world * zoom + pan`. Pan is in screen pixels, zoom is a
//! scalar clamped to [`ZOOM_MIN`]..=[`ZOOM_MAX`].

pub const ZOOM_MIN: f32 = 0.1;
pub const ZOOM_MAX: f32 = 4.0;
/// Zoom multiplier applied per wheel step.
pub const ZOOM_STEP: f32 = 1.1;

/// A 2D point. Shared by screen space and world space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// Pan/zoom camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub pan_x: f32,
    pub pan_y: f32,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Camera { pan_x: 0.0, pan_y: 0.0, zoom: 1.0 }
    }
}

impl Camera {
    pub fn screen_to_world(&self, p: Point) -> Point {
        Point::new((p.x - self.pan_x) / self.zoom, (p.y - self.pan_y) / self.zoom)
    }

    pub fn world_to_screen(&self, p: Point) -> Point {
        Point::new(p.x * self.zoom + self.pan_x, p.y * self.zoom + self.pan_y)
    }

    /// Scale `factor` into the zoom, keeping the world point under
    /// `screen_pt` stationary on screen. Clamped at the zoom limits.
    pub fn zoom_at(&mut self, screen_pt: Point, factor: f32) {
        let new_zoom = (self.zoom * factor).clamp(ZOOM_MIN, ZOOM_MAX);
        let ratio = new_zoom / self.zoom;
        self.pan_x = screen_pt.x - ratio * (screen_pt.x - self.pan_x);
        self.pan_y = screen_pt.y - ratio * (screen_pt.y - self.pan_y);
        self.zoom = new_zoom;
    }

    /// Convert a fixed screen distance (handle sizes) into world units at
    /// the current zoom.
    pub fn screen_dist_to_world(&self, d: f32) -> f32 {
        d / self.zoom
    }
}

/// Logical viewport size in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport { width: 800.0, height: 600.0 }
    }
}

impl Viewport {
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }
}
