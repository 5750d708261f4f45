use std::any::Any;

use arrayvec::ArrayString;

use crate::{
    log,
    utils::{Rect, Rgba8, Size},
};

// ----------------------------------------------
// SurfaceRect
// ----------------------------------------------

// Integer pixel rectangle on a surface, used for batch clips and blit
// source windows.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SurfaceRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl SurfaceRect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn whole_surface(size: Size) -> Self {
        Self { x: 0, y: 0, width: size.width, height: size.height }
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x + self.width &&
        y >= self.y && y < self.y + self.height
    }

    // Clamp to a surface of the given size: negative corners snap to
    // zero, extents shrink to fit. Mirrors how viewport-centered clip
    // windows are bounded before a partial redraw.
    #[inline]
    #[must_use]
    pub fn clamped_to(mut self, size: Size) -> Self {
        if self.x < 0 {
            self.x = 0;
        }
        if self.y < 0 {
            self.y = 0;
        }
        if self.x + self.width > size.width {
            self.width = size.width - self.x;
        }
        if self.y + self.height > size.height {
            self.height = size.height - self.y;
        }
        self
    }
}

impl std::fmt::Display for SurfaceRect {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "[{},{}; {}x{}]", self.x, self.y, self.width, self.height)
    }
}

// ----------------------------------------------
// ImageHandle
// ----------------------------------------------

// Handle to a static decorative image owned by the render device.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ImageHandle {
    Invalid,
    Index(u32), // Index into the device's image registry.
}

impl ImageHandle {
    #[inline]
    pub const fn invalid() -> Self {
        ImageHandle::Invalid
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        !matches!(self, ImageHandle::Invalid)
    }
}

impl Default for ImageHandle {
    fn default() -> Self { ImageHandle::invalid() }
}

// ----------------------------------------------
// PixelSurface
// ----------------------------------------------

// Off-screen RGBA pixel buffer. Per-pixel writes must happen inside a
// batch scope: begin_pixel_batch() .. end_pixel_batch(). Use the
// PixelBatch guard instead of calling the raw protocol directly so an
// unclosed batch cannot be expressed.
pub trait PixelSurface: Any {
    fn as_any(&self) -> &dyn Any;

    fn size(&self) -> Size;

    // Overwrites every pixel, batch not required.
    fn fill(&mut self, color: Rgba8);

    // Raw batch-write protocol:
    fn begin_pixel_batch(&mut self, clip: Option<SurfaceRect>);
    fn draw_pixel(&mut self, x: i32, y: i32, color: Rgba8);
    fn end_pixel_batch(&mut self);

    // Readback, for compositing and tests. Out-of-bounds reads return
    // transparent black.
    fn pixel_at(&self, x: i32, y: i32) -> Rgba8;
}

// ----------------------------------------------
// PixelBatch
// ----------------------------------------------

// Scope guard over a surface batch write: opens the batch on creation
// and closes it when dropped.
pub struct PixelBatch<'surface> {
    surface: &'surface mut dyn PixelSurface,
}

impl<'surface> PixelBatch<'surface> {
    pub fn new(surface: &'surface mut dyn PixelSurface, clip: Option<SurfaceRect>) -> Self {
        surface.begin_pixel_batch(clip);
        Self { surface }
    }

    #[inline]
    pub fn draw_pixel(&mut self, x: i32, y: i32, color: Rgba8) {
        self.surface.draw_pixel(x, y, color);
    }
}

impl Drop for PixelBatch<'_> {
    fn drop(&mut self) {
        self.surface.end_pixel_batch();
    }
}

// ----------------------------------------------
// RenderDevice
// ----------------------------------------------

// Display backend seam. Surface allocation may fail (returns None);
// callers degrade the affected draws to no-ops rather than failing
// the frame.
pub trait RenderDevice: Any {
    fn as_any(&self) -> &dyn Any;

    fn create_surface(&mut self, label: &str, size: Size) -> Option<Box<dyn PixelSurface>>;

    fn load_image(&mut self, file_path: &str) -> ImageHandle;
    fn image_size(&self, handle: ImageHandle) -> Size;

    // Copies the src_clip window of a surface to the display at the
    // destination rect's position. Transparent pixels are skipped.
    fn blit(&mut self, surface: &dyn PixelSurface, src_clip: SurfaceRect, dest: Rect);

    fn draw_image(&mut self, handle: ImageHandle, dest: Rect);

    fn display_size(&self) -> Size;
}

// ----------------------------------------------
// SoftwareSurface
// ----------------------------------------------

const SURFACE_LABEL_MAX_LEN: usize = 32;

// CPU reference implementation: a dense pixel vector with clip-rect
// honoring batch writes.
pub struct SoftwareSurface {
    label: ArrayString<SURFACE_LABEL_MAX_LEN>,
    size: Size,
    pixels: Vec<Rgba8>,
    clip: SurfaceRect,
    batch_open: bool,
}

impl SoftwareSurface {
    pub fn new(label: &str, size: Size) -> Self {
        debug_assert!(size.is_valid());
        let pixel_count = (size.width * size.height).max(0) as usize;
        Self {
            label: ArrayString::from(label).unwrap_or_default(),
            size,
            pixels: vec![Rgba8::TRANSPARENT; pixel_count],
            clip: SurfaceRect::whole_surface(size),
            batch_open: false,
        }
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    fn pixel_index(&self, x: i32, y: i32) -> usize {
        (x + (y * self.size.width)) as usize
    }
}

impl PixelSurface for SoftwareSurface {
    fn as_any(&self) -> &dyn Any {
        self
    }

    #[inline]
    fn size(&self) -> Size {
        self.size
    }

    fn fill(&mut self, color: Rgba8) {
        self.pixels.fill(color);
    }

    fn begin_pixel_batch(&mut self, clip: Option<SurfaceRect>) {
        debug_assert!(!self.batch_open, "surface '{}': batch already open", self.label);
        self.clip = clip
            .unwrap_or_else(|| SurfaceRect::whole_surface(self.size))
            .clamped_to(self.size);
        self.batch_open = true;
    }

    #[inline]
    fn draw_pixel(&mut self, x: i32, y: i32, color: Rgba8) {
        debug_assert!(self.batch_open, "surface '{}': pixel write outside batch", self.label);
        if !self.clip.contains(x, y) {
            return;
        }
        let index = self.pixel_index(x, y);
        self.pixels[index] = color;
    }

    fn end_pixel_batch(&mut self) {
        debug_assert!(self.batch_open, "surface '{}': batch not open", self.label);
        self.clip = SurfaceRect::whole_surface(self.size);
        self.batch_open = false;
    }

    #[inline]
    fn pixel_at(&self, x: i32, y: i32) -> Rgba8 {
        if x < 0 || x >= self.size.width || y < 0 || y >= self.size.height {
            return Rgba8::TRANSPARENT;
        }
        self.pixels[self.pixel_index(x, y)]
    }
}

// ----------------------------------------------
// SoftwareDevice
// ----------------------------------------------

struct ImageEntry {
    file_path: String,
    size: Size,
}

// CPU reference backend: composites blits into an in-memory display
// buffer. Decorative images are registered by path only; the software
// backend has no decoder, so draw_image stamps nothing.
pub struct SoftwareDevice {
    display: SoftwareSurface,
    images: Vec<ImageEntry>,
}

impl SoftwareDevice {
    // Nominal size reported for registered images.
    const IMAGE_SIZE: Size = Size { width: 16, height: 16 };

    pub fn new(display_size: Size) -> Self {
        Self {
            display: SoftwareSurface::new("display", display_size),
            images: Vec::new(),
        }
    }

    #[inline]
    pub fn display(&self) -> &SoftwareSurface {
        &self.display
    }

    pub fn clear_display(&mut self) {
        self.display.fill(Rgba8::TRANSPARENT);
    }
}

impl RenderDevice for SoftwareDevice {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn create_surface(&mut self, label: &str, size: Size) -> Option<Box<dyn PixelSurface>> {
        if !size.is_valid() {
            log::warn!(log::channel!("render"),
                       "Refusing to create surface '{label}' with size {size}.");
            return None;
        }
        Some(Box::new(SoftwareSurface::new(label, size)))
    }

    fn load_image(&mut self, file_path: &str) -> ImageHandle {
        let index = self.images.len() as u32;
        self.images.push(ImageEntry {
            file_path: file_path.to_string(),
            size: Self::IMAGE_SIZE,
        });
        ImageHandle::Index(index)
    }

    fn image_size(&self, handle: ImageHandle) -> Size {
        match handle {
            ImageHandle::Index(index) => self.images[index as usize].size,
            ImageHandle::Invalid => Size::zero(),
        }
    }

    fn blit(&mut self, surface: &dyn PixelSurface, src_clip: SurfaceRect, dest: Rect) {
        let src_clip = src_clip.clamped_to(surface.size());
        if !src_clip.is_valid() {
            return;
        }

        let dest_x = dest.x() as i32;
        let dest_y = dest.y() as i32;

        for row in 0..src_clip.height {
            for col in 0..src_clip.width {
                let color = surface.pixel_at(src_clip.x + col, src_clip.y + row);
                if color.is_transparent() {
                    continue;
                }

                let x = dest_x + col;
                let y = dest_y + row;
                if x < 0 || x >= self.display.size.width || y < 0 || y >= self.display.size.height {
                    continue;
                }
                let index = self.display.pixel_index(x, y);
                self.display.pixels[index] = color;
            }
        }
    }

    fn draw_image(&mut self, _handle: ImageHandle, _dest: Rect) {
        // No pixel data to stamp in the CPU reference backend.
    }

    fn display_size(&self) -> Size {
        self.display.size
    }
}
