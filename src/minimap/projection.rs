use enum_dispatch::enum_dispatch;

use crate::{
    render::PixelBatch,
    utils::{
        coords::{Cell, PixelPoint},
        Rgba8,
        Size,
    },
};

// ----------------------------------------------
// Projection
// ----------------------------------------------

// Mapping between tile grid coordinates and minimap surface pixels.
// One implementation is selected at map-load time and injected into
// the rasterizer; the terrain pass and the entity overlay go through
// the same instance so their pixels are guaranteed to stay aligned.
#[enum_dispatch]
pub trait Projection {
    // Pixel origin of a tile's drawn block at the given zoom.
    fn tile_to_pixel(&self, cell: Cell, zoom: i32) -> PixelPoint;

    // Inverse of tile_to_pixel, up to the fixed pixel offset.
    fn pixel_to_tile(&self, point: PixelPoint, zoom: i32) -> Cell;

    // Un-zoomed pixel offset of the observer, computed once per frame
    // and shared by terrain clipping and entity placement.
    fn observer_offset(&self, cell: Cell) -> PixelPoint;

    // Dimensions of a terrain surface able to hold the whole map.
    fn surface_extent(&self, zoom: i32) -> Size;

    // Writes one tile/marker footprint: a zoom-sized square block for
    // the orthogonal view, a two-block diamond row for the isometric.
    fn draw_block(&self, batch: &mut PixelBatch, origin: PixelPoint, zoom: i32, color: Rgba8);

    // Decorative compass artwork matching this view's orientation.
    fn compass_image_path(&self) -> &'static str;
}

// ----------------------------------------------
// Orthogonal
// ----------------------------------------------

#[derive(Copy, Clone, Debug)]
pub struct Orthogonal {
    map_size: Size,
}

impl Orthogonal {
    pub fn new(map_size: Size) -> Self {
        Self { map_size }
    }
}

impl Projection for Orthogonal {
    #[inline]
    fn tile_to_pixel(&self, cell: Cell, zoom: i32) -> PixelPoint {
        // -1 on both axes centers the block within the zoomed tile.
        PixelPoint::new((zoom * cell.x) - 1, (zoom * cell.y) - 1)
    }

    #[inline]
    fn pixel_to_tile(&self, point: PixelPoint, zoom: i32) -> Cell {
        Cell::new((point.x + 1) / zoom, (point.y + 1) / zoom)
    }

    #[inline]
    fn observer_offset(&self, cell: Cell) -> PixelPoint {
        PixelPoint::new(cell.x, cell.y)
    }

    #[inline]
    fn surface_extent(&self, zoom: i32) -> Size {
        let side = (self.map_size + zoom).max_side() * zoom;
        Size::new(side, side)
    }

    fn draw_block(&self, batch: &mut PixelBatch, origin: PixelPoint, zoom: i32, color: Rgba8) {
        for l in 0..zoom {
            for k in 0..zoom {
                batch.draw_pixel(origin.x + k, origin.y + l, color);
            }
        }
    }

    fn compass_image_path(&self) -> &'static str {
        "images/menus/compass_ortho.png"
    }
}

// ----------------------------------------------
// Isometric
// ----------------------------------------------

#[derive(Copy, Clone, Debug)]
pub struct Isometric {
    map_size: Size,
}

impl Isometric {
    pub fn new(map_size: Size) -> Self {
        Self { map_size }
    }

    // Diagonal span offset keeping every projected column positive.
    #[inline]
    fn axis_shift(&self) -> i32 {
        self.map_size.max_side()
    }
}

impl Projection for Isometric {
    #[inline]
    fn tile_to_pixel(&self, cell: Cell, zoom: i32) -> PixelPoint {
        PixelPoint::new(
            zoom * (cell.x - cell.y + self.axis_shift()),
            (zoom * (cell.x + cell.y)) - 1,
        )
    }

    #[inline]
    fn pixel_to_tile(&self, point: PixelPoint, zoom: i32) -> Cell {
        let diff = (point.x / zoom) - self.axis_shift(); // x - y
        let sum = (point.y + 1) / zoom;                  // x + y
        Cell::new((sum + diff) / 2, (sum - diff) / 2)
    }

    #[inline]
    fn observer_offset(&self, cell: Cell) -> PixelPoint {
        PixelPoint::new(cell.x - cell.y + self.axis_shift(), cell.x + cell.y)
    }

    #[inline]
    fn surface_extent(&self, zoom: i32) -> Size {
        // Doubled to accommodate the diagonal extent of the projection.
        let side = (self.map_size + zoom).max_side() * 2 * zoom;
        Size::new(side, side)
    }

    fn draw_block(&self, batch: &mut PixelBatch, origin: PixelPoint, zoom: i32, color: Rgba8) {
        // Two columns per tile render the flattened diamond row.
        for l in 0..zoom {
            for k in 0..zoom {
                batch.draw_pixel(origin.x + k, origin.y + l, color);
                batch.draw_pixel(origin.x + k - zoom, origin.y + l, color);
            }
        }
    }

    fn compass_image_path(&self) -> &'static str {
        "images/menus/compass_iso.png"
    }
}

// ----------------------------------------------
// ProjectionKind
// ----------------------------------------------

#[enum_dispatch(Projection)]
#[derive(Copy, Clone, Debug)]
pub enum ProjectionKind {
    Orthogonal,
    Isometric,
}

impl ProjectionKind {
    pub fn orthogonal(map_size: Size) -> Self {
        Self::Orthogonal(Orthogonal::new(map_size))
    }

    pub fn isometric(map_size: Size) -> Self {
        Self::Isometric(Isometric::new(map_size))
    }
}
