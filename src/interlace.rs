/// Placement of one reduced image inside the full image: pixel `(x, y)` of
/// the pass lands at `(x * x_factor + x_offset, y * y_factor + y_offset)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PassGeometry {
    pub x_factor: u32,
    pub y_factor: u32,
    pub x_offset: u32,
    pub y_offset: u32,
}

impl PassGeometry {
    /// A non-interlaced image is a single pass covering every pixel.
    pub const FULL: PassGeometry = PassGeometry::new(1, 1, 0, 0);

    const fn new(x_factor: u32, y_factor: u32, x_offset: u32, y_offset: u32) -> Self {
        Self { x_factor, y_factor, x_offset, y_offset }
    }

    /// Width and height of this pass for an image of the given size. Either
    /// may be zero, in which case the pass holds no data at all.
    pub fn dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        (
            reduced_len(width, self.x_offset, self.x_factor),
            reduced_len(height, self.y_offset, self.y_factor),
        )
    }

    /// Copies one row of RGBA8 pass pixels into `output_rgba`, an image
    /// `image_width` pixels wide.
    pub(crate) fn scatter_row(
        &self,
        pass_y: u32,
        row_rgba: &[u8],
        image_width: usize,
        output_rgba: &mut [u8],
    ) {
        let output_y = (pass_y * self.y_factor + self.y_offset) as usize;
        let row_start = output_y * image_width * 4;

        if self.x_factor == 1 && self.x_offset == 0 {
            output_rgba[row_start..row_start + row_rgba.len()].copy_from_slice(row_rgba);
            return;
        }

        let x_factor = self.x_factor as usize;
        let x_offset = self.x_offset as usize;

        for (x, pixel) in row_rgba.chunks_exact(4).enumerate() {
            let output_idx = row_start + (x * x_factor + x_offset) * 4;
            output_rgba[output_idx..output_idx + 4].copy_from_slice(pixel);
        }
    }
}

fn reduced_len(len: u32, offset: u32, factor: u32) -> u32 {
    if len <= offset {
        0
    } else {
        (len - offset + factor - 1) / factor
    }
}

// Adam7 Interlacing Pattern
// 1 6 4 6 2 6 4 6
// 7 7 7 7 7 7 7 7
// 5 6 5 6 5 6 5 6
// 7 7 7 7 7 7 7 7
// 3 6 4 6 3 6 4 6
// 7 7 7 7 7 7 7 7
// 5 6 5 6 5 6 5 6
// 7 7 7 7 7 7 7 7
pub const ADAM7_PASSES: [PassGeometry; 7] = [
    PassGeometry::new(8, 8, 0, 0),
    PassGeometry::new(8, 8, 4, 0),
    PassGeometry::new(4, 8, 0, 4),
    PassGeometry::new(4, 4, 2, 0),
    PassGeometry::new(2, 4, 0, 2),
    PassGeometry::new(2, 2, 1, 0),
    PassGeometry::new(1, 2, 0, 1),
];
