use crate::common::BitMatrix;

use super::{PixelBuffer, OPAQUE_BLACK, TRANSPARENT};

// Bit matrix to pixels
// Output takes the matrix's own dimensions, which can differ from the
// requested size once the writer has added its quiet zone
//------------------------------------------------------------------------------

pub fn render(matrix: &BitMatrix) -> PixelBuffer {
    let (w, h) = (matrix.width(), matrix.height());
    let mut buf = PixelBuffer::new(w, h);
    for y in 0..h {
        for x in 0..w {
            buf.put(x, y, if matrix.get(x, y) { OPAQUE_BLACK } else { TRANSPARENT });
        }
    }
    buf
}

#[cfg(test)]
mod render_tests {
    use super::render;
    use crate::common::BitMatrix;
    use crate::raster::{OPAQUE_BLACK, TRANSPARENT};

    #[test]
    fn test_render_keeps_matrix_size() {
        let m = BitMatrix::new(7, 3);
        let buf = render(&m);
        assert_eq!((buf.width(), buf.height()), (7, 3));
    }

    #[test]
    fn test_render_two_tone() {
        let m = BitMatrix::from_fn(4, 4, |x, y| (x + y) % 2 == 0);
        let buf = render(&m);
        for y in 0..4 {
            for x in 0..4 {
                let exp = if (x + y) % 2 == 0 { OPAQUE_BLACK } else { TRANSPARENT };
                assert_eq!(buf.get(x, y), exp, "pixel ({x}, {y})");
            }
        }
    }
}
