use kernelscope_core::buffer::ImageBuffer;
use kernelscope_core::color::{Pixel, Rgb};
use kernelscope_core::kernel::ProductMatrix;

/// Assert every channel of two pixels differs by at most `tolerance`.
pub fn assert_pixel_close(actual: Pixel, expected: Pixel, tolerance: u8) {
    for c in 0..3 {
        let diff = (actual[c] as i16 - expected[c] as i16).unsigned_abs();
        assert!(
            diff <= tolerance as u16,
            "pixel {actual:?} != expected {expected:?} (channel {c} off by {diff}, tolerance {tolerance})"
        );
    }
}

/// Assert two buffers have the same dimensions.
pub fn assert_same_dimensions(a: &ImageBuffer, b: &ImageBuffer) {
    assert_eq!(
        (a.width(), a.height()),
        (b.width(), b.height()),
        "buffer dimensions differ"
    );
}

/// Assert two buffers match pixel for pixel within `tolerance`.
pub fn assert_buffers_close(actual: &ImageBuffer, expected: &ImageBuffer, tolerance: u8) {
    assert_same_dimensions(actual, expected);
    for y in 0..actual.height() {
        for x in 0..actual.width() {
            let (a, e) = (actual.pixel(x, y), expected.pixel(x, y));
            let off = (0..3).any(|c| (a[c] as i16 - e[c] as i16).unsigned_abs() > tolerance as u16);
            assert!(
                !off,
                "pixel ({x}, {y}) is {a:?}, expected {e:?} (tolerance {tolerance})"
            );
        }
    }
}

/// Assert two linear triples agree within `tolerance`.
pub fn assert_rgb_approx(actual: Rgb, expected: Rgb, tolerance: f64) {
    for c in 0..3 {
        assert!(
            (actual[c] - expected[c]).abs() <= tolerance,
            "{actual:?} != expected {expected:?} (channel {c}, tolerance {tolerance})"
        );
    }
}

/// Assert a product matrix equals the given rows exactly.
pub fn assert_matrix_eq<const N: usize>(matrix: &ProductMatrix, expected: &[[f64; N]; N]) {
    assert_eq!(
        matrix.size(),
        N,
        "matrix is {0}x{0}, expected {1}x{1}",
        matrix.size(),
        N
    );
    for (row, cells) in expected.iter().enumerate() {
        for (col, &want) in cells.iter().enumerate() {
            assert_eq!(
                matrix.get(row, col),
                want,
                "cell ({row}, {col}) is {}, expected {want}",
                matrix.get(row, col)
            );
        }
    }
}
