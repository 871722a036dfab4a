//! Synthetic still frames.

/// Eight vertical bars (white, yellow, cyan, green, magenta, red, blue,
/// black) as (Y, U, V).
const BARS: [(u8, u8, u8); 8] = [
    (235, 128, 128),
    (210, 16, 146),
    (170, 166, 16),
    (145, 54, 34),
    (106, 202, 222),
    (81, 90, 240),
    (41, 240, 110),
    (16, 128, 128),
];

/// Packed YUYV 4:2:2 colour bars, two bytes per pixel.
///
/// An odd trailing column gets a luma sample only.
pub fn color_bars(width: u32, height: u32) -> Vec<u8> {
    let width = width as usize;
    let height = height as usize;
    let mut data = vec![0u8; width * height * 2];
    if width == 0 {
        return data;
    }

    for row in data.chunks_exact_mut(width * 2) {
        for (pair, px) in row.chunks_mut(4).enumerate() {
            let x = pair * 2;
            let (y, u, v) = BARS[(x * BARS.len() / width).min(BARS.len() - 1)];
            px[0] = y;
            if px.len() == 4 {
                px[1] = u;
                px[2] = y;
                px[3] = v;
            }
        }
    }
    data
}
