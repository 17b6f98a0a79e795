use crate::math::edge_function;
use crate::scene::Rgb;
use crate::vertex::Vertex;

/// Color and depth buffers for one frame
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    pixels: Vec<Rgb>,
    z_buffer: Vec<f64>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        FrameBuffer {
            width,
            height,
            pixels: vec![Rgb::BLACK; width * height],
            z_buffer: vec![f64::INFINITY; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels = vec![Rgb::BLACK; width * height];
        self.z_buffer = vec![f64::INFINITY; width * height];
    }

    pub fn clear(&mut self) {
        self.pixels.fill(Rgb::BLACK);
        self.z_buffer.fill(f64::INFINITY);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Rgb {
        self.pixels[y * self.width + x]
    }

    #[cfg(test)]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Writes a pixel if it passes the depth test. Returns whether it was written.
    pub fn plot(&mut self, x: isize, y: isize, depth: f64, color: Rgb) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        let offset = y as usize * self.width + x as usize;
        if depth < self.z_buffer[offset] {
            self.z_buffer[offset] = depth;
            self.pixels[offset] = color;
            true
        } else {
            false
        }
    }
}

/// Fills a triangle with a flat color, depth-tested. Both windings are drawn.
pub fn draw_triangle(v0: &Vertex, v1: &Vertex, v2: &Vertex, frame: &mut FrameBuffer, color: Rgb) {
    if frame.width == 0 || frame.height == 0 {
        return;
    }
    let (width, height) = (frame.width, frame.height);

    // Compute bounding box of the triangle
    let min_x = v0.screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0) as usize;
    let max_x = v0.screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(width as f64 - 1.0);
    let min_y = v0.screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0) as usize;
    let max_y = v0.screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(height as f64 - 1.0);
    if max_x < 0.0 || max_y < 0.0 {
        return;
    }
    let (max_x, max_y) = (max_x as usize, max_y as usize);

    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area == 0.0 {
        return;
    }

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = [x as f64 + 0.5, y as f64 + 0.5];

            // Barycentric weights; dividing by the signed area normalizes either winding
            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p) / area;
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p) / area;
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p) / area;

            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;
                frame.plot(x as isize, y as isize, depth, color);
            }
        }
    }
}

/// Draws a depth-tested line between two vertices using Bresenham's
/// algorithm. Widths above one thicken the line to the right and below.
pub fn draw_line(v0: &Vertex, v1: &Vertex, frame: &mut FrameBuffer, color: Rgb, line_width: u32) {
    let (mut x0, mut y0, x1, y1) = (
        v0.screen_position[0].round() as isize,
        v0.screen_position[1].round() as isize,
        v1.screen_position[0].round() as isize,
        v1.screen_position[1].round() as isize,
    );
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy; // error value e_xy

    let steps = dx.max(-dy).max(1) as f64;
    let brush = line_width.max(1) as isize;
    let mut step = 0.0;

    loop {
        let depth = v0.depth + (v1.depth - v0.depth) * (step / steps);
        for oy in 0..brush {
            for ox in 0..brush {
                frame.plot(x0 + ox, y0 + oy, depth, color);
            }
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
        step += 1.0;
    }
}

/// Clips a 2D segment to the rectangle `[0, width] x [0, height]`
/// (Liang-Barsky). Returns the parametric range kept, if any.
pub fn clip_segment_to_rect(
    a: &[f64; 2],
    b: &[f64; 2],
    width: f64,
    height: f64,
) -> Option<(f64, f64)> {
    let d = [b[0] - a[0], b[1] - a[1]];
    let mut t0: f64 = 0.0;
    let mut t1: f64 = 1.0;

    for (p, q) in [
        (-d[0], a[0]),
        (d[0], width - a[0]),
        (-d[1], a[1]),
        (d[1], height - a[1]),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }

    if t0 > t1 {
        None
    } else {
        Some((t0, t1))
    }
}
