/// Vertex projected onto the output surface
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vertex {
    /// Pixel coordinates, origin at the top-left corner
    pub screen_position: [f64; 2],
    /// Normalized device depth in [-1, 1]; smaller is closer
    pub depth: f64,
}
