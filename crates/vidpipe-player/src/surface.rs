use vidpipe_frame::Pixels;

/// The rendering collaborator that receives decoded pixels.
///
/// Texture upload and drawing live outside vidpipe; implementors bridge to
/// whatever graphics stack the application uses.
pub trait RenderSurface: Send {
    /// Whether the surface can accept frames.
    fn is_ready(&self) -> bool;

    /// (Re)allocate backing storage for frames of the given size.
    fn allocate(&mut self, width: usize, height: usize, channels: usize);

    /// Receive a fresh frame.
    fn upload(&mut self, pixels: &Pixels);

    fn draw(&mut self, x: f32, y: f32);

    fn draw_scaled(&mut self, x: f32, y: f32, width: f32, height: f32);
}

/// A surface that accepts everything and draws nothing.
///
/// Ready once allocated, like a real texture.
#[derive(Debug, Default)]
pub struct NullSurface {
    allocated: bool,
}

impl NullSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RenderSurface for NullSurface {
    fn is_ready(&self) -> bool {
        self.allocated
    }

    fn allocate(&mut self, _width: usize, _height: usize, _channels: usize) {
        self.allocated = true;
    }

    fn upload(&mut self, _pixels: &Pixels) {}

    fn draw(&mut self, _x: f32, _y: f32) {}

    fn draw_scaled(&mut self, _x: f32, _y: f32, _width: f32, _height: f32) {}
}
