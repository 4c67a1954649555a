use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use super::DisplayMode;
use crate::app::scene::View;
use crate::raster::Surface;

/// Double-buffered presentation: scenes draw into the back buffer through a
/// `Surface`, then the finished frame is handed to the GPU surface in one
/// render call. The back buffer keeps the fixed logical resolution of the
/// configured display mode regardless of the OS surface size.
pub struct Presenter {
    window: &'static Window,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
}

impl Presenter {
    pub fn new(window: &'static Window, mode: DisplayMode) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(window, size.width, size.height, mode)?;
        Ok(Self {
            window,
            pixels,
            width: mode.width(),
            height: mode.height(),
        })
    }

    pub fn resize_surface(&mut self, surface_width: u32, surface_height: u32) -> Result<(), Error> {
        if surface_width == 0 || surface_height == 0 {
            return Ok(());
        }
        let mode_size = (self.width, self.height);
        self.pixels = {
            let surface = SurfaceTexture::new(surface_width, surface_height, self.window);
            Pixels::new(mode_size.0, mode_size.1, surface)?
        };
        Ok(())
    }

    fn build_pixels(
        window: &'static Window,
        surface_width: u32,
        surface_height: u32,
        mode: DisplayMode,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(mode.width(), mode.height(), surface)
    }

    /// Draws the active scene into the back buffer and presents it.
    pub fn present(&mut self, view: &View) -> Result<(), Error> {
        let frame = self.pixels.frame_mut();
        let mut surface = Surface::new(frame, self.width, self.height);
        view.render(&mut surface);
        self.pixels.render()
    }
}
