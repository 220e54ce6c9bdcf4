//! Structs and functions for handling textures.
//!
//! The module provides the [`Texture`] struct which is a CPU representation of a GPU texture.
//! Images are decoded with the `image` crate, flipped so the first row is the bottom one,
//! uploaded, and the decoded pixels are dropped right away.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use super::driver::{
    DriverRef, PixelFormat, TextureFilter, TextureId, TextureParameter, TextureWrap,
};
use crate::error::TextureError;

/// Represents a texture stored on the GPU side.
pub struct Texture {
    driver: DriverRef,
    id: Option<TextureId>,
    path: Option<PathBuf>,
    width: u32,
    height: u32,
    channels: u8,
}

impl Texture {
    /// Decodes the image at `path` and uploads it.
    ///
    /// Nothing is allocated on the driver if decoding fails.
    pub fn load(driver: &DriverRef, path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let image = image::open(path).map_err(|e| TextureError::Load {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut texture = Self::from_image(driver, &image)?;
        texture.path = Some(path.to_path_buf());
        log::debug!(
            "Loaded texture {:?} ({}x{}, {} channels)",
            path,
            texture.width,
            texture.height,
            texture.channels
        );
        Ok(texture)
    }

    /// Uploads a decoded image, flipped vertically. Images with alpha keep it.
    pub fn from_image(driver: &DriverRef, image: &DynamicImage) -> Result<Self, TextureError> {
        let image = image.flipv();
        let (channels, pixels) = if image.color().has_alpha() {
            (4, image.to_rgba8())
        } else {
            let rgb = image.to_rgb8();
            return Self::from_pixels(driver, rgb.width(), rgb.height(), 3, rgb.as_raw());
        };
        Self::from_pixels(driver, pixels.width(), pixels.height(), channels, pixels.as_raw())
    }

    /// Creates a new texture from raw, tightly packed pixel rows.
    pub fn from_pixels(
        driver: &DriverRef,
        width: u32,
        height: u32,
        channels: u8,
        pixels: &[u8],
    ) -> Result<Self, TextureError> {
        let format =
            PixelFormat::from_channels(channels).ok_or(TextureError::UnsupportedChannels(channels))?;
        let expected = width as usize * height as usize * channels as usize;
        if pixels.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }

        let id = driver.create_texture().map_err(TextureError::Driver)?;
        driver.bind_texture(Some(id));
        driver.tex_parameter(TextureParameter::WrapS(TextureWrap::Repeat));
        driver.tex_parameter(TextureParameter::WrapT(TextureWrap::Repeat));
        driver.tex_parameter(TextureParameter::MinFilter(TextureFilter::Linear));
        driver.tex_parameter(TextureParameter::MagFilter(TextureFilter::Linear));
        driver.tex_image_2d(width, height, format, pixels);
        driver.generate_mipmap();
        driver.bind_texture(None);

        Ok(Self {
            driver: DriverRef::clone(driver),
            id: Some(id),
            path: None,
            width,
            height,
            channels,
        })
    }

    /// Binds the texture to texture unit `slot`.
    pub fn bind(&self, slot: u32) {
        self.driver.active_texture(slot);
        self.driver.bind_texture(self.id);
    }

    pub fn unbind(&self) {
        self.driver.bind_texture(None);
    }

    /// Releases the GPU texture and forgets its metadata. Calling it again does nothing.
    pub fn clear(&mut self) {
        if let Some(id) = self.id.take() {
            self.driver.delete_texture(id);
        }
        self.path = None;
        self.width = 0;
        self.height = 0;
        self.channels = 0;
    }

    pub fn is_loaded(&self) -> bool {
        self.id.is_some()
    }

    pub fn id(&self) -> Option<TextureId> {
        self.id
    }

    /// The file this texture was loaded from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn channels(&self) -> u8 {
        self.channels
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.clear();
    }
}
