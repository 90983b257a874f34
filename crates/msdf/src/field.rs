//! Distance field containers.
//!
//! A distance field is a float bitmap plus the two numbers needed to read it
//! back: the distance `range` (in shape units) the samples were scaled by,
//! and the `mid_value` that marks the shape's edge.

use image::{Luma, Rgb, Rgba};

use crate::buffer::{BitmapBuffer, BitmapView, BitmapViewMut, PixelImage};
use crate::error::Result;

/// Edge value msdfgen writes for every field kind.
pub const DEFAULT_MID_VALUE: f32 = 0.5;

pub type GrayFImage = PixelImage<Luma<f32>>;

pub trait DistanceField: Sized {
    type Pixel: image::Pixel<Subpixel = f32>;

    fn from_buffer(buffer: BitmapBuffer<Self::Pixel>, range: f64, mid_value: f32) -> Self;
    fn buffer(&self) -> &BitmapBuffer<Self::Pixel>;
    fn buffer_mut(&mut self) -> &mut BitmapBuffer<Self::Pixel>;
    fn into_buffer(self) -> BitmapBuffer<Self::Pixel>;
    fn range(&self) -> f64;
    fn mid_value(&self) -> f32;

    /// Zeroed field of the given size, ready for native code to fill.
    fn new(width: u32, height: u32, range: f64) -> Result<Self> {
        Ok(Self::from_buffer(
            BitmapBuffer::new(width, height)?,
            range,
            DEFAULT_MID_VALUE,
        ))
    }

    fn from_image(image: PixelImage<Self::Pixel>, range: f64, mid_value: f32) -> Result<Self> {
        Ok(Self::from_buffer(
            BitmapBuffer::from_image(image)?,
            range,
            mid_value,
        ))
    }

    fn image(&self) -> &PixelImage<Self::Pixel> {
        self.buffer().image()
    }

    fn to_image(self) -> PixelImage<Self::Pixel> {
        self.into_buffer().into_image()
    }

    fn view(&self) -> BitmapView<'_, Self::Pixel> {
        self.buffer().view()
    }

    fn view_mut(&mut self) -> BitmapViewMut<'_, Self::Pixel> {
        self.buffer_mut().view_mut()
    }
}

macro_rules! distance_field {
    ($(#[$doc:meta])* $name:ident, $pixel:ty) => {
        $(#[$doc])*
        #[derive(Clone, Debug)]
        pub struct $name {
            buffer: BitmapBuffer<$pixel>,
            range: f64,
            mid_value: f32,
        }

        impl DistanceField for $name {
            type Pixel = $pixel;

            fn from_buffer(buffer: BitmapBuffer<$pixel>, range: f64, mid_value: f32) -> Self {
                Self {
                    buffer,
                    range,
                    mid_value,
                }
            }

            fn buffer(&self) -> &BitmapBuffer<$pixel> {
                &self.buffer
            }

            fn buffer_mut(&mut self) -> &mut BitmapBuffer<$pixel> {
                &mut self.buffer
            }

            fn into_buffer(self) -> BitmapBuffer<$pixel> {
                self.buffer
            }

            fn range(&self) -> f64 {
                self.range
            }

            fn mid_value(&self) -> f32 {
                self.mid_value
            }
        }
    };
}

distance_field!(
    /// Conventional single-channel signed distance field.
    Sdf,
    Luma<f32>
);
distance_field!(
    /// Multi-channel signed distance field, one channel per edge color.
    Msdf,
    Rgb<f32>
);
distance_field!(
    /// Multi-channel field with the true distance in the alpha channel.
    Mtsdf,
    Rgba<f32>
);
