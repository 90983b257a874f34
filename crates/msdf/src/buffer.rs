//! Rust-owned pixel storage and the borrowed views handed to msdfgen.
//!
//! [`BitmapBuffer`] owns its samples the way `msdfgen::Bitmap` does, but the
//! memory comes from Rust's allocator, so native code must only ever see it
//! through a pointer and never destroy it. [`BitmapView`] and
//! [`BitmapViewMut`] carry the `BitmapConstRef` / `BitmapRef` mirrors with a
//! lifetime tied to the storage they point into.

use std::fmt;
use std::marker::PhantomData;
use std::mem::size_of;
use std::os::raw::c_int;
use std::slice;

use image::{ImageBuffer, Pixel};
use log::debug;
use msdf_sys::{Bitmap, BitmapConstRef, BitmapRef};

use crate::error::{MsdfError, Result};

/// Image type backing a buffer of pixel kind `P`.
pub type PixelImage<P> = ImageBuffer<P, Vec<<P as Pixel>::Subpixel>>;

/// Validates `width` x `height` for pixel kind `P` and returns the number of
/// samples the storage must hold. The byte size must stay within
/// `isize::MAX`, the allocator's limit.
fn sample_len<P: Pixel>(width: u32, height: u32) -> Result<usize> {
    if c_int::try_from(width).is_err() || c_int::try_from(height).is_err() {
        return Err(MsdfError::DimensionsTooLarge { width, height });
    }
    let channels = P::CHANNEL_COUNT as usize;
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(channels))
        .filter(|&n| {
            n.checked_mul(size_of::<P::Subpixel>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or(MsdfError::CapacityOverflow {
            width,
            height,
            channels,
        })
}

/// Owning, contiguous pixel storage.
///
/// Holds exactly `width * height * P::CHANNEL_COUNT` samples, row-major with
/// interleaved channels, and both dimensions fit in a C `int`.
pub struct BitmapBuffer<P: Pixel> {
    image: PixelImage<P>,
}

impl<P: Pixel> BitmapBuffer<P> {
    /// Zero-filled buffer.
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let len = sample_len::<P>(width, height)?;
        debug!(
            "allocating {}x{} bitmap, {} channel(s), {} samples",
            width,
            height,
            P::CHANNEL_COUNT,
            len
        );
        Ok(Self {
            image: ImageBuffer::new(width, height),
        })
    }

    pub fn from_image(image: PixelImage<P>) -> Result<Self> {
        let (width, height) = image.dimensions();
        let expected = sample_len::<P>(width, height)?;
        let actual = image.as_raw().len();
        if actual != expected {
            return Err(MsdfError::BufferSizeMismatch {
                width,
                height,
                channels: P::CHANNEL_COUNT as usize,
                expected,
                actual,
            });
        }
        Ok(Self { image })
    }

    /// Takes ownership of `samples`, which must hold exactly
    /// `width * height * channels` values.
    pub fn from_raw(width: u32, height: u32, samples: Vec<P::Subpixel>) -> Result<Self> {
        let expected = sample_len::<P>(width, height)?;
        let mismatch = MsdfError::BufferSizeMismatch {
            width,
            height,
            channels: P::CHANNEL_COUNT as usize,
            expected,
            actual: samples.len(),
        };
        if samples.len() != expected {
            return Err(mismatch);
        }
        let image = ImageBuffer::from_raw(width, height, samples).ok_or(mismatch)?;
        Ok(Self { image })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    #[inline]
    pub fn channels(&self) -> usize {
        P::CHANNEL_COUNT as usize
    }

    #[inline]
    pub fn samples(&self) -> &[P::Subpixel] {
        self.image.as_raw()
    }

    #[inline]
    pub fn samples_mut(&mut self) -> &mut [P::Subpixel] {
        &mut self.image
    }

    /// Samples as raw bytes, e.g. for a texture upload.
    pub fn as_bytes(&self) -> &[u8]
    where
        P::Subpixel: bytemuck::Pod,
    {
        bytemuck::cast_slice(self.samples())
    }

    pub fn image(&self) -> &PixelImage<P> {
        &self.image
    }

    pub fn into_image(self) -> PixelImage<P> {
        self.image
    }

    pub fn view(&self) -> BitmapView<'_, P> {
        BitmapView::from_image_unchecked(&self.image)
    }

    pub fn view_mut(&mut self) -> BitmapViewMut<'_, P> {
        BitmapViewMut::from_image_unchecked(&mut self.image)
    }

    /// Runs `f` with a `msdfgen::Bitmap` descriptor of this buffer.
    ///
    /// The descriptor aliases Rust-owned memory: pass it by pointer only, and
    /// do not let it escape `f`.
    pub fn with_sys_bitmap<R>(&mut self, f: impl FnOnce(&Bitmap<P::Subpixel>) -> R) -> R {
        let (w, h) = self.image.dimensions();
        let bitmap = Bitmap::from_raw_parts(self.image.as_mut_ptr(), w as c_int, h as c_int);
        f(&bitmap)
    }
}

impl<P: Pixel> Clone for BitmapBuffer<P> {
    fn clone(&self) -> Self {
        Self {
            image: self.image.clone(),
        }
    }
}

impl<P: Pixel> fmt::Debug for BitmapBuffer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BitmapBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("channels", &self.channels())
            .finish()
    }
}

/// Read-only view: a `BitmapConstRef` that cannot outlive its storage.
pub struct BitmapView<'a, P: Pixel> {
    raw: BitmapConstRef<P::Subpixel>,
    _borrow: PhantomData<&'a [P::Subpixel]>,
    _pixel: PhantomData<P>,
}

impl<'a, P: Pixel> BitmapView<'a, P> {
    /// Null, 0x0 view; same state as the native default constructor.
    pub fn empty() -> Self {
        Self {
            raw: BitmapConstRef::new(),
            _borrow: PhantomData,
            _pixel: PhantomData,
        }
    }

    pub fn from_image(image: &'a PixelImage<P>) -> Result<Self> {
        let (w, h) = image.dimensions();
        sample_len::<P>(w, h)?;
        Ok(Self::from_image_unchecked(image))
    }

    fn from_image_unchecked(image: &'a PixelImage<P>) -> Self {
        let (w, h) = image.dimensions();
        Self {
            raw: BitmapConstRef::from_raw_parts(image.as_ptr(), w as c_int, h as c_int),
            _borrow: PhantomData,
            _pixel: PhantomData,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.raw.width() as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.raw.height() as u32
    }

    pub fn samples(&self) -> &'a [P::Subpixel] {
        let len = self.raw.sample_count(P::CHANNEL_COUNT as usize).unwrap_or(0);
        if len == 0 || self.raw.is_null() {
            return &[];
        }
        // SAFETY: the pointer came from a live `&'a` image holding `len`
        // samples (checked when the view was built).
        unsafe { slice::from_raw_parts(self.raw.pixels(), len) }
    }

    /// The mirror to pass to native code.
    pub fn as_raw(&self) -> &BitmapConstRef<P::Subpixel> {
        &self.raw
    }
}

impl<P: Pixel> Clone for BitmapView<'_, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Pixel> Copy for BitmapView<'_, P> {}

impl<P: Pixel> fmt::Debug for BitmapView<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BitmapView").field(&self.raw).finish()
    }
}

// SAFETY: a view behaves like `&'a [S]`.
unsafe impl<P: Pixel> Send for BitmapView<'_, P> where P::Subpixel: Sync {}
unsafe impl<P: Pixel> Sync for BitmapView<'_, P> where P::Subpixel: Sync {}

/// Mutable view: a `BitmapRef` holding an exclusive borrow of its storage.
pub struct BitmapViewMut<'a, P: Pixel> {
    raw: BitmapRef<P::Subpixel>,
    _borrow: PhantomData<&'a mut [P::Subpixel]>,
    _pixel: PhantomData<P>,
}

impl<'a, P: Pixel> BitmapViewMut<'a, P> {
    pub fn empty() -> Self {
        Self {
            raw: BitmapRef::new(),
            _borrow: PhantomData,
            _pixel: PhantomData,
        }
    }

    pub fn from_image(image: &'a mut PixelImage<P>) -> Result<Self> {
        let (w, h) = image.dimensions();
        sample_len::<P>(w, h)?;
        Ok(Self::from_image_unchecked(image))
    }

    fn from_image_unchecked(image: &'a mut PixelImage<P>) -> Self {
        let (w, h) = image.dimensions();
        Self {
            raw: BitmapRef::from_raw_parts(image.as_mut_ptr(), w as c_int, h as c_int),
            _borrow: PhantomData,
            _pixel: PhantomData,
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.raw.width() as u32
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.raw.height() as u32
    }

    fn len(&self) -> usize {
        if self.raw.is_null() {
            return 0;
        }
        self.raw.sample_count(P::CHANNEL_COUNT as usize).unwrap_or(0)
    }

    pub fn samples(&self) -> &[P::Subpixel] {
        match self.len() {
            0 => &[],
            // SAFETY: see `samples_mut`.
            len => unsafe { slice::from_raw_parts(self.raw.pixels(), len) },
        }
    }

    pub fn samples_mut(&mut self) -> &mut [P::Subpixel] {
        match self.len() {
            0 => &mut [],
            // SAFETY: the pointer came from a live `&'a mut` image holding
            // `len` samples, and `&mut self` keeps the access exclusive.
            len => unsafe { slice::from_raw_parts_mut(self.raw.pixels(), len) },
        }
    }

    /// Reborrows as a read-only view.
    pub fn as_const(&self) -> BitmapView<'_, P> {
        BitmapView {
            raw: self.raw.into(),
            _borrow: PhantomData,
            _pixel: PhantomData,
        }
    }

    /// The mirror to pass to native code that writes through it.
    pub fn as_raw(&mut self) -> &BitmapRef<P::Subpixel> {
        &self.raw
    }
}

impl<P: Pixel> fmt::Debug for BitmapViewMut<'_, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BitmapViewMut").field(&self.raw).finish()
    }
}

// SAFETY: a mutable view behaves like `&'a mut [S]`.
unsafe impl<P: Pixel> Send for BitmapViewMut<'_, P> where P::Subpixel: Send {}
unsafe impl<P: Pixel> Sync for BitmapViewMut<'_, P> where P::Subpixel: Sync {}
