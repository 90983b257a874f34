//! Layout mirrors of msdfgen's bitmap templates.
//!
//! msdfgen declares three class templates that share one shape:
//!
//! ```text
//! template <typename T, int N = 1>
//! class Bitmap { T *pixels; int w, h; };
//! ```
//!
//! `Bitmap` owns its pixel block (allocated with `new[]`, released in its
//! destructor), `BitmapRef` and `BitmapConstRef` only point into memory that
//! somebody else keeps alive. The channel count `N` is a compile-time
//! parameter on the native side and never stored, so the mirrors here are
//! generic over the sample type only.
//!
//! None of these types implement `Drop`. A mirror is a descriptor: it never
//! frees the memory it points at, whoever allocated the block releases it.

use std::fmt;
use std::marker::PhantomData;
use std::os::raw::c_int;
use std::ptr;

/// Mirror of `msdfgen::Bitmap<T, N>`.
///
/// On the native side this type owns `w * h * N` samples. A value built in
/// Rust with [`Bitmap::from_raw_parts`] must therefore never be handed to
/// native code that would destroy it, only passed by pointer.
#[repr(C)]
pub struct Bitmap<T> {
    pub pixels: *mut T,
    pub w: c_int,
    pub h: c_int,
    pub _marker: PhantomData<T>,
}

/// Mirror of `msdfgen::BitmapRef<T, N>`: a mutable, non-owning view.
#[repr(C)]
pub struct BitmapRef<T> {
    pub pixels: *mut T,
    pub w: c_int,
    pub h: c_int,
    pub _marker: PhantomData<T>,
}

/// Mirror of `msdfgen::BitmapConstRef<T, N>`: a read-only, non-owning view.
#[repr(C)]
pub struct BitmapConstRef<T> {
    pub pixels: *const T,
    pub w: c_int,
    pub h: c_int,
    pub _marker: PhantomData<T>,
}

/// Checked `w * h * channels`. `None` for negative dimensions or overflow.
fn checked_samples(w: c_int, h: c_int, channels: usize) -> Option<usize> {
    let w = usize::try_from(w).ok()?;
    let h = usize::try_from(h).ok()?;
    w.checked_mul(h)?.checked_mul(channels)
}

// The three mirrors only differ in pointer constness, so their inherent and
// trait impls are stamped out from one template.
macro_rules! mirror_impls {
    ($name:ident, $ptr:ty, $null:expr) => {
        impl<T> $name<T> {
            /// Null pixels, zero width, zero height. Same bytes as the native
            /// default constructor.
            #[inline]
            pub const fn new() -> Self {
                Self {
                    pixels: $null,
                    w: 0,
                    h: 0,
                    _marker: PhantomData,
                }
            }

            /// Stores exactly `pixels`, `width` and `height`. Nothing is read
            /// through the pointer.
            #[inline]
            pub const fn from_raw_parts(pixels: $ptr, width: c_int, height: c_int) -> Self {
                Self {
                    pixels,
                    w: width,
                    h: height,
                    _marker: PhantomData,
                }
            }

            #[inline]
            pub const fn width(&self) -> c_int {
                self.w
            }

            #[inline]
            pub const fn height(&self) -> c_int {
                self.h
            }

            #[inline]
            pub const fn pixels(&self) -> $ptr {
                self.pixels
            }

            #[inline]
            pub fn is_null(&self) -> bool {
                self.pixels.is_null()
            }

            /// Number of samples the pixel block must hold for `channels`
            /// channels per pixel.
            #[inline]
            pub fn sample_count(&self, channels: usize) -> Option<usize> {
                checked_samples(self.w, self.h, channels)
            }

            /// Pointer form taken by bindgen-generated functions.
            #[inline]
            pub fn as_ptr(&self) -> *const Self {
                self as *const Self
            }
        }

        impl<T> Default for $name<T> {
            fn default() -> Self {
                Self::new()
            }
        }

        impl<T> Clone for $name<T> {
            fn clone(&self) -> Self {
                *self
            }
        }

        impl<T> Copy for $name<T> {}

        impl<T> PartialEq for $name<T> {
            fn eq(&self, other: &Self) -> bool {
                ptr::eq(self.pixels, other.pixels) && self.w == other.w && self.h == other.h
            }
        }

        impl<T> Eq for $name<T> {}

        impl<T> fmt::Debug for $name<T> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("pixels", &self.pixels)
                    .field("w", &self.w)
                    .field("h", &self.h)
                    .finish()
            }
        }

        // SAFETY: a null pointer, two zero ints and a ZST marker are valid.
        unsafe impl<T> bytemuck::Zeroable for $name<T> {}
    };
}

mirror_impls!(Bitmap, *mut T, ptr::null_mut());
mirror_impls!(BitmapRef, *mut T, ptr::null_mut());
mirror_impls!(BitmapConstRef, *const T, ptr::null());

// Native `Bitmap` converts implicitly to both view kinds, and `BitmapRef`
// to `BitmapConstRef`.

impl<T> From<Bitmap<T>> for BitmapRef<T> {
    fn from(b: Bitmap<T>) -> Self {
        BitmapRef::from_raw_parts(b.pixels, b.w, b.h)
    }
}

impl<T> From<Bitmap<T>> for BitmapConstRef<T> {
    fn from(b: Bitmap<T>) -> Self {
        BitmapConstRef::from_raw_parts(b.pixels, b.w, b.h)
    }
}

impl<T> From<BitmapRef<T>> for BitmapConstRef<T> {
    fn from(r: BitmapRef<T>) -> Self {
        BitmapConstRef::from_raw_parts(r.pixels, r.w, r.h)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};

    fn field_at<T: Copy, U>(value: &U, offset: usize) -> T {
        // SAFETY: tests only read plain integer / pointer fields inside `U`.
        unsafe { ptr::read_unaligned((value as *const U as *const u8).add(offset) as *const T) }
    }

    #[test]
    fn default_is_null_and_empty() {
        let b = Bitmap::<f32>::default();
        assert!(b.is_null());
        assert_eq!((b.width(), b.height()), (0, 0));

        let r = BitmapRef::<u8>::new();
        assert!(r.is_null());
        assert_eq!((r.w, r.h), (0, 0));

        let c = BitmapConstRef::<f32>::default();
        assert!(c.is_null());
        assert_eq!(c.sample_count(3), Some(0));
    }

    #[test]
    fn default_bytes_are_all_zero() {
        let view = BitmapConstRef::<f32>::new();
        let bytes: [u8; size_of::<BitmapConstRef<f32>>()] =
            unsafe { std::mem::transmute(view) };
        assert!(bytes.iter().all(|&b| b == 0));

        let zeroed: Bitmap<u8> = bytemuck::Zeroable::zeroed();
        assert_eq!(zeroed, Bitmap::new());
    }

    #[test]
    fn dimensions_sit_after_the_pointer() {
        let mut samples = [0.0f32; 6];
        let b = Bitmap::from_raw_parts(samples.as_mut_ptr(), 3, 2);
        let ptr_size = size_of::<*mut f32>();

        let p: *mut f32 = field_at(&b, 0);
        let w: c_int = field_at(&b, ptr_size);
        let h: c_int = field_at(&b, ptr_size + size_of::<c_int>());
        assert_eq!(p, samples.as_mut_ptr());
        assert_eq!((w, h), (3, 2));
    }

    #[test]
    fn marker_adds_no_bytes() {
        assert_eq!(size_of::<PhantomData<f32>>(), 0);
        let expected = (size_of::<*mut u8>() + 2 * size_of::<c_int>())
            .next_multiple_of(align_of::<*mut u8>());
        assert_eq!(size_of::<Bitmap<u8>>(), expected);
        assert_eq!(size_of::<BitmapRef<f32>>(), expected);
        assert_eq!(size_of::<BitmapConstRef<f32>>(), expected);
    }

    #[test]
    fn conversions_keep_pointer_and_dimensions() {
        let mut samples = vec![0u8; 4 * 4 * 3];
        let owner = Bitmap::from_raw_parts(samples.as_mut_ptr(), 4, 4);

        let r: BitmapRef<u8> = owner.into();
        assert_eq!((r.pixels(), r.width(), r.height()), (samples.as_mut_ptr(), 4, 4));

        let c: BitmapConstRef<u8> = r.into();
        assert_eq!(c.pixels(), samples.as_ptr());
        assert_eq!(c.sample_count(3), Some(samples.len()));

        let c2 = BitmapConstRef::from(owner);
        assert_eq!(c, c2);
    }

    #[test]
    fn sample_count_rejects_negative_and_overflow() {
        let neg = BitmapRef::<f32>::from_raw_parts(ptr::null_mut(), -1, 4);
        assert_eq!(neg.sample_count(1), None);

        let big = BitmapRef::<f32>::from_raw_parts(ptr::null_mut(), c_int::MAX, c_int::MAX);
        assert_eq!(big.sample_count(8), None);
    }
}
