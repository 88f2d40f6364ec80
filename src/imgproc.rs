//! Image processing helpers: grayscale conversion and region blur.
//!
//! All pixel work delegates to the `image` crate; this module only adds the
//! region discipline (clamp, blur in place, touch nothing else).

use image::{imageops, GrayImage, RgbImage};

use crate::detect::FaceRect;

/// Grayscale conversion for detector input.
pub fn grayscale(img: &RgbImage) -> GrayImage {
    imageops::grayscale(img)
}

/// Gaussian-blur one region of `img` in place.
///
/// The rect is clamped to the image bounds first; a rect that clamps to
/// nothing is skipped. Pixels outside the clamped rect are left untouched.
pub fn blur_region(img: &mut RgbImage, rect: FaceRect, sigma: f32) {
    let Some(rect) = rect.clamp_to(img.width(), img.height()) else {
        return;
    };
    let region = imageops::crop_imm(img, rect.x, rect.y, rect.width, rect.height).to_image();
    let blurred = imageops::blur(&region, sigma);
    imageops::replace(img, &blurred, i64::from(rect.x), i64::from(rect.y));
}

/// Blur every detected face region on the color frame.
pub fn blur_faces(img: &mut RgbImage, faces: &[FaceRect], sigma: f32) {
    for face in faces {
        blur_region(img, *face, sigma);
    }
}
