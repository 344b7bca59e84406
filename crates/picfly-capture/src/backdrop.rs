use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, RgbaImage, imageops};
use picfly_types::{Point, ScreenBounds, SelectionRect};

use crate::CaptureError;

/// Snapshot of the whole virtual desktop, taken before the overlay is shown.
pub struct Backdrop {
    image: RgbaImage,
    origin: Point,
}

impl Backdrop {
    /// `origin` is the virtual-screen position of the image's top-left pixel.
    pub fn new(image: RgbaImage, origin: Point) -> Self {
        Self { image, origin }
    }

    /// Paint every monitor image at its offset inside the combined virtual screen.
    pub fn compose<I>(monitors: I) -> Result<Self, CaptureError>
    where
        I: IntoIterator<Item = (ScreenBounds, RgbaImage)>,
    {
        let monitors: Vec<_> = monitors.into_iter().collect();
        let bounds = ScreenBounds::union_of(monitors.iter().map(|(b, _)| *b))
            .ok_or_else(|| CaptureError::Backdrop("no monitor found".into()))?;

        let mut canvas = RgbaImage::new(bounds.width, bounds.height);
        for (monitor, image) in &monitors {
            let at = bounds.to_local(Point::new(monitor.x, monitor.y));
            imageops::replace(&mut canvas, image, i64::from(at.x), i64::from(at.y));
        }

        Ok(Self::new(canvas, Point::new(bounds.x, bounds.y)))
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn bounds(&self) -> ScreenBounds {
        ScreenBounds {
            x: self.origin.x,
            y: self.origin.y,
            width: self.image.width(),
            height: self.image.height(),
        }
    }

    /// The backdrop's own pixel area, in overlay-local coordinates.
    pub fn extent(&self) -> SelectionRect {
        SelectionRect::from_origin_size(0, 0, self.image.width(), self.image.height())
    }

    /// Copy out `rect` (overlay-local). The rect is clamped to the backdrop first, so the
    /// crop never reads outside the captured pixels; `None` when nothing is left.
    pub fn crop(&self, rect: SelectionRect) -> Option<CapturedRegion> {
        let rect = rect.intersect(&self.extent())?;
        let image = imageops::crop_imm(
            &self.image,
            rect.x0 as u32,
            rect.y0 as u32,
            rect.width(),
            rect.height(),
        )
        .to_image();

        Some(CapturedRegion {
            image,
            rect: rect.offset(self.origin.x, self.origin.y),
        })
    }
}

/// Pixels of a finalized selection.
pub struct CapturedRegion {
    pub image: RgbaImage,
    /// Where the pixels came from, in virtual-screen coordinates
    pub rect: SelectionRect,
}

impl CapturedRegion {
    pub fn to_png(&self) -> Result<Vec<u8>, CaptureError> {
        encode_png(&self.image)
    }
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    PngEncoder::new(&mut buffer).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;
    Ok(buffer)
}

/// Source of backdrop snapshots.
pub trait ScreenCapturer: Send + Sync {
    fn capture_backdrop(&self) -> Result<Backdrop, CaptureError>;
}
