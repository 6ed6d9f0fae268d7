use base64::Engine;
use image::imageops::FilterType;
use image::{ImageFormat, RgbaImage};
use tutor_realtime_types::{FrameDataUri, RawFrame};

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Fixed-size off-screen raster target. Source frames of any dimensions are
/// drawn (scaled) into it before encoding, so every payload on the wire has
/// the same shape regardless of what the camera delivers.
pub struct RasterTarget {
    width: u32,
    height: u32,
    canvas: RgbaImage,
}

impl RasterTarget {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            canvas: RgbaImage::new(width, height),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Draw a raw frame into the target, scaling to fit.
    pub fn draw(&mut self, frame: &RawFrame) -> anyhow::Result<()> {
        let source = RgbaImage::from_raw(
            frame.width(),
            frame.height(),
            frame.pixels().to_vec(),
        )
        .ok_or_else(|| anyhow::anyhow!("frame buffer does not match its dimensions"))?;
        self.canvas = image::imageops::resize(&source, self.width, self.height, FilterType::Nearest);
        Ok(())
    }

    /// Encode the current canvas as a PNG `data:` URI.
    pub fn encode(&self) -> anyhow::Result<FrameDataUri> {
        let mut png = std::io::Cursor::new(Vec::new());
        self.canvas.write_to(&mut png, ImageFormat::Png)?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(png.into_inner());
        Ok(format!("{}{}", DATA_URI_PREFIX, encoded))
    }
}

/// Decode a PNG `data:` URI back into a raw frame.
pub fn decode(data_uri: &str) -> anyhow::Result<RawFrame> {
    let encoded = data_uri
        .strip_prefix(DATA_URI_PREFIX)
        .ok_or_else(|| anyhow::anyhow!("not a png data uri"))?;
    let png = base64::engine::general_purpose::STANDARD.decode(encoded)?;
    let decoded = image::load_from_memory_with_format(&png, ImageFormat::Png)?.to_rgba8();
    Ok(RawFrame::new(
        decoded.width(),
        decoded.height(),
        decoded.into_raw(),
    ))
}
