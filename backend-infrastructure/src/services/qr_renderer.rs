use std::io::Cursor;

use anyhow::{Context, Result};
use image::{ImageFormat, Luma};
use qrcode::QrCode;

use backend_domain::ports::QrCodeRenderer;

/// Renders QR payloads as grayscale PNG bytes.
pub struct PngQrRenderer {
    min_size: u32,
}

impl PngQrRenderer {
    pub fn new() -> Self {
        Self { min_size: 256 }
    }
}

impl Default for PngQrRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl QrCodeRenderer for PngQrRenderer {
    fn render_png(&self, payload: &str) -> Result<Vec<u8>> {
        let code = QrCode::new(payload.as_bytes()).context("encoding qr payload")?;
        let image = code
            .render::<Luma<u8>>()
            .min_dimensions(self.min_size, self.min_size)
            .build();
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .context("writing qr png")?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_png() {
        let png = PngQrRenderer::new()
            .render_png(r#"{"qr_code_id":"abc","owner":"biz"}"#)
            .expect("render");
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
