// src/services/qr.rs

use crate::errors::ShortenerError;
use qrcode::render::svg;
use qrcode::QrCode;

/// Pixel size of one QR module in the rendered SVG
const MODULE_SIZE: u32 = 10;

/// Generate an SVG QR code for a URL
pub fn generate_qr_code_svg(url: &str) -> Result<String, ShortenerError> {
    let code = QrCode::new(url.as_bytes()).map_err(|e| {
        log::error!("Failed to encode QR code for {}: {}", url, e);
        ShortenerError::InternalError(format!("QR encoding failed: {}", e))
    })?;

    Ok(code
        .render::<svg::Color>()
        .module_dimensions(MODULE_SIZE, MODULE_SIZE)
        .build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_svg_document() {
        let svg = generate_qr_code_svg("http://localhost:8000/abc1234").unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }

    #[test]
    fn test_oversized_payload_is_an_error() {
        let huge = "x".repeat(8000);
        assert!(generate_qr_code_svg(&huge).is_err());
    }
}
