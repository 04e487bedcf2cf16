// src/utils/qr.rs

//! 共有リンクURLのQRコードレンダリング
//!
//! URLをPNGにエンコードし、フロントエンドがそのまま `<img>` に
//! 埋め込めるdata URLとして返す。認可や監査には一切関与しない。

use crate::error::{AppError, AppResult};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::{codecs::png::PngEncoder, ExtendedColorType, ImageEncoder, Luma};
use qrcode::QrCode;

const QR_MIN_DIMENSIONS: u32 = 240;

/// URLをQRコードのPNG data URLにエンコードする
pub fn encode_url_as_data_url(url: &str) -> AppResult<String> {
    let code = QrCode::new(url.as_bytes())
        .map_err(|e| AppError::InternalServerError(format!("Failed to encode QR code: {}", e)))?;

    let qr_image = code
        .render::<Luma<u8>>()
        .min_dimensions(QR_MIN_DIMENSIONS, QR_MIN_DIMENSIONS)
        .build();

    let mut png_bytes: Vec<u8> = Vec::new();
    PngEncoder::new(&mut png_bytes)
        .write_image(
            qr_image.as_raw(),
            qr_image.width(),
            qr_image.height(),
            ExtendedColorType::L8,
        )
        .map_err(|e| AppError::InternalServerError(format!("Failed to render QR PNG: {}", e)))?;

    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(&png_bytes)
    ))
}
