use base64::{engine::general_purpose, Engine as _};

use crate::canvas::{CanvasResult, PixelBuffer};

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

pub fn png_data_url(png: &[u8]) -> String {
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len().div_ceil(3) * 4);
    url.push_str(PNG_DATA_URL_PREFIX);
    general_purpose::STANDARD.encode_string(png, &mut url);
    url
}

pub fn encode_data_url(buffer: &PixelBuffer) -> CanvasResult<String> {
    let png = buffer.to_png()?;
    Ok(png_data_url(&png))
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine as _;
    use crate::geometry::Color;

    #[test]
    fn data_url_carries_png_prefix_and_padding() {
        assert_eq!(png_data_url(b"ab"), "data:image/png;base64,YWI=");
    }

    #[test]
    fn data_url_decodes_back_to_the_png() {
        let buffer = PixelBuffer::filled(2, 2, Color::new(1, 2, 3)).expect("buffer should build");
        let url = encode_data_url(&buffer).expect("png should encode");
        let payload = url
            .strip_prefix(PNG_DATA_URL_PREFIX)
            .expect("url should carry png prefix");
        let png = general_purpose::STANDARD
            .decode(payload)
            .expect("payload should be valid base64");
        assert_eq!(png, buffer.to_png().expect("png should encode"));
    }
}
