//! PNG export for canvases

use super::Canvas;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn encode_into<W: Write>(canvas: &Canvas, w: W) -> std::io::Result<()> {
    let mut encoder = png::Encoder::new(w, canvas.width, canvas.height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png::Compression::Default);

    let mut writer = encoder.write_header().map_err(std::io::Error::other)?;
    writer
        .write_image_data(&canvas.pixels)
        .map_err(std::io::Error::other)?;
    writer.finish().map_err(std::io::Error::other)?;

    Ok(())
}

/// Write a Canvas to a PNG file
pub fn write_png(canvas: &Canvas, path: &Path) -> std::io::Result<()> {
    let file = File::create(path)?;
    encode_into(canvas, BufWriter::new(file))
}

/// Encode a Canvas as PNG bytes in memory
pub fn encode_png(canvas: &Canvas) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    encode_into(canvas, &mut bytes)?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_png() {
        let canvas = Canvas::filled(32, 32, [255, 255, 255, 255]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("canvas.png");

        write_png(&canvas, &path).unwrap();

        let metadata = std::fs::metadata(&path).unwrap();
        assert!(metadata.len() > 0);
    }

    #[test]
    fn test_encode_png_signature() {
        let bytes = encode_png(&Canvas::new(4, 4)).unwrap();
        assert_eq!(&bytes[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }

    #[test]
    fn test_encoded_png_decodes() {
        let canvas = Canvas::filled(3, 2, [10, 20, 30, 255]);
        let bytes = encode_png(&canvas).unwrap();

        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(&buf[..4], &[10, 20, 30, 255]);
    }
}
