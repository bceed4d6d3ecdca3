//! Image re-encoding
//!
//! Every target is produced by decoding the stored image and encoding it
//! again with the target codec. JPEG has no alpha channel, so images are
//! flattened to RGB first; the other lossless targets get RGBA. An animated
//! WebP converted to GIF keeps all of its frames; other sources contribute
//! their first frame only.

use crate::error::{Error, Result};
use bytes::Bytes;
use image::codecs::gif::{GifEncoder, Repeat};
use image::codecs::webp::WebPDecoder;
use image::{AnimationDecoder, DynamicImage, Frame, ImageFormat};
use std::io::Cursor;

fn decode_err(e: image::ImageError) -> Error {
    Error::Conversion(format!("image decode: {}", e))
}

fn encode_err(e: image::ImageError) -> Error {
    Error::Conversion(format!("image encode: {}", e))
}

pub fn to_png(data: &Bytes) -> Result<Bytes> {
    reencode(data, ImageFormat::Png)
}

pub fn to_jpeg(data: &Bytes) -> Result<Bytes> {
    reencode(data, ImageFormat::Jpeg)
}

pub fn to_webp(data: &Bytes) -> Result<Bytes> {
    reencode(data, ImageFormat::WebP)
}

pub fn to_avif(data: &Bytes) -> Result<Bytes> {
    reencode(data, ImageFormat::Avif)
}

pub fn to_gif(data: &Bytes) -> Result<Bytes> {
    if let Some(frames) = animated_webp_frames(data)? {
        return encode_gif_frames(frames);
    }
    reencode(data, ImageFormat::Gif)
}

fn reencode(data: &[u8], format: ImageFormat) -> Result<Bytes> {
    let decoded = image::load_from_memory(data).map_err(decode_err)?;
    let prepared = match format {
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(decoded.to_rgb8()),
        ImageFormat::Png => decoded,
        _ => DynamicImage::ImageRgba8(decoded.to_rgba8()),
    };

    let mut out = Cursor::new(Vec::new());
    prepared.write_to(&mut out, format).map_err(encode_err)?;
    Ok(Bytes::from(out.into_inner()))
}

fn animated_webp_frames(data: &[u8]) -> Result<Option<Vec<Frame>>> {
    if image::guess_format(data).ok() != Some(ImageFormat::WebP) {
        return Ok(None);
    }
    let decoder = WebPDecoder::new(Cursor::new(data)).map_err(decode_err)?;
    if !decoder.has_animation() {
        return Ok(None);
    }
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(decode_err)?;
    Ok(Some(frames))
}

fn encode_gif_frames(frames: Vec<Frame>) -> Result<Bytes> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        encoder.set_repeat(Repeat::Infinite).map_err(encode_err)?;
        encoder.encode_frames(frames).map_err(encode_err)?;
    }
    Ok(Bytes::from(out))
}

#[cfg(test)]
pub(crate) fn sample_png() -> Bytes {
    let img = image::RgbaImage::from_fn(4, 4, |x, y| {
        image::Rgba([(x * 60) as u8, (y * 60) as u8, 128, if x == 0 { 0 } else { 255 }])
    });
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(img)
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    Bytes::from(out.into_inner())
}

/// Two-frame GIF: red then blue
#[cfg(test)]
pub(crate) fn sample_animated_gif() -> Bytes {
    use image::{Delay, RgbaImage};

    let frames = [[255u8, 0, 0, 255], [0, 0, 255, 255]]
        .into_iter()
        .map(|px| {
            Frame::from_parts(
                RgbaImage::from_pixel(3, 3, image::Rgba(px)),
                0,
                0,
                Delay::from_numer_denom_ms(100, 1),
            )
        })
        .collect::<Vec<_>>();
    encode_gif_frames(frames).unwrap()
}

#[cfg(test)]
pub(crate) fn gif_frame_count(data: &[u8]) -> usize {
    use image::codecs::gif::GifDecoder;

    GifDecoder::new(Cursor::new(data))
        .unwrap()
        .into_frames()
        .collect_frames()
        .unwrap()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbaImage};

    const SIDE: u32 = 3;

    fn push_chunk(out: &mut Vec<u8>, fourcc: &[u8; 4], payload: &[u8]) {
        out.extend_from_slice(fourcc);
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
    }

    fn push_u24(out: &mut Vec<u8>, value: u32) {
        out.extend_from_slice(&value.to_le_bytes()[..3]);
    }

    /// The `VP8L` chunk (header and padding included) of a still lossless WebP
    fn vp8l_chunk(webp: &[u8]) -> Vec<u8> {
        let pos = webp
            .windows(4)
            .position(|w| w == b"VP8L")
            .expect("lossless webp carries a VP8L chunk");
        let len = u32::from_le_bytes(webp[pos + 4..pos + 8].try_into().unwrap()) as usize;
        let end = pos + 8 + len + (len & 1);
        webp[pos..end].to_vec()
    }

    /// Two-frame animated WebP (red then blue) assembled from still frames
    fn animated_webp() -> Bytes {
        let mut body = b"WEBP".to_vec();

        let mut vp8x = vec![0x02 | 0x10, 0, 0, 0];
        push_u24(&mut vp8x, SIDE - 1);
        push_u24(&mut vp8x, SIDE - 1);
        push_chunk(&mut body, b"VP8X", &vp8x);

        let mut anim = 0u32.to_le_bytes().to_vec();
        anim.extend_from_slice(&0u16.to_le_bytes());
        push_chunk(&mut body, b"ANIM", &anim);

        for px in [[255u8, 0, 0, 255], [0, 0, 255, 255]] {
            let still = DynamicImage::ImageRgba8(RgbaImage::from_pixel(SIDE, SIDE, image::Rgba(px)));
            let mut encoded = Cursor::new(Vec::new());
            still.write_to(&mut encoded, ImageFormat::WebP).unwrap();

            let mut anmf = Vec::new();
            push_u24(&mut anmf, 0);
            push_u24(&mut anmf, 0);
            push_u24(&mut anmf, SIDE - 1);
            push_u24(&mut anmf, SIDE - 1);
            push_u24(&mut anmf, 100);
            anmf.push(0x02);
            anmf.extend_from_slice(&vp8l_chunk(&encoded.into_inner()));
            push_chunk(&mut body, b"ANMF", &anmf);
        }

        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        Bytes::from(out)
    }

    #[test]
    fn test_targets_have_expected_format() {
        let png = sample_png();
        let cases = [
            (to_jpeg(&png).unwrap(), ImageFormat::Jpeg),
            (to_webp(&png).unwrap(), ImageFormat::WebP),
            (to_gif(&png).unwrap(), ImageFormat::Gif),
            (to_png(&to_gif(&png).unwrap()).unwrap(), ImageFormat::Png),
        ];
        for (bytes, format) in cases {
            assert_eq!(image::guess_format(&bytes).unwrap(), format);
        }
    }

    #[test]
    fn test_avif_output() {
        let avif = to_avif(&sample_png()).unwrap();
        assert_eq!(&avif[4..8], b"ftyp");
    }

    #[test]
    fn test_dimensions_survive() {
        let webp = to_webp(&sample_png()).unwrap();
        let decoded = image::load_from_memory(&webp).unwrap();
        assert_eq!(decoded.dimensions(), (4, 4));
    }

    #[test]
    fn test_alpha_source_to_jpeg() {
        let jpeg = to_jpeg(&sample_png()).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (4, 4));
    }

    #[test]
    fn test_animated_gif_first_frame_to_png() {
        let png = to_png(&sample_animated_gif()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        let px = decoded.get_pixel(0, 0);
        assert!(px[0] > 200 && px[2] < 50, "expected the red first frame, got {:?}", px);
    }

    #[test]
    fn test_animated_webp_fixture_is_animated() {
        let webp = animated_webp();
        assert_eq!(image::guess_format(&webp).unwrap(), ImageFormat::WebP);
        let frames = animated_webp_frames(&webp).unwrap().unwrap();
        assert_eq!(frames.len(), 2);
    }

    #[test]
    fn test_animated_webp_to_gif_keeps_every_frame() {
        let gif = to_gif(&animated_webp()).unwrap();
        assert_eq!(image::guess_format(&gif).unwrap(), ImageFormat::Gif);
        assert_eq!(gif_frame_count(&gif), 2);

        let first = image::load_from_memory(&gif).unwrap().to_rgba8();
        let px = first.get_pixel(0, 0);
        assert!(px[0] > 200 && px[2] < 50, "expected the red first frame, got {:?}", px);
    }

    #[test]
    fn test_still_webp_is_not_animated() {
        let webp = to_webp(&sample_png()).unwrap();
        assert!(animated_webp_frames(&webp).unwrap().is_none());
        assert_eq!(gif_frame_count(&to_gif(&webp).unwrap()), 1);
    }

    #[test]
    fn test_animated_webp_to_png_is_single_image() {
        let png = to_png(&animated_webp()).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!(decoded.dimensions(), (SIDE, SIDE));
    }

    #[test]
    fn test_garbage_is_conversion_error() {
        let result = to_png(&Bytes::from_static(b"definitely not an image"));
        assert!(matches!(result, Err(Error::Conversion(_))));
    }
}
