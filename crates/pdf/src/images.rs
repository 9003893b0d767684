//! Image XObjects referenced by a page.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageFormat, RgbImage};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream};

use crate::objects::{
    dict_get, filters, name, number, page_resources, resolve, resolve_stream, resource_category,
    stream_bytes,
};

/// Payload of one image XObject, ready to be written out.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    /// Resource name, e.g. `Im1`.
    pub name: String,
    pub width: u32,
    pub height: u32,
    /// File extension matching `bytes`: `jpeg`, `jp2`, `png` or `bin`.
    pub format: &'static str,
    pub bytes: Vec<u8>,
}

/// Image XObjects of one page in resource order.
pub fn page_images(doc: &Document, page_id: ObjectId) -> Vec<PageImage> {
    let Some(xobjects) = page_resources(doc, page_id)
        .and_then(|resources| resource_category(doc, resources, b"XObject"))
    else {
        return Vec::new();
    };

    xobjects
        .iter()
        .filter_map(|(key, value)| {
            let stream = resolve_stream(doc, value)?;
            if dict_get(doc, &stream.dict, b"Subtype").and_then(name).as_deref() != Some("Image") {
                return None;
            }
            Some(read_image(doc, String::from_utf8_lossy(key).into_owned(), stream))
        })
        .collect()
}

fn read_image(doc: &Document, name: String, stream: &Stream) -> PageImage {
    let dict = &stream.dict;
    let dimension = |key: &[u8]| {
        dict_get(doc, dict, key)
            .and_then(number)
            .map(|n| n.max(0.0) as u32)
            .unwrap_or(0)
    };
    let (width, height) = (dimension(b"Width"), dimension(b"Height"));

    let filters = filters(doc, dict);
    let encoded = match filters.last().map(String::as_str) {
        Some("DCTDecode") => Some("jpeg"),
        Some("JPXDecode") => Some("jp2"),
        _ => None,
    };

    if let Some(format) = encoded {
        let bytes = if filters.len() == 1 {
            stream.content.clone()
        } else {
            stream_bytes(stream)
        };
        return PageImage {
            name,
            width,
            height,
            format,
            bytes,
        };
    }

    let samples = stream_bytes(stream);
    let bits = dict_get(doc, dict, b"BitsPerComponent").and_then(number);
    let png = match (bits, components(doc, dict)) {
        (Some(bits), Some(components)) if bits == 8.0 => {
            encode_png(width, height, components, &samples)
        }
        _ => None,
    };

    match png {
        Some(bytes) => PageImage {
            name,
            width,
            height,
            format: "png",
            bytes,
        },
        None => {
            log::debug!("Image {} kept as raw samples", name);
            PageImage {
                name,
                width,
                height,
                format: "bin",
                bytes: samples,
            }
        }
    }
}

/// Colour components per pixel for the colour spaces PNG can carry.
fn components(doc: &Document, dict: &Dictionary) -> Option<u8> {
    match dict_get(doc, dict, b"ColorSpace")? {
        Object::Name(space) => match space.as_slice() {
            b"DeviceGray" | b"CalGray" => Some(1),
            b"DeviceRGB" | b"CalRGB" => Some(3),
            _ => None,
        },
        Object::Array(items) => {
            let family = items.first().and_then(|o| resolve(doc, o)).and_then(name)?;
            match family.as_str() {
                "CalGray" => Some(1),
                "CalRGB" => Some(3),
                "ICCBased" => {
                    let profile = items.get(1).and_then(|o| resolve_stream(doc, o))?;
                    match dict_get(doc, &profile.dict, b"N").and_then(number)? as u8 {
                        n @ (1 | 3) => Some(n),
                        _ => None,
                    }
                }
                _ => None,
            }
        }
        _ => None,
    }
}

fn encode_png(width: u32, height: u32, components: u8, samples: &[u8]) -> Option<Vec<u8>> {
    let expected = (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(usize::from(components))?;
    if expected == 0 || samples.len() < expected {
        return None;
    }
    let samples = samples[..expected].to_vec();

    let image = match components {
        1 => GrayImage::from_raw(width, height, samples).map(DynamicImage::ImageLuma8),
        3 => RgbImage::from_raw(width, height, samples).map(DynamicImage::ImageRgb8),
        _ => None,
    }?;

    let mut png = Vec::new();
    match image.write_to(&mut Cursor::new(&mut png), ImageFormat::Png) {
        Ok(()) => Some(png),
        Err(e) => {
            log::warn!("Failed to encode image as PNG: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GenericImageView;
    use lopdf::dictionary;

    fn page_with_xobjects(doc: &mut Document, xobjects: Dictionary) -> ObjectId {
        doc.add_object(dictionary! {
            "Type" => "Page",
            "Resources" => dictionary! { "XObject" => xobjects },
        })
    }

    #[test]
    fn test_jpeg_kept_raw_and_rgb_reencoded() {
        let mut doc = Document::with_version("1.5");
        let jpeg = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 4,
                "Height" => 4,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            b"\xff\xd8\xff\xe0 fake jpeg".to_vec(),
        ));
        let rgb = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => 2,
                "Height" => 1,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            vec![255, 0, 0, 0, 0, 255],
        ));
        let form = doc.add_object(Stream::new(
            dictionary! { "Type" => "XObject", "Subtype" => "Form" },
            b"q Q".to_vec(),
        ));
        let page = page_with_xobjects(
            &mut doc,
            dictionary! { "Im1" => jpeg, "Fm1" => form, "Im2" => rgb },
        );

        let images = page_images(&doc, page);
        assert_eq!(images.len(), 2);

        assert_eq!(images[0].name, "Im1");
        assert_eq!(images[0].format, "jpeg");
        assert_eq!(images[0].bytes, b"\xff\xd8\xff\xe0 fake jpeg");
        assert_eq!((images[0].width, images[0].height), (4, 4));

        assert_eq!(images[1].format, "png");
        let decoded = image::load_from_memory(&images[1].bytes).unwrap();
        assert_eq!(decoded.dimensions(), (2, 1));
    }

    #[test]
    fn test_unsupported_samples_kept_as_bin() {
        let mut doc = Document::with_version("1.5");
        let cmyk = doc.add_object(Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => 1,
                "Height" => 1,
                "ColorSpace" => "DeviceCMYK",
                "BitsPerComponent" => 8,
            },
            vec![0, 0, 0, 255],
        ));
        let page = page_with_xobjects(&mut doc, dictionary! { "Im1" => cmyk });

        let images = page_images(&doc, page);
        assert_eq!(images[0].format, "bin");
        assert_eq!(images[0].bytes, vec![0, 0, 0, 255]);
    }

    #[test]
    fn test_oversized_dimensions_kept_as_bin() {
        let mut doc = Document::with_version("1.5");
        let huge = doc.add_object(Stream::new(
            dictionary! {
                "Subtype" => "Image",
                "Width" => i64::from(u32::MAX),
                "Height" => i64::from(u32::MAX),
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
            },
            vec![1, 2, 3],
        ));
        let page = page_with_xobjects(&mut doc, dictionary! { "Im1" => huge });

        let images = page_images(&doc, page);
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].format, "bin");
        assert_eq!((images[0].width, images[0].height), (u32::MAX, u32::MAX));
        assert_eq!(images[0].bytes, vec![1, 2, 3]);
    }

    #[test]
    fn test_page_without_xobjects() {
        let mut doc = Document::with_version("1.5");
        let page = doc.add_object(dictionary! { "Type" => "Page" });
        assert!(page_images(&doc, page).is_empty());
    }
}
