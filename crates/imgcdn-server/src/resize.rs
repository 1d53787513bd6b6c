//! Variant generation: decode once, thumbnail per size class, re-encode

use crate::error::Result;
use crate::types::SizeClass;
use image::GenericImageView;
use std::io::Cursor;
use tracing::debug;

/// A resized, re-encoded rendition of a source image
pub struct Variant {
    pub size: SizeClass,
    pub data: Vec<u8>,
    pub content_type: &'static str,
}

/// Produce one variant per size class from raw source bytes.
///
/// Variants fit within the class's bounding square with aspect ratio
/// preserved; sources already within bounds are re-encoded unscaled.
/// Output stays in the source format.
pub fn make_variants(data: &[u8]) -> Result<Vec<Variant>> {
    let format = image::guess_format(data)?;
    let source = image::load_from_memory_with_format(data, format)?;
    let (width, height) = source.dimensions();

    let mut variants = Vec::with_capacity(SizeClass::ALL.len());
    for size in SizeClass::ALL {
        let max = size.max_dimension();

        let scaled = if width > max || height > max {
            source.thumbnail(max, max)
        } else {
            source.clone()
        };

        let mut buf = Cursor::new(Vec::new());
        scaled.write_to(&mut buf, format)?;

        debug!(
            size = %size,
            width = scaled.width(),
            height = scaled.height(),
            bytes = buf.get_ref().len(),
            "Generated variant"
        );

        variants.push(Variant {
            size,
            data: buf.into_inner(),
            content_type: format.to_mime_type(),
        });
    }

    Ok(variants)
}
