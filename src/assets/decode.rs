use std::sync::Arc;

use crate::assets::garment::GarmentAsset;
use crate::foundation::error::{DrapeError, DrapeResult};
use crate::foundation::math::premultiply_rgba8_in_place;

/// Decode any raster format supported by `image` into a premultiplied garment.
pub fn decode_image(reference: &str, bytes: &[u8]) -> DrapeResult<GarmentAsset> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| DrapeError::decode(format!("garment '{reference}': {e}")))?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    GarmentAsset::new(reference, width, height, Arc::new(rgba8_premul))
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
