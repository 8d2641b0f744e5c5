// src/codec.rs

//! Byte-level raster codecs.
//!
//! Everything here is bytes in, bytes out. Reading and writing files is left
//! to the binary. Netpbm is handled natively in `pnm`; everything else goes
//! through the `image` crate in `image_io`.

pub mod image_io;
pub mod pnm;

pub use pnm::PnmFormat;

use crate::config::ExportFormat;
use crate::raster::Raster;
use anyhow::Result;
use log::trace;

/// Decodes `bytes`, sniffing Netpbm by its magic number.
pub fn decode(bytes: &[u8]) -> Result<Raster> {
    if pnm::is_pnm(bytes) {
        trace!("decode: netpbm, {} bytes", bytes.len());
        pnm::decode(bytes)
    } else {
        trace!("decode: host codec, {} bytes", bytes.len());
        image_io::decode(bytes)
    }
}

pub fn encode(raster: &Raster, format: ExportFormat) -> Result<Vec<u8>> {
    match format {
        ExportFormat::Png => image_io::encode_png(raster),
        ExportFormat::Ppm => Ok(pnm::encode(raster, PnmFormat::Ppm)),
        ExportFormat::Pgm => Ok(pnm::encode(raster, PnmFormat::Pgm)),
        ExportFormat::Pbm => Ok(pnm::encode(raster, PnmFormat::Pbm)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use test_log::test;

    fn sample() -> Raster {
        let mut raster = Raster::filled(3, 2, Color::rgb(200, 10, 10));
        raster.put(1, 1, Color::rgb(0, 0, 250));
        raster
    }

    #[test]
    fn test_dispatch_by_format() {
        let raster = sample();
        for format in [ExportFormat::Png, ExportFormat::Ppm] {
            let bytes = encode(&raster, format).unwrap();
            assert_eq!(decode(&bytes).unwrap(), raster, "{:?}", format);
        }
        assert!(encode(&raster, ExportFormat::Pgm).unwrap().starts_with(b"P5"));
        assert!(encode(&raster, ExportFormat::Pbm).unwrap().starts_with(b"P4"));
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode(b"definitely not an image").is_err());
        assert!(decode(b"").is_err());
    }
}
