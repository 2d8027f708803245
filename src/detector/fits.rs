//! Detector image serialization in the FITS single-image format.
//!
//! The layout is fixed: 2880-byte blocks, a header of 80-character text
//! records (36 per block), then big-endian 16-bit samples stored with the
//! conventional 32768 zero offset (the unsigned sample XORed with 0x8000),
//! zero-padded to the next block boundary.

use std::io::{Read, Write};

use anyhow::{Context, Result, bail};
use ndarray::Array2;

use super::Detector;

const BLOCK_SIZE: usize = 2880;
const RECORD_LEN: usize = 80;

/// Writes a detector's image. See [write_image].
pub fn write<W: Write>(detector: &Detector, writer: &mut W) -> Result<()> {
    write_image(detector.image(), writer)
}

/// Writes an image buffer as a 16-bit FITS file.
///
/// The array is indexed `[row, column]`; rows map to NAXIS2.
pub fn write_image<W: Write>(image: &Array2<u16>, writer: &mut W) -> Result<()> {
    let (ny, nx) = image.dim();

    let records = [
        format!("{:<8}= {:>20}", "SIMPLE", "T"),
        format!("{:<8}= {:>20}", "BITPIX", 16),
        format!("{:<8}= {:>20}", "NAXIS", 2),
        format!("{:<8}= {:>20}", "NAXIS1", nx),
        format!("{:<8}= {:>20}", "NAXIS2", ny),
        "ORIGIN  = 'lensy'".to_string(),
        format!("{:<8}= {:>20}", "BZERO", 32768),
        format!("{:<8}= {:>20}", "BSCALE", 1),
        "END".to_string(),
    ];

    let mut header = Vec::with_capacity(BLOCK_SIZE);
    for record in &records {
        let mut bytes = record.clone().into_bytes();
        bytes.resize(RECORD_LEN, b' ');
        header.extend_from_slice(&bytes);
    }
    // Pad the final header block with blank records.
    header.resize(header.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE, b' ');
    writer.write_all(&header)?;

    let mut data = Vec::with_capacity(2 * nx * ny);
    for sample in image.iter() {
        data.extend_from_slice(&(sample ^ 0x8000).to_be_bytes());
    }
    data.resize(data.len().div_ceil(BLOCK_SIZE) * BLOCK_SIZE, 0);
    writer.write_all(&data)?;

    Ok(())
}

/// Reads back an image written by [write_image], bit-exactly.
pub fn read_image<R: Read>(reader: &mut R) -> Result<Array2<u16>> {
    let mut nx: Option<usize> = None;
    let mut ny: Option<usize> = None;

    // Walk header blocks until the END record.
    let mut block = [0u8; BLOCK_SIZE];
    'header: loop {
        reader
            .read_exact(&mut block)
            .context("truncated FITS header")?;

        for record in block.chunks(RECORD_LEN) {
            let text = std::str::from_utf8(record).context("non-ASCII FITS header record")?;
            let keyword = text[..8].trim_end();
            match keyword {
                "END" => break 'header,
                "SIMPLE" | "BITPIX" | "NAXIS" | "NAXIS1" | "NAXIS2" => {
                    let value = text[10..].trim();
                    match keyword {
                        "SIMPLE" if value != "T" => bail!("not a standard FITS file"),
                        "BITPIX" if value != "16" => {
                            bail!("unsupported BITPIX {}, expected 16", value)
                        }
                        "NAXIS" if value != "2" => {
                            bail!("unsupported NAXIS {}, expected 2", value)
                        }
                        "NAXIS1" => nx = Some(value.parse().context("bad NAXIS1")?),
                        "NAXIS2" => ny = Some(value.parse().context("bad NAXIS2")?),
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    let nx = nx.context("missing NAXIS1")?;
    let ny = ny.context("missing NAXIS2")?;

    let mut data = vec![0u8; 2 * nx * ny];
    reader
        .read_exact(&mut data)
        .context("truncated FITS data block")?;

    let samples: Vec<u16> = data
        .chunks_exact(2)
        .map(|pair| u16::from_be_bytes([pair[0], pair[1]]) ^ 0x8000)
        .collect();

    Array2::from_shape_vec((ny, nx), samples).context("image shape mismatch")
}

#[cfg(test)]
mod test {
    use crate::core::math::vec3::Vec3;

    use super::*;

    fn exposed_detector() -> Detector {
        let mut det = Detector::new(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0e-3, 0.0, 0.0),
            Vec3::new(0.0, 1.0e-3, 0.0),
            37,
            21,
        )
        .unwrap();

        det.expose(Vec3::new(0.0, 0.0, 0.0), 100);
        det.expose(Vec3::new(0.0, 0.0, 0.0), 23);
        det.expose(Vec3::new(5.2e-3, -3.1e-3, 0.0), 65535);
        det.expose(Vec3::new(-10.0e-3, 4.0e-3, 0.0), 1);
        det
    }

    #[test]
    fn test_round_trip_is_bit_exact() {
        let det = exposed_detector();

        let mut buffer = Vec::new();
        write(&det, &mut buffer).unwrap();

        let restored = read_image(&mut buffer.as_slice()).unwrap();
        assert_eq!(restored, *det.image());
    }

    #[test]
    fn test_file_is_block_aligned() {
        let det = exposed_detector();

        let mut buffer = Vec::new();
        write(&det, &mut buffer).unwrap();

        assert_eq!(buffer.len() % BLOCK_SIZE, 0);
        // One header block plus the padded 37 * 21 * 2 byte data block.
        assert_eq!(buffer.len(), BLOCK_SIZE + BLOCK_SIZE);
    }

    #[test]
    fn test_header_records() {
        let det = exposed_detector();

        let mut buffer = Vec::new();
        write(&det, &mut buffer).unwrap();

        let header = std::str::from_utf8(&buffer[..BLOCK_SIZE]).unwrap();
        let record = |i: usize| &header[i * RECORD_LEN..(i + 1) * RECORD_LEN];

        assert_eq!(&record(0)[..30], "SIMPLE  =                    T");
        assert_eq!(&record(1)[..30], "BITPIX  =                   16");
        assert_eq!(&record(3)[..30], "NAXIS1  =                   37");
        assert_eq!(&record(4)[..30], "NAXIS2  =                   21");
        assert_eq!(&record(5)[..17], "ORIGIN  = 'lensy'");
        assert_eq!(&record(8)[..3], "END");
    }

    #[test]
    fn test_zero_samples_use_the_bzero_offset() {
        let image: Array2<u16> = Array2::zeros((1, 1));

        let mut buffer = Vec::new();
        write_image(&image, &mut buffer).unwrap();

        // An unsigned zero is stored as the signed value -32768: 0x8000.
        assert_eq!(&buffer[BLOCK_SIZE..BLOCK_SIZE + 2], &[0x80, 0x00]);
    }

    #[test]
    fn test_truncated_input_is_an_error() {
        let det = exposed_detector();

        let mut buffer = Vec::new();
        write(&det, &mut buffer).unwrap();
        buffer.truncate(buffer.len() - 1000);

        assert!(read_image(&mut buffer.as_slice()).is_err());
    }
}
