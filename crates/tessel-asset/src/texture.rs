//! Texture blob: header followed by raw texels in the declared format.

use crate::error::{BlobError, BlobErrorKind};
use crate::format::{AlignedBlob, Cursor, PixelFormat, TextureHeader, BLOB_VERSION, TEXTURE_MAGIC};

/// Borrowed view of a decoded texture blob.
#[derive(Debug, Copy, Clone)]
pub struct TextureBlob<'a> {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// Texel bytes, row-major, no row padding.
    pub data: &'a [u8],
}

impl<'a> TextureBlob<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, BlobError> {
        let mut cur = Cursor::new(bytes);
        let header: TextureHeader = cur.record("texture header")?;

        if header.magic != TEXTURE_MAGIC {
            return Err(BlobError::new(BlobErrorKind::BadMagic, "expected TSTX", 0));
        }
        if header.version != BLOB_VERSION {
            return Err(BlobError::new(BlobErrorKind::UnsupportedVersion, "texture version", 4));
        }
        let format = PixelFormat::from_tag(header.format)
            .ok_or(BlobError::layout("unknown pixel format tag", 16))?;

        let expected = (header.width as usize)
            .checked_mul(header.height as usize)
            .and_then(|n| n.checked_mul(format.bytes_per_pixel()))
            .ok_or(BlobError::layout("texture size overflows", 8))?;
        if header.data_len as usize != expected {
            return Err(BlobError::layout("data length does not match width * height", 20));
        }

        let data = cur.take(expected, "texel data")?;
        Ok(Self { width: header.width, height: header.height, format, data })
    }
}

/// Serializes texels into the layout read by [`TextureBlob::parse`].
pub fn encode_texture(width: u32, height: u32, format: PixelFormat, data: &[u8]) -> AlignedBlob {
    debug_assert_eq!(data.len(), width as usize * height as usize * format.bytes_per_pixel());

    let header = TextureHeader {
        magic: TEXTURE_MAGIC,
        version: BLOB_VERSION,
        width,
        height,
        format: format.tag(),
        data_len: data.len() as u32,
        reserved: [0; 2],
    };

    let mut out = Vec::with_capacity(size_of::<TextureHeader>() + data.len());
    out.extend_from_slice(bytemuck::bytes_of(&header));
    out.extend_from_slice(data);
    AlignedBlob::from_bytes(&out)
}
