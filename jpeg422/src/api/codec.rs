// Copyright (c) the JPEG XL Project Authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

use std::sync::Arc;

use super::CodecOptions;
use crate::error::{Error, Result};
use crate::frame::decode::scatter_pass;
use crate::frame::{FrameCodec, FrameHeader, FrameLayout};
use crate::thread_pool::WorkerPool;
use crate::util::try_filled_vec;
use crate::util::tracing_wrappers::*;

/// Compressor and decompressor for packed 4:2:2 frames of one fixed size.
///
/// A `Codec` owns its decode workers; they are started by [`Codec::new`] and joined
/// when the codec is dropped. All methods take `&self`, and a codec may be shared
/// between threads.
pub struct Codec {
    frame: Arc<FrameCodec>,
    options: CodecOptions,
    pool: Option<WorkerPool>,
}

impl std::fmt::Debug for Codec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Codec")
            .field("width", &self.width())
            .field("height", &self.height())
            .field("options", &self.options)
            .finish()
    }
}

impl Codec {
    /// Creates a codec for `width` x `height` frames. The width must be a multiple of 16
    /// and the height a multiple of 8.
    pub fn new(width: usize, height: usize, options: CodecOptions) -> Result<Codec> {
        let layout = FrameLayout::new(width, height)?;
        let frame = Arc::new(FrameCodec::new(layout, &options)?);
        let pool = match options.threads {
            0 => None,
            threads => Some(WorkerPool::new(threads, frame.clone())?),
        };
        info!(width, height, ?options, "created codec");
        Ok(Codec {
            frame,
            options,
            pool,
        })
    }

    pub fn width(&self) -> usize {
        self.frame.layout().width
    }

    pub fn height(&self) -> usize {
        self.frame.layout().height
    }

    /// Bytes in one uncompressed frame: `2 * width * height`.
    pub fn plane_len(&self) -> usize {
        self.frame.layout().plane_len()
    }

    pub fn options(&self) -> &CodecOptions {
        &self.options
    }

    fn check_plane_len(&self, actual: usize) -> Result<()> {
        let expected = self.plane_len();
        if actual != expected {
            return Err(Error::InvalidPlaneSize { expected, actual });
        }
        Ok(())
    }

    /// Compresses one packed frame.
    pub fn compress(&self, plane: &[u8]) -> Result<Vec<u8>> {
        self.check_plane_len(plane.len())?;
        self.frame.encode_frame(plane, self.options.parallel_encode)
    }

    /// Decompresses one frame produced by [`Codec::compress`] on a codec of the same
    /// size and options.
    pub fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut plane = try_filled_vec(self.plane_len(), 0u8)?;
        self.decompress_into(data, &mut plane)?;
        Ok(plane)
    }

    /// Like [`Codec::decompress`], writing into a caller-provided buffer of exactly
    /// [`Codec::plane_len`] bytes. The buffer contents are unspecified on error.
    #[cfg_attr(feature = "tracing", instrument(level = "debug", skip_all))]
    pub fn decompress_into(&self, data: &[u8], dest: &mut [u8]) -> Result<()> {
        self.check_plane_len(dest.len())?;
        let Some(pool) = &self.pool else {
            return self.frame.decode_frame(data, dest);
        };
        let header = FrameHeader::read(data)?;
        let planes = pool.dispatch(Arc::from(data), header.pass_ranges())?;
        for (geometry, samples) in self.frame.layout().passes.iter().zip(&planes) {
            scatter_pass(geometry, samples, dest);
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::api::TransformKind;
    use test_log::test;

    #[test]
    fn reports_dimensions() -> Result<()> {
        let codec = Codec::new(64, 24, CodecOptions::default().with_threads(1))?;
        assert_eq!((codec.width(), codec.height()), (64, 24));
        assert_eq!(codec.plane_len(), 64 * 24 * 2);
        assert_eq!(codec.options().transform, TransformKind::Fast);
        Ok(())
    }

    #[test]
    fn rejects_bad_frame_sizes() {
        assert!(matches!(
            Codec::new(20, 8, CodecOptions::default()),
            Err(Error::InvalidFrameSize(20, 8))
        ));
        assert!(matches!(
            Codec::new(16, 9, CodecOptions::default().with_threads(0)),
            Err(Error::InvalidFrameSize(16, 9))
        ));
    }

    #[test]
    fn rejects_bad_plane_sizes() -> Result<()> {
        let codec = Codec::new(16, 8, CodecOptions::default())?;
        assert!(matches!(
            codec.compress(&[0; 255]),
            Err(Error::InvalidPlaneSize {
                expected: 256,
                actual: 255
            })
        ));
        let stream = codec.compress(&[0; 256])?;
        let mut short = [0u8; 100];
        assert!(matches!(
            codec.decompress_into(&stream, &mut short),
            Err(Error::InvalidPlaneSize { .. })
        ));
        Ok(())
    }

    #[test]
    fn corrupt_input_is_an_error_not_a_panic() -> Result<()> {
        for threads in [0, 2] {
            let codec = Codec::new(16, 8, CodecOptions::default().with_threads(threads))?;
            let plane: Vec<u8> = (0..=255).collect();
            let stream = codec.compress(&plane)?;

            let truncated = &stream[..stream.len() - 1];
            assert!(codec.decompress(truncated).is_err_and(|e| e.is_corrupt_stream()));
            assert!(codec.decompress(&stream[..10]).is_err_and(|e| e.is_corrupt_stream()));

            let mut garbage = stream.clone();
            for byte in garbage[16..].iter_mut() {
                *byte = 0xff;
            }
            assert!(codec.decompress(&garbage).is_err_and(|e| e.is_corrupt_stream()));
        }
        Ok(())
    }
}
