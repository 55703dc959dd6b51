//! Tokio framing for fixed-layout records.
//!
//! Every frame is exactly [`FixedLayoutCodec::layout_len`] bytes, so records
//! can be streamed over any `AsyncRead`/`AsyncWrite` with
//! `tokio_util::codec::{FramedRead, FramedWrite}` and no length prefix.

use crate::core::fixed::FixedLayoutCodec;
use crate::core::layout::Record;
use crate::error::{CodecError, Result};
use bytes::BytesMut;
use std::marker::PhantomData;
use tokio_util::codec::{Decoder, Encoder};

/// Frames records of type `T` with a fixed-layout codec.
#[derive(Debug)]
pub struct RecordCodec<T> {
    layout: FixedLayoutCodec,
    frame_len: usize,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> RecordCodec<T> {
    /// Fails if `T` has no bounded layout.
    pub fn new(layout: FixedLayoutCodec) -> Result<Self> {
        let frame_len = layout.layout_len(T::record_type())?;
        Ok(Self {
            layout,
            frame_len,
            _record: PhantomData,
        })
    }

    pub fn frame_len(&self) -> usize {
        self.frame_len
    }
}

impl<T: Record> Decoder for RecordCodec<T> {
    type Item = T;
    type Error = CodecError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<T>> {
        if src.len() < self.frame_len {
            src.reserve(self.frame_len - src.len());
            return Ok(None);
        }

        let frame = src.split_to(self.frame_len);
        self.layout.decode(&frame, 0).map(Some)
    }
}

impl<T: Record> Encoder<T> for RecordCodec<T> {
    type Error = CodecError;

    fn encode(&mut self, item: T, dst: &mut BytesMut) -> Result<()> {
        let start = dst.len();
        dst.resize(start + self.frame_len, 0);
        let result = self.layout.encode(&item, &mut dst[start..], 0);
        if result.is_err() {
            dst.truncate(start);
        }
        result
    }
}
