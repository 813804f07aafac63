use std::sync::Arc;

use bytes::Bytes;
use mavwire_frame::{FrameAssembler, Frames};
use mavwire_schema::SchemaRegistry;
use serde_json::{Map, Value};

use crate::config::SessionConfig;
use crate::decoder::{DecodedMessage, FrameDecoder};
use crate::encoder::CommandEncoder;
use crate::error::{DecodeError, EncodeError, SinkError};
use crate::reporter::{ErrorReporter, ErrorSink};

/// Receives each successfully decoded message.
pub trait MessageSink {
    fn deliver(&mut self, message: DecodedMessage) -> Result<(), SinkError>;
}

impl MessageSink for Vec<DecodedMessage> {
    fn deliver(&mut self, message: DecodedMessage) -> Result<(), SinkError> {
        self.push(message);
        Ok(())
    }
}

impl<T: MessageSink + ?Sized> MessageSink for &mut T {
    fn deliver(&mut self, message: DecodedMessage) -> Result<(), SinkError> {
        (**self).deliver(message)
    }
}

/// Outcome counts for one [`Session::pump`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    pub delivered: usize,
    pub filtered: usize,
    pub reported: usize,
}

/// One connection's codec state: assembly buffer, decoder and sequence counter.
#[derive(Debug)]
pub struct Session {
    assembler: FrameAssembler,
    decoder: FrameDecoder,
    encoder: CommandEncoder,
    config: SessionConfig,
}

impl Session {
    pub fn new(registry: Arc<SchemaRegistry>, config: SessionConfig) -> Self {
        Self {
            assembler: FrameAssembler::new(),
            decoder: FrameDecoder::new(Arc::clone(&registry)),
            encoder: CommandEncoder::with_config(registry, config.encoder),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn registry(&self) -> &Arc<SchemaRegistry> {
        self.decoder.registry()
    }

    /// Append `chunk` and decode every complete frame now buffered.
    ///
    /// Frames left unconsumed when the iterator is dropped stay buffered and
    /// are yielded by the next call.
    pub fn feed(&mut self, chunk: &[u8]) -> Decoded<'_> {
        Decoded {
            frames: self.assembler.feed(chunk),
            decoder: &self.decoder,
            target: self.config.decoder.target_system,
        }
    }

    /// Feed `chunk`, deliver decoded messages to `sink` and report failures.
    ///
    /// Filtered frames are counted and dropped. A message the sink refuses
    /// is logged and the loop continues.
    pub fn pump<M, E>(
        &mut self,
        chunk: &[u8],
        sink: &mut M,
        reporter: &mut ErrorReporter<E>,
    ) -> PumpStats
    where
        M: MessageSink + ?Sized,
        E: ErrorSink,
    {
        let mut stats = PumpStats::default();
        for outcome in self.feed(chunk) {
            match outcome {
                Ok(message) => {
                    let (msg_id, msg_name) = (message.id, message.name.clone());
                    match sink.deliver(message) {
                        Ok(()) => stats.delivered += 1,
                        Err(err) => tracing::warn!(
                            msg_id,
                            msg_name = %msg_name,
                            error = %err,
                            "message sink rejected decoded message"
                        ),
                    }
                }
                Err(err) if err.is_filtered() => stats.filtered += 1,
                Err(err) => {
                    if reporter.report(&err) {
                        stats.reported += 1;
                    }
                }
            }
        }
        stats
    }

    pub fn encode(
        &mut self,
        name: &str,
        fields: &Map<String, Value>,
    ) -> Result<Bytes, EncodeError> {
        self.encoder.encode(name, fields)
    }

    pub fn encode_json(&mut self, input: impl AsRef<[u8]>) -> Result<Bytes, EncodeError> {
        self.encoder.encode_json(input)
    }

    pub fn encoder_mut(&mut self) -> &mut CommandEncoder {
        &mut self.encoder
    }

    /// Discard buffered bytes and restart the outbound sequence at 0.
    pub fn reset(&mut self) {
        self.assembler.reset();
        self.encoder.reset();
    }

    pub fn buffered(&self) -> usize {
        self.assembler.buffered()
    }

    pub fn skipped_bytes(&self) -> u64 {
        self.assembler.skipped_bytes()
    }
}

/// Iterator returned by [`Session::feed`].
pub struct Decoded<'a> {
    frames: Frames<'a>,
    decoder: &'a FrameDecoder,
    target: Option<u8>,
}

impl Iterator for Decoded<'_> {
    type Item = Result<DecodedMessage, DecodeError>;

    fn next(&mut self) -> Option<Self::Item> {
        let frame = self.frames.next()?;
        Some(self.decoder.decode(&frame, self.target))
    }
}
