use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder, LinesCodec, LinesCodecError};

/// One framed request from the link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestLine {
    Line(String),
    /// A line longer than the configured limit. Its bytes are discarded up to
    /// the next newline.
    Oversized,
}

/// Newline framing that keeps the link usable after an over-long line.
///
/// `LinesCodec` reports such a line as an error, which ends a `Framed` stream.
/// Here it becomes an ordinary item so the connection can answer it and go on.
#[derive(Debug, Clone)]
pub struct RequestCodec {
    lines: LinesCodec,
}

impl RequestCodec {
    pub fn new(max_line_length: usize) -> Self {
        Self {
            lines: LinesCodec::new_with_max_length(max_line_length),
        }
    }

    fn frame(
        result: Result<Option<String>, LinesCodecError>,
    ) -> Result<Option<RequestLine>, LinesCodecError> {
        match result {
            Ok(line) => Ok(line.map(RequestLine::Line)),
            Err(LinesCodecError::MaxLineLengthExceeded) => Ok(Some(RequestLine::Oversized)),
            Err(e) => Err(e),
        }
    }
}

impl Decoder for RequestCodec {
    type Item = RequestLine;
    type Error = LinesCodecError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<RequestLine>, LinesCodecError> {
        Self::frame(self.lines.decode(buf))
    }

    fn decode_eof(&mut self, buf: &mut BytesMut) -> Result<Option<RequestLine>, LinesCodecError> {
        Self::frame(self.lines.decode_eof(buf))
    }
}

impl<T: AsRef<str>> Encoder<T> for RequestCodec {
    type Error = LinesCodecError;

    fn encode(&mut self, line: T, dst: &mut BytesMut) -> Result<(), LinesCodecError> {
        self.lines.encode(line, dst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_line_is_skipped_not_fatal() {
        let mut codec = RequestCodec::new(8);
        let mut buf = BytesMut::from("1|MHT|123456789\n2|STP|\n");

        assert_eq!(codec.decode(&mut buf).unwrap(), Some(RequestLine::Oversized));
        assert_eq!(
            codec.decode(&mut buf).unwrap(),
            Some(RequestLine::Line("2|STP|".to_string()))
        );
        assert_eq!(codec.decode(&mut buf).unwrap(), None);
    }

    #[test]
    fn test_encodes_with_newline() {
        let mut codec = RequestCodec::new(8);
        let mut buf = BytesMut::new();
        codec.encode("1|RES|0", &mut buf).unwrap();
        assert_eq!(&buf[..], b"1|RES|0\n");
    }
}
