use super::{command::Command, error::ControlChanError, line_parser, line_parser::ParseError, Reply};

use bytes::BytesMut;
use std::io::Write;
use tokio_util::codec::{Decoder, Encoder};

// FtpCodec implements tokio's `Decoder` and `Encoder` traits for the control
// channel: it splits incoming bytes on newlines and parses each line into a
// `Command`, and serializes outgoing `Reply`s.
pub struct FtpCodec {
    // Stored index of the next index to examine for a '\n' character. This
    // avoids rescanning the buffer when a command arrives in pieces.
    next_index: usize,
}

impl FtpCodec {
    pub fn new() -> Self {
        FtpCodec { next_index: 0 }
    }
}

impl Decoder for FtpCodec {
    // Parse failures are yielded as items, not as `Error`: an `Err` from
    // `decode` fuses the `Framed` stream and would end the whole session
    // over one bad command line.
    type Item = Result<Command, ParseError>;
    type Error = ControlChanError;

    fn decode(&mut self, buf: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(newline_offset) = buf[self.next_index..].iter().position(|b| *b == b'\n') {
            let newline_index = newline_offset + self.next_index;
            let line = buf.split_to(newline_index + 1);
            self.next_index = 0;
            Ok(Some(line_parser::parse(line)))
        } else {
            self.next_index = buf.len();
            Ok(None)
        }
    }
}

impl Encoder<Reply> for FtpCodec {
    type Error = ControlChanError;

    fn encode(&mut self, reply: Reply, buf: &mut BytesMut) -> Result<(), Self::Error> {
        let mut buffer = vec![];
        match reply {
            Reply::None => {
                return Ok(());
            }
            Reply::CodeAndMsg { code, msg } => {
                if msg.is_empty() {
                    writeln!(buffer, "{}\r", code as u32)?;
                } else {
                    writeln!(buffer, "{} {}\r", code as u32, msg)?;
                }
            }
            Reply::MultiLine { code, mut lines } => {
                let last_line = lines.pop().unwrap_or_default();

                // Continuation lines starting with a digit must be indented
                // so they cannot be mistaken for the final line.
                for it in lines.iter_mut() {
                    if it.starts_with(|c: char| c.is_ascii_digit()) {
                        it.insert(0, ' ');
                    }
                }
                if lines.is_empty() {
                    writeln!(buffer, "{} {}\r", code as u32, last_line)?;
                } else {
                    write!(buffer, "{}-{}\r\n{} {}\r\n", code as u32, lines.join("\r\n"), code as u32, last_line)?;
                }
            }
        }
        buf.extend(&buffer);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::controlchan::ReplyCode;
    use pretty_assertions::assert_eq;

    fn encoded(reply: Reply) -> String {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::new();
        codec.encode(reply, &mut buf).unwrap();
        String::from_utf8(buf.to_vec()).unwrap()
    }

    #[test]
    fn encodes_single_line_reply() {
        assert_eq!(encoded(Reply::new(ReplyCode::CommandOkay, "Okay")), "200 Okay\r\n");
    }

    #[test]
    fn encodes_no_reply_as_nothing() {
        assert_eq!(encoded(Reply::none()), "");
    }

    #[test]
    fn encodes_multi_line_reply() {
        let reply = Reply::new_multiline(ReplyCode::SystemStatus, vec!["Extensions supported:", " SIZE", "END"]);
        assert_eq!(encoded(reply), "211-Extensions supported:\r\n SIZE\r\n211 END\r\n");
    }

    #[test]
    fn decodes_partial_input_as_none() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from(&b"NOO"[..]);
        assert!(codec.decode(&mut buf).unwrap().is_none());
        buf.extend_from_slice(b"P\r\n");
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Ok(Command::Noop)));
    }

    #[test]
    fn keeps_decoding_after_a_parse_failure() {
        let mut codec = FtpCodec::new();
        let mut buf = BytesMut::from(&b"XYZZY\r\nNOOP\r\n"[..]);
        let first = codec.decode(&mut buf).unwrap().unwrap();
        assert!(first.is_err());
        assert_eq!(codec.decode(&mut buf).unwrap(), Some(Ok(Command::Noop)));
    }
}
