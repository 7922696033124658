//! Hex dumps.

use super::Console;
use crate::hal::serial::ConsoleBackend;

/// Bytes per `dump_memory` line.
const LINE: usize = 16;

/// Bytes per hex group within a line.
const GROUP: usize = 4;

impl<B: ConsoleBackend> Console<B> {
    /// Print a frame as space separated lowercase hex pairs.
    pub fn dump_frame(&self, frame: &[u8]) {
        for b in frame {
            let _ = write!(self, "{b:02x} ");
        }
        self.put_str("\n\r");
    }

    /// Print `buffer` as a memory dump starting at `address`:
    ///
    /// ```text
    /// 0x00001000: 48656C6C 6F2C2077 6F726C64 210A0000 <16 raw bytes>
    /// ```
    ///
    /// The raw bytes go out through [`put_char`](Self::put_char) unescaped.
    /// A short last line is padded so its raw column lines up with the
    /// lines above.
    pub fn dump_memory(&self, buffer: &[u8], address: u32) {
        let lines = buffer.chunks_exact(LINE);
        let tail = lines.remainder();

        for (i, line) in lines.enumerate() {
            let _ = write!(self, "0x{:08X}: ", address.wrapping_add((i * LINE) as u32));
            for group in line.chunks_exact(GROUP) {
                let _ = write!(
                    self,
                    "{:02X}{:02X}{:02X}{:02X} ",
                    group[0], group[1], group[2], group[3]
                );
            }
            self.put_bytes(line);
            self.put_str("\n\r");
        }

        if tail.is_empty() {
            return;
        }

        let start = buffer.len() - tail.len();
        let _ = write!(self, "0x{:08X}: ", address.wrapping_add(start as u32));
        for j in 0..LINE {
            if j != 0 && j % GROUP == 0 {
                self.put_char(b' ');
            }
            match tail.get(j) {
                Some(b) => {
                    let _ = write!(self, "{b:02X}");
                }
                None => self.put_str("  "),
            }
        }
        self.put_char(b' ');
        self.put_bytes(tail);
        self.put_str("\n\r");
    }
}

#[cfg(test)]
mod tests {
    use crate::mock::configured_console;

    #[test]
    fn frame_is_lowercase_pairs() {
        let console = configured_console();
        console.dump_frame(&[0x00, 0xAB, 0x7F]);
        assert_eq!(console.backend().unwrap().tx(), b"00 ab 7f \n\r");
    }

    #[test]
    fn empty_frame_is_just_a_line_end() {
        let console = configured_console();
        console.dump_frame(&[]);
        assert_eq!(console.backend().unwrap().tx(), b"\n\r");
    }

    #[test]
    fn memory_with_partial_last_line() {
        let console = configured_console();
        let buffer: [u8; 20] = core::array::from_fn(|i| b'A' + i as u8);

        console.dump_memory(&buffer, 0x1000);

        let expected = concat!(
            "0x00001000: 41424344 45464748 494A4B4C 4D4E4F50 ABCDEFGHIJKLMNOP\n\r",
            "0x00001010: 51525354                            QRST\n\r",
        );
        assert_eq!(console.backend().unwrap().tx_string(), expected);
    }

    #[test]
    fn partial_line_keeps_group_spacing() {
        let console = configured_console();
        console.dump_memory(b"0123456", 0x2000_0000);

        assert_eq!(
            console.backend().unwrap().tx_string(),
            "0x20000000: 30313233 343536                     0123456\n\r"
        );
    }

    #[test]
    fn whole_lines_advance_by_sixteen() {
        let console = configured_console();
        console.dump_memory(&[0u8; 32], 0xFFFF_FFF0);

        let out = console.backend().unwrap().tx();
        let lines: Vec<&[u8]> = out.split(|&b| b == b'\r').collect();
        assert!(lines[0].starts_with(b"0xFFFFFFF0: 00000000"));
        assert!(lines[1].starts_with(b"0x00000000: 00000000"));
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn empty_buffer_prints_nothing() {
        let console = configured_console();
        console.dump_memory(&[], 0x1000);
        assert!(console.backend().unwrap().tx().is_empty());
    }
}
