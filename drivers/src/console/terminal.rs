//! Terminal helpers: blocking number entry, echo and screen control.
//!
//! Input helpers echo every byte they read and print a diagnostic on the
//! console when they fail. They never retry; the caller decides whether to
//! prompt again. A failed read produces no value.

use core::fmt;

use super::Console;
use crate::hal::serial::ConsoleBackend;
use crate::platform::Platform;

/// Clear the screen and move the cursor home.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[0;0f";

/// Move the cursor home.
pub const RESET_CURSOR: &str = "\x1b[0;0f";

/// Move one column left and erase to the end of the line.
pub const ERASE_LEFT: &str = "\x1b[1D\x1b[K";

const CR: u8 = b'\r';
const LF: u8 = b'\n';
const BS: u8 = 0x08;
const DEL: u8 = 0x7F;

/// Number entry errors. `Display` yields the diagnostic shown to the user.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum InputError {
    /// Terminator typed before any digit.
    NoDigits,
    /// A byte that is neither a digit nor a terminator.
    NotANumber(u8),
    /// A byte that is not a hexadecimal digit.
    NotHex(u8),
    /// A well-formed number outside the accepted range.
    OutOfRange { value: u32, min: u32, max: u32 },
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            InputError::NoDigits => f.write_str("Write a number and press ENTER or SPACE!"),
            InputError::NotANumber(c) => write!(f, "'{}' not a number!", char::from(c)),
            InputError::NotHex(_) => f.write_str("It is not a hexa character!"),
            InputError::OutOfRange { min, max, .. } => {
                write!(f, "The number have to be between {min} and {max}")
            }
        }
    }
}

fn hex_nibble(c: u8) -> Option<u32> {
    match c {
        b'0'..=b'9' => Some((c - b'0') as u32),
        b'A'..=b'F' => Some((c - b'A' + 10) as u32),
        b'a'..=b'f' => Some((c - b'a' + 10) as u32),
        _ => None,
    }
}

impl<B: ConsoleBackend> Console<B> {
    /// Read and echo one byte.
    fn read_echo(&self) -> u8 {
        let c = self.get_char();
        self.put_char(c);
        c
    }

    fn report(&self, err: InputError) -> InputError {
        let _ = write!(self, "\n\r{err}\n\r");
        log::debug!("console: input rejected: {err:?}");
        err
    }

    /// Read a decimal number terminated by carriage return or space.
    ///
    /// The value accumulates in 32 bits and wraps on overflow.
    pub fn get_integer(&self) -> Result<u32, InputError> {
        let mut value: u32 = 0;
        let mut digits = 0usize;

        loop {
            match self.read_echo() {
                c @ b'0'..=b'9' => {
                    value = value.wrapping_mul(10).wrapping_add((c - b'0') as u32);
                    digits += 1;
                }
                CR | b' ' if digits == 0 => return Err(self.report(InputError::NoDigits)),
                CR | b' ' => {
                    self.put_str("\n\r");
                    return Ok(value);
                }
                c => return Err(self.report(InputError::NotANumber(c))),
            }
        }
    }

    /// [`get_integer`](Self::get_integer), rejecting values outside
    /// `min..=max`.
    pub fn get_integer_min_max(&self, min: u32, max: u32) -> Result<u32, InputError> {
        let value = self.get_integer()?;
        if value < min || value > max {
            return Err(self.report(InputError::OutOfRange { value, min, max }));
        }
        self.put_str("\n\r");
        Ok(value)
    }

    /// Read exactly eight hexadecimal digits, most significant first.
    pub fn get_hexa_32(&self) -> Result<u32, InputError> {
        let mut value: u32 = 0;

        for _ in 0..8 {
            let c = self.read_echo();
            match hex_nibble(c) {
                Some(nibble) => value = (value << 4) | nibble,
                None => return Err(self.report(InputError::NotHex(c))),
            }
        }

        self.put_str("\n\r");
        Ok(value)
    }

    /// Echo a typed byte, turning line ends into CR LF and backspace or
    /// delete into an erase of the previous column.
    pub fn echo(&self, c: u8) {
        match c {
            CR | LF => self.put_str("\r\n"),
            DEL | BS => self.put_str(ERASE_LEFT),
            _ => self.put_char(c),
        }
    }

    pub fn clear_screen(&self) {
        self.put_str(CLEAR_SCREEN);
    }

    pub fn reset_cursor(&self) {
        self.put_str(RESET_CURSOR);
    }

    /// Clear the screen and print a banner naming the running program.
    ///
    /// Debug builds add the package version, board, chip and clock figures.
    pub fn example_info<P: Platform>(&self, name: &str) {
        self.clear_screen();
        self.reset_cursor();

        let _ = write!(self, "-- {name} --\r\n");
        #[cfg(debug_assertions)]
        {
            let _ = write!(self, "Drivers v{}\r\n", env!("CARGO_PKG_VERSION"));
            let _ = write!(self, "Built for {}\r\n", P::name());
            let _ = write!(self, "Processor: {}\r\n", P::chip_name());
            let _ = write!(
                self,
                "Processor clock: {} MHz\r\n",
                P::processor_clock_hz() / 1_000_000
            );
            let _ = write!(self, "Master clock: {} MHz\r\n", P::master_clock_hz() / 1_000_000);
        }
        self.put_str("\r\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::configured_console;
    use crate::platform::CurrentPlatform;

    fn typed(input: &[u8]) -> &'static Console<crate::mock::MockSerial> {
        let console = configured_console();
        console.backend().unwrap().inject_rx(input);
        console
    }

    #[test]
    fn integer_terminated_by_space() {
        let console = typed(b"123 ");
        assert_eq!(console.get_integer(), Ok(123));
        assert_eq!(console.backend().unwrap().tx(), b"123 \n\r");
    }

    #[test]
    fn integer_terminated_by_carriage_return() {
        let console = typed(b"4096\r");
        assert_eq!(console.get_integer(), Ok(4096));
    }

    #[test]
    fn integer_with_stray_character_fails() {
        let console = typed(b"12x9 ");
        assert_eq!(console.get_integer(), Err(InputError::NotANumber(b'x')));

        let serial = console.backend().unwrap();
        assert_eq!(serial.tx(), b"12x\n\r'x' not a number!\n\r");
        // Aborts at the bad byte, the rest stays unread
        assert_eq!(serial.rx_pending(), 2);
    }

    #[test]
    fn integer_without_digits_fails() {
        let console = typed(b" ");
        assert_eq!(console.get_integer(), Err(InputError::NoDigits));
        assert_eq!(
            console.backend().unwrap().tx(),
            b" \n\rWrite a number and press ENTER or SPACE!\n\r"
        );
    }

    #[test]
    fn integer_wraps_at_32_bits() {
        let console = typed(b"4294967296 ");
        assert_eq!(console.get_integer(), Ok(0));
    }

    #[test]
    fn bounded_integer_accepts_inclusive_range() {
        assert_eq!(typed(b"10 ").get_integer_min_max(10, 20), Ok(10));
        assert_eq!(typed(b"20\r").get_integer_min_max(10, 20), Ok(20));
    }

    #[test]
    fn bounded_integer_rejects_out_of_range() {
        let console = typed(b"21 ");
        assert_eq!(
            console.get_integer_min_max(10, 20),
            Err(InputError::OutOfRange {
                value: 21,
                min: 10,
                max: 20
            })
        );
        assert!(
            console
                .backend()
                .unwrap()
                .tx_string()
                .ends_with("\n\rThe number have to be between 10 and 20\n\r")
        );
    }

    #[test]
    fn bounded_integer_propagates_parse_failure() {
        assert_eq!(
            typed(b"-1 ").get_integer_min_max(0, 9),
            Err(InputError::NotANumber(b'-'))
        );
    }

    #[test]
    fn hexa_32_reads_eight_digits() {
        let console = typed(b"1A2B3C4D");
        assert_eq!(console.get_hexa_32(), Ok(0x1A2B_3C4D));
        assert_eq!(console.backend().unwrap().tx(), b"1A2B3C4D\n\r");
    }

    #[test]
    fn hexa_32_accepts_lowercase() {
        assert_eq!(typed(b"deadbeef").get_hexa_32(), Ok(0xDEAD_BEEF));
    }

    #[test]
    fn hexa_32_stops_at_first_bad_digit() {
        let console = typed(b"1G2B3C4D");
        assert_eq!(console.get_hexa_32(), Err(InputError::NotHex(b'G')));

        let serial = console.backend().unwrap();
        assert_eq!(serial.reads(), 2);
        assert_eq!(serial.tx(), b"1G\n\rIt is not a hexa character!\n\r");
    }

    #[test]
    fn echo_translates_control_bytes() {
        let console = configured_console();
        let serial = console.backend().unwrap();

        console.echo(b'\r');
        assert_eq!(serial.take_tx(), b"\r\n");
        console.echo(b'\n');
        assert_eq!(serial.take_tx(), b"\r\n");
        console.echo(0x7F);
        assert_eq!(serial.take_tx(), b"\x1b[1D\x1b[K");
        console.echo(0x08);
        assert_eq!(serial.take_tx(), b"\x1b[1D\x1b[K");
        console.echo(b'a');
        assert_eq!(serial.take_tx(), b"a");
    }

    #[test]
    fn screen_control_sequences() {
        let console = configured_console();
        let serial = console.backend().unwrap();

        console.clear_screen();
        assert_eq!(serial.take_tx(), b"\x1b[2J\x1b[0;0f");
        console.reset_cursor();
        assert_eq!(serial.take_tx(), b"\x1b[0;0f");
    }

    #[test]
    fn example_info_starts_with_cleared_screen_and_banner() {
        let console = configured_console();
        console.example_info::<CurrentPlatform>("getting started");

        let out = console.backend().unwrap().tx_string();
        assert!(out.starts_with("\x1b[2J\x1b[0;0f\x1b[0;0f-- getting started --\r\n"));
        assert!(out.ends_with("\r\n\r\n"));
        #[cfg(debug_assertions)]
        assert!(out.contains("Master clock: 132 MHz\r\n"));
    }
}
