use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Error, Result};

/// Minimum length the server accepts for a new PIN.
pub const MIN_PIN_LEN: usize = 4;

/// Parent PIN held as a secret so it never shows up in logs or debug output.
pub struct Pin(SecretString);

impl Pin {
    /// Wrap a PIN exactly as typed. No validation; the server is authoritative.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(SecretString::from(raw.into()))
    }

    /// Build a PIN that satisfies the server's rules for a new PIN.
    pub fn new_checked(raw: impl Into<String>) -> Result<Self> {
        let pin = Self::new(raw);
        pin.check_new()?;
        Ok(pin)
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    pub fn len(&self) -> usize {
        self.expose().chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }

    pub fn check_new(&self) -> Result<()> {
        if self.len() < MIN_PIN_LEN {
            return Err(Error::InvalidPin(format!("PIN must be at least {MIN_PIN_LEN} digits")));
        }
        Ok(())
    }

    pub fn matches(&self, other: &Pin) -> bool {
        self.expose() == other.expose()
    }
}

impl fmt::Debug for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pin(****)")
    }
}

/// What happened to a digit pushed onto the PIN pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinPush {
    /// Digit stored, buffer not yet full.
    Accepted,
    /// Digit stored and the buffer is now full; time to submit.
    Completed,
    /// Buffer was already full or the input was not a digit.
    Ignored,
}

/// Fixed-capacity digit buffer behind the PIN pad. Wiped on drop.
#[derive(Clone, Default, Zeroize, ZeroizeOnDrop)]
pub struct PinBuffer {
    digits: String,
}

impl PinBuffer {
    pub const CAPACITY: usize = 4;

    pub fn push(&mut self, digit: char) -> PinPush {
        if !digit.is_ascii_digit() || self.is_full() {
            return PinPush::Ignored;
        }
        self.digits.push(digit);
        if self.is_full() {
            PinPush::Completed
        } else {
            PinPush::Accepted
        }
    }

    pub fn pop(&mut self) -> bool {
        self.digits.pop().is_some()
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.digits.len() >= Self::CAPACITY
    }

    /// Copy the current digits out as a [`Pin`], leaving the buffer intact.
    pub fn to_pin(&self) -> Pin {
        Pin::new(self.digits.clone())
    }

    pub fn clear(&mut self) {
        self.digits.zeroize();
    }

    /// One bullet per entered digit, for rendering.
    pub fn masked(&self) -> String {
        "\u{2022}".repeat(self.len())
    }
}

impl fmt::Debug for PinBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinBuffer").field("len", &self.len()).finish()
    }
}
