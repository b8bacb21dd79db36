// SPDX-FileCopyrightText: 2025 SCuM Project Authors
//
// SPDX-License-Identifier: Apache-2.0

//! RAM model of the 1216-bit analog scan chain.
//!
//! The chain is stored as 38 32-bit words. Bit position 0 is the
//! most-significant bit of word 0, so multi-bit fields written at increasing
//! positions land MSB-to-LSB. The hardware shift register receives the whole
//! vector MSB-first, word 37 down to word 0, bit 31 down to bit 0 within each
//! word; [`AscChain::shift_bits`] produces exactly that order.

use scum_hal::scan_port::ScanChainPort;

/// Number of configuration bits in the analog scan chain.
pub const ASC_BIT_COUNT: usize = 1216;

/// Number of 32-bit words backing the chain.
pub const ASC_WORD_COUNT: usize = ASC_BIT_COUNT / 32;

/// A scan-chain bit position outside `0..1216`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfRange {
    pub position: usize,
}

impl ufmt::uDisplay for OutOfRange {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        ufmt::uwrite!(f, "scan-chain position {} out of range", self.position)
    }
}

impl core::fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "scan-chain position {} out of range", self.position)
    }
}

/// In-memory mirror of the analog scan chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AscChain {
    words: [u32; ASC_WORD_COUNT],
}

impl Default for AscChain {
    fn default() -> Self {
        AscChain::new()
    }
}

impl AscChain {
    /// An all-zero chain.
    pub const fn new() -> AscChain {
        AscChain {
            words: [0; ASC_WORD_COUNT],
        }
    }

    fn mask(position: usize) -> Result<(usize, u32), OutOfRange> {
        if position >= ASC_BIT_COUNT {
            return Err(OutOfRange { position });
        }
        let word = position >> 5;
        // Position 0 is the MSB of word 0.
        let mask = 0x8000_0000u32 >> (position & 31);
        Ok((word, mask))
    }

    /// Set bit `position` to 1.
    pub fn set(&mut self, position: usize) -> Result<(), OutOfRange> {
        let (word, mask) = Self::mask(position)?;
        self.words[word] |= mask;
        Ok(())
    }

    /// Clear bit `position` to 0.
    pub fn clear(&mut self, position: usize) -> Result<(), OutOfRange> {
        let (word, mask) = Self::mask(position)?;
        self.words[word] &= !mask;
        Ok(())
    }

    /// Write bit `position`.
    pub fn write(&mut self, position: usize, value: bool) -> Result<(), OutOfRange> {
        if value {
            self.set(position)
        } else {
            self.clear(position)
        }
    }

    /// Read bit `position`.
    pub fn get(&self, position: usize) -> Result<bool, OutOfRange> {
        let (word, mask) = Self::mask(position)?;
        Ok(self.words[word] & mask != 0)
    }

    /// Read backing word `index`.
    pub fn word(&self, index: usize) -> u32 {
        self.words[index]
    }

    /// All backing words, word 0 first.
    pub fn words(&self) -> &[u32; ASC_WORD_COUNT] {
        &self.words
    }

    /// Replace the bits of word `index` not covered by `keep_mask`.
    pub fn update_word(&mut self, index: usize, keep_mask: u32, bits: u32) {
        self.words[index] = (self.words[index] & keep_mask) | (bits & !keep_mask);
    }

    /// The bits in hardware shift order: word 37 first, MSB of each word
    /// first.
    pub fn shift_bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.words
            .iter()
            .rev()
            .flat_map(|&word| (0..32).rev().map(move |bit| word & (1 << bit) != 0))
    }

    /// Shift the whole chain into hardware and latch it into the live
    /// configuration.
    pub fn commit(&self, port: &mut ScanChainPort) {
        port.shift_out(self.shift_bits());
        port.load_shadow();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn msb_first_word_layout() {
        let mut chain = AscChain::new();
        chain.set(0).unwrap();
        assert_eq!(chain.word(0), 0x8000_0000);
        chain.set(31).unwrap();
        assert_eq!(chain.word(0), 0x8000_0001);
        chain.set(32).unwrap();
        assert_eq!(chain.word(1), 0x8000_0000);
    }

    #[test]
    fn out_of_range_is_rejected() {
        let mut chain = AscChain::new();
        assert_eq!(
            chain.set(ASC_BIT_COUNT),
            Err(OutOfRange {
                position: ASC_BIT_COUNT
            })
        );
        assert_eq!(chain.get(usize::MAX).unwrap_err().position, usize::MAX);
    }
}
