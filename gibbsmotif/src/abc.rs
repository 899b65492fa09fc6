//! Digital encoding for biological sequences using an alphabet.

use std::fmt::Debug;

use generic_array::ArrayLength;
use generic_array::GenericArray;
use typenum::consts::U4;
use typenum::marker_traits::NonZero;
use typenum::marker_traits::Unsigned;

use super::err::InvalidData;
use super::err::InvalidSymbol;
use super::seq::EncodedSequence;

// --- Symbol ------------------------------------------------------------------

/// A symbol from a biological alphabet.
pub trait Symbol: Default + Sized + Copy + Eq {
    /// View this symbol as a zero-based index.
    fn as_index(&self) -> usize;
    /// View this symbol as a string character.
    fn as_char(&self) -> char {
        self.as_ascii() as char
    }
    /// Parse a string character into a symbol.
    fn from_char(c: char) -> Result<Self, InvalidSymbol> {
        if c.is_ascii() {
            Self::from_ascii(c as u8)
        } else {
            Err(InvalidSymbol(c))
        }
    }
    /// View this symbol as an ASCII charater.
    fn as_ascii(&self) -> u8;
    /// Parse an ASCII character into a symbol.
    fn from_ascii(c: u8) -> Result<Self, InvalidSymbol>;
}

// --- Alphabet ----------------------------------------------------------------

/// A biological alphabet with associated metadata.
pub trait Alphabet: Debug + Copy + Default + 'static {
    type Symbol: Symbol + Debug;
    type K: Unsigned + NonZero + ArrayLength + Debug;

    /// Get all the symbols of this alphabet, in index order.
    fn symbols() -> &'static [Self::Symbol];

    /// Get a string with all symbols from this alphabet.
    fn as_str() -> &'static str;
}

// --- DNA ---------------------------------------------------------------------

/// The standard DNA alphabet composed of 4 deoxyribonucleotides.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dna;

impl Alphabet for Dna {
    type Symbol = Nucleotide;
    type K = U4;

    fn symbols() -> &'static [Nucleotide] {
        &[Nucleotide::A, Nucleotide::C, Nucleotide::G, Nucleotide::T]
    }

    fn as_str() -> &'static str {
        "ACGT"
    }
}

/// A deoxyribonucleotide.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Nucleotide {
    /// Adenine.
    #[default]
    A = 0,
    /// Cytosine.
    C = 1,
    /// Guanine.
    G = 2,
    /// Thymine.
    T = 3,
}

impl From<Nucleotide> for char {
    fn from(n: Nucleotide) -> char {
        n.as_char()
    }
}

impl Symbol for Nucleotide {
    fn as_index(&self) -> usize {
        *self as usize
    }

    fn as_ascii(&self) -> u8 {
        match self {
            Nucleotide::A => b'A',
            Nucleotide::C => b'C',
            Nucleotide::G => b'G',
            Nucleotide::T => b'T',
        }
    }

    fn from_ascii(c: u8) -> Result<Self, InvalidSymbol> {
        match c {
            b'A' => Ok(Nucleotide::A),
            b'C' => Ok(Nucleotide::C),
            b'G' => Ok(Nucleotide::G),
            b'T' => Ok(Nucleotide::T),
            _ => Err(InvalidSymbol(c as char)),
        }
    }
}

// --- Background --------------------------------------------------------------

/// The background frequencies for an alphabet.
#[derive(Clone, Debug, PartialEq)]
pub struct Background<A: Alphabet> {
    frequencies: GenericArray<f64, A::K>,
    alphabet: std::marker::PhantomData<A>,
}

impl<A: Alphabet> Background<A> {
    /// Create a new background with the given frequencies.
    ///
    /// The array must contain valid frequencies, i.e. real numbers between
    /// zero and one that sum to one.
    pub fn new<F>(frequencies: F) -> Result<Self, InvalidData>
    where
        F: Into<GenericArray<f64, A::K>>,
    {
        let frequencies = frequencies.into();
        let mut sum = 0.0;
        for &f in frequencies.iter() {
            if !(0.0..=1.0).contains(&f) {
                return Err(InvalidData);
            }
            sum += f;
        }
        if (sum - 1.0).abs() > 1e-6 {
            return Err(InvalidData);
        }
        Ok(Self::new_unchecked(frequencies))
    }

    fn new_unchecked(frequencies: GenericArray<f64, A::K>) -> Self {
        Self {
            frequencies,
            alphabet: std::marker::PhantomData,
        }
    }

    /// Create a new background from raw symbol counts.
    ///
    /// Fails with [`InvalidData`] if all the counts are zero.
    pub fn from_counts(counts: &GenericArray<usize, A::K>) -> Result<Self, InvalidData> {
        let total = counts.iter().sum::<usize>();
        if total == 0 {
            return Err(InvalidData);
        }
        let frequencies = counts
            .iter()
            .map(|&n| n as f64 / total as f64)
            .collect();
        Ok(Self::new_unchecked(frequencies))
    }

    /// Estimate the background frequencies of a single sequence.
    ///
    /// Each frequency is the number of occurences of a symbol divided by
    /// the length of the sequence. An empty sequence yields a uniform
    /// background.
    ///
    /// # Example
    /// ```
    /// # use gibbsmotif::abc::*;
    /// # use gibbsmotif::seq::EncodedSequence;
    /// let seq = EncodedSequence::<Dna>::encode("AACGTTTT").unwrap();
    /// let bg = Background::from_sequence(&seq);
    /// assert_eq!(bg.frequencies(), &[0.25, 0.125, 0.125, 0.5]);
    /// ```
    pub fn from_sequence(sequence: &EncodedSequence<A>) -> Self {
        Self::from_counts(&sequence.count_symbols()).unwrap_or_default()
    }

    /// Create a new background with uniform frequencies.
    ///
    /// # Note
    /// The `Default` implementation for `Background` uses uniform frequencies.
    ///
    /// # Example
    /// ```
    /// # use gibbsmotif::abc::*;
    /// let bg = Background::<Dna>::uniform();
    /// assert_eq!(bg.frequencies(), &[0.25, 0.25, 0.25, 0.25]);
    /// ```
    pub fn uniform() -> Self {
        let frequencies = (0..A::K::USIZE)
            .map(|_| 1.0 / (A::K::USIZE as f64))
            .collect();
        Self::new_unchecked(frequencies)
    }

    /// A reference to the raw background frequencies.
    pub fn frequencies(&self) -> &[f64] {
        &self.frequencies
    }
}

impl<A: Alphabet> AsRef<[f64]> for Background<A> {
    fn as_ref(&self) -> &[f64] {
        self.frequencies()
    }
}

impl<A: Alphabet> AsRef<GenericArray<f64, A::K>> for Background<A> {
    fn as_ref(&self) -> &GenericArray<f64, A::K> {
        &self.frequencies
    }
}

impl<A: Alphabet> Default for Background<A> {
    fn default() -> Self {
        Self::uniform()
    }
}
