//! Count, frequency and scoring matrices for fixed-length motifs.

use super::abc::Alphabet;
use super::abc::Background;
use super::abc::Symbol;
use super::dense::DenseMatrix;
use super::err::InvalidData;
use super::seq::EncodedSequence;

// --- CountMatrix -------------------------------------------------------------

/// A matrix storing symbol occurences at each position.
#[derive(Clone, Debug, PartialEq)]
pub struct CountMatrix<A: Alphabet> {
    /// The alphabet of the count matrix.
    alphabet: std::marker::PhantomData<A>,
    /// The actual counts for each position of the motif.
    data: DenseMatrix<u32, A::K>,
    /// The number of sequences from which this count matrix was obtained.
    n: u32,
}

impl<A: Alphabet> CountMatrix<A> {
    /// Create a new count matrix without checking the contents.
    fn new_unchecked(data: DenseMatrix<u32, A::K>, n: u32) -> Self {
        Self {
            alphabet: std::marker::PhantomData,
            n,
            data,
        }
    }

    /// Create a new count matrix from the given data.
    ///
    /// The matrix must contain count data, for sequences of the same
    /// length, i.e. rows should all sum to the same value.
    pub fn new(data: DenseMatrix<u32, A::K>) -> Result<Self, InvalidData> {
        let mut sums = data.iter().map(|row| row.iter().sum::<u32>());
        let n = match sums.next() {
            None => return Ok(Self::new_unchecked(data, 0)),
            Some(n) => n,
        };
        if sums.any(|s| s != n) {
            return Err(InvalidData);
        }
        Ok(Self::new_unchecked(data, n))
    }

    /// Create a new count matrix from the given sequences.
    ///
    /// All sequences must have the same length, which becomes the length
    /// of the motif.
    pub fn from_sequences<I>(sequences: I) -> Result<Self, InvalidData>
    where
        I: IntoIterator,
        <I as IntoIterator>::Item: AsRef<EncodedSequence<A>>,
    {
        let mut n = 0;
        let mut data: Option<DenseMatrix<u32, A::K>> = None;
        for seq in sequences {
            let seq = seq.as_ref();
            let d = data.get_or_insert_with(|| DenseMatrix::new(seq.len()));
            if seq.len() != d.rows() {
                return Err(InvalidData);
            }
            for (i, x) in seq.iter().enumerate() {
                d[i][x.as_index()] += 1;
            }
            n += 1;
        }
        let data = data.unwrap_or_else(|| DenseMatrix::new(0));
        Ok(Self::new_unchecked(data, n))
    }

    /// Create a new count matrix of the given width from sequence windows.
    ///
    /// # Panics
    ///
    /// Panics if any window is shorter than `width`.
    pub fn from_windows<'s, I>(width: usize, windows: I) -> Self
    where
        I: IntoIterator<Item = &'s [A::Symbol]>,
    {
        let mut n = 0;
        let mut data = DenseMatrix::new(width);
        for window in windows {
            for i in 0..width {
                data[i][window[i].as_index()] += 1;
            }
            n += 1;
        }
        Self::new_unchecked(data, n)
    }

    /// Build a frequency matrix from this count matrix.
    ///
    /// Each row is divided by its total, so that rows sum to one. Rows
    /// without any observation are left filled with zeros.
    pub fn to_freq(&self) -> FrequencyMatrix<A> {
        let mut probas = DenseMatrix::new(self.data.rows());
        for (src, dst) in self.data.iter().zip(probas.iter_mut()) {
            let s = src.iter().sum::<u32>();
            if s > 0 {
                for (x, y) in src.iter().zip(dst.iter_mut()) {
                    *y = *x as f64 / s as f64;
                }
            }
        }
        FrequencyMatrix::new_unchecked(probas)
    }

    /// The length of the motif encoded in this count matrix.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.rows()
    }

    /// Check whether the count matrix has no column.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.rows() == 0
    }

    /// The number of sequences counted in this matrix.
    #[inline]
    pub fn sequence_count(&self) -> u32 {
        self.n
    }

    /// The raw counts from the count matrix.
    #[inline]
    pub fn counts(&self) -> &DenseMatrix<u32, A::K> {
        &self.data
    }
}

impl<A: Alphabet> AsRef<DenseMatrix<u32, A::K>> for CountMatrix<A> {
    fn as_ref(&self) -> &DenseMatrix<u32, A::K> {
        &self.data
    }
}

// --- FrequencyMatrix ---------------------------------------------------------

/// A matrix storing symbol frequencies at each position.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyMatrix<A: Alphabet> {
    alphabet: std::marker::PhantomData<A>,
    data: DenseMatrix<f64, A::K>,
}

impl<A: Alphabet> FrequencyMatrix<A> {
    fn new_unchecked(data: DenseMatrix<f64, A::K>) -> Self {
        Self {
            alphabet: std::marker::PhantomData,
            data,
        }
    }

    /// Create a new frequency matrix from the given data.
    ///
    /// Every row must contain frequencies between zero and one summing
    /// to one.
    pub fn new(data: DenseMatrix<f64, A::K>) -> Result<Self, InvalidData> {
        for row in data.iter() {
            if row.iter().any(|x| !(0.0..=1.0).contains(x)) {
                return Err(InvalidData);
            }
            if (row.iter().sum::<f64>() - 1.0).abs() > 1e-6 {
                return Err(InvalidData);
            }
        }
        Ok(Self::new_unchecked(data))
    }

    /// The length of the motif encoded in this frequency matrix.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.rows()
    }

    /// Check whether the frequency matrix has no column.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.rows() == 0
    }

    /// The raw frequencies of the matrix.
    #[inline]
    pub fn matrix(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }

    /// Convert to a scoring matrix using the given background frequencies.
    ///
    /// Each entry is the natural logarithm of the odds ratio between the
    /// motif and the background frequencies. Entries where either
    /// frequency is zero are left undefined.
    pub fn to_scoring(&self, background: &Background<A>) -> ScoringMatrix<A> {
        let mut weights = DenseMatrix::new(self.data.rows());
        for (src, dst) in self.data.iter().zip(weights.iter_mut()) {
            for (j, (&x, &f)) in src.iter().zip(background.frequencies()).enumerate() {
                dst[j] = if x == 0.0 || f == 0.0 {
                    None
                } else {
                    Some((x / f).ln())
                };
            }
        }
        ScoringMatrix {
            alphabet: std::marker::PhantomData,
            data: weights,
        }
    }
}

impl<A: Alphabet> AsRef<DenseMatrix<f64, A::K>> for FrequencyMatrix<A> {
    fn as_ref(&self) -> &DenseMatrix<f64, A::K> {
        &self.data
    }
}

// --- ScoringMatrix -----------------------------------------------------------

/// A matrix storing log-odds ratio of symbol occurences at each position.
///
/// An entry is `None` when the motif or the background frequency of the
/// symbol is zero, in which case the log-odds ratio is not finite.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoringMatrix<A: Alphabet> {
    alphabet: std::marker::PhantomData<A>,
    data: DenseMatrix<Option<f64>, A::K>,
}

impl<A: Alphabet> ScoringMatrix<A> {
    /// The length of the motif encoded in this scoring matrix.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.rows()
    }

    /// Check whether the scoring matrix has no column.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.rows() == 0
    }

    /// The log-odds ratios of the scoring matrix.
    #[inline]
    pub fn weights(&self) -> &DenseMatrix<Option<f64>, A::K> {
        &self.data
    }

    /// Compute the score of a single window.
    ///
    /// The score is the sum of the log-odds ratios of each symbol. A window
    /// containing any symbol with an undefined ratio gets a neutral score
    /// of exactly zero instead of negative infinity.
    pub fn score_window(&self, window: &[A::Symbol]) -> f64 {
        let mut score = 0.0;
        for (row, x) in self.data.iter().zip(window) {
            match row[x.as_index()] {
                Some(w) => score += w,
                None => return 0.0,
            }
        }
        score
    }

    /// Compute the scores of every window of a sequence.
    ///
    /// The returned vector has one score per valid start position, i.e.
    /// `sequence.len() - self.len() + 1` elements, or none if the sequence
    /// is shorter than the motif.
    pub fn scores(&self, sequence: &EncodedSequence<A>) -> Vec<f64> {
        let width = self.len();
        let seq: &[A::Symbol] = sequence.as_ref();
        if seq.len() < width {
            return Vec::new();
        }
        if width == 0 {
            return vec![0.0; seq.len() + 1];
        }
        seq.windows(width).map(|w| self.score_window(w)).collect()
    }
}

impl<A: Alphabet> AsRef<DenseMatrix<Option<f64>, A::K>> for ScoringMatrix<A> {
    fn as_ref(&self) -> &DenseMatrix<Option<f64>, A::K> {
        &self.data
    }
}
