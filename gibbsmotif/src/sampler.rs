//! Gibbs sampler for the discovery of fixed-length motifs.
//!
//! The sampler keeps one candidate start position per sequence. Each pass
//! visits the sequences in order, builds a profile from the windows of all
//! other sequences, and draws a new start position for the held-out
//! sequence from the odds of each of its windows under that profile. The
//! new position is written back immediately, so that the following
//! sequences of the same pass see it. Passes are repeated until a whole
//! pass leaves every position unchanged, or until a maximum number of
//! passes is reached.

use std::time::Duration;
use std::time::Instant;

use log::debug;
use log::info;
use log::trace;
use rand::distributions::Distribution;
use rand::distributions::Uniform;
use rand::Rng;
use rand_distr::WeightedIndex;

use super::abc::Alphabet;
use super::abc::Background;
use super::err::SamplerError;
use super::pwm::CountMatrix;
use super::pwm::FrequencyMatrix;
use super::pwm::ScoringMatrix;
use super::seq::EncodedSequence;

/// The default maximum number of passes over the sequences.
pub const DEFAULT_MAX_PASSES: usize = 2000;

// --- Profile -----------------------------------------------------------------

/// Build a motif profile from the windows at the given start positions.
///
/// The window of `width` symbols starting at `starts[i]` is taken from
/// every sequence `i`, except for the `exclude` sequence when given. Each
/// row of the resulting matrix sums to one as long as at least one window
/// was counted.
///
/// # Panics
///
/// Panics if a window exceeds the bounds of its sequence.
pub fn profile<A: Alphabet>(
    sequences: &[EncodedSequence<A>],
    starts: &[usize],
    width: usize,
    exclude: Option<usize>,
) -> FrequencyMatrix<A> {
    let windows = sequences
        .iter()
        .zip(starts)
        .enumerate()
        .filter(|&(i, _)| Some(i) != exclude)
        .map(|(_, (seq, &start))| seq.window(start, width));
    CountMatrix::from_windows(width, windows).to_freq()
}

// --- Sampling ----------------------------------------------------------------

/// Draw a new motif start position in a sequence.
///
/// Every window of the sequence is scored with `pssm`, and a position is
/// drawn with a probability proportional to the exponential of its score.
/// When the exponentials all vanish, the position is drawn uniformly
/// instead. A sequence with a single window always yields `0`.
pub fn sample_position<A, R>(
    sequence: &EncodedSequence<A>,
    pssm: &ScoringMatrix<A>,
    rng: &mut R,
) -> usize
where
    A: Alphabet,
    R: Rng,
{
    let scores = pssm.scores(sequence);
    if scores.len() <= 1 {
        return 0;
    }

    let mut weights = scores.iter().map(|s| s.exp()).collect::<Vec<f64>>();
    let mut total = weights.iter().sum::<f64>();
    if total.is_infinite() {
        // rescale to the best window, the distribution is unchanged
        let max = scores.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        weights = scores.iter().map(|s| (s - max).exp()).collect();
        total = weights.iter().sum();
    }

    if total == 0.0 {
        trace!("all window weights vanished, sampling uniformly");
        return rng.sample(Uniform::new(0, scores.len()));
    }
    match WeightedIndex::new(&weights) {
        Ok(dist) => dist.sample(rng),
        Err(e) => {
            trace!("invalid window weights ({}), sampling uniformly", e);
            rng.sample(Uniform::new(0, scores.len()))
        }
    }
}

// --- SamplerData -------------------------------------------------------------

/// The sequences to sample from, with their background frequencies.
#[derive(Debug)]
pub struct SamplerData<A, S>
where
    A: Alphabet,
    S: AsRef<[EncodedSequence<A>]>,
{
    sequences: S,
    backgrounds: Vec<Background<A>>,
}

impl<A, S> SamplerData<A, S>
where
    A: Alphabet,
    S: AsRef<[EncodedSequence<A>]>,
{
    /// Prepare the sampler data, estimating each sequence background once.
    pub fn new(sequences: S) -> Self {
        let backgrounds = sequences
            .as_ref()
            .iter()
            .map(Background::from_sequence)
            .collect();
        Self {
            sequences,
            backgrounds,
        }
    }

    /// The sequences to sample from.
    #[inline]
    pub fn sequences(&self) -> &[EncodedSequence<A>] {
        self.sequences.as_ref()
    }

    /// The background frequencies of each sequence.
    #[inline]
    pub fn backgrounds(&self) -> &[Background<A>] {
        &self.backgrounds
    }
}

impl<A, S> From<S> for SamplerData<A, S>
where
    A: Alphabet,
    S: AsRef<[EncodedSequence<A>]>,
{
    fn from(value: S) -> Self {
        Self::new(value)
    }
}

// --- Sampler -----------------------------------------------------------------

/// A Gibbs sampler over a set of sequences.
///
/// Iterating over the sampler runs one full pass over the sequences per
/// item, and stops once the start positions are stable or the maximum
/// number of passes was reached.
#[derive(Debug)]
pub struct Sampler<'a, R, A, S>
where
    R: Rng,
    A: Alphabet,
    S: AsRef<[EncodedSequence<A>]>,
{
    /// A reference to the sampler data.
    data: &'a SamplerData<A, S>,
    /// The random number generator.
    rng: R,

    // -- Parameters ----------------------------
    /// The width of the motif being built.
    width: usize,
    /// The maximum number of passes over the sequences.
    max_passes: usize,

    // -- Internal data -------------------------
    /// The start positions of the motif in each sequence.
    starts: Vec<usize>,
    /// The number of completed passes.
    pass: usize,
    /// Whether the positions are stable or the pass limit was hit.
    done: bool,
    /// The time the sampler was created.
    started: Instant,
}

impl<'a, R, A, S> Sampler<'a, R, A, S>
where
    R: Rng,
    A: Alphabet,
    S: AsRef<[EncodedSequence<A>]>,
{
    /// Create a new sampler for a motif of the given width.
    ///
    /// Initial start positions are drawn uniformly in each sequence. Fails
    /// if there are fewer than two sequences, or if the width is zero or
    /// larger than the shortest sequence.
    pub fn new(
        data: &'a SamplerData<A, S>,
        width: usize,
        mut rng: R,
    ) -> Result<Self, SamplerError> {
        let started = Instant::now();
        let sequences = data.sequences();
        if sequences.len() < 2 {
            return Err(SamplerError::NotEnoughSequences(sequences.len()));
        }
        let shortest = sequences.iter().map(|seq| seq.len()).min().unwrap_or(0);
        if width == 0 || width > shortest {
            return Err(SamplerError::InvalidMotifLength { width, shortest });
        }

        // select initial positions in each sequence randomly
        let starts = sequences
            .iter()
            .map(|seq| rng.sample(Uniform::new(0, seq.len() - width + 1)))
            .collect::<Vec<usize>>();

        Ok(Self {
            data,
            rng,
            width,
            max_passes: DEFAULT_MAX_PASSES,
            starts,
            pass: 0,
            done: false,
            started,
        })
    }

    /// Use a different maximum number of passes.
    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// The width of the motif.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// The current start positions of the motif in each sequence.
    #[inline]
    pub fn starts(&self) -> &[usize] {
        &self.starts
    }

    /// The number of passes completed so far.
    #[inline]
    pub fn passes(&self) -> usize {
        self.pass
    }

    /// Build the profile of the motif from all sequences.
    pub fn profile(&self) -> FrequencyMatrix<A> {
        profile(self.data.sequences(), &self.starts, self.width, None)
    }

    /// Run the sampler until the start positions are stable.
    pub fn run(mut self) -> SamplerResult<A> {
        for _ in self.by_ref() {}
        info!(
            "sampling finished after {} passes ({} sequences, width {})",
            self.pass,
            self.starts.len(),
            self.width
        );
        SamplerResult {
            frequencies: self.profile(),
            passes: self.pass,
            elapsed: self.started.elapsed(),
            starts: self.starts,
        }
    }

    fn update_holdout(&mut self, z: usize) {
        let data = self.data;
        let freq = profile(data.sequences(), &self.starts, self.width, Some(z));
        let pssm = freq.to_scoring(&data.backgrounds()[z]);
        self.starts[z] = sample_position(&data.sequences()[z], &pssm, &mut self.rng);
    }
}

impl<'a, R, A, S> Iterator for Sampler<'a, R, A, S>
where
    R: Rng,
    A: Alphabet,
    S: AsRef<[EncodedSequence<A>]>,
{
    type Item = GibbsIteration;
    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.pass >= self.max_passes {
            debug!("reached the maximum of {} passes", self.max_passes);
            self.done = true;
            return None;
        }

        // resample every sequence in order, updating positions in place
        let previous = self.starts.clone();
        for z in 0..self.starts.len() {
            self.update_holdout(z);
        }
        self.pass += 1;

        let changed = previous
            .iter()
            .zip(&self.starts)
            .filter(|(x, y)| x != y)
            .count();
        debug!("pass {}: {} start positions changed", self.pass, changed);
        if changed == 0 {
            self.done = true;
        }

        Some(GibbsIteration {
            pass: self.pass,
            changed,
        })
    }
}

/// A summary of one pass of the sampler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GibbsIteration {
    /// The index of the pass, starting at one.
    pub pass: usize,
    /// The number of sequences whose start position changed.
    pub changed: usize,
}

/// The motif found by a sampler.
#[derive(Debug, Clone)]
pub struct SamplerResult<A: Alphabet> {
    /// The profile of the motif, built from all sequences.
    pub frequencies: FrequencyMatrix<A>,
    /// The start position of the motif in each sequence.
    pub starts: Vec<usize>,
    /// The number of passes run.
    pub passes: usize,
    /// The time spent finding the motif.
    pub elapsed: Duration,
}

/// Find a motif of the given width in a set of sequences.
///
/// This estimates the background of every sequence, draws random initial
/// positions with `rng` and runs a [`Sampler`] until the positions are
/// stable, or for at most [`DEFAULT_MAX_PASSES`] passes.
///
/// # Example
/// ```
/// # use gibbsmotif::abc::Dna;
/// # use gibbsmotif::seq::EncodedSequence;
/// # use gibbsmotif::sampler::find_motif;
/// # use rand::SeedableRng;
/// let sequences = ["TTACGTAA", "GACGTCCC", "CCCCACGT"]
///     .iter()
///     .map(|s| EncodedSequence::<Dna>::encode(s).unwrap())
///     .collect::<Vec<_>>();
/// let rng = rand::rngs::StdRng::seed_from_u64(42);
/// let result = find_motif(&sequences, 4, rng).unwrap();
/// assert_eq!(result.starts.len(), 3);
/// assert_eq!(result.frequencies.len(), 4);
/// ```
pub fn find_motif<A, S, R>(
    sequences: S,
    width: usize,
    rng: R,
) -> Result<SamplerResult<A>, SamplerError>
where
    A: Alphabet,
    S: AsRef<[EncodedSequence<A>]>,
    R: Rng,
{
    let start = Instant::now();
    let data = SamplerData::new(sequences);
    let mut result = Sampler::new(&data, width, rng)?.run();
    result.elapsed = start.elapsed();
    Ok(result)
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    use crate::abc::Dna;
    use crate::dense::DenseMatrix;

    fn encode(s: &str) -> EncodedSequence<Dna> {
        EncodedSequence::encode(s).unwrap()
    }

    #[test]
    fn profile_rows_sum_to_one() {
        let sequences = [
            encode("ACGTTGCAAGTC"),
            encode("TTTTGGGGCCCA"),
            encode("GATTACAGATTA"),
            encode("CCGGAATTCCGG"),
        ];
        let starts = [0, 3, 7, 5];
        for exclude in [None, Some(0), Some(2), Some(3)] {
            let freq = profile(&sequences, &starts, 5, exclude);
            assert_eq!(freq.len(), 5);
            for row in freq.matrix().iter() {
                assert!((row.iter().sum::<f64>() - 1.0).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn profile_leave_one_out() {
        let sequences = [encode("AAAACGTA"), encode("TTACGTTT"), encode("ACGTCCCC")];
        let freq = profile(&sequences, &[3, 2, 0], 4, Some(0));
        assert_eq!(&freq.matrix()[0], &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(&freq.matrix()[3], &[0.0, 0.0, 0.0, 1.0]);

        let freq = profile(&sequences, &[0, 2, 0], 4, Some(1));
        assert_eq!(&freq.matrix()[0], &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(&freq.matrix()[1], &[0.5, 0.5, 0.0, 0.0]);
    }

    #[test]
    fn profile_two_sequences() {
        let sequences = [encode("GGGTACC"), encode("CATGCAT")];
        let freq = profile(&sequences, &[1, 2], 3, Some(0));
        let expected = DenseMatrix::from_rows([
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
        ]);
        assert_eq!(freq.matrix(), &expected);
    }

    #[test]
    fn sample_position_single_window() {
        let seq = encode("ACGTAC");
        let freq = FrequencyMatrix::<Dna>::new(DenseMatrix::from_rows(vec![
            [0.25, 0.25, 0.25, 0.25];
            6
        ]))
        .unwrap();
        let pssm = freq.to_scoring(&Background::from_sequence(&seq));
        let mut rng = StdRng::seed_from_u64(0);
        for _ in 0..100 {
            assert_eq!(sample_position(&seq, &pssm, &mut rng), 0);
        }
    }

    #[test]
    fn sample_position_background_profile() {
        let seq = encode("ACGTTGCAACGTAGGCTTAC");
        let bg = Background::from_sequence(&seq);
        let rows = vec![bg.frequencies().to_vec(); 8];
        let freq = FrequencyMatrix::<Dna>::new(DenseMatrix::from_rows(rows)).unwrap();
        let pssm = freq.to_scoring(&bg);
        assert!(pssm.scores(&seq).iter().all(|&s| s == 0.0));

        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = [0usize; 13];
        for _ in 0..13_000 {
            counts[sample_position(&seq, &pssm, &mut rng)] += 1;
        }
        for &c in counts.iter() {
            assert!(c > 800 && c < 1200, "{:?}", counts);
        }
    }

    #[test]
    fn sample_position_vanishing_weights() {
        let seq = encode("AAAA");
        let freq = FrequencyMatrix::<Dna>::new(DenseMatrix::from_rows([
            [1e-300, 1.0, 0.0, 0.0],
            [1e-300, 1.0, 0.0, 0.0],
        ]))
        .unwrap();
        let pssm = freq.to_scoring(&Background::uniform());
        assert!(pssm.scores(&seq).iter().all(|s| s.exp() == 0.0));

        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 3];
        for _ in 0..300 {
            seen[sample_position(&seq, &pssm, &mut rng)] = true;
        }
        assert_eq!(seen, [true, true, true]);
    }

    #[test]
    fn sample_position_overflowing_weights() {
        let mut rng = StdRng::seed_from_u64(11);
        let symbols = Uniform::new(0, Dna::symbols().len());
        let seq = EncodedSequence::<Dna>::new(
            (0..610)
                .map(|_| Dna::symbols()[rng.sample(symbols)])
                .collect(),
        );
        let sequences = [seq.clone(), seq.clone()];

        let freq = profile(&sequences, &[3, 3], 600, Some(0));
        let pssm = freq.to_scoring(&Background::from_sequence(&seq));
        let scores = pssm.scores(&seq);
        assert!(scores[3] > 709.0);
        assert!(scores[3].exp().is_infinite());

        for _ in 0..200 {
            assert_eq!(sample_position(&seq, &pssm, &mut rng), 3);
        }
    }

    #[test]
    fn sample_position_prefers_motif() {
        let seq = encode("TTTTTTACGTTTTTTT");
        let freq = FrequencyMatrix::<Dna>::new(DenseMatrix::from_rows([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ]))
        .unwrap();
        let pssm = freq.to_scoring(&Background::from_sequence(&seq));
        let mut rng = StdRng::seed_from_u64(1);
        let hits = (0..100)
            .filter(|_| sample_position(&seq, &pssm, &mut rng) == 6)
            .count();
        assert!(hits > 90);
    }

    #[test]
    fn sampler_invalid_parameters() {
        let one = SamplerData::new(vec![encode("ACGTACGT")]);
        let err = Sampler::new(&one, 4, StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(err, SamplerError::NotEnoughSequences(1));

        let data = SamplerData::new(vec![encode("ACGTACGT"), encode("ACG")]);
        let err = Sampler::new(&data, 4, StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(
            err,
            SamplerError::InvalidMotifLength {
                width: 4,
                shortest: 3
            }
        );
        let err = Sampler::new(&data, 0, StdRng::seed_from_u64(0)).unwrap_err();
        assert_eq!(
            err,
            SamplerError::InvalidMotifLength {
                width: 0,
                shortest: 3
            }
        );
    }

    #[test]
    fn sampler_initial_positions() {
        let data = SamplerData::new(vec![
            encode("ACGTACGTAC"),
            encode("TTGCA"),
            encode("CCCCCCCCCCCCCCC"),
        ]);
        for seed in 0..20 {
            let sampler = Sampler::new(&data, 5, StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(sampler.passes(), 0);
            assert!(sampler.starts()[0] <= 5);
            assert_eq!(sampler.starts()[1], 0);
            assert!(sampler.starts()[2] <= 10);
        }
    }

    #[test]
    fn sampler_sequential_updates() {
        let sequences = vec![
            encode("GATTACAGATTACAGGCT"),
            encode("CCGTAGGATTACATTGCA"),
            encode("TTGCAGATTGCAGCCCTA"),
            encode("AGGATTACCATGCAGTCC"),
        ];
        let data = SamplerData::new(&sequences);
        let mut sampler = Sampler::new(&data, 6, StdRng::seed_from_u64(11)).unwrap();
        let first = sampler.next().unwrap();
        assert_eq!(first.pass, 1);

        // replay the same pass by hand with the same random stream
        let mut rng = StdRng::seed_from_u64(11);
        let mut starts = sequences
            .iter()
            .map(|seq| rng.sample(Uniform::new(0, seq.len() - 6 + 1)))
            .collect::<Vec<usize>>();
        let initial = starts.clone();
        for z in 0..sequences.len() {
            let bg = Background::from_sequence(&sequences[z]);
            let pssm = profile(&sequences, &starts, 6, Some(z)).to_scoring(&bg);
            starts[z] = sample_position(&sequences[z], &pssm, &mut rng);
        }
        assert_eq!(sampler.starts(), starts.as_slice());

        let changed = initial.iter().zip(&starts).filter(|(x, y)| x != y).count();
        assert_eq!(first.changed, changed);
    }
}
