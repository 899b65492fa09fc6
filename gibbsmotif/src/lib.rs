#![doc = include_str!("../README.md")]

extern crate generic_array;
extern crate log;
extern crate rand;
extern crate rand_distr;
extern crate typenum;

pub mod abc;
pub mod dense;
pub mod err;
pub mod pwm;
pub mod sampler;
pub mod seq;

pub use abc::Alphabet;
pub use abc::Background;
pub use abc::Dna;
pub use abc::Nucleotide;
pub use abc::Symbol;
pub use dense::DenseMatrix;
pub use err::InvalidData;
pub use err::InvalidSymbol;
pub use err::SamplerError;
pub use pwm::CountMatrix;
pub use pwm::FrequencyMatrix;
pub use pwm::ScoringMatrix;
pub use sampler::find_motif;
pub use sampler::Sampler;
pub use sampler::SamplerData;
pub use sampler::SamplerResult;
pub use seq::EncodedSequence;
