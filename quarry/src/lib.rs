//! # Quarry - Generation and Shrinking for Property-Based Testing
//!
//! Quarry provides the value generation and shrinking core of a property-based
//! testing library: arbitraries that draw values from a seeded random source,
//! biased toward edge cases, and that lazily enumerate simpler candidates when
//! a value has to be minimized.
//!
//! Every generated value travels with a [`Context`] recording how it was
//! produced, so shrinking can resume from where it left off. Stateful values
//! (such as [`InfiniteStream`]) carry a cloner and are handed out fresh on
//! every read.
//!
//! ## Quick Start
//!
//! ```rust
//! use quarry::{Arbitrary, ArrayConstraints, Random, array, nat};
//!
//! let arbitrary = array(nat(), ArrayConstraints::new().with_min_length(2)).unwrap();
//! let mut rng = Random::new(42);
//!
//! // Generate a value
//! let value = arbitrary.generate(&mut rng, Some(2));
//! assert!(value.value_ref().len() >= 2);
//!
//! // Walk the shrink tree, always taking the first candidate
//! let mut current = value;
//! while let Some(next) = arbitrary.shrink(current.value_ref(), current.context()).next() {
//!     current = next;
//! }
//! assert_eq!(current.value(), vec![0, 0]);
//! ```

pub mod arbitrary;
pub mod array;
pub mod bias;
pub mod combinators;
pub mod config;
pub mod depth;
pub mod error;
pub mod frequency;
pub mod infinite_stream;
pub mod option;
pub mod primitives;
pub mod rng;
pub mod sampler;
pub mod shrink;
pub mod size;
pub mod stream;
pub mod tuple;
pub mod value;

// Re-export the main public API
pub use arbitrary::{Arbitrary, BoxedArbitrary};
pub use array::{
    ArrayArbitrary, ArrayConstraints, UniqueArrayArbitrary, UniqueArrayConstraints, array,
    unique_array,
};
pub use combinators::{FilterArbitrary, MapArbitrary, NoBiasArbitrary, NoShrinkArbitrary};
pub use config::{
    GlobalParameters, configure_global, read_configure_global, reset_configure_global,
    with_global_parameters,
};
pub use depth::{
    DepthContext, DepthGuard, DepthIdentifier, create_depth_identifier, get_depth_context_for,
};
pub use error::{ArbitraryError, SizeParseError};
pub use frequency::{
    FrequencyArbitrary, OneOfConstraints, WeightedArbitrary, frequency, frequency_with, one_of,
    one_of_weighted, one_of_with,
};
pub use infinite_stream::{InfiniteStream, InfiniteStreamArbitrary, infinite_stream};
pub use option::{OptionArbitrary, OptionConstraints, option};
pub use primitives::{
    ConstantArbitrary, IntegerArbitrary, IntegerBound, boolean, constant, constant_from, integer,
    integer_in, nat, nat_max,
};
pub use rng::Random;
pub use sampler::{SampleParameters, sample, statistics};
pub use size::{DepthSize, RelativeSize, Size, SizeForArbitrary};
pub use stream::Stream;
pub use tuple::*;
pub use value::{CloneMethod, Cloner, Context, Value, ValueMeta};
