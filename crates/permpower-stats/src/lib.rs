//! Alignment and permutation testing of binary event histories.
//!
//! This crate holds the statistical core of `permpower`:
//!
//! - **Histories**: month-by-individual 0/1 matrices ([`matrix::HistoryMatrix`])
//! - **Alignment**: circular realignment of each history on the individual's
//!   entry month and extraction of a fixed pre/post window ([`align`])
//! - **Permutation testing**: empirical p-values per relative month against a
//!   null distribution built by shuffling entry offsets across individuals
//!   ([`permutation`], [`p_value`])
//! - **Seeds**: hex-serializable seeds that derive independent child seeds
//!   ([`seed`])
//! - **Descriptive statistics** for summarizing p-values ([`descriptive`])
//!
//! # Alignment Contract
//!
//! After alignment, relative month `0` is each individual's own entry month,
//! whatever its absolute entry month was. Relative months before `0` are the
//! months immediately preceding entry.
//!
//! # Example
//!
//! ```
//! use permpower_stats::{
//!     matrix::HistoryMatrix, permutation::PermutationTest, seed::Seed, window::Window,
//! };
//!
//! // 20 months, 30 individuals with events only before their entry month
//! let offsets: Vec<usize> = (0..30).map(|i| 5 + i % 10).collect();
//! let matrix = HistoryMatrix::from_fn(20, 30, |month, i| month < offsets[i]);
//!
//! let test = PermutationTest::new(Window::new(4, 4), 99);
//! let outcome = test.run(&matrix, &offsets, &mut Seed::from_u64(1).rng()).unwrap();
//! assert_eq!(outcome.p_values.get(0), Some(&0.01));
//! ```

pub mod align;
pub mod descriptive;
pub mod matrix;
pub mod p_value;
pub mod permutation;
pub mod seed;
pub mod window;
