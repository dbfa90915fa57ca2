#![forbid(missing_docs)]
#![forbid(unsafe_code)]
#![doc = include_str!("../README.md")]
pub mod combinat;
pub mod endofunction;
pub mod factorization;
pub mod funcstruct;
mod macros;
pub mod multiset;
pub mod necklace;
pub mod partitions;
pub mod rooted_tree;

pub use endofunction::{Endofunction, Permutation};
pub use factorization::DivisorCache;
pub use funcstruct::{EndofunctionStructures, Funcstruct};
pub use multiset::Multiset;
pub use necklace::{FixedContentNecklaces, Necklace};
pub use rooted_tree::{
    Canonicalize, DominantSequence, ForestEnumerator, LevelSequence, PartitionForests, RootedTree,
    TreeEnumerator,
};
