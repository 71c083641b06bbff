use shadow_rs::shadow;

shadow!(build);

// Internals
// ---------
pub mod cost;
pub mod heap_primitives;

// Maps
// ----
pub mod map;
pub mod maps;

// Search space
// ------------
pub mod heuristic;
pub mod search;

// Frontiers
// ---------
pub mod data_structures;

// Algorithms
// ----------
pub mod algorithms;
