//! QuoteForge: machining quote estimation from drawing text
//!
//! Text from a part drawing is mined for signals (material, quantity,
//! weight and bounding dimensions), which the estimation engine turns into
//! either a priced quote or a list of the inputs it still needs.

pub mod cli;
pub mod core;
pub mod entities;
pub mod estimate;
pub mod signals;
