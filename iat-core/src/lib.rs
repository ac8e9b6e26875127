pub mod anchor;
pub mod mapping;
pub mod stimulus;
pub mod trial;

pub use anchor::{Anchor, AnchorSet, Position};
pub use mapping::{Key, Label, ResponseMapping};
pub use stimulus::Stimulus;
pub use trial::{TrialResult, TrialState};

pub use string_cache::DefaultAtom as Atom;
