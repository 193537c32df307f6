mod machine;

pub use machine::{
    transition, AnimationState, DuckEffect, DuckEvent, DuckMachine, DuckState, DuckTimer, Sequence,
};
