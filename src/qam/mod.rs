pub mod bits;
pub mod channel;
pub mod constellation;
pub mod demodulator;
pub mod error;
pub mod experiment;
pub mod modulator;

pub use channel::{AwgnChannel, add_noise};
pub use constellation::{Constellation, ModulationOrder, build_constellation};
pub use demodulator::{Demodulator, demodulate};
pub use error::{QamError, Result};
pub use experiment::*;
pub use modulator::{Modulator, modulate};
