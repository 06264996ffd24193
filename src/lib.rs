//! Square QAM over an AWGN channel: constellation, modulation, noise,
//! minimum-distance demodulation and BER sweeps.

pub mod qam;
pub mod ui;
pub mod utils;
