mod classifier;
mod evaluate;
mod extremeness;
mod maths;
mod signal;
mod wave;
mod window;

pub use classifier::Zone;
pub use evaluate::{RegimeEval, evaluate_series};
pub use signal::{SignalEvent, SignalLedger, SignalSide};
pub use wave::{WavePoint, WaveSeries};
