//! Bounded Signal History
//!
//! Provides the two buffers the fatigue engine keeps between frames:
//! - [`RingBuffer`]: capacity-bounded FIFO, oldest sample dropped on overflow
//! - [`TimeWindow`]: age-bounded instants, entries evicted once they leave the window

mod buffer;
mod window;

pub use buffer::RingBuffer;
pub use window::TimeWindow;
