//! Frame-Persistent Stateless Randomisation.
//!
//! Stateless generators map a frame number to a piecewise-constant ("held")
//! random value. The search engine recovers hold metadata (changed flag, hold
//! boundaries, next value, progress) from point evaluations alone.
//!
//! ```
//! use fpsr::{inspect, Generator, SearchConfig, ToggledModulo};
//!
//! let signal = Generator::from(ToggledModulo::default().with_final_rand(false));
//! let out = inspect(&signal, 103.0, &SearchConfig::default());
//! assert_eq!(out.value, 100.0);
//! assert_eq!((out.last_changed_frame, out.next_changed_frame), (100.0, 110.0));
//! ```

pub mod generator;
#[doc(hidden)]
pub mod harness;
pub mod hash;
#[doc(hidden)]
pub mod invariant_ppt;
pub mod output;
pub mod render;
pub mod search;
pub mod signal;
pub mod sine;
pub mod timeline;

pub use generator::{
    Generator, QuantMode, QuantisedSwitching, QuantisedSwitchingBuilder, ResolvedTiming,
    StackedModulo, ToggledModulo,
};
pub use hash::{portable_rand, FinalHash};
pub use output::{ActiveStream, DualStream, HoldOutput, Lod};
pub use render::{hold_spans, render_values, HoldSpan};
pub use search::{inspect, SearchConfig, DEFAULT_MAX_SEARCH_FRAMES, DEFAULT_SCAN_FRAMES};
pub use signal::{FnSignal, HeldSignal};
pub use sine::{init_sine_tables, sine_tables_initialised, SinePrecision};
pub use timeline::{Timeline, TimelineError, DEFAULT_INFLATION};
