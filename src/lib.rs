//! Split-Diff: a diff alignment and view-synchronization engine for side-by-side code review
//! views with collapsible unchanged regions.
//!
//! Goals
//! - Align two line sequences into a minimal opcode stream (Ratcliff/Obershelp).
//! - Refine opaque replace blocks around near-identical lines so they can be highlighted
//!   character by character.
//! - Hide long unchanged runs behind placeholders and restore them on demand without losing
//!   the mapping back to original line numbers.
//!
//! Core Capabilities
//! - Alignment: `align::align` with optional autojunk for pathological repeated lines.
//! - Refinement: `align::refine_opcodes` splits `Replace` opcodes at synchronization lines.
//! - Highlights: `intraline::char_diff` runs a time-bounded char diff and pairs
//!   delete+insert into modifications.
//! - Collapsing: `collapse::collapse` builds both displayed streams, the collapsed-section
//!   table and the placeholder table; `CollapseManager::expand` splices sections back.
//! - Scheduling: `schedule::Debouncer` spells out the debounce contract for callers.
//!
//! Modules
//! - `align`: opcode types, sequence matcher, replace refiner.
//! - `intraline`: character differ and highlight ranges.
//! - `collapse`: displayed streams, collapsed sections, line-number cache.
//! - `engine`: `DiffEngine`, the façade a presentation layer drives.
//! - `render`: side-by-side rows and an ANSI preview.
//! - `schedule`: generation-guarded debounce timer bookkeeping.
//! - `config`: `EngineConfig`.
//! - `errors`: unified error types.
//! - `utils`: line splitting helpers.
//!
//! Typical Usage
//! - `DiffEngine::new(config).set_diff_text(old, new)` then query `display_text`,
//!   `original_line_number` and `highlights`; call `expand_section(i)` when a placeholder
//!   is clicked.

pub mod align;
pub mod collapse;
pub mod config;
pub mod engine;
pub mod errors;
pub mod intraline;
pub mod render;
pub mod schedule;
pub mod utils;

pub use align::{MatchingBlock, Opcode, Tag};
pub use collapse::{CollapsedSection, DisplayLine, Side};
pub use config::EngineConfig;
pub use engine::DiffEngine;
pub use errors::DiffError;
pub use intraline::{CharEdit, HighlightKind, HighlightRange};
