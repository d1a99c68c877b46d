//! Reading, writing and editing [LittleSoundDJ](https://www.littlesounddj.com) save files and songs
//!
//! LSDJ keeps its songs in the Game Boy's battery-backed SRAM: one uncompressed song being
//! worked on, and a filesystem of up to 32 compressed ones. This crate can:
//!
//!  * Read and write whole `.sav` files through [`SRam`](sram::SRam)
//!  * Import and export single songs as `.lsdsng` through [`LsdSng`](lsdsng::LsdSng) and
//!    [`Project`](project::Project)
//!  * Edit songs in place through the views in [`song`]
//!  * Compress and decompress song data with [`serde`]
//!
//! ```no_run
//! use lsdj::{sram::SRam, u5};
//!
//! let mut sram = SRam::from_path("bangers.sav")?;
//! sram.set_working_memory_song_from_project(u5::new(0))?;
//! sram.working_memory_song.settings_mut().set_tempo(140)?;
//! sram.to_path("bangers.sav")?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! This crate does not handle ROM manipulation (which is where samples are stored).

pub mod fs;
pub mod lsdsng;
pub mod name;
pub mod project;
pub mod serde;
pub mod song;
pub mod sram;
pub mod vio;

pub use ux::{u3, u4, u5, u6, u7};
