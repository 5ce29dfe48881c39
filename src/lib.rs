//! # Tile-Map Editor Core
//!
//! Data and rendering core for a tile-map editor. Terrain is stored as
//! fixed-width packed cell records, resolved into pixels through two
//! independently addressed tile catalogs, and edited through region-growing
//! algorithms backed by a snapshot undo history.
//!
//! Project file parsing, the GUI, image-file codecs and process
//! orchestration are collaborator concerns; this crate only defines the
//! boundary types they feed.

pub mod bitfield;
pub mod block;
pub mod config;
pub mod edit;
pub mod map;
pub mod render;
pub mod tileset;

pub use bitfield::BitField;
pub use block::{read_blockdata, write_blockdata, Block, BlockLayout, Blockdata};
pub use config::CoreConfig;
pub use edit::fill::FillTarget;
pub use edit::history::{EditHistory, HistoryEntry};
pub use edit::paint::Selection;
pub use map::MapLayout;
pub use render::{LayoutRenderer, RenderConfig};
pub use tileset::{AddressBounds, Tileset, TilesetPair};
