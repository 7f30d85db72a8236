//! # Board Client Library
//!
//! Client-side implementation of the shared drawing board: pattern
//! generation, local controls, server synchronization, and rendering.
//!
//! ## How a frame works
//!
//! Every frame the client polls the server (`updateRequest`), replaces its
//! view of all users with whatever snapshot arrived, advances the jitter
//! ramp, applies held keys to the pattern controls, regenerates the preview
//! at the pointer, and draws remote shapes followed by the translucent
//! preview. Pressing the pointer commits the preview (`placeObjects`) and
//! resets the jitter ramp.
//!
//! ## Module Organization
//!
//! ### Collections Module (`collections`)
//! Pure stamp-pattern generation: line walks and radial rings, plus the
//! jitter pass applied to everything generated.
//!
//! ### Session Module (`session`)
//! Client-local pattern controls: the jitter ramp, key adjustments with
//! their clamps, and the object/pattern toggles.
//!
//! ### Input Module (`input`)
//! Per-frame keyboard and pointer sampling with edge detection for the
//! toggle keys.
//!
//! ### Network Module (`network`)
//! The WebSocket bridge: an IO thread behind channels, so the render loop
//! never blocks.
//!
//! ### Rendering Module (`rendering`)
//! The macroquad-backed draw surface and the helpers that paint every
//! user's shapes and the local preview.

pub mod collections;
pub mod input;
pub mod network;
pub mod rendering;
pub mod session;
