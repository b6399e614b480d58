//! Domain layer - Core generation logic with no I/O
//!
//! This layer contains:
//! - Entities: story arcs, levels, quests, code templates, validation rules, generation jobs
//! - Value Objects: identifiers and random source helpers
//! - Domain Services: story/level/quest/narrative generators, template engines, code validator

pub mod entities;
pub mod services;
pub mod value_objects;
