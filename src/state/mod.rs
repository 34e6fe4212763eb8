/// State management module
///
/// This module handles all application state, including:
/// - Shared data structures (data.rs)
/// - Resource definitions pages are built from (resource.rs)
/// - Search filters (criteria.rs)
/// - The generic list/detail controller (controller.rs)
/// - Tree grouping for hierarchical grids (tree.rs)
/// - Durable storage and the login session (storage.rs, session.rs)

pub mod controller;
pub mod criteria;
pub mod data;
pub mod resource;
pub mod session;
pub mod storage;
pub mod tree;
