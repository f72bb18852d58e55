//! # ChemTools Core Library
//!
//! A headless suite of small medicinal-chemistry calculators and molecule viewer embeds,
//! organised into categories and driven through a tab/tool navigation controller.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture so that the arithmetic, the navigation
//! machinery and the individual widgets can be tested in isolation.
//!
//! - **[`core`]: The Foundation.** Stateless closed-form computations: concentration units,
//!   potency conversions, efficiency metrics, dose requirements, formula parsing, atom selection
//!   expressions and result formatting.
//!
//! - **[`engine`]: The Logic Core.** The stateful part: the tool registry, the content
//!   [`Container`](engine::container::Container) that holds at most one interactive panel, the
//!   [`Navigator`](engine::navigator::Navigator) state machine, deep links and the external script
//!   loader with stale-completion handling.
//!
//! - **[`tools`]: The Widgets.** Each tool mounts a panel into a container, recomputes its
//!   results on every input event and degrades to a placeholder on invalid input.
//!   [`tools::standard_registry`] assembles the built-in catalogue.

pub mod core;
pub mod engine;
pub mod tools;
