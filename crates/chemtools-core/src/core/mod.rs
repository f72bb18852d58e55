//! # Core Module
//!
//! Stateless computations shared by every tool. Nothing in this module holds state between
//! calls; invalid input is reported as `None` or a typed error and never as `NaN`.
//!
//! - **Formatting** ([`format`]) - Field parsing and result formatting with the `–` placeholder
//! - **Units** ([`units`]) - Molar and mass concentration units and conversion via mol/L
//! - **Potency** ([`potency`]) - IC50 ⇄ pIC50, fold differences and potency classes
//! - **Formulas** ([`formula`]) - Simplified formula parsing and heavy-atom counting
//! - **Efficiency** ([`efficiency`]) - LLE, LE, GE and the rule of five
//! - **Dosing** ([`dose`]) - Species weights and in-vivo compound requirements
//! - **Selections** ([`selection`]) - Whitelisted atom selection expressions

pub mod dose;
pub mod efficiency;
pub mod format;
pub mod formula;
pub mod potency;
pub mod selection;
pub mod units;
