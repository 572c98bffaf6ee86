//! Module for reading and writing models, tables and annotation strings
pub mod equation_parse;
pub mod json;
pub mod reference_parse;
pub mod report;
pub mod sbml;
pub mod table;
