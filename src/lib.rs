//! Convert Visual Studio 2008 C/C++ solutions (`.sln` + `.vcproj`) into
//! Visual Studio 2010 solutions (`.sln` + `.vcxproj`), adding an `x64`
//! configuration for every 32-bit one.

pub mod configuration;
pub mod convert;
pub mod error;
pub mod grammar;
pub mod line_reader;
pub mod project;
pub mod project_writer;
pub mod solution;

pub use configuration::{ConfigurationSet, ProjectConfiguration, SolutionConfiguration};
pub use convert::{Converter, ConverterBuilder, VsVersion};
pub use error::{ConvertError, ErrorKind};
pub use project::{Project, ProjectInformation};
pub use solution::SolutionProject;
