//! Conversion driver: format versions, options and the solution-wide
//! conversion pass.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use crate::configuration::{ProjectConfiguration, X64_PLATFORM_TOOLSET};
use crate::error::{ConvertError, io_error};
use crate::project::{ProjectFileReader, Vs2008ProjectFileReader};
use crate::project_writer::{ProjectFileWriter, Vs2010FiltersFileWriter, Vs2010ProjectFileWriter};
use crate::solution::{
    SolutionFileReader, SolutionFileWriter, Vs2008SolutionFileReader, Vs2010SolutionFileWriter,
    projects_by_guid, resolve_dependencies,
};

// ═══════════════════════════════════════════════════════════════════════════════
//  VsVersion
// ═══════════════════════════════════════════════════════════════════════════════

/// Visual Studio release whose solution and project formats are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VsVersion {
    Vs2008,
    Vs2010,
    Vs2012,
    Vs2013,
    Vs2015,
}

impl VsVersion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vs2008 => "2008",
            Self::Vs2010 => "2010",
            Self::Vs2012 => "2012",
            Self::Vs2013 => "2013",
            Self::Vs2015 => "2015",
        }
    }

    fn solution_reader(self, path: &Path) -> Result<Box<dyn SolutionFileReader>, ConvertError> {
        match self {
            Self::Vs2008 => Ok(Box::new(Vs2008SolutionFileReader::open(path)?)),
            _ => Err(unsupported("solution reader", self)),
        }
    }

    fn project_reader(self, path: &Path) -> Result<Box<dyn ProjectFileReader>, ConvertError> {
        match self {
            Self::Vs2008 => Ok(Box::new(Vs2008ProjectFileReader::open(path)?)),
            _ => Err(unsupported("project reader", self)),
        }
    }

    fn solution_writer(self, path: &Path) -> Result<Box<dyn SolutionFileWriter>, ConvertError> {
        match self {
            Self::Vs2010 => Ok(Box::new(Vs2010SolutionFileWriter::create(path)?)),
            _ => Err(unsupported("solution writer", self)),
        }
    }

    fn project_writer(self, path: &Path) -> Result<Box<dyn ProjectFileWriter>, ConvertError> {
        match self {
            Self::Vs2010 => Ok(Box::new(Vs2010ProjectFileWriter::create(path)?)),
            _ => Err(unsupported("project writer", self)),
        }
    }

    fn has_reader(self) -> bool {
        self == Self::Vs2008
    }

    fn has_writer(self) -> bool {
        self == Self::Vs2010
    }
}

fn unsupported(what: &str, version: VsVersion) -> ConvertError {
    ConvertError::unsupported(format!("no Visual Studio {version} {what}"))
}

impl fmt::Display for VsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VsVersion {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "2008" => Ok(Self::Vs2008),
            "2010" => Ok(Self::Vs2010),
            "2012" => Ok(Self::Vs2012),
            "2013" => Ok(Self::Vs2013),
            "2015" => Ok(Self::Vs2015),
            _ => Err(ConvertError::unsupported(format!(
                "unknown Visual Studio version: {s}"
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  ConverterBuilder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for a [`Converter`].
///
/// # Example
/// ```no_run
/// use msvscpp_convert::{ConverterBuilder, VsVersion};
///
/// let converter = ConverterBuilder::new()
///     .output_version(VsVersion::Vs2010)
///     .output_directory("vs2010")
///     .build()
///     .unwrap();
/// converter.convert("msvscpp/libexample.sln").unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConverterBuilder {
    input_version: VsVersion,
    output_version: VsVersion,
    output_directory: Option<PathBuf>,
    platform_toolset: String,
}

impl Default for ConverterBuilder {
    fn default() -> Self {
        Self {
            input_version: VsVersion::Vs2008,
            output_version: VsVersion::Vs2010,
            output_directory: None,
            platform_toolset: X64_PLATFORM_TOOLSET.to_string(),
        }
    }
}

impl ConverterBuilder {
    /// Convert from Visual Studio 2008 to 2010 into `./2010` by default.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input_version(mut self, version: VsVersion) -> Self {
        self.input_version = version;
        self
    }

    pub fn output_version(mut self, version: VsVersion) -> Self {
        self.output_version = version;
        self
    }

    /// Directory the converted solution is written to. It must not exist.
    ///
    /// Defaults to the output version string, e.g. `2010`.
    pub fn output_directory(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_directory = Some(path.into());
        self
    }

    /// Platform toolset of synthesized x64 configurations.
    pub fn platform_toolset(mut self, toolset: impl Into<String>) -> Self {
        self.platform_toolset = toolset.into();
        self
    }

    /// Validate the version pair and return the converter.
    pub fn build(self) -> Result<Converter, ConvertError> {
        if !self.input_version.has_reader() || !self.output_version.has_writer() {
            return Err(ConvertError::unsupported(format!(
                "unsupported conversion from Visual Studio {} to {}",
                self.input_version, self.output_version
            )));
        }
        let output_directory = self
            .output_directory
            .unwrap_or_else(|| PathBuf::from(self.output_version.as_str()));
        Ok(Converter {
            input_version: self.input_version,
            output_version: self.output_version,
            output_directory,
            platform_toolset: self.platform_toolset,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Converter
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct Converter {
    input_version: VsVersion,
    output_version: VsVersion,
    output_directory: PathBuf,
    platform_toolset: String,
}

/// `base` joined with a `\` separated relative `filename` plus `extension`.
fn native_path(base: &Path, filename: &str, extension: &str) -> PathBuf {
    let mut path: PathBuf = base.to_path_buf();
    path.extend(filename.split('\\').filter(|c| !c.is_empty()));
    path.as_mut_os_string().push(extension);
    path
}

impl Converter {
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// Create the output directory, failing if it already exists.
    fn create_output_directory(&self) -> Result<(), ConvertError> {
        let directory = &self.output_directory;
        if let Some(parent) = directory.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
        match fs::create_dir(directory) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(ConvertError::environment(
                format!("{}: output directory already exists", directory.display()),
            )),
            Err(e) => Err(io_error(directory, e)),
        }
    }

    /// Convert a solution and every project it lists.
    ///
    /// Stops at the first error. Output written before the error is kept.
    pub fn convert(&self, solution_path: impl AsRef<Path>) -> Result<(), ConvertError> {
        let solution_path = solution_path.as_ref();
        let solution_directory = solution_path.parent().unwrap_or(Path::new(""));
        let Some(solution_filename) = solution_path.file_name() else {
            return Err(ConvertError::environment(format!(
                "{}: not a solution file path",
                solution_path.display()
            )));
        };

        let mut reader = self.input_version.solution_reader(solution_path)?;
        reader.read_header()?;
        let projects = reader.read_projects()?;
        let mut configurations = reader.read_configurations()?;
        drop(reader);

        configurations.extend_with_x64();

        self.create_output_directory()?;

        let output_solution = self.output_directory.join(solution_filename);
        self.output_version
            .solution_writer(&output_solution)?
            .write_solution(&projects, &configurations)?;
        info!("wrote {}", output_solution.display());

        let by_guid = projects_by_guid(&projects);
        for solution_project in &projects {
            let input = native_path(solution_directory, &solution_project.filename, ".vcproj");
            debug!("reading {}", input.display());

            let mut project = self.input_version.project_reader(&input)?.read_project()?;
            project
                .configurations
                .extend_with_x64_by(|c: &ProjectConfiguration| {
                    c.copy_to_x64_with_toolset(&self.platform_toolset)
                });

            let output = native_path(&self.output_directory, &solution_project.filename, ".vcxproj");
            if let Some(parent) = output.parent() {
                fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
            }

            let dependencies = resolve_dependencies(solution_project, &by_guid);
            self.output_version
                .project_writer(&output)?
                .write_project(&project, &dependencies)?;
            info!("wrote {}", output.display());

            let filters = native_path(
                &self.output_directory,
                &solution_project.filename,
                ".vcxproj.filters",
            );
            Vs2010FiltersFileWriter::create(&filters)?.write_filters(&project.information)?;
            debug!("wrote {}", filters.display());
        }

        info!(
            "converted {} projects from Visual Studio {} to {}",
            projects.len(),
            self.input_version,
            self.output_version
        );
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
