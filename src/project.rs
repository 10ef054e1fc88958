//! Project model and the Visual Studio 2008 `.vcproj` reader.
//!
//! A `.vcproj` file is XML, but Visual Studio 2008 writes it in a fixed shape
//! with one element tag or attribute per line:
//!
//! ```text
//! <Configuration
//!     Name="Release|Win32"
//!     ConfigurationType="4"
//!     >
//!     <Tool
//!         Name="VCCLCompilerTool"
//!         Optimization="2"
//!     />
//! </Configuration>
//! ```
//!
//! The reader therefore works line by line through a [`LineReader`] and only
//! interprets the lines it knows about.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, trace};

use crate::configuration::{ConfigurationSet, ProjectConfiguration};
use crate::error::ConvertError;
use crate::grammar::{parse_attribute, parse_configuration_identifier};
use crate::line_reader::{BYTE_ORDER_MARK, LineReader};

// ═══════════════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════════════

/// Project-level metadata and the categorized file lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectInformation {
    pub name: String,
    /// Project GUID without braces, as written in the project file.
    pub guid: String,
    pub root_namespace: String,
    pub keyword: Option<String>,
    pub source_files: Vec<String>,
    pub header_files: Vec<String>,
    pub resource_files: Vec<String>,
}

/// File categories that survive conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileCategory {
    Source,
    Header,
    Resource,
}

impl FileCategory {
    /// Map a `<Filter Name="...">` value to its category.
    pub fn from_filter_name(name: &str) -> Option<Self> {
        match name {
            "Source Files" => Some(Self::Source),
            "Header Files" => Some(Self::Header),
            "Resource Files" => Some(Self::Resource),
            _ => None,
        }
    }

    pub fn filter_name(self) -> &'static str {
        match self {
            Self::Source => "Source Files",
            Self::Header => "Header Files",
            Self::Resource => "Resource Files",
        }
    }
}

impl ProjectInformation {
    pub fn files(&self, category: FileCategory) -> &[String] {
        match category {
            FileCategory::Source => &self.source_files,
            FileCategory::Header => &self.header_files,
            FileCategory::Resource => &self.resource_files,
        }
    }

    fn files_mut(&mut self, category: FileCategory) -> &mut Vec<String> {
        match category {
            FileCategory::Source => &mut self.source_files,
            FileCategory::Header => &mut self.header_files,
            FileCategory::Resource => &mut self.resource_files,
        }
    }
}

/// Everything read from one project file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Project {
    pub information: ProjectInformation,
    pub configurations: ConfigurationSet<ProjectConfiguration>,
}

/// Reads a project file of one format version.
pub trait ProjectFileReader {
    /// Validate the file signature. Fails the whole read on mismatch.
    fn read_header(&mut self) -> Result<(), ConvertError>;

    fn read_project_information(
        &mut self,
        information: &mut ProjectInformation,
    ) -> Result<(), ConvertError>;

    fn read_configurations(
        &mut self,
    ) -> Result<ConfigurationSet<ProjectConfiguration>, ConvertError>;

    fn read_files(&mut self, information: &mut ProjectInformation) -> Result<(), ConvertError>;

    /// Read the whole file in document order.
    fn read_project(&mut self) -> Result<Project, ConvertError> {
        self.read_header()?;
        let mut information = ProjectInformation::default();
        self.read_project_information(&mut information)?;
        let configurations = self.read_configurations()?;
        self.read_files(&mut information)?;
        Ok(Project { information, configurations })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Visual Studio 2008 reader
// ═══════════════════════════════════════════════════════════════════════════════

const HEADER_LINES: [&str; 4] = [
    "<?xml version=\"1.0\" encoding=\"Windows-1252\"?>",
    "<VisualStudioProject",
    "ProjectType=\"Visual C++\"",
    "Version=\"9,00\"",
];

/// Tool blocks inside a `<Configuration>` whose attributes are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ToolKind {
    Compiler,
    Librarian,
    Linker,
    /// Any other tool, or a tool whose `Name` was not read yet.
    Other,
}

impl ToolKind {
    fn from_name(name: &str) -> Self {
        match name {
            "VCCLCompilerTool" => Self::Compiler,
            "VCLibrarianTool" => Self::Librarian,
            "VCLinkerTool" => Self::Linker,
            _ => Self::Other,
        }
    }
}

/// Position inside a `<Configuration>` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ConfigurationState {
    Configuration,
    Tool(ToolKind),
}

/// Position inside the `<Files>` block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilesState {
    /// Between elements.
    Body,
    /// Reading the attributes of a `<Filter` start tag.
    FilterTag,
    /// Reading the attributes of a `<File` start tag.
    FileTag,
}

/// Reader for Visual Studio 2008 (`Version="9,00"`) `.vcproj` files.
pub struct Vs2008ProjectFileReader<S: BufRead> {
    reader: LineReader<S>,
}

impl Vs2008ProjectFileReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        Ok(Self::new(LineReader::open(path)?))
    }
}

impl<S: BufRead> Vs2008ProjectFileReader<S> {
    pub fn new(reader: LineReader<S>) -> Self {
        Self { reader }
    }

    fn read_line(&mut self) -> Result<Option<String>, ConvertError> {
        self.reader.read_line(false)
    }

    /// Skip lines until `tag` is found. Returns `false` at end of input.
    fn skip_to(&mut self, tag: &str) -> Result<bool, ConvertError> {
        while let Some(line) = self.read_line()? {
            if line == tag {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn read_configuration(&mut self) -> Result<ProjectConfiguration, ConvertError> {
        let mut configuration = ProjectConfiguration::default();
        let mut state = ConfigurationState::Configuration;

        loop {
            let Some(line) = self.read_line()? else {
                return Err(ConvertError::malformed(format!(
                    "unexpected end of project file in configuration (line {})",
                    self.reader.line_number()
                )));
            };

            state = match state {
                ConfigurationState::Configuration => {
                    if line == "</Configuration>" {
                        break;
                    }
                    if line == "<Tool" {
                        ConfigurationState::Tool(ToolKind::Other)
                    } else {
                        if let Some((key, value)) = parse_attribute(&line)
                            && !set_general_attribute(key, value, &mut configuration)
                        {
                            trace!("ignoring configuration attribute {key}");
                        }
                        state
                    }
                }
                ConfigurationState::Tool(kind) => {
                    if line == "/>" || line == "</Tool>" {
                        ConfigurationState::Configuration
                    } else if let Some((key, value)) = parse_attribute(&line) {
                        let mut next = state;
                        let known = match (kind, key) {
                            (ToolKind::Other, "Name") => {
                                let kind = ToolKind::from_name(value);
                                if kind == ToolKind::Linker {
                                    configuration.linker_values_set = true;
                                }
                                next = ConfigurationState::Tool(kind);
                                true
                            }
                            (ToolKind::Compiler, _) => set_compiler_attribute(key, value, &mut configuration),
                            (ToolKind::Librarian, _) => set_librarian_attribute(key, value, &mut configuration),
                            (ToolKind::Linker, _) => set_linker_attribute(key, value, &mut configuration),
                            (ToolKind::Other, _) => true,
                        };
                        if !known {
                            trace!("ignoring {kind:?} attribute {key}");
                        }
                        next
                    } else {
                        state
                    }
                }
            };
        }

        debug!("read configuration {}|{}", configuration.name, configuration.platform);
        Ok(configuration)
    }
}

impl<S: BufRead> ProjectFileReader for Vs2008ProjectFileReader<S> {
    fn read_header(&mut self) -> Result<(), ConvertError> {
        for (index, expected) in HEADER_LINES.iter().enumerate() {
            let line = self.read_line()?.unwrap_or_default();
            let line = if index == 0 {
                line.trim_start_matches(BYTE_ORDER_MARK)
            } else {
                line.as_str()
            };
            if !line.starts_with(expected) {
                return Err(ConvertError::malformed(format!(
                    "unsupported project file header: expected {expected:?} on line {}",
                    index + 1
                )));
            }
        }
        Ok(())
    }

    fn read_project_information(
        &mut self,
        information: &mut ProjectInformation,
    ) -> Result<(), ConvertError> {
        loop {
            let Some(line) = self.read_line()? else {
                return Err(ConvertError::malformed(
                    "unexpected end of project file in project information",
                ));
            };
            if line.starts_with('>') {
                break;
            }
            let Some((key, value)) = parse_attribute(&line) else {
                continue;
            };
            match key {
                "Name" => information.name = value.to_string(),
                "ProjectGUID" => {
                    information.guid = value.trim_start_matches('{').trim_end_matches('}').to_string()
                }
                "RootNamespace" => information.root_namespace = value.to_string(),
                "Keyword" => information.keyword = Some(value.to_string()),
                _ => {}
            }
        }
        debug!("read project information for {}", information.name);
        Ok(())
    }

    fn read_configurations(
        &mut self,
    ) -> Result<ConfigurationSet<ProjectConfiguration>, ConvertError> {
        if !self.skip_to("<Configurations>")? {
            return Err(ConvertError::malformed("missing <Configurations> in project file"));
        }

        let mut configurations = ConfigurationSet::new();
        loop {
            let Some(line) = self.read_line()? else {
                return Err(ConvertError::malformed("missing </Configurations> in project file"));
            };
            if line == "</Configurations>" {
                break;
            }
            if line == "<Configuration" {
                configurations.append(self.read_configuration()?);
            }
        }
        Ok(configurations)
    }

    fn read_files(&mut self, information: &mut ProjectInformation) -> Result<(), ConvertError> {
        if !self.skip_to("<Files>")? {
            debug!("project file has no <Files> section");
            return Ok(());
        }

        // One entry per open <Filter>; only top-level filters carry a category.
        let mut filters: Vec<Option<FileCategory>> = Vec::new();
        let mut state = FilesState::Body;

        while let Some(line) = self.read_line()? {
            state = match state {
                FilesState::Body => match line.as_str() {
                    "</Files>" => break,
                    "<Filter" => {
                        filters.push(None);
                        FilesState::FilterTag
                    }
                    "</Filter>" => {
                        filters.pop();
                        state
                    }
                    "<File" => FilesState::FileTag,
                    _ => state,
                },
                FilesState::FilterTag => {
                    if line.starts_with('>') || line.starts_with("/>") {
                        if line.starts_with("/>") {
                            filters.pop();
                        }
                        FilesState::Body
                    } else {
                        if let Some(("Name", value)) = parse_attribute(&line) {
                            if filters.len() == 1 {
                                if let Some(top) = filters.last_mut() {
                                    *top = FileCategory::from_filter_name(value);
                                }
                            }
                        }
                        state
                    }
                }
                FilesState::FileTag => {
                    if line.starts_with('>') || line.starts_with("/>") {
                        FilesState::Body
                    } else {
                        if let Some(("RelativePath", value)) = parse_attribute(&line) {
                            if let [Some(category)] = filters.as_slice() {
                                information.files_mut(*category).push(value.to_string());
                            }
                        }
                        state
                    }
                }
            };
        }

        debug!(
            "read {} source, {} header and {} resource files",
            information.source_files.len(),
            information.header_files.len(),
            information.resource_files.len()
        );
        Ok(())
    }
}

// ─── Attribute dispatch ──────────────────────────────────────────────────────

fn set_general_attribute(key: &str, value: &str, c: &mut ProjectConfiguration) -> bool {
    let s = || Some(value.to_string());
    match key {
        "Name" => {
            if let Some((name, platform)) = parse_configuration_identifier(value) {
                c.name = name.to_string();
                c.platform = platform.to_string();
            }
        }
        "ConfigurationType"        => c.output_type = s(),
        "CharacterSet"             => c.character_set = s(),
        "ManagedExtensions"        => c.managed_extensions = s(),
        "WholeProgramOptimization" => c.whole_program_optimization = s(),
        "OutputDirectory"          => c.output_directory = s(),
        "IntermediateDirectory"    => c.intermediate_directory = s(),
        _ => return false,
    }
    true
}

fn set_compiler_attribute(key: &str, value: &str, c: &mut ProjectConfiguration) -> bool {
    let s = || Some(value.to_string());
    match key {
        "AdditionalIncludeDirectories"   => c.include_directories = s(),
        "BasicRuntimeChecks"             => c.basic_runtime_checks = s(),
        "CompileAs"                      => c.compile_as = s(),
        "DebugInformationFormat"         => c.debug_information_format = s(),
        "Detect64BitPortabilityProblems" => c.detect_64bit_portability_problems = s(),
        "EnableFunctionLevelLinking"     => c.enable_function_level_linking = s(),
        "EnableIntrinsicFunctions"       => c.enable_intrinsic_functions = s(),
        "Optimization"                   => c.optimization = s(),
        "PreprocessorDefinitions"        => c.preprocessor_definitions = s(),
        "RuntimeLibrary"                 => c.runtime_library = s(),
        "SmallerTypeCheck"               => c.smaller_type_check = s(),
        "UsePrecompiledHeader"           => c.precompiled_header = s(),
        "WarnAsError"                    => c.warning_as_error = s(),
        "WarningLevel"                   => c.warning_level = s(),
        _ => return false,
    }
    true
}

fn set_librarian_attribute(key: &str, value: &str, c: &mut ProjectConfiguration) -> bool {
    let s = || Some(value.to_string());
    match key {
        "OutputFile"                => c.librarian_output_file = s(),
        "IgnoreAllDefaultLibraries" => c.librarian_ignore_defaults = s(),
        _ => return false,
    }
    true
}

fn set_linker_attribute(key: &str, value: &str, c: &mut ProjectConfiguration) -> bool {
    let s = || Some(value.to_string());
    match key {
        "AdditionalDependencies" => {
            c.additional_dependencies = value.split_whitespace().map(String::from).collect()
        }
        "AdditionalLibraryDirectories" => c.library_directories = s(),
        "DataExecutionPrevention"      => c.data_execution_prevention = s(),
        "EnableCOMDATFolding"          => c.enable_comdat_folding = s(),
        "FixedBaseAddress"             => c.fixed_base_address = s(),
        "GenerateDebugInformation"     => c.generate_debug_information = s(),
        "ImportLibrary"                => c.import_library = s(),
        "LinkIncremental"              => c.link_incremental = s(),
        "ModuleDefinitionFile"         => c.module_definition_file = s(),
        "OptimizeReferences"           => c.optimize_references = s(),
        "OutputFile"                   => c.linker_output_file = s(),
        "RandomizedBaseAddress"        => c.randomized_base_address = s(),
        "SubSystem"                    => c.sub_system = s(),
        "TargetMachine"                => c.target_machine = s(),
        _ => return false,
    }
    true
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
