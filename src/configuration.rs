//! Build configurations (`Debug|Win32`, `Release|x64`, …) and the ordered
//! sets that hold them.

use std::collections::HashMap;

use tracing::warn;

/// Platform name of synthesized 64-bit configurations.
pub const PLATFORM_X64: &str = "x64";

/// Platform toolset assigned to synthesized 64-bit configurations.
pub const X64_PLATFORM_TOOLSET: &str = "Windows7.1SDK";

/// `VCLinkerTool` `TargetMachine` code for AMD64 as written by Visual Studio 2008.
pub const TARGET_MACHINE_X64: &str = "17";

/// Behaviour shared by every configuration type stored in a
/// [`ConfigurationSet`].
pub trait Configuration: Clone {
    fn name(&self) -> &str;
    fn platform(&self) -> &str;

    /// Clone this configuration as its 64-bit counterpart.
    fn copy_to_x64(&self) -> Self;

    /// The `Name|Platform` key used by solution and project files.
    fn identifier(&self) -> String {
        format!("{}|{}", self.name(), self.platform())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  SolutionConfiguration
// ═══════════════════════════════════════════════════════════════════════════════

/// A solution-level configuration: only the (name, platform) pair.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionConfiguration {
    pub name: String,
    pub platform: String,
}

impl SolutionConfiguration {
    pub fn new(name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self { name: name.into(), platform: platform.into() }
    }
}

impl Configuration for SolutionConfiguration {
    fn name(&self) -> &str {
        &self.name
    }

    fn platform(&self) -> &str {
        &self.platform
    }

    fn copy_to_x64(&self) -> Self {
        Self::new(self.name.clone(), PLATFORM_X64)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  ProjectConfiguration
// ═══════════════════════════════════════════════════════════════════════════════

// Every setting holds the raw attribute value from the `.vcproj` file.
// `None` means the attribute was absent, `Some("")` that it was present but
// empty; the writer treats the two differently for the special-zero fields.

/// A project configuration with its compiler, librarian and linker settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectConfiguration {
    pub name: String,
    pub platform: String,

    // ── General ──
    /// `ConfigurationType`.
    pub output_type: Option<String>,
    pub character_set: Option<String>,
    pub managed_extensions: Option<String>,
    pub whole_program_optimization: Option<String>,
    pub platform_toolset: Option<String>,
    pub output_directory: Option<String>,
    pub intermediate_directory: Option<String>,

    // ── VCCLCompilerTool ──
    /// `AdditionalIncludeDirectories`.
    pub include_directories: Option<String>,
    pub basic_runtime_checks: Option<String>,
    pub compile_as: Option<String>,
    pub debug_information_format: Option<String>,
    pub detect_64bit_portability_problems: Option<String>,
    pub enable_function_level_linking: Option<String>,
    pub enable_intrinsic_functions: Option<String>,
    pub optimization: Option<String>,
    pub preprocessor_definitions: Option<String>,
    pub runtime_library: Option<String>,
    pub smaller_type_check: Option<String>,
    /// `UsePrecompiledHeader`.
    pub precompiled_header: Option<String>,
    /// `WarnAsError`.
    pub warning_as_error: Option<String>,
    pub warning_level: Option<String>,

    // ── VCLibrarianTool ──
    pub librarian_output_file: Option<String>,
    /// `IgnoreAllDefaultLibraries`.
    pub librarian_ignore_defaults: Option<String>,

    // ── VCLinkerTool ──
    /// Set once a `VCLinkerTool` block was seen.
    pub linker_values_set: bool,
    /// `AdditionalDependencies`, space separated in the source file.
    pub additional_dependencies: Vec<String>,
    /// `AdditionalLibraryDirectories`.
    pub library_directories: Option<String>,
    pub data_execution_prevention: Option<String>,
    /// `EnableCOMDATFolding`.
    pub enable_comdat_folding: Option<String>,
    pub fixed_base_address: Option<String>,
    pub generate_debug_information: Option<String>,
    pub import_library: Option<String>,
    pub link_incremental: Option<String>,
    pub module_definition_file: Option<String>,
    pub optimize_references: Option<String>,
    pub linker_output_file: Option<String>,
    pub randomized_base_address: Option<String>,
    pub sub_system: Option<String>,
    pub target_machine: Option<String>,
}

impl Configuration for ProjectConfiguration {
    fn name(&self) -> &str {
        &self.name
    }

    fn platform(&self) -> &str {
        &self.platform
    }

    fn copy_to_x64(&self) -> Self {
        self.copy_to_x64_with_toolset(X64_PLATFORM_TOOLSET)
    }
}

impl ProjectConfiguration {
    pub fn new(name: impl Into<String>, platform: impl Into<String>) -> Self {
        Self { name: name.into(), platform: platform.into(), ..Default::default() }
    }

    /// Same as [`Configuration::copy_to_x64`] with a custom platform toolset.
    pub fn copy_to_x64_with_toolset(&self, platform_toolset: &str) -> Self {
        Self {
            platform: PLATFORM_X64.to_string(),
            platform_toolset: Some(platform_toolset.to_string()),
            target_machine: Some(TARGET_MACHINE_X64.to_string()),
            ..self.clone()
        }
    }
}

// ─── Display strings ─────────────────────────────────────────────────────────

// Each derivation maps a numeric code to the Visual Studio 2010 token.
// Unrecognized or absent codes map to "" which the writer omits.

const BASIC_RUNTIME_CHECKS: &[(i64, &str)] = &[(0, "Default"), (3, "EnableFastChecks")];
const CHARACTER_SET: &[(i64, &str)] = &[(1, "Unicode"), (2, "MultiByte")];
const COMPILE_AS: &[(i64, &str)] = &[(1, "CompileAsC"), (2, "CompileAsCpp")];
const DEBUG_INFORMATION_FORMAT: &[(i64, &str)] = &[(3, "ProgramDatabase"), (4, "EditAndContinue")];
const FALSE_TRUE: &[(i64, &str)] = &[(1, "false"), (2, "true")];
const OFF_ON: &[(i64, &str)] = &[(0, "false"), (1, "true")];
const OPTIMIZATION: &[(i64, &str)] = &[(0, "Disabled"), (2, "MaxSpeed")];
const OUTPUT_TYPE: &[(i64, &str)] =
    &[(1, "Application"), (2, "DynamicLibrary"), (4, "StaticLibrary")];
const PRECOMPILED_HEADER: &[(i64, &str)] = &[(1, "Create"), (2, "Use")];
const RUNTIME_LIBRARY: &[(i64, &str)] = &[(2, "MultiThreadedDLL"), (3, "MultiThreadedDebugDLL")];
const SUB_SYSTEM: &[(i64, &str)] = &[(0, "NotSet"), (1, "Console"), (2, "Windows")];
const TARGET_MACHINE: &[(i64, &str)] = &[(1, "MachineX86"), (2, "MachineX64"), (17, "MachineX64")];
const WARNING_LEVEL: &[(i64, &str)] = &[
    (0, "TurnOffAllWarnings"),
    (1, "Level1"),
    (2, "Level2"),
    (3, "Level3"),
    (4, "Level4"),
];

/// Look up a numeric code. Unmapped non-empty codes are logged and dropped.
fn code_string(field: &str, value: &Option<String>, table: &[(i64, &'static str)]) -> &'static str {
    let Some(raw) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) else {
        return "";
    };
    let found = raw
        .parse::<i64>()
        .ok()
        .and_then(|code| table.iter().find(|(c, _)| *c == code))
        .map(|(_, token)| *token);

    match found {
        Some(token) => token,
        None => {
            warn!("{field}: unsupported value {raw:?} dropped");
            ""
        }
    }
}

/// Pass a `true`/`false` switch through, normalized to lower case.
fn bool_string(field: &str, value: &Option<String>) -> &'static str {
    match value.as_deref().map(str::trim) {
        None | Some("") => "",
        Some(v) if v.eq_ignore_ascii_case("true") => "true",
        Some(v) if v.eq_ignore_ascii_case("false") => "false",
        Some(v) => {
            warn!("{field}: unsupported value {v:?} dropped");
            ""
        }
    }
}

impl ProjectConfiguration {
    pub fn basic_runtime_checks_string(&self) -> &'static str {
        code_string("BasicRuntimeChecks", &self.basic_runtime_checks, BASIC_RUNTIME_CHECKS)
    }

    pub fn character_set_string(&self) -> &'static str {
        code_string("CharacterSet", &self.character_set, CHARACTER_SET)
    }

    pub fn compile_as_string(&self) -> &'static str {
        code_string("CompileAs", &self.compile_as, COMPILE_AS)
    }

    pub fn data_execution_prevention_string(&self) -> &'static str {
        code_string("DataExecutionPrevention", &self.data_execution_prevention, FALSE_TRUE)
    }

    pub fn debug_information_format_string(&self) -> &'static str {
        code_string("DebugInformationFormat", &self.debug_information_format, DEBUG_INFORMATION_FORMAT)
    }

    pub fn enable_comdat_folding_string(&self) -> &'static str {
        code_string("EnableCOMDATFolding", &self.enable_comdat_folding, FALSE_TRUE)
    }

    pub fn enable_function_level_linking_string(&self) -> &'static str {
        bool_string("EnableFunctionLevelLinking", &self.enable_function_level_linking)
    }

    pub fn enable_intrinsic_functions_string(&self) -> &'static str {
        bool_string("EnableIntrinsicFunctions", &self.enable_intrinsic_functions)
    }

    pub fn fixed_base_address_string(&self) -> &'static str {
        code_string("FixedBaseAddress", &self.fixed_base_address, FALSE_TRUE)
    }

    pub fn generate_debug_information_string(&self) -> &'static str {
        bool_string("GenerateDebugInformation", &self.generate_debug_information)
    }

    pub fn librarian_ignore_defaults_string(&self) -> &'static str {
        bool_string("IgnoreAllDefaultLibraries", &self.librarian_ignore_defaults)
    }

    pub fn link_incremental_string(&self) -> &'static str {
        code_string("LinkIncremental", &self.link_incremental, FALSE_TRUE)
    }

    pub fn managed_extensions_string(&self) -> &'static str {
        code_string("ManagedExtensions", &self.managed_extensions, OFF_ON)
    }

    pub fn optimization_string(&self) -> &'static str {
        code_string("Optimization", &self.optimization, OPTIMIZATION)
    }

    pub fn optimize_references_string(&self) -> &'static str {
        code_string("OptimizeReferences", &self.optimize_references, FALSE_TRUE)
    }

    pub fn output_type_string(&self) -> &'static str {
        code_string("ConfigurationType", &self.output_type, OUTPUT_TYPE)
    }

    pub fn precompiled_header_string(&self) -> &'static str {
        code_string("UsePrecompiledHeader", &self.precompiled_header, PRECOMPILED_HEADER)
    }

    pub fn randomized_base_address_string(&self) -> &'static str {
        code_string("RandomizedBaseAddress", &self.randomized_base_address, FALSE_TRUE)
    }

    pub fn runtime_library_string(&self) -> &'static str {
        code_string("RuntimeLibrary", &self.runtime_library, RUNTIME_LIBRARY)
    }

    pub fn smaller_type_check_string(&self) -> &'static str {
        bool_string("SmallerTypeCheck", &self.smaller_type_check)
    }

    pub fn sub_system_string(&self) -> &'static str {
        code_string("SubSystem", &self.sub_system, SUB_SYSTEM)
    }

    pub fn target_machine_string(&self) -> &'static str {
        code_string("TargetMachine", &self.target_machine, TARGET_MACHINE)
    }

    pub fn warning_as_error_string(&self) -> &'static str {
        bool_string("WarnAsError", &self.warning_as_error)
    }

    pub fn warning_level_string(&self) -> &'static str {
        code_string("WarningLevel", &self.warning_level, WARNING_LEVEL)
    }

    pub fn whole_program_optimization_string(&self) -> &'static str {
        code_string("WholeProgramOptimization", &self.whole_program_optimization, OFF_ON)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  ConfigurationSet
// ═══════════════════════════════════════════════════════════════════════════════

/// Configurations keyed by `Name|Platform`.
///
/// Distinct names and platforms are remembered in insertion order; iteration
/// goes through [`sorted`](Self::sorted) so output never depends on the hash
/// map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationSet<C> {
    configurations: HashMap<String, C>,
    names: Vec<String>,
    platforms: Vec<String>,
}

impl<C> Default for ConfigurationSet<C> {
    fn default() -> Self {
        Self { configurations: HashMap::new(), names: Vec::new(), platforms: Vec::new() }
    }
}

impl<C: Configuration> ConfigurationSet<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a configuration, replacing one with the same `Name|Platform`.
    pub fn append(&mut self, configuration: C) {
        if !self.names.iter().any(|n| n == configuration.name()) {
            self.names.push(configuration.name().to_string());
        }
        if !self.platforms.iter().any(|p| p == configuration.platform()) {
            self.platforms.push(configuration.platform().to_string());
        }
        self.configurations.insert(configuration.identifier(), configuration);
    }

    pub fn get(&self, name: &str, platform: &str) -> Option<&C> {
        self.configurations.get(&format!("{name}|{platform}"))
    }

    pub fn len(&self) -> usize {
        self.configurations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configurations.is_empty()
    }

    /// Distinct configuration names in insertion order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Distinct platforms in insertion order.
    pub fn platforms(&self) -> &[String] {
        &self.platforms
    }

    /// Iterate names ascending (descending with `reverse`), platforms always
    /// ascending. Missing name/platform combinations are skipped.
    pub fn sorted(&self, reverse: bool) -> impl Iterator<Item = &C> {
        let mut names: Vec<&str> = self.names.iter().map(String::as_str).collect();
        names.sort_unstable();
        if reverse {
            names.reverse();
        }
        let mut platforms: Vec<&str> = self.platforms.iter().map(String::as_str).collect();
        platforms.sort_unstable();

        names.into_iter().flat_map(move |name| {
            platforms
                .clone()
                .into_iter()
                .filter_map(move |platform| self.get(name, platform))
        })
    }

    /// Add an x64 clone of every non-x64 configuration.
    ///
    /// Does nothing when an x64 platform is already present.
    pub fn extend_with_x64(&mut self) {
        self.extend_with_x64_by(C::copy_to_x64);
    }

    /// [`extend_with_x64`](Self::extend_with_x64) with a custom clone function.
    pub fn extend_with_x64_by<F>(&mut self, copy: F)
    where
        F: Fn(&C) -> C,
    {
        if self.platforms.iter().any(|p| p == PLATFORM_X64) {
            return;
        }
        let copies: Vec<C> = self
            .sorted(false)
            .filter(|c| c.platform() != PLATFORM_X64)
            .map(&copy)
            .collect();
        for configuration in copies {
            self.append(configuration);
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════
