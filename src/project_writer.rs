//! Visual Studio 2010 `.vcxproj` and `.vcxproj.filters` writers.
//!
//! Both files are MSBuild XML. They are written line by line rather than
//! through a DOM so the output matches what Visual Studio 2010 itself
//! produces: two-space indentation, CRLF line endings, a UTF-8 byte-order
//! mark, and element order fixed per section.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use tracing::debug;

use crate::configuration::{Configuration, ProjectConfiguration};
use crate::error::{ConvertError, io_error};
use crate::line_reader::BYTE_ORDER_MARK;
use crate::project::{FileCategory, Project, ProjectInformation};
use crate::solution::SolutionProject;

const MSBUILD_NAMESPACE: &str = "http://schemas.microsoft.com/developer/msbuild/2003";
const PROJECT_FILE_VERSION: &str = "10.0.40219.1";

const DEFAULT_OUTPUT_DIRECTORY: &str = "$(SolutionDir)$(Configuration)\\";
const DEFAULT_INTERMEDIATE_DIRECTORY: &str = "$(Configuration)\\";

/// Writes a project file of one format version.
pub trait ProjectFileWriter {
    /// Write the complete project file.
    ///
    /// `dependencies` are the solution projects this project references,
    /// already resolved and ordered.
    fn write_project(
        &mut self,
        project: &Project,
        dependencies: &[&SolutionProject],
    ) -> Result<(), ConvertError>;
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Line output
// ═══════════════════════════════════════════════════════════════════════════════

struct XmlLines<W: Write> {
    out: W,
}

impl<W: Write> XmlLines<W> {
    fn line(&mut self, depth: usize, text: &str) -> io::Result<()> {
        write!(self.out, "{:indent$}{text}\r\n", "", indent = depth * 2)
    }

    fn header(&mut self) -> io::Result<()> {
        write!(self.out, "{BYTE_ORDER_MARK}")?;
        self.line(0, "<?xml version=\"1.0\" encoding=\"utf-8\"?>")
    }

    /// `<tag>value</tag>`, or nothing when `value` is empty.
    fn element(&mut self, depth: usize, tag: &str, value: &str) -> io::Result<()> {
        if value.is_empty() {
            return Ok(());
        }
        self.line(depth, &format!("<{tag}>{value}</{tag}>"))
    }

    /// An element that is present but has no value.
    fn empty_element(&mut self, depth: usize, tag: &str) -> io::Result<()> {
        self.line(depth, &format!("<{tag}>"))?;
        self.line(depth, &format!("</{tag}>"))
    }

    /// Fields where code `0` has no destination token but must still be
    /// written so the setting is not inherited.
    fn special_zero_element(
        &mut self,
        depth: usize,
        tag: &str,
        code: &Option<String>,
        value: &str,
    ) -> io::Result<()> {
        if !value.is_empty() {
            self.element(depth, tag, value)
        } else if code.as_deref() == Some("0") {
            self.empty_element(depth, tag)
        } else {
            Ok(())
        }
    }
}

// ─── Value rewriting ─────────────────────────────────────────────────────────

fn condition(configuration: &ProjectConfiguration) -> String {
    format!(
        "'$(Configuration)|$(Platform)'=='{}'",
        configuration.identifier()
    )
}

/// `$(OutDir)` already ends in a separator in Visual Studio 2010.
fn strip_out_dir_separator(value: &str) -> String {
    value.replace("$(OutDir)\\", "$(OutDir)")
}

/// Terminate a `;` separated list and append the inherit token.
fn inherited_list(value: &str, inherit: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let separator = if value.ends_with(';') { "" } else { ";" };
    format!("{value}{separator}%({inherit})")
}

fn directory(value: &Option<String>, default: &str) -> String {
    let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
        return default.to_string();
    };
    let value = value.replace("$(ConfigurationName)", "$(Configuration)");
    if value.ends_with('\\') {
        value
    } else {
        format!("{value}\\")
    }
}

/// Escape text taken from the solution file for use in an attribute.
///
/// Values copied from a `.vcproj` are already escaped and are written as is.
fn escape_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn opt(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Visual Studio 2010 project writer
// ═══════════════════════════════════════════════════════════════════════════════

/// Writer for Visual Studio 2010 (`ToolsVersion="4.0"`) `.vcxproj` files.
pub struct Vs2010ProjectFileWriter<W: Write> {
    xml: XmlLines<W>,
}

impl Vs2010ProjectFileWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| io_error(path, e))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Vs2010ProjectFileWriter<W> {
    pub fn new(out: W) -> Self {
        Self { xml: XmlLines { out } }
    }

    pub fn into_inner(self) -> W {
        self.xml.out
    }

    fn write_header(&mut self) -> io::Result<()> {
        self.xml.header()?;
        self.xml.line(
            0,
            &format!(
                "<Project DefaultTargets=\"Build\" ToolsVersion=\"4.0\" xmlns=\"{MSBUILD_NAMESPACE}\">"
            ),
        )
    }

    fn write_project_configurations(&mut self, project: &Project) -> io::Result<()> {
        let xml = &mut self.xml;
        xml.line(1, "<ItemGroup Label=\"ProjectConfigurations\">")?;
        for configuration in project.configurations.sorted(false) {
            xml.line(
                2,
                &format!("<ProjectConfiguration Include=\"{}\">", configuration.identifier()),
            )?;
            xml.element(3, "Configuration", &configuration.name)?;
            xml.element(3, "Platform", &configuration.platform)?;
            xml.line(2, "</ProjectConfiguration>")?;
        }
        xml.line(1, "</ItemGroup>")
    }

    fn write_globals(&mut self, information: &ProjectInformation) -> io::Result<()> {
        let xml = &mut self.xml;
        xml.line(1, "<PropertyGroup Label=\"Globals\">")?;
        xml.element(2, "ProjectGuid", &format!("{{{}}}", information.guid))?;
        xml.element(2, "RootNamespace", &information.root_namespace)?;
        xml.element(2, "Keyword", opt(&information.keyword))?;
        xml.line(1, "</PropertyGroup>")?;
        xml.line(1, "<Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.Default.props\" />")
    }

    fn write_configuration_properties(&mut self, project: &Project) -> io::Result<()> {
        let xml = &mut self.xml;
        for configuration in project.configurations.sorted(true) {
            xml.line(
                1,
                &format!(
                    "<PropertyGroup Condition=\"{}\" Label=\"Configuration\">",
                    condition(configuration)
                ),
            )?;
            xml.element(2, "ConfigurationType", configuration.output_type_string())?;
            xml.element(2, "CharacterSet", configuration.character_set_string())?;
            xml.element(2, "CLRSupport", configuration.managed_extensions_string())?;
            xml.element(
                2,
                "WholeProgramOptimization",
                configuration.whole_program_optimization_string(),
            )?;
            xml.element(2, "PlatformToolset", opt(&configuration.platform_toolset))?;
            xml.line(1, "</PropertyGroup>")?;
        }
        xml.line(1, "<Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.props\" />")?;
        xml.line(1, "<ImportGroup Label=\"ExtensionSettings\">")?;
        xml.line(1, "</ImportGroup>")
    }

    fn write_property_sheets(&mut self, project: &Project) -> io::Result<()> {
        let xml = &mut self.xml;
        for configuration in project.configurations.sorted(true) {
            xml.line(
                1,
                &format!(
                    "<ImportGroup Condition=\"{}\" Label=\"PropertySheets\">",
                    condition(configuration)
                ),
            )?;
            xml.line(
                2,
                "<Import Project=\"$(UserRootDir)\\Microsoft.Cpp.$(Platform).user.props\" \
                 Condition=\"exists('$(UserRootDir)\\Microsoft.Cpp.$(Platform).user.props')\" \
                 Label=\"LocalAppDataPlatform\" />",
            )?;
            xml.line(1, "</ImportGroup>")?;
        }
        xml.line(1, "<PropertyGroup Label=\"UserMacros\" />")
    }

    fn write_output_directories(&mut self, project: &Project) -> io::Result<()> {
        let xml = &mut self.xml;
        xml.line(1, "<PropertyGroup>")?;
        xml.element(2, "_ProjectFileVersion", PROJECT_FILE_VERSION)?;
        for configuration in project.configurations.sorted(true) {
            xml.line(
                2,
                &format!(
                    "<OutDir Condition=\"{}\">{}</OutDir>",
                    condition(configuration),
                    directory(&configuration.output_directory, DEFAULT_OUTPUT_DIRECTORY)
                ),
            )?;
        }
        for configuration in project.configurations.sorted(true) {
            xml.line(
                2,
                &format!(
                    "<IntDir Condition=\"{}\">{}</IntDir>",
                    condition(configuration),
                    directory(&configuration.intermediate_directory, DEFAULT_INTERMEDIATE_DIRECTORY)
                ),
            )?;
        }
        for configuration in project.configurations.sorted(true) {
            let link_incremental = configuration.link_incremental_string();
            if !link_incremental.is_empty() {
                xml.line(
                    2,
                    &format!(
                        "<LinkIncremental Condition=\"{}\">{link_incremental}</LinkIncremental>",
                        condition(configuration)
                    ),
                )?;
            }
        }
        xml.line(1, "</PropertyGroup>")
    }

    fn write_compiler_settings(&mut self, c: &ProjectConfiguration) -> io::Result<()> {
        let xml = &mut self.xml;
        xml.line(2, "<ClCompile>")?;
        xml.element(3, "Optimization", c.optimization_string())?;
        xml.element(3, "IntrinsicFunctions", c.enable_intrinsic_functions_string())?;
        xml.element(
            3,
            "AdditionalIncludeDirectories",
            &inherited_list(
                &strip_out_dir_separator(opt(&c.include_directories)),
                "AdditionalIncludeDirectories",
            ),
        )?;
        xml.element(
            3,
            "PreprocessorDefinitions",
            &inherited_list(opt(&c.preprocessor_definitions), "PreprocessorDefinitions"),
        )?;
        xml.element(3, "BasicRuntimeChecks", c.basic_runtime_checks_string())?;
        xml.element(3, "SmallerTypeCheck", c.smaller_type_check_string())?;
        xml.element(3, "RuntimeLibrary", c.runtime_library_string())?;
        xml.element(3, "FunctionLevelLinking", c.enable_function_level_linking_string())?;
        xml.special_zero_element(
            3,
            "PrecompiledHeader",
            &c.precompiled_header,
            c.precompiled_header_string(),
        )?;
        xml.element(3, "WarningLevel", c.warning_level_string())?;
        xml.element(3, "TreatWarningAsError", c.warning_as_error_string())?;
        xml.special_zero_element(
            3,
            "DebugInformationFormat",
            &c.debug_information_format,
            c.debug_information_format_string(),
        )?;
        xml.element(3, "CompileAs", c.compile_as_string())?;
        xml.line(2, "</ClCompile>")
    }

    fn write_librarian_settings(&mut self, c: &ProjectConfiguration) -> io::Result<()> {
        if c.librarian_output_file.is_none() && c.librarian_ignore_defaults.is_none() {
            return Ok(());
        }
        let xml = &mut self.xml;
        xml.line(2, "<Lib>")?;
        xml.element(3, "OutputFile", &strip_out_dir_separator(opt(&c.librarian_output_file)))?;
        xml.element(3, "IgnoreAllDefaultLibraries", c.librarian_ignore_defaults_string())?;
        xml.line(2, "</Lib>")
    }

    fn write_linker_settings(&mut self, c: &ProjectConfiguration) -> io::Result<()> {
        if !c.linker_values_set {
            return Ok(());
        }
        let xml = &mut self.xml;
        xml.line(2, "<Link>")?;
        xml.element(
            3,
            "AdditionalDependencies",
            &inherited_list(&c.additional_dependencies.join(";"), "AdditionalDependencies"),
        )?;
        xml.element(3, "OutputFile", &strip_out_dir_separator(opt(&c.linker_output_file)))?;
        xml.element(
            3,
            "AdditionalLibraryDirectories",
            &inherited_list(
                &strip_out_dir_separator(opt(&c.library_directories)),
                "AdditionalLibraryDirectories",
            ),
        )?;
        let module_definition_file = match c.module_definition_file.as_deref() {
            Some("0") | None => "",
            Some(file) => file,
        };
        xml.special_zero_element(
            3,
            "ModuleDefinitionFile",
            &c.module_definition_file,
            module_definition_file,
        )?;
        xml.element(3, "GenerateDebugInformation", c.generate_debug_information_string())?;
        xml.element(3, "SubSystem", c.sub_system_string())?;
        xml.special_zero_element(
            3,
            "OptimizeReferences",
            &c.optimize_references,
            c.optimize_references_string(),
        )?;
        xml.special_zero_element(
            3,
            "EnableCOMDATFolding",
            &c.enable_comdat_folding,
            c.enable_comdat_folding_string(),
        )?;
        xml.element(3, "RandomizedBaseAddress", c.randomized_base_address_string())?;
        xml.special_zero_element(
            3,
            "FixedBaseAddress",
            &c.fixed_base_address,
            c.fixed_base_address_string(),
        )?;
        xml.special_zero_element(
            3,
            "DataExecutionPrevention",
            &c.data_execution_prevention,
            c.data_execution_prevention_string(),
        )?;
        xml.element(3, "ImportLibrary", &strip_out_dir_separator(opt(&c.import_library)))?;
        xml.element(3, "TargetMachine", c.target_machine_string())?;
        xml.line(2, "</Link>")
    }

    fn write_item_definitions(&mut self, project: &Project) -> io::Result<()> {
        for configuration in project.configurations.sorted(false) {
            self.xml.line(
                1,
                &format!("<ItemDefinitionGroup Condition=\"{}\">", condition(configuration)),
            )?;
            self.write_compiler_settings(configuration)?;
            self.write_librarian_settings(configuration)?;
            self.write_linker_settings(configuration)?;
            self.xml.line(1, "</ItemDefinitionGroup>")?;
        }
        Ok(())
    }

    fn write_files(&mut self, information: &ProjectInformation) -> io::Result<()> {
        for category in [FileCategory::Source, FileCategory::Header, FileCategory::Resource] {
            let files = information.files(category);
            if files.is_empty() {
                continue;
            }
            self.xml.line(1, "<ItemGroup>")?;
            for file in files {
                self.xml.line(2, &format!("<{} Include=\"{file}\" />", item_tag(category)))?;
            }
            self.xml.line(1, "</ItemGroup>")?;
        }
        Ok(())
    }

    fn write_dependencies(&mut self, dependencies: &[&SolutionProject]) -> io::Result<()> {
        if dependencies.is_empty() {
            return Ok(());
        }
        let xml = &mut self.xml;
        xml.line(1, "<ItemGroup>")?;
        for dependency in dependencies {
            xml.line(
                2,
                &format!(
                    "<ProjectReference Include=\"..\\{}.vcxproj\">",
                    escape_attribute(&dependency.filename)
                ),
            )?;
            xml.element(3, "Project", &format!("{{{}}}", dependency.guid))?;
            xml.element(3, "ReferenceOutputAssembly", "false")?;
            xml.line(2, "</ProjectReference>")?;
        }
        xml.line(1, "</ItemGroup>")
    }

    fn write_footer(&mut self) -> io::Result<()> {
        let xml = &mut self.xml;
        xml.line(1, "<Import Project=\"$(VCTargetsPath)\\Microsoft.Cpp.targets\" />")?;
        xml.line(1, "<ImportGroup Label=\"ExtensionTargets\">")?;
        xml.line(1, "</ImportGroup>")?;
        xml.line(0, "</Project>")?;
        xml.out.flush()
    }
}

impl<W: Write> ProjectFileWriter for Vs2010ProjectFileWriter<W> {
    fn write_project(
        &mut self,
        project: &Project,
        dependencies: &[&SolutionProject],
    ) -> Result<(), ConvertError> {
        self.write_header()?;
        self.write_project_configurations(project)?;
        self.write_globals(&project.information)?;
        self.write_configuration_properties(project)?;
        self.write_property_sheets(project)?;
        self.write_output_directories(project)?;
        self.write_item_definitions(project)?;
        self.write_files(&project.information)?;
        self.write_dependencies(dependencies)?;
        self.write_footer()?;

        debug!(
            "wrote project {} with {} configurations",
            project.information.name,
            project.configurations.len()
        );
        Ok(())
    }
}

fn item_tag(category: FileCategory) -> &'static str {
    match category {
        FileCategory::Source => "ClCompile",
        FileCategory::Header => "ClInclude",
        FileCategory::Resource => "ResourceCompile",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Visual Studio 2010 filters writer
// ═══════════════════════════════════════════════════════════════════════════════

fn filter_identifier(category: FileCategory) -> &'static str {
    match category {
        FileCategory::Source => "{4FC737F1-C7A5-4376-A066-2A32D752A2FF}",
        FileCategory::Header => "{93995380-89BD-4b04-88EB-625FBE52EBFB}",
        FileCategory::Resource => "{67DA6AB6-F800-4c08-8B7A-83BB121AAD01}",
    }
}

fn filter_extensions(category: FileCategory) -> &'static str {
    match category {
        FileCategory::Source => "cpp;c;cc;cxx;def;odl;idl;hpj;bat;asm;asmx",
        FileCategory::Header => "h;hpp;hxx;hm;inl;inc;xsd",
        FileCategory::Resource => {
            "rc;ico;cur;bmp;dlg;rc2;rct;bin;rgs;gif;jpg;jpeg;jpe;resx;tiff;tif;png;wav;mfcribbon-ms"
        }
    }
}

/// Writer for the `.vcxproj.filters` file that groups sources in the IDE.
pub struct Vs2010FiltersFileWriter<W: Write> {
    xml: XmlLines<W>,
}

impl Vs2010FiltersFileWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| io_error(path, e))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Vs2010FiltersFileWriter<W> {
    pub fn new(out: W) -> Self {
        Self { xml: XmlLines { out } }
    }

    pub fn into_inner(self) -> W {
        self.xml.out
    }

    pub fn write_filters(&mut self, information: &ProjectInformation) -> Result<(), ConvertError> {
        const CATEGORIES: [FileCategory; 3] =
            [FileCategory::Source, FileCategory::Header, FileCategory::Resource];

        let xml = &mut self.xml;
        xml.header()?;
        xml.line(
            0,
            &format!("<Project ToolsVersion=\"4.0\" xmlns=\"{MSBUILD_NAMESPACE}\">"),
        )?;

        xml.line(1, "<ItemGroup>")?;
        for category in CATEGORIES {
            xml.line(2, &format!("<Filter Include=\"{}\">", category.filter_name()))?;
            xml.element(3, "UniqueIdentifier", filter_identifier(category))?;
            xml.element(3, "Extensions", filter_extensions(category))?;
            xml.line(2, "</Filter>")?;
        }
        xml.line(1, "</ItemGroup>")?;

        for category in CATEGORIES {
            let files = information.files(category);
            if files.is_empty() {
                continue;
            }
            xml.line(1, "<ItemGroup>")?;
            for file in files {
                xml.line(2, &format!("<{} Include=\"{file}\">", item_tag(category)))?;
                xml.element(3, "Filter", category.filter_name())?;
                xml.line(2, &format!("</{}>", item_tag(category)))?;
            }
            xml.line(1, "</ItemGroup>")?;
        }

        xml.line(0, "</Project>")?;
        xml.out.flush()?;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::configuration::ConfigurationSet;
    use pretty_assertions::assert_eq;

    fn write(project: &Project, dependencies: &[&SolutionProject]) -> String {
        let mut writer = Vs2010ProjectFileWriter::new(Vec::new());
        writer.write_project(project, dependencies).unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    fn sample_project() -> Project {
        let mut release = ProjectConfiguration::new("Release", "Win32");
        release.output_type = Some("2".into());
        release.optimization = Some("2".into());
        release.precompiled_header = Some("0".into());
        release.include_directories = Some("..\\include".into());
        release.preprocessor_definitions = Some("WIN32;NDEBUG;".into());
        release.linker_values_set = true;
        release.additional_dependencies = vec!["zlib.lib".into(), "advapi32.lib".into()];
        release.linker_output_file = Some("$(OutDir)\\$(ProjectName).dll".into());
        release.import_library = Some("$(OutDir)\\$(ProjectName).lib".into());
        release.module_definition_file = Some("0".into());
        release.target_machine = Some("1".into());

        let mut debug = ProjectConfiguration::new("Debug", "Win32");
        debug.optimization = Some("0".into());
        debug.output_directory = Some("$(SolutionDir)$(ConfigurationName)".into());

        let mut configurations = ConfigurationSet::new();
        configurations.append(release);
        configurations.append(debug);
        configurations.extend_with_x64();

        Project {
            information: ProjectInformation {
                name: "libexample".into(),
                guid: "AAAAAAAA-0000-0000-0000-000000000001".into(),
                root_namespace: "libexample".into(),
                keyword: Some("Win32Proj".into()),
                source_files: vec!["..\\src\\a.c".into()],
                header_files: vec!["..\\src\\a.h".into()],
                resource_files: vec![],
            },
            configurations,
        }
    }

    fn parse(text: &str) -> roxmltree::Document<'_> {
        roxmltree::Document::parse(text.trim_start_matches(BYTE_ORDER_MARK)).unwrap()
    }

    fn conditions<'a>(doc: &'a roxmltree::Document, tag: &str) -> Vec<&'a str> {
        doc.descendants()
            .filter(|n| n.has_tag_name(tag))
            .filter_map(|n| n.attribute("Condition"))
            .collect()
    }

    const RELEASE_WIN32: &str = "'$(Configuration)|$(Platform)'=='Release|Win32'";
    const RELEASE_X64: &str = "'$(Configuration)|$(Platform)'=='Release|x64'";
    const DEBUG_WIN32: &str = "'$(Configuration)|$(Platform)'=='Debug|Win32'";
    const DEBUG_X64: &str = "'$(Configuration)|$(Platform)'=='Debug|x64'";

    #[test]
    fn output_is_well_formed_with_bom_and_crlf() {
        let text = write(&sample_project(), &[]);
        assert!(text.starts_with('\u{feff}'));
        assert!(text.ends_with("</Project>\r\n"));
        assert!(!text.replace("\r\n", "").contains('\n'));
        let doc = parse(&text);
        assert_eq!(doc.root_element().attribute("ToolsVersion"), Some("4.0"));
    }

    #[test]
    fn property_groups_reverse_item_definitions_forward() {
        let text = write(&sample_project(), &[]);
        let doc = parse(&text);
        assert_eq!(
            conditions(&doc, "PropertyGroup"),
            [RELEASE_WIN32, RELEASE_X64, DEBUG_WIN32, DEBUG_X64]
        );
        assert_eq!(
            conditions(&doc, "ItemDefinitionGroup"),
            [DEBUG_WIN32, DEBUG_X64, RELEASE_WIN32, RELEASE_X64]
        );
        let includes: Vec<_> = doc
            .descendants()
            .filter(|n| n.has_tag_name("ProjectConfiguration"))
            .filter_map(|n| n.attribute("Include"))
            .collect();
        assert_eq!(includes, ["Debug|Win32", "Debug|x64", "Release|Win32", "Release|x64"]);
    }

    #[test]
    fn x64_configurations_carry_toolset_and_machine() {
        let text = write(&sample_project(), &[]);
        assert!(text.contains("    <PlatformToolset>Windows7.1SDK</PlatformToolset>\r\n"));
        assert_eq!(text.matches("<PlatformToolset>").count(), 2);
        assert_eq!(text.matches("<TargetMachine>MachineX64</TargetMachine>").count(), 1);
        assert_eq!(text.matches("<TargetMachine>MachineX86</TargetMachine>").count(), 1);
    }

    #[test]
    fn special_zero_written_as_empty_element() {
        let text = write(&sample_project(), &[]);
        assert!(text.contains("      <PrecompiledHeader>\r\n      </PrecompiledHeader>\r\n"));
        assert!(text.contains("      <ModuleDefinitionFile>\r\n      </ModuleDefinitionFile>\r\n"));
        // Debug has no precompiled header code at all.
        assert_eq!(text.matches("<PrecompiledHeader>").count(), 2);
        assert!(!text.contains("<DebugInformationFormat>"));
    }

    fn module_definition_lines(value: Option<&str>) -> Vec<String> {
        let mut project = sample_project();
        let mut release = project.configurations.get("Release", "Win32").unwrap().clone();
        release.module_definition_file = value.map(String::from);
        let mut configurations = ConfigurationSet::new();
        configurations.append(release);
        project.configurations = configurations;

        write(&project, &[])
            .lines()
            .filter(|l| l.contains("ModuleDefinitionFile"))
            .map(String::from)
            .collect()
    }

    #[test]
    fn module_definition_file_zero_empty_and_path() {
        assert_eq!(
            module_definition_lines(Some("0")),
            ["      <ModuleDefinitionFile>", "      </ModuleDefinitionFile>"]
        );
        assert!(module_definition_lines(Some("")).is_empty());
        assert!(module_definition_lines(None).is_empty());
        assert_eq!(
            module_definition_lines(Some("libexample.def")),
            ["      <ModuleDefinitionFile>libexample.def</ModuleDefinitionFile>"]
        );
    }

    #[test]
    fn project_reference_path_is_escaped() {
        let odd = SolutionProject::new("a&b", "a&b\\\"q\"", "aaaaaaaa-0000-0000-0000-000000000003");
        let text = write(&sample_project(), &[&odd]);
        assert!(text.contains("<ProjectReference Include=\"..\\a&amp;b\\&quot;q&quot;.vcxproj\">"));

        let doc = parse(&text);
        let reference = doc.descendants().find(|n| n.has_tag_name("ProjectReference")).unwrap();
        assert_eq!(reference.attribute("Include"), Some("..\\a&b\\\"q\".vcxproj"));
    }

    #[test]
    fn escape_attribute_characters() {
        assert_eq!(escape_attribute("a<b>&\"c\""), "a&lt;b&gt;&amp;&quot;c&quot;");
        assert_eq!(escape_attribute("plain\\path"), "plain\\path");
    }

    #[test]
    fn paths_and_lists_are_rewritten() {
        let text = write(&sample_project(), &[]);
        assert!(text.contains("<OutputFile>$(OutDir)$(ProjectName).dll</OutputFile>"));
        assert!(text.contains("<ImportLibrary>$(OutDir)$(ProjectName).lib</ImportLibrary>"));
        assert!(text.contains(
            "<AdditionalIncludeDirectories>..\\include;%(AdditionalIncludeDirectories)</AdditionalIncludeDirectories>"
        ));
        assert!(text.contains(
            "<PreprocessorDefinitions>WIN32;NDEBUG;%(PreprocessorDefinitions)</PreprocessorDefinitions>"
        ));
        assert!(text.contains(
            "<AdditionalDependencies>zlib.lib;advapi32.lib;%(AdditionalDependencies)</AdditionalDependencies>"
        ));
    }

    #[test]
    fn output_directories() {
        let text = write(&sample_project(), &[]);
        assert!(text.contains(&format!(
            "<OutDir Condition=\"{DEBUG_WIN32}\">$(SolutionDir)$(Configuration)\\</OutDir>"
        )));
        assert!(text.contains(&format!(
            "<IntDir Condition=\"{RELEASE_WIN32}\">$(Configuration)\\</IntDir>"
        )));
    }

    #[test]
    fn absent_linker_block_is_not_written() {
        let text = write(&sample_project(), &[]);
        let doc = parse(&text);
        let links = doc.descendants().filter(|n| n.has_tag_name("Link")).count();
        assert_eq!(links, 2);
    }

    #[test]
    fn project_references() {
        let b = SolutionProject::new("libb", "libb\\libb", "bbbbbbbb-0000-0000-0000-000000000002");
        let a = SolutionProject::new("liba", "liba\\liba", "aaaaaaaa-0000-0000-0000-000000000003");
        let text = write(&sample_project(), &[&a, &b]);
        let expected = "\
    <ProjectReference Include=\"..\\liba\\liba.vcxproj\">\r
      <Project>{aaaaaaaa-0000-0000-0000-000000000003}</Project>\r
      <ReferenceOutputAssembly>false</ReferenceOutputAssembly>\r
    </ProjectReference>\r
    <ProjectReference Include=\"..\\libb\\libb.vcxproj\">\r
";
        assert!(text.contains(expected), "{text}");
    }

    #[test]
    fn file_items() {
        let text = write(&sample_project(), &[]);
        assert!(text.contains("    <ClCompile Include=\"..\\src\\a.c\" />\r\n"));
        assert!(text.contains("    <ClInclude Include=\"..\\src\\a.h\" />\r\n"));
        assert!(!text.contains("<ResourceCompile"));
    }

    #[test]
    fn globals() {
        let text = write(&sample_project(), &[]);
        let doc = parse(&text);
        let guid = doc.descendants().find(|n| n.has_tag_name("ProjectGuid")).unwrap();
        assert_eq!(guid.text(), Some("{AAAAAAAA-0000-0000-0000-000000000001}"));
    }

    #[test]
    fn inherited_list_termination() {
        assert_eq!(inherited_list("", "X"), "");
        assert_eq!(inherited_list("a", "X"), "a;%(X)");
        assert_eq!(inherited_list("a;", "X"), "a;%(X)");
    }

    #[test]
    fn filters_file() {
        let project = sample_project();
        let mut writer = Vs2010FiltersFileWriter::new(Vec::new());
        writer.write_filters(&project.information).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let doc = parse(&text);

        let filters: Vec<_> = doc
            .descendants()
            .filter(|n| n.has_tag_name("Filter"))
            .filter_map(|n| n.attribute("Include"))
            .collect();
        assert_eq!(filters, ["Source Files", "Header Files", "Resource Files"]);

        let header = doc
            .descendants()
            .find(|n| n.has_tag_name("ClInclude"))
            .unwrap();
        assert_eq!(header.attribute("Include"), Some("..\\src\\a.h"));
        let filter = header.children().find(|n| n.has_tag_name("Filter")).unwrap();
        assert_eq!(filter.text(), Some("Header Files"));
    }
}
