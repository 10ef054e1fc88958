//! Solution (`.sln`) files: the project list, project dependencies and the
//! solution configuration matrix.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::configuration::{Configuration, ConfigurationSet, SolutionConfiguration};
use crate::error::{ConvertError, io_error};
use crate::grammar::{parse_configuration_mapping, parse_dependency_line, parse_project_line};
use crate::line_reader::{BYTE_ORDER_MARK, LineReader};

/// Project kind GUID of Visual C++ projects.
pub const VISUAL_CPP_PROJECT_KIND: &str = "8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942";

// ═══════════════════════════════════════════════════════════════════════════════
//  SolutionProject
// ═══════════════════════════════════════════════════════════════════════════════

/// A project entry of a solution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SolutionProject {
    pub name: String,
    /// Path relative to the solution without extension, `\` separated.
    pub filename: String,
    /// Lower case, without braces.
    pub guid: String,
    /// GUIDs of the projects this one depends on, lower case, in file order.
    pub dependencies: Vec<String>,
}

impl SolutionProject {
    pub fn new(name: impl Into<String>, filename: impl Into<String>, guid: &str) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            guid: guid.to_lowercase(),
            dependencies: Vec::new(),
        }
    }

    pub fn add_dependency(&mut self, guid: &str) {
        self.dependencies.push(guid.to_lowercase());
    }
}

/// Index projects by GUID for dependency lookups.
pub fn projects_by_guid(projects: &[SolutionProject]) -> HashMap<&str, &SolutionProject> {
    projects.iter().map(|p| (p.guid.as_str(), p)).collect()
}

/// Resolve the dependencies of `project`, sorted by project name.
///
/// GUIDs with no matching project are skipped.
pub fn resolve_dependencies<'a>(
    project: &SolutionProject,
    by_guid: &HashMap<&str, &'a SolutionProject>,
) -> Vec<&'a SolutionProject> {
    let mut resolved: Vec<&SolutionProject> = project
        .dependencies
        .iter()
        .filter_map(|guid| {
            let dependency = by_guid.get(guid.as_str()).copied();
            if dependency.is_none() {
                warn!("{}: dependency {{{guid}}} is not a project of the solution", project.name);
            }
            dependency
        })
        .collect();
    resolved.sort_by(|a, b| a.name.cmp(&b.name));
    resolved
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Reader
// ═══════════════════════════════════════════════════════════════════════════════

/// Reads a solution file of one format version.
pub trait SolutionFileReader {
    /// Validate the file signature. Fails the whole read on mismatch.
    fn read_header(&mut self) -> Result<(), ConvertError>;

    /// Read the next supported project, or `None` when no project remains.
    fn read_project(&mut self) -> Result<Option<SolutionProject>, ConvertError>;

    fn read_configurations(
        &mut self,
    ) -> Result<ConfigurationSet<SolutionConfiguration>, ConvertError>;

    fn read_projects(&mut self) -> Result<Vec<SolutionProject>, ConvertError> {
        let mut projects = Vec::new();
        while let Some(project) = self.read_project()? {
            projects.push(project);
        }
        Ok(projects)
    }
}

const VS2008_FORMAT_LINE: &str = "Microsoft Visual Studio Solution File, Format Version 10.00";
const PROJECT_DEPENDENCIES_SECTION: &str = "ProjectSection(ProjectDependencies) = postProject";
const SOLUTION_CONFIGURATIONS_SECTION: &str =
    "GlobalSection(SolutionConfigurationPlatforms) = preSolution";

/// Reader for Visual Studio 2008 (format version 10.00) solution files.
pub struct Vs2008SolutionFileReader<S: BufRead> {
    reader: LineReader<S>,
}

impl Vs2008SolutionFileReader<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        Ok(Self::new(LineReader::open(path)?))
    }
}

impl<S: BufRead> Vs2008SolutionFileReader<S> {
    pub fn new(reader: LineReader<S>) -> Self {
        Self { reader }
    }

    fn unexpected_end(&self, context: &str) -> ConvertError {
        ConvertError::malformed(format!(
            "unexpected end of solution file in {context} (line {})",
            self.reader.line_number()
        ))
    }

    /// Read one `Project(...)` ... `EndProject` block. Returns `None` when
    /// the next line does not start a project.
    fn read_project_block(&mut self) -> Result<Option<(bool, SolutionProject)>, ConvertError> {
        match self.reader.read_line(true)? {
            Some(line) if line.starts_with("Project(") => {}
            _ => return Ok(None),
        }
        let line = self.reader.read_line(false)?.unwrap_or_default();
        let Some(entry) = parse_project_line(&line) else {
            return Err(ConvertError::malformed(format!(
                "unsupported project line {} in solution file: {line}",
                self.reader.line_number()
            )));
        };

        let supported = entry.kind.eq_ignore_ascii_case(VISUAL_CPP_PROJECT_KIND)
            && entry.path.ends_with(".vcproj");
        let filename = entry.path.strip_suffix(".vcproj").unwrap_or(entry.path);
        let mut project = SolutionProject::new(entry.name, filename, entry.guid);

        let mut in_dependencies = false;
        loop {
            let Some(line) = self.reader.read_line(false)? else {
                return Err(self.unexpected_end("project"));
            };
            match line.as_str() {
                "EndProject" => break,
                PROJECT_DEPENDENCIES_SECTION => in_dependencies = true,
                "EndProjectSection" => in_dependencies = false,
                _ if in_dependencies => match parse_dependency_line(&line) {
                    Some((guid, value)) if guid.eq_ignore_ascii_case(value) => {
                        project.add_dependency(guid)
                    }
                    _ => debug!("{}: ignoring dependency line {line:?}", project.name),
                },
                _ => {}
            }
        }
        Ok(Some((supported, project)))
    }
}

impl<S: BufRead> SolutionFileReader for Vs2008SolutionFileReader<S> {
    fn read_header(&mut self) -> Result<(), ConvertError> {
        let line = self.reader.read_line(false)?.unwrap_or_default();
        if line != BYTE_ORDER_MARK.to_string() {
            return Err(ConvertError::malformed(
                "unsupported solution file: missing byte-order mark line",
            ));
        }

        let line = self.reader.read_line(false)?.unwrap_or_default();
        if line != VS2008_FORMAT_LINE {
            return Err(ConvertError::malformed(format!(
                "unsupported solution file format: {line:?}"
            )));
        }

        // Optional `# Visual C++ Express 2008` style comment.
        if let Some(line) = self.reader.read_line(true)? {
            if line.starts_with("# Visual") {
                self.reader.read_line(false)?;
            }
        }
        Ok(())
    }

    fn read_project(&mut self) -> Result<Option<SolutionProject>, ConvertError> {
        while let Some((supported, project)) = self.read_project_block()? {
            if supported {
                debug!("read solution project {} ({})", project.name, project.filename);
                return Ok(Some(project));
            }
            warn!("skipping unsupported project {} ({})", project.name, project.filename);
        }
        Ok(None)
    }

    fn read_configurations(
        &mut self,
    ) -> Result<ConfigurationSet<SolutionConfiguration>, ConvertError> {
        let mut configurations = ConfigurationSet::new();

        loop {
            let Some(line) = self.reader.read_line(false)? else {
                warn!("solution file has no solution configurations");
                return Ok(configurations);
            };
            if line == SOLUTION_CONFIGURATIONS_SECTION {
                break;
            }
        }

        loop {
            let Some(line) = self.reader.read_line(false)? else {
                return Err(self.unexpected_end("solution configurations"));
            };
            if line == "EndGlobalSection" {
                break;
            }
            match parse_configuration_mapping(&line) {
                Some((identifier, value)) if identifier == value => {
                    configurations.append(SolutionConfiguration::new(identifier.0, identifier.1))
                }
                _ => debug!("ignoring solution configuration line {line:?}"),
            }
        }
        debug!("read {} solution configurations", configurations.len());
        Ok(configurations)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Writer
// ═══════════════════════════════════════════════════════════════════════════════

/// Writes a solution file of one format version.
pub trait SolutionFileWriter {
    fn write_solution(
        &mut self,
        projects: &[SolutionProject],
        configurations: &ConfigurationSet<SolutionConfiguration>,
    ) -> Result<(), ConvertError>;
}

/// Writer for Visual Studio 2010 (format version 11.00) solution files.
pub struct Vs2010SolutionFileWriter<W: Write> {
    out: W,
}

impl Vs2010SolutionFileWriter<BufWriter<File>> {
    pub fn create(path: impl AsRef<Path>) -> Result<Self, ConvertError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| io_error(path, e))?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> Vs2010SolutionFileWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, depth: usize, text: &str) -> io::Result<()> {
        write!(self.out, "{:\t<depth$}{text}\r\n", "")
    }

    fn write_header(&mut self) -> io::Result<()> {
        self.line(0, &BYTE_ORDER_MARK.to_string())?;
        self.line(0, "Microsoft Visual Studio Solution File, Format Version 11.00")?;
        self.line(0, "# Visual C++ Express 2010")
    }

    fn write_project(&mut self, project: &SolutionProject) -> io::Result<()> {
        self.line(
            0,
            &format!(
                "Project(\"{{{VISUAL_CPP_PROJECT_KIND}}}\") = \"{}\", \"{}.vcxproj\", \"{{{}}}\"",
                project.name,
                project.filename,
                project.guid.to_uppercase()
            ),
        )?;
        if !project.dependencies.is_empty() {
            self.line(1, PROJECT_DEPENDENCIES_SECTION)?;
            for guid in &project.dependencies {
                let guid = guid.to_uppercase();
                self.line(2, &format!("{{{guid}}} = {{{guid}}}"))?;
            }
            self.line(1, "EndProjectSection")?;
        }
        self.line(0, "EndProject")
    }

    fn write_global(
        &mut self,
        projects: &[SolutionProject],
        configurations: &ConfigurationSet<SolutionConfiguration>,
    ) -> io::Result<()> {
        self.line(0, "Global")?;

        self.line(1, SOLUTION_CONFIGURATIONS_SECTION)?;
        for configuration in configurations.sorted(false) {
            let identifier = configuration.identifier();
            self.line(2, &format!("{identifier} = {identifier}"))?;
        }
        self.line(1, "EndGlobalSection")?;

        self.line(1, "GlobalSection(ProjectConfigurationPlatforms) = postSolution")?;
        for project in projects {
            let guid = project.guid.to_uppercase();
            for configuration in configurations.sorted(false) {
                let identifier = configuration.identifier();
                self.line(2, &format!("{{{guid}}}.{identifier}.ActiveCfg = {identifier}"))?;
                self.line(2, &format!("{{{guid}}}.{identifier}.Build.0 = {identifier}"))?;
            }
        }
        self.line(1, "EndGlobalSection")?;

        self.line(1, "GlobalSection(SolutionProperties) = preSolution")?;
        self.line(2, "HideSolutionNode = FALSE")?;
        self.line(1, "EndGlobalSection")?;

        self.line(0, "EndGlobal")
    }
}

impl<W: Write> SolutionFileWriter for Vs2010SolutionFileWriter<W> {
    fn write_solution(
        &mut self,
        projects: &[SolutionProject],
        configurations: &ConfigurationSet<SolutionConfiguration>,
    ) -> Result<(), ConvertError> {
        self.write_header()?;
        for project in projects {
            self.write_project(project)?;
        }
        self.write_global(projects, configurations)?;
        self.out.flush()?;
        debug!(
            "wrote solution with {} projects and {} configurations",
            projects.len(),
            configurations.len()
        );
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    const EXAMPLE_SLN: &str = include_str!("../testdata/vs2008/example.sln");

    fn reader(text: &str) -> Vs2008SolutionFileReader<&[u8]> {
        Vs2008SolutionFileReader::new(LineReader::new(text.as_bytes()))
    }

    fn read(text: &str) -> (Vec<SolutionProject>, ConfigurationSet<SolutionConfiguration>) {
        let mut reader = reader(text);
        reader.read_header().unwrap();
        let projects = reader.read_projects().unwrap();
        let configurations = reader.read_configurations().unwrap();
        (projects, configurations)
    }

    #[test]
    fn reads_fixture_projects() {
        let (projects, _) = read(EXAMPLE_SLN);
        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["libexample", "exampletool"]);
        assert_eq!(projects[0].filename, "libexample\\libexample");
        assert_eq!(projects[0].guid, "aaaaaaaa-0000-0000-0000-000000000001");
        assert!(projects[0].dependencies.is_empty());
        assert_eq!(projects[1].dependencies, ["aaaaaaaa-0000-0000-0000-000000000001"]);
    }

    #[test]
    fn reads_fixture_configurations() {
        let (_, configurations) = read(EXAMPLE_SLN);
        let identifiers: Vec<_> = configurations.sorted(false).map(|c| c.identifier()).collect();
        assert_eq!(identifiers, ["Debug|Win32", "Release|Win32"]);
    }

    #[test]
    fn header_requires_byte_order_mark() {
        let text = EXAMPLE_SLN.trim_start_matches(BYTE_ORDER_MARK);
        let err = reader(text).read_header().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedInput);
    }

    #[test]
    fn header_requires_2008_format() {
        let text = EXAMPLE_SLN.replace("Format Version 10.00", "Format Version 11.00");
        let err = reader(&text).read_header().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedInput);
    }

    #[test]
    fn header_without_comment_line() {
        let text = EXAMPLE_SLN.replace("# Visual C++ Express 2008\r\n", "");
        let (projects, _) = read(&text);
        assert_eq!(projects.len(), 2);
    }

    #[test]
    fn mismatched_dependency_and_configuration_lines_are_ignored() {
        let text = "\u{feff}
Microsoft Visual Studio Solution File, Format Version 10.00
Project(\"{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}\") = \"a\", \"a\\a.vcproj\", \"{AAAAAAAA-0000-0000-0000-000000000001}\"
\tProjectSection(ProjectDependencies) = postProject
\t\t{BBBBBBBB-0000-0000-0000-000000000002} = {CCCCCCCC-0000-0000-0000-000000000003}
\t\t{dddddddd-0000-0000-0000-000000000004} = {DDDDDDDD-0000-0000-0000-000000000004}
\tEndProjectSection
EndProject
Global
\tGlobalSection(SolutionConfigurationPlatforms) = preSolution
\t\tDebug|Win32 = Release|Win32
\t\tRelease|Win32 = Release|Win32
\tEndGlobalSection
EndGlobal
";
        let (projects, configurations) = read(text);
        assert_eq!(projects[0].dependencies, ["dddddddd-0000-0000-0000-000000000004"]);
        assert_eq!(configurations.len(), 1);
        assert!(configurations.get("Release", "Win32").is_some());
    }

    #[test]
    fn malformed_project_line_is_an_error() {
        let text = "\u{feff}
Microsoft Visual Studio Solution File, Format Version 10.00
Project(\"{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}\") = \"a\"
EndProject
";
        let mut reader = reader(text);
        reader.read_header().unwrap();
        let err = reader.read_projects().unwrap_err();
        assert_eq!(err.kind, ErrorKind::MalformedInput);
    }

    #[test]
    fn resolves_dependencies_by_name() {
        let mut tool = SolutionProject::new("tool", "tool\\tool", "CCCCCCCC-0000-0000-0000-000000000003");
        tool.add_dependency("BBBBBBBB-0000-0000-0000-000000000002");
        tool.add_dependency("ffffffff-0000-0000-0000-00000000000f");
        tool.add_dependency("AAAAAAAA-0000-0000-0000-000000000001");
        let projects = vec![
            SolutionProject::new("zlib", "zlib\\zlib", "AAAAAAAA-0000-0000-0000-000000000001"),
            SolutionProject::new("libb", "libb\\libb", "BBBBBBBB-0000-0000-0000-000000000002"),
            tool.clone(),
        ];
        let by_guid = projects_by_guid(&projects);
        let names: Vec<_> =
            resolve_dependencies(&tool, &by_guid).iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["libb", "zlib"]);
    }

    #[test]
    fn writes_2010_solution() {
        let (projects, mut configurations) = read(EXAMPLE_SLN);
        configurations.extend_with_x64();

        let mut writer = Vs2010SolutionFileWriter::new(Vec::new());
        writer.write_solution(&projects, &configurations).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();

        let expected = "\u{feff}\r
Microsoft Visual Studio Solution File, Format Version 11.00\r
# Visual C++ Express 2010\r
Project(\"{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}\") = \"libexample\", \"libexample\\libexample.vcxproj\", \"{AAAAAAAA-0000-0000-0000-000000000001}\"\r
EndProject\r
Project(\"{8BC9CEB8-8B4A-11D0-8D11-00A0C91BC942}\") = \"exampletool\", \"exampletool\\exampletool.vcxproj\", \"{BBBBBBBB-0000-0000-0000-000000000002}\"\r
\tProjectSection(ProjectDependencies) = postProject\r
\t\t{AAAAAAAA-0000-0000-0000-000000000001} = {AAAAAAAA-0000-0000-0000-000000000001}\r
\tEndProjectSection\r
EndProject\r
Global\r
\tGlobalSection(SolutionConfigurationPlatforms) = preSolution\r
\t\tDebug|Win32 = Debug|Win32\r
\t\tDebug|x64 = Debug|x64\r
\t\tRelease|Win32 = Release|Win32\r
\t\tRelease|x64 = Release|x64\r
\tEndGlobalSection\r
\tGlobalSection(ProjectConfigurationPlatforms) = postSolution\r
";
        assert!(text.starts_with(expected), "{text}");
        assert!(text.contains(
            "\t\t{BBBBBBBB-0000-0000-0000-000000000002}.Release|x64.Build.0 = Release|x64\r\n"
        ));
        assert_eq!(text.matches(".ActiveCfg = ").count(), 8);
        assert!(text.ends_with(
            "\tGlobalSection(SolutionProperties) = preSolution\r
\t\tHideSolutionNode = FALSE\r
\tEndGlobalSection\r
EndGlobal\r
"
        ));
    }

    #[test]
    fn written_solution_reads_back_as_2010() {
        let (projects, configurations) = read(EXAMPLE_SLN);
        let mut writer = Vs2010SolutionFileWriter::new(Vec::new());
        writer.write_solution(&projects, &configurations).unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();

        // The 2008 reader only accepts format 10.00; everything after the
        // header keeps the same line shapes.
        let text = text.replace("Format Version 11.00", "Format Version 10.00");
        let text = text.replace(".vcxproj", ".vcproj");
        let (reread, reconfigured) = read(&text);
        assert_eq!(reread, projects);
        assert_eq!(reconfigured, configurations);
    }
}
