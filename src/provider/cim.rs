use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;

use crate::error::ProviderError;
use crate::schema::{CimClass, Namespace, PropertyMetadata};

/// Live provider backed by the CIM cmdlets.
///
/// Each call runs one `Get-CimClass` through PowerShell and reads back a
/// compact JSON projection of the class definitions. Remote hosts are
/// reached with `-ComputerName`, using the caller's credentials.
#[derive(Debug)]
pub struct CimProvider {
    powershell: PathBuf,
    computer_name: Option<String>,
}

fn default_powershell() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("powershell.exe")
    } else {
        PathBuf::from("pwsh")
    }
}

impl CimProvider {
    pub fn new(computer_name: Option<String>) -> Self {
        Self {
            powershell: default_powershell(),
            computer_name,
        }
    }

    pub fn with_powershell(mut self, exe: impl AsRef<Path>) -> Self {
        self.powershell = exe.as_ref().to_path_buf();
        self
    }

    /// Build the script for one lookup (`Some(class)`) or a namespace listing (`None`).
    pub fn script(&self, namespace: &Namespace, class_name: Option<&str>) -> String {
        let mut query = format!("Get-CimClass -Namespace {}", quote(namespace.path()));
        if let Some(class) = class_name {
            query.push_str(&format!(" -ClassName {}", quote(class)));
        }
        if let Some(host) = &self.computer_name {
            query.push_str(&format!(" -ComputerName {}", quote(host)));
        }

        format!(
            "$ErrorActionPreference = 'Stop'; \
             try {{ \
               $classes = @({query} | ForEach-Object {{ [pscustomobject]@{{ \
                 Name = $_.CimClassName; \
                 Properties = @($_.CimClassProperties | ForEach-Object {{ [pscustomobject]@{{ \
                   Name = $_.Name; \
                   CimType = $_.CimType.ToString(); \
                   Qualifiers = @($_.Qualifiers | ForEach-Object {{ $_.Name }}) \
                 }} }}) \
               }} }}); \
               ConvertTo-Json -InputObject $classes -Depth 5 -Compress \
             }} catch {{ [Console]::Error.WriteLine($_.Exception.Message); exit 1 }}"
        )
    }

    fn run(&self, script: &str) -> Result<Vec<CimClass>, ProviderError> {
        tracing::trace!(exe = %self.powershell.display(), script, "invoking CIM query");

        let output = Command::new(&self.powershell)
            .args(["-NoProfile", "-NonInteractive", "-Command", script])
            .output()
            .map_err(|e| {
                ProviderError::new(format!(
                    "failed to start {}: {e}",
                    self.powershell.display()
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let message = stderr.trim();
            return Err(ProviderError::new(if message.is_empty() {
                format!("CIM query exited with {}", output.status)
            } else {
                message.to_string()
            }));
        }

        parse_classes(&String::from_utf8_lossy(&output.stdout))
    }
}

impl super::Provider for CimProvider {
    fn describe(&self) -> String {
        format!(
            "cim ({})",
            self.computer_name.as_deref().unwrap_or("localhost")
        )
    }

    fn get_class(&self, namespace: &Namespace, class_name: &str) -> Result<CimClass, ProviderError> {
        let classes = self.run(&self.script(namespace, Some(class_name)))?;
        exact_match(classes, namespace, class_name)
    }

    fn list_classes(&self, namespace: &Namespace) -> Result<Vec<CimClass>, ProviderError> {
        self.run(&self.script(namespace, None))
    }
}

/// `-ClassName` expands wildcards, so only a definition whose name is the
/// requested one counts as found.
fn exact_match(
    classes: Vec<CimClass>,
    namespace: &Namespace,
    class_name: &str,
) -> Result<CimClass, ProviderError> {
    let mut matching: Vec<_> = classes
        .into_iter()
        .filter(|c| c.name.eq_ignore_ascii_case(class_name))
        .collect();
    match matching.len() {
        1 => Ok(matching.remove(0)),
        0 => Err(ProviderError::new(format!(
            "Not found: class {class_name} in {namespace}"
        ))),
        n => Err(ProviderError::new(format!(
            "expected one definition of {class_name}, provider returned {n}"
        ))),
    }
}

/// Quote a value as a single-quoted PowerShell literal.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireClass {
    name: String,
    #[serde(default)]
    properties: Option<Vec<WireProperty>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WireProperty {
    name: String,
    cim_type: String,
    #[serde(default)]
    qualifiers: Option<Vec<String>>,
}

/// Windows PowerShell sometimes wraps arrays as `{"value": [...], "Count": n}`
/// and emits a bare object for one-element results.
#[derive(Deserialize)]
#[serde(untagged)]
enum WirePayload {
    List(Vec<WireClass>),
    Wrapped { value: Vec<WireClass> },
    Single(WireClass),
}

/// Parse the JSON emitted by [`CimProvider::script`].
pub fn parse_classes(json: &str) -> Result<Vec<CimClass>, ProviderError> {
    let json = json.trim();
    if json.is_empty() {
        return Ok(Vec::new());
    }

    let payload: WirePayload = serde_json::from_str(json)
        .map_err(|e| ProviderError::new(format!("unreadable CIM output: {e}")))?;
    let wire = match payload {
        WirePayload::List(classes) | WirePayload::Wrapped { value: classes } => classes,
        WirePayload::Single(class) => vec![class],
    };

    Ok(wire
        .into_iter()
        .map(|class| {
            let properties = class
                .properties
                .unwrap_or_default()
                .into_iter()
                .map(|p| {
                    PropertyMetadata::new(p.name, p.cim_type, p.qualifiers.unwrap_or_default())
                })
                .collect();
            CimClass::new(class.name, properties)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Provider;
    use crate::schema::{DataType, PropertyType};
    use pretty_assertions::assert_eq;

    #[test]
    fn script_targets_rooted_namespace_and_class() {
        let provider = CimProvider::new(None);
        let script = provider.script(&Namespace::new("cimv2"), Some("Win32_OSRecoveryConfiguration"));
        assert!(script.contains("Get-CimClass -Namespace 'root/cimv2' -ClassName 'Win32_OSRecoveryConfiguration'"));
        assert!(!script.contains("-ComputerName"));
    }

    #[test]
    fn script_listing_with_remote_host() {
        let provider = CimProvider::new(Some("srv01".into()));
        let script = provider.script(&Namespace::new("SecurityCenter"), None);
        assert!(script.contains("Get-CimClass -Namespace 'root/SecurityCenter' -ComputerName 'srv01'"));
        assert!(!script.contains("-ClassName"));
    }

    #[test]
    fn script_escapes_single_quotes() {
        let provider = CimProvider::new(None);
        let script = provider.script(&Namespace::default(), Some("Bad'; Remove-Item x; '"));
        assert!(script.contains("-ClassName 'Bad''; Remove-Item x; '''"));
    }

    #[test]
    fn parses_class_list() {
        let json = r#"[{"Name":"Win32_OSRecoveryConfiguration","Properties":[
            {"Name":"AutoReboot","CimType":"Boolean","Qualifiers":["write","description"]},
            {"Name":"DebugFilePath","CimType":"String","Qualifiers":["write"]},
            {"Name":"Flags","CimType":"StringArray","Qualifiers":null}]}]"#;
        let classes = parse_classes(json).unwrap();
        assert_eq!(classes.len(), 1);
        let props = &classes[0].properties;
        assert_eq!(props[0].property_type(), &PropertyType::Data(DataType::Boolean));
        assert_eq!(props[1].qualifiers().to_vec(), vec!["write".to_string()]);
        assert_eq!(props[2].property_type(), &PropertyType::Other("StringArray".into()));
        assert!(props[2].qualifiers().is_empty());
    }

    #[test]
    fn parses_wrapped_and_single_payloads() {
        let wrapped = r#"{"value":[{"Name":"A","Properties":[]},{"Name":"B"}],"Count":2}"#;
        let names: Vec<_> = parse_classes(wrapped).unwrap().into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["A", "B"]);

        let single = r#"{"Name":"C","Properties":null}"#;
        let classes = parse_classes(single).unwrap();
        assert_eq!(classes, vec![CimClass::new("C", vec![])]);
    }

    #[test]
    fn lookup_requires_exact_class_name() {
        let ns = Namespace::default();
        let expanded = vec![
            CimClass::new("Win32_OSRecoveryConfiguration", vec![]),
            CimClass::new("Win32_OSRecoveryHistory", vec![]),
        ];
        let err = exact_match(expanded.clone(), &ns, "Win32_OSRecovery*").unwrap_err();
        assert_eq!(err.message, "Not found: class Win32_OSRecovery* in root/cimv2");

        let single = vec![CimClass::new("Win32_OSRecoveryConfiguration", vec![])];
        assert!(exact_match(single, &ns, "Win32_OSRecov?ryConfiguration").is_err());

        let class = exact_match(expanded, &ns, "win32_osrecoveryconfiguration").unwrap();
        assert_eq!(class.name, "Win32_OSRecoveryConfiguration");
    }

    #[test]
    fn empty_output_is_empty_list() {
        assert!(parse_classes("  \n").unwrap().is_empty());
    }

    #[test]
    fn garbage_output_is_provider_error() {
        let err = parse_classes("WARNING: something").unwrap_err();
        assert!(err.message.starts_with("unreadable CIM output"));
    }

    #[test]
    fn missing_executable_is_provider_error() {
        let provider = CimProvider::new(None).with_powershell("/nonexistent/wmiscout-powershell");
        let err = provider.list_classes(&Namespace::default()).unwrap_err();
        assert!(err.message.contains("failed to start /nonexistent/wmiscout-powershell"));
    }
}
