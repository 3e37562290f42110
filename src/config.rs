//! # Recipe Schema and Parsing
//!
//! This module defines the `.pbxpatch.yaml` recipe: an ordered list of patch
//! steps applied as one run. Each step is a single-key mapping whose key
//! names the step:
//!
//! ```yaml
//! - embed_framework:
//!     project: UnityBuild/Unity-iPhone.xcodeproj
//!     framework: UnityFramework.framework
//! - public_header:
//!     project: UnityBuild/Unity-iPhone.xcodeproj
//!     marker: Libraries/Plugins/iOS
//! - text_patch:
//!     file: UnityBuild/Classes/UI/UnityViewControllerBase+iOS.mm
//!     method: "- (BOOL)shouldAutorotate"
//! ```
//!
//! ## Key Components
//!
//! - **`Recipe`**: A type alias for `Vec<Step>`.
//! - **`Step`**: An untagged enum with one variant per step kind. Each variant
//!   wraps an options struct (`EmbedFrameworkOp`, `TextPatchOp`, ...).
//!
//! ## Paths
//!
//! [`from_file`] resolves every relative path in the recipe against the
//! directory containing the recipe, so a recipe can be run from anywhere.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default recipe file name, looked up in the working directory.
pub const DEFAULT_RECIPE: &str = ".pbxpatch.yaml";

/// Names of all step kinds, in documentation order.
pub const STEP_NAMES: [&str; 8] = [
    "embed_framework",
    "move_resource",
    "public_header",
    "workspace",
    "replace_dir",
    "copy_file",
    "text_patch",
    "build_log",
];

/// Embed a framework into a target's bundle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EmbedFrameworkOp {
    /// The `.xcodeproj` bundle, its directory, or the descriptor itself.
    pub project: PathBuf,
    /// Path of the framework as referenced from the project.
    pub framework: String,
    /// Target to embed into. Defaults to the first application target.
    #[serde(default)]
    pub target: Option<String>,
    /// Leave the framework in the target's link phases.
    #[serde(default)]
    pub keep_linked: bool,
}

/// Move a folder resource between targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveResourceOp {
    pub project: PathBuf,
    pub path: String,
    pub from_target: String,
    pub to_target: String,
}

/// Make a header public
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublicHeaderOp {
    pub project: PathBuf,
    /// Substring of the header's path, e.g. `Libraries/Plugins/iOS`.
    pub marker: String,
}

/// Reference a project from a workspace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WorkspaceOp {
    /// The `.xcworkspace` bundle or its `contents.xcworkspacedata`.
    pub workspace: PathBuf,
    pub project: PathBuf,
}

/// Source and destination of a copy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CopyOp {
    pub from: PathBuf,
    pub to: PathBuf,
}

/// Replace a literal inside one method of a source file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextPatchOp {
    pub file: PathBuf,
    pub method: String,
    /// Defaults to `return YES;`.
    #[serde(default)]
    pub find: Option<String>,
    /// Defaults to `return NO;`.
    #[serde(default)]
    pub replace: Option<String>,
}

/// Require a build log to report success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildLogOp {
    pub log: PathBuf,
    /// Defaults to `build success`.
    #[serde(default)]
    pub marker: Option<String>,
}

/// All step kinds of a recipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    EmbedFramework { embed_framework: EmbedFrameworkOp },
    MoveResource { move_resource: MoveResourceOp },
    PublicHeader { public_header: PublicHeaderOp },
    Workspace { workspace: WorkspaceOp },
    ReplaceDir { replace_dir: CopyOp },
    CopyFile { copy_file: CopyOp },
    TextPatch { text_patch: TextPatchOp },
    BuildLog { build_log: BuildLogOp },
}

impl Step {
    pub fn name(&self) -> &'static str {
        match self {
            Step::EmbedFramework { .. } => "embed_framework",
            Step::MoveResource { .. } => "move_resource",
            Step::PublicHeader { .. } => "public_header",
            Step::Workspace { .. } => "workspace",
            Step::ReplaceDir { .. } => "replace_dir",
            Step::CopyFile { .. } => "copy_file",
            Step::TextPatch { .. } => "text_patch",
            Step::BuildLog { .. } => "build_log",
        }
    }

    /// The project this step edits in memory, if it edits one.
    pub fn project(&self) -> Option<&Path> {
        match self {
            Step::EmbedFramework { embed_framework } => Some(&embed_framework.project),
            Step::MoveResource { move_resource } => Some(&move_resource.project),
            Step::PublicHeader { public_header } => Some(&public_header.project),
            _ => None,
        }
    }

    /// Join every relative path of the step onto `base`.
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };
        match self {
            Step::EmbedFramework { embed_framework } => resolve(&mut embed_framework.project),
            Step::MoveResource { move_resource } => resolve(&mut move_resource.project),
            Step::PublicHeader { public_header } => resolve(&mut public_header.project),
            Step::Workspace { workspace } => {
                resolve(&mut workspace.workspace);
                resolve(&mut workspace.project);
            }
            Step::ReplaceDir { replace_dir: op } | Step::CopyFile { copy_file: op } => {
                resolve(&mut op.from);
                resolve(&mut op.to);
            }
            Step::TextPatch { text_patch } => resolve(&mut text_patch.file),
            Step::BuildLog { build_log } => resolve(&mut build_log.log),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::EmbedFramework { embed_framework: op } => {
                write!(f, "embed {} in {}", op.framework, op.project.display())
            }
            Step::MoveResource { move_resource: op } => write!(
                f,
                "move {} from {} to {} in {}",
                op.path,
                op.from_target,
                op.to_target,
                op.project.display()
            ),
            Step::PublicHeader { public_header: op } => write!(
                f,
                "make {} header public in {}",
                op.marker,
                op.project.display()
            ),
            Step::Workspace { workspace: op } => write!(
                f,
                "add {} to {}",
                op.project.display(),
                op.workspace.display()
            ),
            Step::ReplaceDir { replace_dir: op } => {
                write!(f, "replace {} with {}", op.to.display(), op.from.display())
            }
            Step::CopyFile { copy_file: op } => {
                write!(f, "copy {} to {}", op.from.display(), op.to.display())
            }
            Step::TextPatch { text_patch: op } => {
                write!(f, "patch {} in {}", op.method, op.file.display())
            }
            Step::BuildLog { build_log: op } => write!(f, "check build log {}", op.log.display()),
        }
    }
}

/// The complete recipe, executed in order.
pub type Recipe = Vec<Step>;

/// Parses a YAML string into a `Recipe`.
///
/// Relative paths are left as written; see [`from_file`].
pub fn parse(yaml_content: &str) -> Result<Recipe> {
    match serde_yaml::from_str::<Recipe>(yaml_content) {
        Ok(recipe) => Ok(recipe),
        Err(err) => Err(diagnose(yaml_content).unwrap_or_else(|| Error::ConfigParse {
            message: err.to_string(),
            hint: None,
        })),
    }
}

/// Explain why a recipe failed to parse, step by step.
///
/// Untagged enums only report that no variant matched; re-parsing each step
/// on its own names the step and the offending field.
fn diagnose(yaml_content: &str) -> Option<Error> {
    use serde_yaml::Value;

    let steps = match serde_yaml::from_str::<Value>(yaml_content) {
        Ok(Value::Sequence(steps)) => steps,
        Ok(Value::Null) => return None,
        Ok(_) => {
            return Some(Error::ConfigParse {
                message: "A recipe must be a list of steps".to_string(),
                hint: Some("start each step with '- ', e.g. '- embed_framework:'".to_string()),
            })
        }
        Err(err) => return Some(Error::Yaml(err)),
    };

    for (index, step) in steps.into_iter().enumerate() {
        let number = index + 1;
        let Value::Mapping(map) = step else {
            return Some(Error::ConfigParse {
                message: format!("Step {} is not a mapping", number),
                hint: None,
            });
        };
        if map.len() != 1 {
            return Some(Error::ConfigParse {
                message: format!("Step {} must have exactly one key, found {}", number, map.len()),
                hint: Some("indent the step's options under its name".to_string()),
            });
        }
        let key = map.keys().next().and_then(Value::as_str).unwrap_or_default();
        if !STEP_NAMES.contains(&key) {
            return Some(Error::ConfigParse {
                message: format!("Unknown step type {:?} in step {}", key, number),
                hint: Some(format!("expected one of: {}", STEP_NAMES.join(", "))),
            });
        }
        if let Err(err) = serde_yaml::from_value::<Step>(Value::Mapping(map.clone())) {
            let detail = map
                .values()
                .next()
                .cloned()
                .map(|options| options_error(key, options))
                .unwrap_or_else(|| err.to_string());
            return Some(Error::ConfigParse {
                message: format!("Invalid {} options in step {}: {}", key, number, detail),
                hint: None,
            });
        }
    }
    None
}

fn options_error(key: &str, options: serde_yaml::Value) -> String {
    fn check<T: serde::de::DeserializeOwned>(options: serde_yaml::Value) -> String {
        match serde_yaml::from_value::<T>(options) {
            Ok(_) => "unexpected shape".to_string(),
            Err(err) => err.to_string(),
        }
    }
    match key {
        "embed_framework" => check::<EmbedFrameworkOp>(options),
        "move_resource" => check::<MoveResourceOp>(options),
        "public_header" => check::<PublicHeaderOp>(options),
        "workspace" => check::<WorkspaceOp>(options),
        "replace_dir" | "copy_file" => check::<CopyOp>(options),
        "text_patch" => check::<TextPatchOp>(options),
        _ => check::<BuildLogOp>(options),
    }
}

/// Parse a recipe file, resolving relative paths against its directory.
pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Recipe> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    let mut recipe = parse(&content)?;
    let base = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    for step in &mut recipe {
        step.resolve_paths(&base);
    }
    Ok(recipe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_recipe() {
        let yaml = r#"
- embed_framework:
    project: UnityBuild/Unity-iPhone.xcodeproj
    framework: UnityFramework.framework
- move_resource:
    project: UnityBuild/Unity-iPhone.xcodeproj
    path: Data
    from_target: Unity-iPhone
    to_target: UnityFramework
- public_header:
    project: UnityBuild/Unity-iPhone.xcodeproj
    marker: Libraries/Plugins/iOS
- workspace:
    workspace: XcodeWorkspace/GameWS.xcworkspace
    project: CocosBuild/proj/Game.xcodeproj
- replace_dir:
    from: UnityBuild/Unity-iPhone/Images.xcassets/AppIcon.appiconset
    to: cocosProject/native/engine/ios/Images.xcassets/AppIcon.appiconset
- copy_file:
    from: PrivacyInfo.xcprivacy
    to: UnityBuild/UnityFramework/PrivacyInfo.xcprivacy
- text_patch:
    file: UnityBuild/Classes/UI/UnityViewControllerBase+iOS.mm
    method: "- (BOOL)shouldAutorotate"
- build_log:
    log: cocos_build.log
"#;
        let recipe = parse(yaml).unwrap();
        let names: Vec<_> = recipe.iter().map(Step::name).collect();
        assert_eq!(names, STEP_NAMES.to_vec());

        match &recipe[0] {
            Step::EmbedFramework { embed_framework } => {
                assert_eq!(embed_framework.framework, "UnityFramework.framework");
                assert_eq!(embed_framework.target, None);
                assert!(!embed_framework.keep_linked);
            }
            other => panic!("expected embed_framework, got {:?}", other),
        }
        match &recipe[6] {
            Step::TextPatch { text_patch } => {
                assert_eq!(text_patch.method, "- (BOOL)shouldAutorotate");
                assert_eq!(text_patch.find, None);
            }
            other => panic!("expected text_patch, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_optional_fields() {
        let yaml = r#"
- embed_framework:
    project: Game.xcodeproj
    framework: Vendor.framework
    target: Game-mobile
    keep_linked: true
- build_log:
    log: build.log
    marker: "BUILD SUCCEEDED"
"#;
        let recipe = parse(yaml).unwrap();
        assert_eq!(
            recipe[0],
            Step::EmbedFramework {
                embed_framework: EmbedFrameworkOp {
                    project: PathBuf::from("Game.xcodeproj"),
                    framework: "Vendor.framework".to_string(),
                    target: Some("Game-mobile".to_string()),
                    keep_linked: true,
                }
            }
        );
        assert_eq!(recipe[0].project(), Some(Path::new("Game.xcodeproj")));
        assert_eq!(recipe[1].project(), None);
    }

    #[test]
    fn test_empty_recipe() {
        assert!(parse("[]").unwrap().is_empty());
    }

    #[test]
    fn test_unknown_step_has_hint() {
        let err = parse("- embed_frameworks:\n    project: a\n").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Unknown step type \"embed_frameworks\" in step 1"));
        assert!(message.contains("hint: expected one of: embed_framework"));
    }

    #[test]
    fn test_invalid_options_name_the_field() {
        let err = parse(
            "- build_log:\n    log: a.log\n- public_header:\n    project: a\n    markers: x\n",
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Invalid public_header options in step 2"));
        assert!(message.contains("markers"));
    }

    #[test]
    fn test_not_a_list() {
        let err = parse("embed_framework: {}").unwrap_err();
        assert!(err.to_string().contains("must be a list of steps"));

        let err = parse("- embed_framework: {}\n  public_header: {}\n").unwrap_err();
        assert!(err.to_string().contains("exactly one key"));
    }

    #[test]
    fn test_from_file_resolves_relative_paths() {
        let temp = tempfile::TempDir::new().unwrap();
        let recipe_path = temp.path().join(DEFAULT_RECIPE);
        std::fs::write(
            &recipe_path,
            "- copy_file:\n    from: PrivacyInfo.xcprivacy\n    to: /abs/PrivacyInfo.xcprivacy\n",
        )
        .unwrap();

        let recipe = from_file(&recipe_path).unwrap();
        match &recipe[0] {
            Step::CopyFile { copy_file } => {
                assert_eq!(copy_file.from, temp.path().join("PrivacyInfo.xcprivacy"));
                assert_eq!(copy_file.to, PathBuf::from("/abs/PrivacyInfo.xcprivacy"));
            }
            other => panic!("expected copy_file, got {:?}", other),
        }
    }

    #[test]
    fn test_display() {
        let recipe = parse("- text_patch:\n    file: a.mm\n    method: \"- (BOOL)x\"\n").unwrap();
        assert_eq!(recipe[0].to_string(), "patch - (BOOL)x in a.mm");
    }
}
